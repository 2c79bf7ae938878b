//! Mock implementation of the SessionLifecycle trait.

use async_trait::async_trait;
use callflow_core::{CoreError, FlowKind, SessionId, SessionLifecycle};
use mockall::mock;

// Generate the mock implementation
mock! {
    pub SessionLifecycle {}

    #[async_trait]
    impl SessionLifecycle for SessionLifecycle {
        async fn close_session(&self, session_id: &SessionId) -> Result<(), CoreError>;
        async fn notify_flow_switched(
            &self,
            session_id: &SessionId,
            from: FlowKind,
            to: FlowKind,
        ) -> Result<(), CoreError>;
    }
}

/// Creates a mock that expects exactly one close and accepts any switch.
pub fn create_mock_lifecycle_expecting_one_close() -> MockSessionLifecycle {
    let mut mock = MockSessionLifecycle::new();

    mock.expect_close_session().times(1).returning(|_| Ok(()));
    mock.expect_notify_flow_switched()
        .returning(|_, _, _| Ok(()));

    mock
}
