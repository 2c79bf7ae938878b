//! Mock implementation of the CallControl trait.

use async_trait::async_trait;
use callflow_core::CoreError;
use callflow_stdlib::CallControl;
use mockall::mock;

mock! {
    pub CallControl {}

    #[async_trait]
    impl CallControl for CallControl {
        async fn transfer(&self, destination: &str) -> Result<(), CoreError>;
        async fn disconnect(&self) -> Result<(), CoreError>;
    }
}

/// Creates a mock that accepts any transfer and hang-up.
pub fn create_mock_call_control() -> MockCallControl {
    let mut mock = MockCallControl::new();

    mock.expect_transfer().returning(|_| Ok(()));
    mock.expect_disconnect().returning(|| Ok(()));

    mock
}
