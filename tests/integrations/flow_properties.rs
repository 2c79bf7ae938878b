//! Controller guarantees checked across many outcome combinations.

use callflow_core::{
    ConditionalBranch, CorrelationToken, FlowConfig, FlowEvent, FlowKind, FlowRegistry, Outcome,
    SequenceContainer, SessionState,
};
use callflow_test_utils::assertions::{assert_closed_once, assert_terminated};
use callflow_test_utils::LifecycleCall;
use callflow_tests::Scenario;
use std::time::Duration;

const OUTCOMES: [Outcome; 4] = [
    Outcome::Continue,
    Outcome::Retry,
    Outcome::JumpToError,
    Outcome::Terminate,
];

#[tokio::test(start_paused = true)]
async fn test_one_step_at_a_time_and_one_close_for_every_outcome_mix() -> anyhow::Result<()> {
    for main in OUTCOMES {
        for error in OUTCOMES {
            for disconnect in OUTCOMES {
                let scenario = Scenario::new();
                let registry = FlowRegistry::builder()
                    .leaf(
                        FlowKind::Main,
                        scenario
                            .step("w")
                            .yielding()
                            .then_wait_for_timer(Duration::from_millis(10)),
                    )
                    .leaf(FlowKind::Main, scenario.step("a").yielding().then(main))
                    .leaf(FlowKind::Error, scenario.step("e").yielding().then(error))
                    .leaf(
                        FlowKind::Disconnect,
                        scenario.step("d").yielding().then(disconnect),
                    )
                    .build();

                let (controller, handle) = scenario.start(registry);
                let producer = tokio::spawn(async move {
                    for _ in 0..50 {
                        if !handle.post(FlowEvent::timeout(CorrelationToken::generate())) {
                            break;
                        }
                        tokio::task::yield_now().await;
                    }
                });

                let summary = controller.run().await?;
                producer.await?;

                let case = format!("main={main:?} error={error:?} disconnect={disconnect:?}");
                assert_eq!(scenario.journal.max_concurrent(), 1, "{case}");
                assert_terminated(&summary)?;
                assert_closed_once(&scenario.lifecycle)?;

                let path = scenario.lifecycle.flow_path();
                assert!(
                    path.iter().filter(|k| **k == FlowKind::Error).count() <= 1,
                    "{case}: {path:?}"
                );
                assert!(
                    path.iter().filter(|k| **k == FlowKind::Disconnect).count() <= 1,
                    "{case}: {path:?}"
                );
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_continue_past_last_step_enters_disconnect_list() -> anyhow::Result<()> {
    for kind in [FlowKind::Main, FlowKind::Error] {
        let scenario = Scenario::new();
        let mut builder = FlowRegistry::builder().leaf(FlowKind::Disconnect, scenario.step("d"));
        builder = match kind {
            FlowKind::Error => builder
                .leaf(FlowKind::Main, scenario.step("m").then(Outcome::JumpToError))
                .leaf(FlowKind::Error, scenario.step("last")),
            _ => builder.leaf(FlowKind::Main, scenario.step("last")),
        };

        let (controller, _handle) = scenario.start(builder.build());
        let summary = controller.run().await?;

        assert_eq!(scenario.journal.count("d", "execute"), 1);
        assert_eq!(summary.last_flow, FlowKind::Disconnect);
        assert_eq!(scenario.lifecycle.flow_path().last(), Some(&FlowKind::Disconnect));

        let calls = scenario.lifecycle.calls();
        let close = calls
            .iter()
            .position(|c| matches!(c, LifecycleCall::Close(_)))
            .unwrap();
        let to_disconnect = calls
            .iter()
            .position(|c| {
                matches!(c, LifecycleCall::Switched { to: FlowKind::Disconnect, .. })
            })
            .unwrap();
        assert!(close < to_disconnect, "close must precede disconnect entry");
    }
    Ok(())
}

#[tokio::test]
async fn test_jump_to_error_inside_error_list_terminates() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("a").then(Outcome::JumpToError))
        .leaf(FlowKind::Error, scenario.step("e").then(Outcome::JumpToError))
        .leaf(FlowKind::Error, scenario.step("never"))
        .leaf(FlowKind::Disconnect, scenario.step("d"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_eq!(scenario.journal.count("e", "execute"), 1);
    assert_eq!(scenario.journal.count("d", "execute"), 0);
    assert_eq!(summary.state, SessionState::Terminated);
    assert_eq!(summary.last_flow, FlowKind::Error);
    assert_closed_once(&scenario.lifecycle)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_repeated_connection_lost_enters_disconnect_once() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(
            FlowKind::Main,
            scenario.step("a").then_wait_for_timer(Duration::from_secs(60)),
        )
        .leaf(
            FlowKind::Disconnect,
            scenario
                .step("d")
                .then_wait_for_timer(Duration::from_millis(300)),
        )
        .build();

    let (controller, handle) = scenario.start(registry);
    scenario.lifecycle.echo_connection_lost(handle.clone());
    let session = tokio::spawn(controller.run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.connection_lost();
    handle.connection_lost();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.connection_lost();

    let summary = session.await??;

    assert_eq!(scenario.journal.count("a", "cancel"), 1);
    assert_eq!(scenario.journal.count("d", "execute"), 1);
    assert_eq!(scenario.journal.count("d", "on_event"), 1);
    assert_terminated(&summary)?;
    assert_closed_once(&scenario.lifecycle)?;
    assert_eq!(
        scenario.lifecycle.flow_path(),
        vec![FlowKind::Main, FlowKind::Disconnect]
    );
    Ok(())
}

#[tokio::test]
async fn test_retry_limit_routes_to_error_list() -> anyhow::Result<()> {
    let config = FlowConfig {
        max_step_retries: Some(3),
        ..FlowConfig::default()
    };
    let scenario = Scenario::new().with_config(config);
    let mut looping = scenario.step("loop");
    for _ in 0..10 {
        looping = looping.then(Outcome::Retry);
    }
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, looping)
        .leaf(FlowKind::Error, scenario.step("e"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    controller.run().await?;

    assert_eq!(scenario.journal.count("loop", "execute"), 4);
    assert_eq!(scenario.journal.count("e", "execute"), 1);
    Ok(())
}

#[tokio::test]
async fn test_retry_limit_is_per_nested_step() -> anyhow::Result<()> {
    let config = FlowConfig {
        max_step_retries: Some(2),
        ..FlowConfig::default()
    };
    let scenario = Scenario::new().with_config(config);
    let branch = ConditionalBranch::new("route").when(
        |_| Ok(true),
        SequenceContainer::new("body")
            .with_leaf(scenario.step("c1").then(Outcome::Retry).then(Outcome::Retry))
            .with_leaf(scenario.step("c2").then(Outcome::Retry).then(Outcome::Retry))
            .with_leaf(scenario.step("c3").then(Outcome::Retry)),
    );
    let registry = FlowRegistry::builder()
        .main(branch)
        .leaf(FlowKind::Error, scenario.step("e"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_eq!(scenario.journal.count("c1", "execute"), 3);
    assert_eq!(scenario.journal.count("c2", "execute"), 3);
    assert_eq!(scenario.journal.count("c3", "execute"), 2);
    assert_eq!(scenario.journal.count("e", "execute"), 0);
    assert_eq!(summary.last_flow, FlowKind::Disconnect);
    Ok(())
}
