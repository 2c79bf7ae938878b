//! End-to-end sessions built from scripted steps, one test per call-flow scenario.

use callflow_core::{FlowKind, FlowRegistry, Outcome, SessionState};
use callflow_test_utils::assertions::{
    assert_closed_once, assert_flow_path, assert_step_calls, assert_terminated,
};
use callflow_tests::Scenario;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn test_main_list_runs_to_completion() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("a"))
        .leaf(FlowKind::Main, scenario.step("b"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_step_calls(&scenario.calls(), &["a.execute", "b.execute"])?;
    assert_terminated(&summary)?;
    assert_closed_once(&scenario.lifecycle)?;
    assert_flow_path(&scenario.lifecycle, &[FlowKind::Main, FlowKind::Disconnect])?;
    Ok(())
}

#[tokio::test]
async fn test_jump_to_error_runs_error_list() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("a").then(Outcome::JumpToError))
        .leaf(FlowKind::Main, scenario.step("never"))
        .leaf(FlowKind::Error, scenario.step("e"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_step_calls(&scenario.calls(), &["a.execute", "e.execute"])?;
    assert_terminated(&summary)?;
    assert_closed_once(&scenario.lifecycle)?;
    assert_flow_path(
        &scenario.lifecycle,
        &[FlowKind::Main, FlowKind::Error, FlowKind::Disconnect],
    )?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timer_wait_resumes_the_step() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(
            FlowKind::Main,
            scenario
                .step("a")
                .then_wait_for_timer(Duration::from_millis(500))
                .then(Outcome::Continue),
        )
        .build();

    let started = Instant::now();
    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_step_calls(&scenario.calls(), &["a.execute", "a.on_event"])?;
    assert_terminated(&summary)?;
    assert_eq!(summary.last_flow, FlowKind::Disconnect);
    assert_closed_once(&scenario.lifecycle)?;
    Ok(())
}

#[tokio::test]
async fn test_error_in_disconnect_list_terminates_without_error_list() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("a"))
        .leaf(FlowKind::Error, scenario.step("e"))
        .leaf(FlowKind::Disconnect, scenario.step("d").then(Outcome::JumpToError))
        .leaf(FlowKind::Disconnect, scenario.step("never"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_step_calls(&scenario.calls(), &["a.execute", "d.execute"])?;
    assert_terminated(&summary)?;
    assert_eq!(summary.last_flow, FlowKind::Disconnect);
    assert_flow_path(&scenario.lifecycle, &[FlowKind::Main, FlowKind::Disconnect])?;
    assert_closed_once(&scenario.lifecycle)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_terminate_is_idempotent() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("t1").then(Outcome::Terminate))
        .leaf(FlowKind::Main, scenario.step("never"))
        .leaf(
            FlowKind::Disconnect,
            scenario
                .step("d")
                .then_wait_for_timer(Duration::from_millis(200))
                .then(Outcome::Terminate),
        )
        .leaf(FlowKind::Disconnect, scenario.step("never_after"))
        .build();

    // Closing the call reports the hang-up back into the session while the
    // disconnect list is still running.
    let (controller, handle) = scenario.start(registry);
    scenario.lifecycle.echo_connection_lost(handle.clone());
    let summary = controller.run().await?;

    assert_step_calls(&scenario.calls(), &["t1.execute", "d.execute", "d.on_event"])?;
    assert_terminated(&summary)?;
    assert_closed_once(&scenario.lifecycle)?;
    assert_flow_path(&scenario.lifecycle, &[FlowKind::Main, FlowKind::Disconnect])?;
    assert!(handle.is_terminated());
    Ok(())
}

#[tokio::test]
async fn test_terminate_in_error_list_skips_disconnect_list() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(FlowKind::Main, scenario.step("a").then(Outcome::JumpToError))
        .leaf(FlowKind::Error, scenario.step("e").then(Outcome::Terminate))
        .leaf(FlowKind::Disconnect, scenario.step("d"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    let summary = controller.run().await?;

    assert_step_calls(&scenario.calls(), &["a.execute", "e.execute"])?;
    assert_eq!(summary.last_flow, FlowKind::Error);
    assert_closed_once(&scenario.lifecycle)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_connection_lost_cancels_waiting_step() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(
            FlowKind::Main,
            scenario
                .step("a")
                .then_wait_for_timer(Duration::from_secs(30)),
        )
        .leaf(FlowKind::Main, scenario.step("never"))
        .leaf(FlowKind::Disconnect, scenario.step("d"))
        .build();

    let (controller, handle) = scenario.start(registry);
    let session = tokio::spawn(controller.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handle.connection_lost());
    let summary = session.await??;

    assert_step_calls(&scenario.calls(), &["a.execute", "a.cancel", "d.execute"])?;
    assert_eq!(summary.state, SessionState::Terminated);
    assert_closed_once(&scenario.lifecycle)?;
    Ok(())
}

#[tokio::test]
async fn test_retry_runs_the_same_step_again() -> anyhow::Result<()> {
    let scenario = Scenario::new();
    let registry = FlowRegistry::builder()
        .leaf(
            FlowKind::Main,
            scenario
                .step("a")
                .then(Outcome::Retry)
                .then(Outcome::Retry)
                .then(Outcome::Continue),
        )
        .leaf(FlowKind::Main, scenario.step("b"))
        .build();

    let (controller, _handle) = scenario.start(registry);
    controller.run().await?;

    assert_eq!(scenario.journal.count("a", "execute"), 3);
    assert_eq!(scenario.journal.count("b", "execute"), 1);
    Ok(())
}
