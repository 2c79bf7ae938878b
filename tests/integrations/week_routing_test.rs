//! The week routing sample run end to end against a recording call.

use callflow_core::{FlowKind, SessionBuilder, SessionState, SessionSummary};
use callflow_stdlib::{
    build_week_routing_flow_with_clock, week_value, CallControlLifecycle, WeekRoutingTargets,
};
use callflow_test_utils::{init_test_tracing, run_with_timeout, RecordingCallControl};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

async fn route_on(
    date: NaiveDate,
    call: Arc<RecordingCallControl>,
    targets: &WeekRoutingTargets,
) -> anyhow::Result<SessionSummary> {
    init_test_tracing();
    let registry = build_week_routing_flow_with_clock(call.clone(), targets, move || date);
    let (controller, _handle) = SessionBuilder::new(registry)
        .with_lifecycle(Arc::new(CallControlLifecycle::new(call)))
        .build();
    Ok(run_with_timeout(controller, Duration::from_secs(30)).await?)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test(start_paused = true)]
async fn test_each_week_value_reaches_its_extension() -> anyhow::Result<()> {
    let targets = WeekRoutingTargets::default();
    let cases = [
        (date(2024, 1, 15), "1004"),
        (date(2024, 1, 1), "1006"),
        (date(2024, 1, 8), "1002"),
        (date(2024, 12, 30), "1002"),
        (date(2025, 12, 29), "1002"),
    ];

    for (day, expected) in cases {
        let call = RecordingCallControl::new();
        let summary = route_on(day, call.clone(), &targets).await?;

        assert_eq!(
            targets.extensions[week_value(day) as usize], expected,
            "week value of {day}"
        );
        assert_eq!(call.transfers(), vec![expected.to_string()], "routing on {day}");
        assert_eq!(call.disconnects(), 1);
        assert_eq!(summary.state, SessionState::Terminated);
        assert_eq!(summary.last_flow, FlowKind::Disconnect);
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transfer_waits_for_the_configured_delay() -> anyhow::Result<()> {
    let targets = WeekRoutingTargets {
        delay_ms: 1_500,
        ..WeekRoutingTargets::default()
    };
    let call = RecordingCallControl::new();

    let started = Instant::now();
    route_on(date(2024, 3, 4), call.clone(), &targets).await?;

    assert!(started.elapsed() >= Duration::from_millis(1_500));
    assert_eq!(call.transfers().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rejected_transfer_hangs_up_from_error_list() -> anyhow::Result<()> {
    let targets = WeekRoutingTargets::default();
    let call = RecordingCallControl::new();
    call.reject("1006");

    let summary = route_on(date(2024, 1, 1), call.clone(), &targets).await?;

    assert!(call.transfers().is_empty());
    assert_eq!(call.disconnects(), 1);
    assert_eq!(summary.last_flow, FlowKind::Error);
    assert!(summary.closed);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_extensions_follow_the_week() -> anyhow::Result<()> {
    let targets = WeekRoutingTargets {
        extensions: ["201".to_string(), "202".to_string(), "203".to_string()],
        delay_ms: 0,
    };
    let call = RecordingCallControl::new();

    // ISO week 53 of 2020
    route_on(date(2021, 1, 3), call.clone(), &targets).await?;

    assert_eq!(call.transfers(), vec!["203".to_string()]);
    Ok(())
}
