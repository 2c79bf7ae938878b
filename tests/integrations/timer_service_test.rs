//! Timer manager behaviour observed through a session's event queue.

use callflow_core::{
    event_queue, CorrelationToken, EventKind, SessionId, TimerService, TokioTimerManager,
};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_only_uncancelled_timers_post_exactly_once() -> anyhow::Result<()> {
    let (sender, mut queue) = event_queue(SessionId("timers".to_string()));
    let timers = TokioTimerManager::new(sender);

    let tokens: Vec<CorrelationToken> = (0..10).map(|_| CorrelationToken::generate()).collect();
    for (i, token) in tokens.iter().enumerate() {
        timers
            .schedule(Duration::from_millis(100 * (i as u64 + 1)), token.clone())
            .await?;
    }

    let cancelled: HashSet<CorrelationToken> = tokens.iter().step_by(2).cloned().collect();
    for token in &cancelled {
        assert!(timers.cancel(token).await?);
    }
    assert_eq!(timers.pending(), 5);

    tokio::time::sleep(Duration::from_secs(2)).await;

    let mut fired = Vec::new();
    while let Some(event) = queue.try_take() {
        assert_eq!(event.kind, EventKind::Timeout);
        fired.push(event.token.expect("timeouts carry their token"));
    }

    assert_eq!(fired.len(), 5);
    assert!(fired.iter().all(|t| !cancelled.contains(t)));
    let unique: HashSet<_> = fired.iter().cloned().collect();
    assert_eq!(unique.len(), 5);
    assert_eq!(timers.pending(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timers_fire_in_deadline_order() -> anyhow::Result<()> {
    let (sender, mut queue) = event_queue(SessionId("order".to_string()));
    let timers = TokioTimerManager::new(sender);

    let late = CorrelationToken("late".to_string());
    let early = CorrelationToken("early".to_string());
    timers.schedule(Duration::from_millis(500), late.clone()).await?;
    timers.schedule(Duration::from_millis(200), early.clone()).await?;

    let first = queue.take().await.expect("queue open");
    let second = queue.take().await.expect("queue open");
    assert!(first.is_timeout_for(&early));
    assert!(second.is_timeout_for(&late));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_leaves_queue_empty() -> anyhow::Result<()> {
    let (sender, mut queue) = event_queue(SessionId("all".to_string()));
    let timers = TokioTimerManager::new(sender);

    for _ in 0..3 {
        timers
            .schedule(Duration::from_millis(250), CorrelationToken::generate())
            .await?;
    }
    assert_eq!(timers.cancel_all().await?, 3);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(queue.try_take().is_none());
    Ok(())
}
