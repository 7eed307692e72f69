//! Drive a batch future while consuming its progress events.
//!
//! Frontends use [`run_with_events`] to render [`EnrichEvent`](crate::pipeline::EnrichEvent)s
//! as the metadata pipeline produces them, without spawning a second task.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on draining after the task finishes, in case a sender clone
/// outlives the task and the channel never closes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, passing every event from `events` to `on_event`.
///
/// Events still queued when the task finishes are delivered before returning.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut events: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut seen: u64 = 0;

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = events.recv() => match event {
                Some(e) => {
                    seen += 1;
                    on_event(e);
                }
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        // Every sender is gone; nothing more will arrive.
        log::debug!("Event channel closed after {} events, awaiting task", seen);
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(e)) => {
                seen += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "Stopped draining events after {}s; a sender is still alive",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
    log::debug!("Task finished, {} events delivered", seen);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_events_sent_before_and_after_completion() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = async move {
            for i in 0..3 {
                tx.send(i).unwrap();
                tokio::task::yield_now().await;
            }
            tx.send(99).unwrap();
            "done"
        };

        let mut got = Vec::new();
        let result = run_with_events(task, rx, |e| got.push(e)).await;
        assert_eq!(result, "done");
        assert_eq!(got, vec![0, 1, 2, 99]);
    }

    #[tokio::test]
    async fn closed_channel_still_awaits_task() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        drop(tx);
        let result = run_with_events(async { 7 }, rx, |_| {}).await;
        assert_eq!(result, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn leaked_sender_does_not_block_forever() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        let _leaked = tx.clone();
        let task = async move {
            tx.send(1).unwrap();
            "ok"
        };
        let mut count = 0;
        assert_eq!(run_with_events(task, rx, |_| count += 1).await, "ok");
        assert_eq!(count, 1);
    }
}
