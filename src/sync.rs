//! Level-triggered collection synchronization.
//!
//! The backing store is polled on a fixed cadence and every poll yields the
//! full current result set. Consumers receive whole snapshots over a watch
//! channel and must replace their local copy wholesale; deltas are never
//! delivered. A failed poll leaves the previous snapshot in place, so a
//! broken subscription degrades to a stale view rather than an error.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub type Snapshot<T> = Arc<Vec<T>>;

/// Spawn an app-lifetime poller for one collection and hand back the
/// receiving end of its snapshot channel. Unchanged polls are not
/// republished.
pub fn spawn_snapshots<T, F, Fut>(
    what: &'static str,
    interval: Duration,
    mut fetch: F,
) -> watch::Receiver<Snapshot<T>>
where
    T: PartialEq + Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<Vec<T>>> + Send,
{
    let (tx, rx) = watch::channel(Snapshot::default());

    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tick.tick().await;
            match fetch().await {
                Ok(next) => {
                    let changed = **tx.borrow() != next;
                    if changed {
                        let _ = tx.send(Arc::new(next));
                    }
                }
                Err(err) => {
                    tracing::warn!("{what} sync poll failed, keeping last snapshot: {err:#}");
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn snapshots_replace_wholesale_and_skip_unchanged_polls() {
        let polls = Arc::new(Mutex::new(vec![
            Ok(vec![1, 2]),
            Ok(vec![1, 2]),
            Ok(vec![3]),
        ]));

        let feed = polls.clone();
        let mut rx = spawn_snapshots("test", Duration::from_millis(1), move || {
            let feed = feed.clone();
            async move {
                let mut polls = feed.lock().unwrap();
                if polls.is_empty() {
                    // Steady state: the store keeps returning the same set.
                    Ok(vec![3])
                } else {
                    polls.remove(0)
                }
            }
        });

        rx.changed().await.unwrap();
        assert_eq!(**rx.borrow_and_update(), vec![1, 2]);

        // The repeated [1, 2] poll is deduplicated; the next change observed
        // is the wholesale replacement by [3].
        rx.changed().await.unwrap();
        assert_eq!(**rx.borrow_and_update(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_polls_keep_the_previous_snapshot() {
        let polls = Arc::new(Mutex::new(vec![
            Ok(vec![7]),
            Err(anyhow::anyhow!("backing store unreachable")),
        ]));

        let feed = polls.clone();
        let mut rx = spawn_snapshots("test", Duration::from_millis(1), move || {
            let feed = feed.clone();
            async move {
                let mut polls = feed.lock().unwrap();
                if polls.is_empty() {
                    Ok(vec![7])
                } else {
                    polls.remove(0)
                }
            }
        });

        rx.changed().await.unwrap();
        assert_eq!(**rx.borrow_and_update(), vec![7]);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(**rx.borrow(), vec![7]);
    }
}
