use axum_prometheus::metrics::counter;
use nutritot_core::domain::history::outbox::PersistenceFailure;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

pub const PERSISTENCE_FAILURES_TOTAL: &str = "nutritot_persistence_failures_total";

/// Counts analysis results the outbox gave up on, exported as
/// [`PERSISTENCE_FAILURES_TOTAL`] when metrics are enabled.
///
/// Runs until the outbox is dropped and returns the number of failures seen.
pub async fn track_persistence_failures(
    mut failures: broadcast::Receiver<PersistenceFailure>,
) -> u64 {
    let mut total = 0;

    loop {
        match failures.recv().await {
            Ok(failure) => {
                total += 1;
                counter!(PERSISTENCE_FAILURES_TOTAL).increment(1);
                debug!(
                    id = %failure.id,
                    attempts = failure.attempts,
                    "Counted dropped analysis result"
                );
            }
            Err(RecvError::Lagged(missed)) => {
                total += missed;
                counter!(PERSISTENCE_FAILURES_TOTAL).increment(missed);
                warn!(missed, "Persistence failure monitor fell behind");
            }
            Err(RecvError::Closed) => return total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(id: &str) -> PersistenceFailure {
        PersistenceFailure {
            id: id.to_string(),
            attempts: 5,
            error: "store offline".to_string(),
        }
    }

    #[tokio::test]
    async fn counts_failures_until_outbox_closes() {
        let (sender, receiver) = broadcast::channel(8);
        let monitor = tokio::spawn(track_persistence_failures(receiver));

        sender.send(failure("a")).unwrap();
        sender.send(failure("b")).unwrap();
        drop(sender);

        assert_eq!(monitor.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missed_failures_are_still_counted() {
        let (sender, receiver) = broadcast::channel(1);
        for id in ["a", "b", "c"] {
            sender.send(failure(id)).unwrap();
        }
        drop(sender);

        assert_eq!(track_persistence_failures(receiver).await, 3);
    }
}
