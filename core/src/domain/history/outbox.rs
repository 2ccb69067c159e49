//! Background persistence of analysis results.
//!
//! `/analyze` answers the caller before its result is stored. The write is
//! queued here and a worker task drains the queue, retrying with exponential
//! backoff. Writes that exhaust their attempts are logged and published on a
//! broadcast channel so they can be observed.

use std::{sync::Arc, time::Duration};

use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tokio::{
    sync::{
        broadcast,
        mpsc::{self, error::TrySendError},
    },
    task::JoinHandle,
};
use tracing::{debug, error, warn};

use crate::domain::{
    common::OutboxConfig,
    history::{document_id, ports::HistoryRepository},
};

const FAILURE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceFailure {
    pub id: String,
    pub attempts: u32,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl From<&OutboxConfig> for RetryPolicy {
    fn from(config: &OutboxConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay,
            backoff_factor: config.backoff_factor,
            max_delay: config.max_delay,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-indexed), with ±25% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let delay = delay.min(self.max_delay.as_secs_f64());

        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_secs_f64((delay * jitter).max(0.0))
    }
}

/// Handle to the persistence queue. Cloning shares the queue.
#[derive(Clone)]
pub struct HistoryOutbox {
    sender: mpsc::Sender<Value>,
    failures: broadcast::Sender<PersistenceFailure>,
}

impl HistoryOutbox {
    /// Spawns the worker. It stops once every handle has been dropped and
    /// the queue is drained.
    pub fn start<H>(repository: Arc<H>, config: &OutboxConfig) -> (Self, JoinHandle<()>)
    where
        H: HistoryRepository,
    {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        let worker = OutboxWorker {
            repository,
            policy: RetryPolicy::from(config),
            failures: failures.clone(),
        };
        let handle = tokio::spawn(worker.run(receiver));

        (Self { sender, failures }, handle)
    }

    /// Queues a document without waiting. Returns `false` when it was dropped.
    pub fn enqueue(&self, document: Value) -> bool {
        match self.sender.try_send(document) {
            Ok(()) => true,
            Err(TrySendError::Full(document)) => {
                warn!(
                    id = %document_id(&document).unwrap_or_default(),
                    "Persistence queue full, dropping analysis result"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                error!("Persistence worker stopped, dropping analysis result");
                false
            }
        }
    }

    pub fn subscribe_failures(&self) -> broadcast::Receiver<PersistenceFailure> {
        self.failures.subscribe()
    }
}

struct OutboxWorker<H> {
    repository: Arc<H>,
    policy: RetryPolicy,
    failures: broadcast::Sender<PersistenceFailure>,
}

impl<H> OutboxWorker<H>
where
    H: HistoryRepository,
{
    async fn run(self, mut receiver: mpsc::Receiver<Value>) {
        while let Some(document) = receiver.recv().await {
            self.persist(document).await;
        }
        debug!("Persistence worker stopped");
    }

    async fn persist(&self, document: Value) {
        let id = document_id(&document).unwrap_or_default();
        let mut attempt = 0;

        loop {
            attempt += 1;

            // A failed first write may still have landed, so retries upsert.
            let outcome = if attempt == 1 {
                self.repository.create(document.clone()).await
            } else {
                self.repository.upsert(document.clone()).await
            };

            match outcome {
                Ok(_) => {
                    debug!(id = %id, attempt, "Analysis result stored");
                    return;
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(id = %id, attempt, error = %e, ?delay, "Storing analysis result failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        id = %id,
                        attempts = attempt,
                        error = %e,
                        payload = %document,
                        "Failed to store analysis result"
                    );
                    // No subscribers is fine: the failure is already logged.
                    let _ = self.failures.send(PersistenceFailure {
                        id,
                        attempts: attempt,
                        error: e.to_string(),
                    });
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;
    use tokio::sync::{Notify, Semaphore};

    use super::*;
    use crate::domain::common::entities::app_errors::CoreError;
    use crate::infrastructure::history::memory_repository::InMemoryHistoryRepository;

    /// Fails the first `failures` writes, then delegates to memory.
    struct FlakyRepository {
        failures: u32,
        calls: AtomicU32,
        inner: InMemoryHistoryRepository,
    }

    impl FlakyRepository {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                inner: InMemoryHistoryRepository::new(),
            }
        }

        fn fail(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst) < self.failures
        }
    }

    impl HistoryRepository for FlakyRepository {
        async fn create(&self, document: Value) -> Result<Value, CoreError> {
            if self.fail() {
                return Err(CoreError::StorageError("store offline".to_string()));
            }
            self.inner.create(document).await
        }

        async fn upsert(&self, document: Value) -> Result<Value, CoreError> {
            if self.fail() {
                return Err(CoreError::StorageError("store offline".to_string()));
            }
            self.inner.upsert(document).await
        }

        async fn find_all(&self) -> Result<Vec<Value>, CoreError> {
            self.inner.find_all().await
        }

        async fn find_by_field(&self, field: String, value: String) -> Result<Vec<Value>, CoreError> {
            self.inner.find_by_field(field, value).await
        }

        async fn ping(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    /// Holds every write until the test hands out permits.
    struct GatedRepository {
        started: Notify,
        gate: Semaphore,
        inner: InMemoryHistoryRepository,
    }

    impl HistoryRepository for GatedRepository {
        async fn create(&self, document: Value) -> Result<Value, CoreError> {
            self.started.notify_one();
            self.gate.acquire().await.unwrap().forget();
            self.inner.create(document).await
        }

        async fn upsert(&self, document: Value) -> Result<Value, CoreError> {
            self.inner.upsert(document).await
        }

        async fn find_all(&self) -> Result<Vec<Value>, CoreError> {
            self.inner.find_all().await
        }

        async fn find_by_field(&self, field: String, value: String) -> Result<Vec<Value>, CoreError> {
            self.inner.find_by_field(field, value).await
        }

        async fn ping(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn fast_config(max_attempts: u32) -> OutboxConfig {
        OutboxConfig {
            capacity: 8,
            max_attempts,
            base_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(300),
        };

        let first = policy.delay_for(1);
        assert!(first >= Duration::from_millis(75) && first <= Duration::from_millis(125));

        let second = policy.delay_for(2);
        assert!(second >= Duration::from_millis(150) && second <= Duration::from_millis(250));

        let capped = policy.delay_for(10);
        assert!(capped <= Duration::from_millis(375));
    }

    #[tokio::test]
    async fn test_retries_until_stored() {
        let repository = Arc::new(FlakyRepository::new(2));
        let (outbox, worker) = HistoryOutbox::start(Arc::clone(&repository), &fast_config(5));
        let mut failures = outbox.subscribe_failures();

        assert!(outbox.enqueue(json!({"id": "r1", "isHealthy": true})));
        drop(outbox);
        worker.await.unwrap();

        let stored = repository.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], json!("r1"));
        assert_eq!(repository.calls.load(Ordering::SeqCst), 3);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exhausted_write_is_published() {
        let repository = Arc::new(FlakyRepository::new(u32::MAX));
        let (outbox, worker) = HistoryOutbox::start(Arc::clone(&repository), &fast_config(3));
        let mut failures = outbox.subscribe_failures();

        outbox.enqueue(json!({"id": "r2"}));
        drop(outbox);
        worker.await.unwrap();

        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.id, "r2");
        assert_eq!(failure.attempts, 3);
        assert!(failure.error.contains("store offline"));
        assert!(repository.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_waiting() {
        let repository = Arc::new(GatedRepository {
            started: Notify::new(),
            gate: Semaphore::new(0),
            inner: InMemoryHistoryRepository::new(),
        });
        let config = OutboxConfig {
            capacity: 1,
            ..fast_config(1)
        };
        let (outbox, worker) = HistoryOutbox::start(Arc::clone(&repository), &config);

        // The worker takes the first write and blocks inside the repository.
        assert!(outbox.enqueue(json!({"id": "q1"})));
        repository.started.notified().await;

        assert!(outbox.enqueue(json!({"id": "q2"})));
        assert!(!outbox.enqueue(json!({"id": "q3"})));

        repository.gate.add_permits(2);
        drop(outbox);
        worker.await.unwrap();

        let ids: Vec<Value> = repository
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("q1"), json!("q2")]);
    }
}
