//! Bounded-concurrency task runner.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

/// Runs submitted units of work with at most `max` in flight.
///
/// `max == 0` means unbounded: every unit is spawned immediately and runs
/// subject only to the runtime. When bounded, each unit waits on a shared
/// semaphore permit before it executes, so a new unit starts only as an
/// in-flight one completes. The pool is the only mutual-exclusion point;
/// it does not otherwise synchronize the work it runs.
pub struct TaskPool<T> {
    tasks: JoinSet<T>,
    permits: Option<Arc<Semaphore>>,
}

impl<T: Send + 'static> TaskPool<T> {
    pub fn new(max: usize) -> Self {
        TaskPool {
            tasks: JoinSet::new(),
            permits: (max > 0).then(|| Arc::new(Semaphore::new(max))),
        }
    }

    /// Number of units submitted and not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Submit a unit of work. Returns immediately; the unit executes once a
    /// permit is available (or at once, if unbounded).
    pub fn submit<F>(&mut self, work: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        match &self.permits {
            Some(permits) => {
                let permits = Arc::clone(permits);
                self.tasks.spawn(async move {
                    // The semaphore is never closed while the pool lives.
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .expect("task pool semaphore closed");
                    work.await
                });
            }
            None => {
                self.tasks.spawn(work);
            }
        }
    }

    /// Wait for every submitted unit and collect their outputs. Units that
    /// panicked are logged and omitted from the result.
    pub async fn join_all(mut self) -> Vec<T> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(output) => outputs.push(output),
                Err(e) => error!("task pool unit panicked: {e}"),
            }
        }
        outputs
    }
}
