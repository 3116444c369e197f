use super::error::EngineError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A fixed-width pool of streamline workers, held for the duration of one run.
///
/// The threads are released when the pool is dropped. Without the `parallel`
/// feature the pool runs every task on the calling thread.
pub struct WorkerPool {
    width: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub fn acquire(width: usize) -> Result<Self, EngineError> {
        if width == 0 {
            return Err(EngineError::WorkerPool(
                "pool width must be at least 1".to_string(),
            ));
        }

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .thread_name(|i| format!("cpet-worker-{}", i))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

        debug!(width, "Worker pool acquired.");
        Ok(Self {
            width,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Applies `task` to every item and returns the outputs in input order.
    ///
    /// Blocks until every task has finished. If any task panics the whole batch
    /// is abandoned and the panic message is returned as
    /// [`EngineError::WorkerFailed`].
    pub fn map_ordered<T, R, F>(&self, items: &[T], task: F) -> Result<Vec<R>, EngineError>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool
                .install(|| items.par_iter().map(&task).collect::<Vec<R>>())
        }));

        #[cfg(not(feature = "parallel"))]
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| items.iter().map(&task).collect::<Vec<R>>()));

        outcome.map_err(|payload| EngineError::WorkerFailed(panic_message(payload.as_ref())))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        debug!(width = self.width, "Worker pool released.");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_pool_is_rejected() {
        assert!(matches!(
            WorkerPool::acquire(0),
            Err(EngineError::WorkerPool(_))
        ));
    }

    #[test]
    fn outputs_follow_input_order() {
        let pool = WorkerPool::acquire(3).unwrap();
        let items: Vec<u64> = (0..200).collect();
        let out = pool.map_ordered(&items, |x| x * x).unwrap();
        assert_eq!(out, items.iter().map(|x| x * x).collect::<Vec<_>>());
        assert_eq!(pool.width(), 3);
    }

    #[test]
    fn panicking_task_fails_the_whole_batch() {
        let pool = WorkerPool::acquire(2).unwrap();
        let items: Vec<usize> = (0..16).collect();
        let result = pool.map_ordered(&items, |&i| {
            if i == 11 {
                panic!("seed {} blew up", i);
            }
            i
        });
        match result {
            Err(EngineError::WorkerFailed(message)) => assert_eq!(message, "seed 11 blew up"),
            other => panic!("expected WorkerFailed, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let pool = WorkerPool::acquire(1).unwrap();
        let out: Vec<u8> = pool.map_ordered(&[] as &[u8], |&b| b).unwrap();
        assert!(out.is_empty());
    }
}
