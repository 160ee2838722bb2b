//! Shared rayon pool for per-voxel map computations.
//!
//! Threads are named `tfstats-N`. If the pool cannot be built the work runs
//! on the calling thread instead.

use std::sync::OnceLock;

use rayon::ThreadPool;

static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Get or initialize the shared thread pool.
fn get_thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .thread_name(|i| format!("tfstats-{i}"))
                .build()
                .map_err(|err| tracing::warn!(%err, "falling back to caller thread"))
                .ok()
        })
        .as_ref()
}

/// Execute a parallel operation on the shared pool.
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
