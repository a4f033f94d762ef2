use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use tracing::*;

/// Spawns a named thread, the name shows up in every log line emitted from it.
pub fn spawn_named<F, T>(name: &str, task: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    debug!("Spawning thread {name:?}");

    thread::Builder::new()
        .name(name.into())
        .spawn(task)
        .with_context(|| format!("Failed to spawn {name} thread"))
}

/// Waits for a thread started with [`spawn_named`], turning a panic into an error.
pub fn join_named<T>(handle: JoinHandle<T>) -> Result<T> {
    let name = handle.thread().name().unwrap_or("unnamed").to_string();

    handle
        .join()
        .map_err(|_| anyhow!("Thread {name} panicked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_thread_carries_its_name() {
        let handle = spawn_named("RefreshLoop", || {
            thread::current().name().map(str::to_string)
        })
        .unwrap();

        assert_eq!(join_named(handle).unwrap().as_deref(), Some("RefreshLoop"));
    }

    #[test]
    fn panicking_thread_is_reported() {
        let handle = spawn_named::<_, ()>("Doomed", || panic!("boom")).unwrap();

        let error = join_named(handle).unwrap_err();
        assert!(error.to_string().contains("Doomed"));
    }
}
