//! Process-global environment mutation helpers.
//!
//! Environment variables are shared by every test thread in a process, so
//! tests that read configuration from the environment go through
//! [`ScopedEnv`], which serializes access and restores previous values.

use std::sync::{Mutex, MutexGuard, OnceLock};

fn global_env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Set an environment variable through a compatibility wrapper.
///
/// Rust toolchains differ on whether env mutation APIs are `unsafe`.
#[allow(unused_unsafe)]
pub fn set_env_var(key: &str, value: &str) {
    // SAFETY: Callers hold the global env lock while test threads may run in parallel.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Remove an environment variable through a compatibility wrapper.
#[allow(unused_unsafe)]
pub fn remove_env_var(key: &str) {
    // SAFETY: Callers hold the global env lock while test threads may run in parallel.
    unsafe {
        std::env::remove_var(key);
    }
}

/// Exclusive view of the process environment.
///
/// Holds the global env lock for its lifetime and restores every variable it
/// touched, in reverse order, when dropped.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Acquire the global env lock.
    ///
    /// A lock poisoned by a panicking test is recovered, since the guard
    /// of that test already restored its variables while unwinding.
    pub fn lock() -> Self {
        let lock = global_env_lock()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    fn remember(&mut self, key: &str) {
        self.saved
            .push((key.to_string(), std::env::var(key).ok()));
    }

    /// Set `key=value` until this guard is dropped.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.remember(key);
        set_env_var(key, value);
        self
    }

    /// Unset `key` until this guard is dropped.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.remember(key);
        remove_env_var(key);
        self
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.saved.pop() {
            match previous {
                Some(value) => set_env_var(&key, &value),
                None => remove_env_var(&key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScopedEnv;

    #[test]
    fn scoped_env_restores_previous_values_in_reverse_order() {
        let key = "CIPHERSTUDIO_TEST_SCOPED_ENV_RESTORE";
        {
            let mut env = ScopedEnv::lock();
            env.set(key, "before");
            env.set(key, "after");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("after"));
        }
        assert!(std::env::var(key).is_err());
    }

    #[test]
    fn scoped_env_remove_is_undone_on_drop() {
        let key = "CIPHERSTUDIO_TEST_SCOPED_ENV_REMOVE";
        {
            let mut env = ScopedEnv::lock();
            env.set(key, "kept").remove(key);
            assert!(std::env::var(key).is_err());
        }
        // Restoring in forward order would leave "kept" behind.
        assert!(std::env::var(key).is_err());
    }
}
