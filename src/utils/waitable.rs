use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type LockResult<'a, T, R> = Result<R, PoisonError<MutexGuard<'a, T>>>;

/// Thread-safe wrapper around a value that allows threads to wait for specific conditions on that value.
#[derive(Debug, Clone)]
pub(crate) struct Waitable<T> {
    inner: Arc<(Mutex<T>, Condvar)>,
}

impl<T> Waitable<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Arc::new((Mutex::new(value), Condvar::new())),
        }
    }

    pub(crate) fn set(&self, value: T) -> LockResult<'_, T, ()> {
        let (mutex, condvar) = &*self.inner;
        let mut guard = mutex.lock()?;
        *guard = value;
        condvar.notify_all();
        Ok(())
    }

    /// Replaces the value only if `f` accepts the current one. Returns whether it was replaced.
    pub(crate) fn set_if<F>(&self, value: T, f: F) -> LockResult<'_, T, bool>
    where
        F: FnOnce(&T) -> bool,
    {
        let (mutex, condvar) = &*self.inner;
        let mut guard = mutex.lock()?;
        if !f(&guard) {
            return Ok(false);
        }
        *guard = value;
        condvar.notify_all();
        Ok(true)
    }

    /// Runs `f` while holding the lock, provided `condition` accepts the current value.
    /// Nobody can change the value while `f` runs.
    pub(crate) fn run_if<C, F, R>(&self, condition: C, f: F) -> LockResult<'_, T, Option<R>>
    where
        C: FnOnce(&T) -> bool,
        F: FnOnce() -> R,
    {
        let (mutex, _) = &*self.inner;
        let guard = mutex.lock()?;
        if !condition(&guard) {
            return Ok(None);
        }
        let result = f();
        drop(guard);
        Ok(Some(result))
    }

    pub(crate) fn get(&self) -> LockResult<'_, T, T>
    where
        T: Clone,
    {
        let (mutex, _) = &*self.inner;
        let guard = mutex.lock()?;
        Ok(guard.clone())
    }

    /// Waits at most `timeout` until `condition` holds. Returns the last observed
    /// value and whether the condition was met.
    pub(crate) fn wait_until<F>(
        &self,
        timeout: Duration,
        mut condition: F,
    ) -> LockResult<'_, T, (T, bool)>
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let (mutex, condvar) = &*self.inner;
        let guard = mutex.lock()?;
        let (guard, wait_result) = condvar
            .wait_timeout_while(guard, timeout, |value| !condition(value))
            .map_err(|e| {
                let (guard, _) = e.into_inner();
                PoisonError::new(guard)
            })?;
        Ok((guard.clone(), !wait_result.timed_out()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_basic_operations() {
        let waitable = Waitable::new(42);

        // Test get
        assert_eq!(waitable.get().unwrap(), 42);

        // Test set
        waitable.set(100).unwrap();
        assert_eq!(waitable.get().unwrap(), 100);

        // Conditional set
        assert!(!waitable.set_if(7, |v| *v == 0).unwrap());
        assert!(waitable.set_if(7, |v| *v == 100).unwrap());
        assert_eq!(waitable.get().unwrap(), 7);
    }

    #[test]
    fn test_run_if_holds_the_lock() {
        let waitable = Waitable::new(1);

        assert_eq!(waitable.run_if(|v| *v == 0, || "ran").unwrap(), None);

        let waitable_clone = waitable.clone();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let t = thread::spawn(move || {
            waitable_clone
                .run_if(
                    |v| *v == 1,
                    || {
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                    },
                )
                .unwrap()
        });
        entered_rx.recv().unwrap();

        // A writer has to wait until the closure returns
        let writer = {
            let waitable = waitable.clone();
            thread::spawn(move || waitable.set(2).unwrap())
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!writer.is_finished());

        release_tx.send(()).unwrap();
        assert_eq!(t.join().unwrap(), Some(()));
        writer.join().unwrap();
        assert_eq!(waitable.get().unwrap(), 2);
    }

    #[test]
    fn test_wait_until() {
        let waitable = Waitable::new(0);
        let waitable_clone = waitable.clone();

        // Spawn a thread that will change the value after a delay
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            waitable_clone.set(42).unwrap();
        });

        // Wait for the value to become 42
        let (value, reached) = waitable
            .wait_until(Duration::from_secs(5), |v| *v == 42)
            .unwrap();
        assert!(reached);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_wait_until_timeout() {
        let waitable = Waitable::new(false);
        let (value, reached) = waitable
            .wait_until(Duration::from_millis(20), |ready| *ready)
            .unwrap();
        assert!(!reached);
        assert!(!value);
    }
}
