/*
 *  shutdown.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cooperative shutdown token shared by every worker
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cloneable stop signal.
///
/// Workers check it at the top of their loop and sleep on it instead of
/// `thread::sleep`, so tripping it wakes every sleeper at once. A worker
/// that hits an unrecoverable condition trips it with [`Shutdown::fail`]
/// and the reason is handed back to `main` for the exit status.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

type Waker = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    tripped: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
    wakers: Mutex<Vec<Waker>>,
    failure: Mutex<Option<String>>,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inner")
            .field("tripped", &self.tripped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let wakers = {
            // hold the lock so a sleeper can't miss the notify between its check and its wait
            let _guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
            self.inner.tripped.store(true, Ordering::SeqCst);
            self.inner.wake.notify_all();
            std::mem::take(&mut *self.inner.wakers.lock().unwrap_or_else(|e| e.into_inner()))
        };
        // outside the lock, a waker may trip the token again
        for wake in wakers {
            wake();
        }
    }

    /// Run `wake` once when the token trips, or straight away if it already
    /// has. For workers blocked on something other than this token.
    pub fn on_trigger(&self, wake: impl Fn() + Send + Sync + 'static) {
        {
            let _guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
            if !self.is_triggered() {
                self.inner.wakers.lock().unwrap_or_else(|e| e.into_inner()).push(Box::new(wake));
                return;
            }
        }
        wake();
    }

    /// Record a fatal reason (first one wins) and trip the token.
    pub fn fail(&self, reason: impl Into<String>) {
        {
            let mut failure = self.inner.failure.lock().unwrap_or_else(|e| e.into_inner());
            if failure.is_none() {
                *failure = Some(reason.into());
            }
        }
        self.trigger();
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.inner.tripped.load(Ordering::SeqCst)
    }

    pub fn failure(&self) -> Option<String> {
        self.inner.failure.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Sleep for `timeout` or until tripped. Returns true when tripped.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
        let (_guard, _) = self
            .inner
            .wake
            .wait_timeout_while(guard, timeout, |_| !self.inner.tripped.load(Ordering::SeqCst))
            .unwrap_or_else(|e| e.into_inner());
        self.is_triggered()
    }

    /// Sleep until `deadline` or until tripped. Returns true when tripped.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.wait_timeout(deadline.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_times_out_when_not_tripped() {
        let token = Shutdown::new();
        let start = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_trigger_wakes_sleeper() {
        let token = Shutdown::new();
        let sleeper = {
            let token = token.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let tripped = token.wait_timeout(Duration::from_secs(30));
                (tripped, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        token.trigger();
        let (tripped, waited) = sleeper.join().unwrap();
        assert!(tripped);
        assert!(waited < Duration::from_secs(30));
    }

    #[test]
    fn test_on_trigger_runs_once() {
        use std::sync::atomic::AtomicUsize;

        let token = Shutdown::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        token.on_trigger(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        token.trigger();
        token.trigger();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // registered late: runs immediately
        let seen = Arc::clone(&calls);
        token.on_trigger(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first_failure_wins() {
        let token = Shutdown::new();
        assert_eq!(token.failure(), None);
        token.fail("out of memory");
        token.fail("something later");
        assert!(token.is_triggered());
        assert_eq!(token.failure().as_deref(), Some("out of memory"));
    }

    #[test]
    fn test_wait_until_past_deadline_returns_immediately() {
        let token = Shutdown::new();
        let past = Instant::now() - Duration::from_millis(5);
        assert!(!token.wait_until(past));
        token.trigger();
        assert!(token.wait_until(Instant::now() + Duration::from_secs(30)));
    }
}
