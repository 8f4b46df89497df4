use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A cancellable deferred callback.
///
/// Runs `callback` once on a dedicated thread after `delay` unless `cancel`
/// is called first. Dropping the timer does not cancel it.
pub struct GraceTimer {
    signal: Arc<(Mutex<bool>, Condvar)>,
}

impl GraceTimer {
    pub fn schedule<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let signal = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_signal = Arc::clone(&signal);
        let deadline = Instant::now() + delay;

        thread::Builder::new()
            .name("grace-timer".into())
            .spawn(move || {
                let (lock, cvar) = &*thread_signal;
                let mut cancelled = lock.lock();
                while !*cancelled {
                    if cvar.wait_until(&mut cancelled, deadline).timed_out() {
                        break;
                    }
                }
                if *cancelled {
                    return;
                }
                drop(cancelled);
                callback();
            })
            .expect("failed to spawn grace timer thread");

        Self { signal }
    }

    /// Prevent the callback from running if it has not started yet.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.signal;
        *lock.lock() = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.0.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn fires_after_delay() {
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        let _timer = GraceTimer::schedule(Duration::from_millis(30), move || {
            tx.send(()).ok();
        });

        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_prevents_callback() {
        let (tx, rx) = mpsc::channel::<()>();
        let timer = GraceTimer::schedule(Duration::from_millis(50), move || {
            tx.send(()).ok();
        });
        timer.cancel();

        assert!(timer.is_cancelled());
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
