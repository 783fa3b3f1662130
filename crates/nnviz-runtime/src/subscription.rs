#![forbid(unsafe_code)]

//! Fixed-interval tick sources for the render loop.
//!
//! The render thread never sleeps on the mailbox. Instead a background
//! subscription sends a tick every interval, and the render loop answers
//! each tick with [`UpdateScheduler::poll_mailbox`]. The producer's cadence
//! and the consumer's polling stay independent.
//!
//! Dropping or cancelling the [`SubscriptionHandle`] stops the pending poll.
//! Work already handed to the render thread is not interrupted.
//!
//! [`UpdateScheduler::poll_mailbox`]: crate::UpdateScheduler::poll_mailbox

use std::sync::{Arc, Condvar, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::Duration;

/// Stop flag observed by a running subscription.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until stopped or `duration` elapses. Returns `true` if stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return true;
        }
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }
}

/// Owner of a running tick thread.
pub struct SubscriptionHandle {
    interval: Duration,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Start `every` on a new thread.
    pub fn spawn<M: Send + 'static>(every: Every<M>, sender: mpsc::Sender<M>) -> Self {
        let interval = every.interval;
        let (signal, trigger) = StopSignal::new();
        tracing::debug!(
            target: "nnviz.subscription",
            interval_ms = interval.as_millis() as u64,
            "starting ticks"
        );
        let thread = thread::spawn(move || every.run(sender, signal));
        Self {
            interval,
            trigger,
            thread: Some(thread),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the ticks and wait for the thread to exit.
    pub fn cancel(mut self) {
        self.trigger.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        tracing::debug!(target: "nnviz.subscription", "ticks cancelled");
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        // No join here; dropping must not block the render thread.
        self.trigger.stop();
    }
}

/// Sends `make_msg()` every `interval` until stopped.
pub struct Every<M: Send + 'static> {
    interval: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    pub fn new(interval: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self {
            interval,
            make_msg: Box::new(make_msg),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick loop; returns once `stop` fires or the receiver hangs up.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        while !stop.wait_timeout(self.interval) {
            if sender.send((self.make_msg)()).is_err() {
                break;
            }
        }
    }
}
