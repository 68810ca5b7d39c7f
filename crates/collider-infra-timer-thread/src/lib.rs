use collider_ports::TimerPort;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type TickFn = dyn Fn(Instant) + Send + Sync;

/// Periodic driver backed by a dedicated thread.
///
/// Each `start` spawns a fresh thread with its own stop flag. `stop` only
/// clears the flag: the tick callback usually locks the server that owns
/// this timer, so joining here could deadlock.
pub struct ThreadTimer {
    tick: Arc<TickFn>,
    running: Option<Arc<AtomicBool>>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    pub fn new<F>(tick: F) -> Self
    where
        F: Fn(Instant) + Send + Sync + 'static,
    {
        Self {
            tick: Arc::new(tick),
            running: None,
            thread: None,
        }
    }
}

impl TimerPort for ThreadTimer {
    fn start(&mut self, period: Duration) {
        if self.is_running() {
            return;
        }
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let tick = Arc::clone(&self.tick);
        let spawned = thread::Builder::new()
            .name("collider-timer".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while flag.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next {
                        thread::sleep(next - now);
                        continue;
                    }
                    tick(now);
                    next += period;
                    if next < now {
                        next = now + period;
                    }
                }
                tracing::trace!("timer thread exiting");
            });
        match spawned {
            Ok(handle) => {
                self.running = Some(running);
                self.thread = Some(handle);
            }
            Err(err) => tracing::error!(%err, "failed to spawn timer thread"),
        }
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::Release);
        }
        self.thread = None;
    }

    fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| running.load(Ordering::Acquire))
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
