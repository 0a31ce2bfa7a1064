//! Progress clock
//!
//! Periodic tick source that runs on its own thread only while playback is
//! active. Ticks carry the clock generation so a consumer can drop ticks
//! that were already queued when the clock was stopped.

use crossbeam_channel::{bounded, select, tick, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

struct Running {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

/// Start/stop-able periodic tick source
pub struct ProgressClock {
    interval: Duration,
    generation: u64,
    running: Option<Running>,
}

impl ProgressClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            running: None,
        }
    }

    /// Start ticking; no-op if already running
    ///
    /// `on_tick` receives the generation of this run and returns `false` to
    /// end the run (e.g. when its receiver has gone away).
    pub fn start<F>(&mut self, on_tick: F) -> io::Result<()>
    where
        F: Fn(u64) -> bool + Send + 'static,
    {
        if self.running.is_some() {
            return Ok(());
        }

        self.generation += 1;
        let generation = self.generation;
        let interval = self.interval;
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = thread::Builder::new()
            .name("promenade-clock".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if !on_tick(generation) {
                                break;
                            }
                        }
                    }
                }
            })?;

        debug!("Progress clock started (generation {})", generation);
        self.running = Some(Running { stop_tx, thread });
        Ok(())
    }

    /// Stop ticking and wait for the clock thread to exit
    ///
    /// No tick of the stopped run is delivered after this returns.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.stop_tx.send(());
        if running.thread.join().is_err() {
            warn!("Progress clock thread panicked");
        }
        debug!("Progress clock stopped (generation {})", self.generation);
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Generation of the current (or last) run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for ProgressClock {
    fn drop(&mut self) {
        self.stop();
    }
}
