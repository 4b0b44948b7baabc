//! Cooperative motion-tracking loop.
//!
//! Wakes every `wake_ms`, sends `MotionTick` once `tick_ms` has elapsed since
//! the previous tick and checks its shutdown flag on every wake, so it stops
//! within one wake interval. The thread is joined when the `Ticker` drops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use echowalk_traits::clock::Clock;

use crate::config::TrackerCfg;
use crate::error::Result;
use crate::runner::EngineHandle;

pub struct Ticker {
    ticks: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<C: Clock + Send + Sync + 'static>(
        handle: EngineHandle,
        cfg: &TrackerCfg,
        clock: C,
    ) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = ticks.clone();
        let wake = Duration::from_millis(cfg.wake_ms.max(1));
        let tick_ms = cfg.tick_ms.max(1);

        let join_handle = std::thread::Builder::new()
            .name("echowalk-ticker".into())
            .spawn(move || {
                let mut last: Instant = clock.now();
                loop {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        tracing::debug!("ticker received shutdown signal");
                        break;
                    }
                    if clock.ms_since(last) >= tick_ms {
                        last = clock.now();
                        if handle.motion_tick().is_err() {
                            tracing::debug!("engine gone, ticker exiting");
                            break;
                        }
                        ticks_clone.fetch_add(1, Ordering::Relaxed);
                    }
                    clock.sleep(wake);
                }
                tracing::trace!("ticker thread exiting cleanly");
            })?;

        Ok(Self {
            ticks,
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    /// Number of `MotionTick`s delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("ticker thread joined"),
                Err(e) => tracing::warn!(?e, "ticker thread panicked during shutdown"),
            }
        }
    }
}
