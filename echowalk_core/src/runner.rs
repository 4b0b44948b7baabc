//! Threaded runtime: an owner thread for `Engine` plus cloneable handles.
//!
//! The engine never leaves its thread. Scan sources, the motion ticker and
//! speech callbacks all talk to it through `EngineHandle`, and the owner
//! publishes `EngineNotice`s on an unbounded outbound channel.
//!
//! Create the channel first, hand `SpeechCallback`s to the synthesizer, then
//! build the engine and `EngineRunner::spawn` it with the inbox.

use std::time::Duration;

use crossbeam_channel as xch;
use echowalk_traits::{Synthesizer, UtteranceId};

use crate::config::EngineSettings;
use crate::engine::{Engine, EngineMsg, EngineNotice, SpeechRequest};
use crate::error::{EngineError, Result};
use crate::geometry::Vec3;
use crate::registry::GeometryEvent;
use crate::speech::SpeechEvent;

/// Create the inbound message channel.
pub fn channel() -> (EngineHandle, EngineInbox) {
    let (tx, rx) = xch::unbounded();
    (EngineHandle { tx }, EngineInbox { rx })
}

/// Sending side of the engine inbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: xch::Sender<EngineMsg>,
}

impl EngineHandle {
    pub fn send(&self, msg: EngineMsg) -> std::result::Result<(), EngineError> {
        self.tx.send(msg).map_err(|_| EngineError::Disconnected)
    }

    pub fn geometry(&self, event: GeometryEvent) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::Geometry(event))
    }

    pub fn motion_tick(&self) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::MotionTick)
    }

    pub fn say(&self, req: SpeechRequest) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::Say(req))
    }

    pub fn configure(&self, settings: EngineSettings) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::Configure(settings))
    }

    pub fn observer_moved(&self, p: Vec3) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::ObserverMoved(p))
    }

    pub fn shutdown(&self) -> std::result::Result<(), EngineError> {
        self.send(EngineMsg::Shutdown)
    }

    /// Completion reporter for a synthesizer running on another thread.
    pub fn speech_callback(&self) -> SpeechCallback {
        SpeechCallback {
            handle: self.clone(),
        }
    }
}

/// Reports synthesizer completions back to the engine. Sends after the engine
/// stopped are dropped with a debug log; a finishing voice has nothing to do
/// about it.
#[derive(Debug, Clone)]
pub struct SpeechCallback {
    handle: EngineHandle,
}

impl SpeechCallback {
    fn report(&self, ev: SpeechEvent) {
        if self.handle.send(EngineMsg::Speech(ev)).is_err() {
            tracing::debug!("speech callback after engine shutdown");
        }
    }

    pub fn finished(&self, id: UtteranceId) {
        self.report(SpeechEvent::Finished(id));
    }

    pub fn cancelled(&self, id: UtteranceId) {
        self.report(SpeechEvent::Cancelled(id));
    }

    pub fn failed(&self, id: UtteranceId, reason: impl Into<String>) {
        self.report(SpeechEvent::Failed(id, reason.into()));
    }
}

/// Receiving side, consumed by `EngineRunner::spawn`.
#[derive(Debug)]
pub struct EngineInbox {
    rx: xch::Receiver<EngineMsg>,
}

impl EngineInbox {
    /// Wait for the next message until `deadline`, or indefinitely without one.
    /// `Ok(None)` means the deadline passed.
    pub fn recv_until(
        &self,
        deadline: Option<Duration>,
    ) -> std::result::Result<Option<EngineMsg>, EngineError> {
        match deadline {
            Some(d) => match self.rx.recv_timeout(d) {
                Ok(m) => Ok(Some(m)),
                Err(xch::RecvTimeoutError::Timeout) => Ok(None),
                Err(xch::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
            },
            None => self.rx.recv().map(Some).map_err(|_| EngineError::Disconnected),
        }
    }

    pub fn try_recv(&self) -> Option<EngineMsg> {
        self.rx.try_recv().ok()
    }
}

/// Owns the engine thread. Dropping it sends `Shutdown` and joins.
pub struct EngineRunner<Y: Synthesizer + Send + 'static> {
    handle: EngineHandle,
    notices: xch::Receiver<EngineNotice>,
    join_handle: Option<std::thread::JoinHandle<Engine<Y>>>,
}

impl<Y: Synthesizer + Send + 'static> EngineRunner<Y> {
    pub fn spawn(engine: Engine<Y>, handle: EngineHandle, inbox: EngineInbox) -> Result<Self> {
        let (notice_tx, notices) = xch::unbounded();
        let join_handle = std::thread::Builder::new()
            .name("echowalk-engine".into())
            .spawn(move || run_owner(engine, &inbox, &notice_tx))?;
        tracing::info!("engine thread started");
        Ok(Self {
            handle,
            notices,
            join_handle: Some(join_handle),
        })
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    /// Outbound warnings and queue notices.
    pub fn notices(&self) -> &xch::Receiver<EngineNotice> {
        &self.notices
    }

    /// Stop the owner thread and take the engine back.
    pub fn shutdown(mut self) -> Result<Engine<Y>> {
        let _ = self.handle.shutdown();
        let jh = self
            .join_handle
            .take()
            .ok_or_else(|| EngineError::State("engine thread already joined".into()))?;
        jh.join()
            .map_err(|_| eyre::Report::new(EngineError::State("engine thread panicked".into())))
    }
}

fn run_owner<Y: Synthesizer>(
    mut engine: Engine<Y>,
    inbox: &EngineInbox,
    notices: &xch::Sender<EngineNotice>,
) -> Engine<Y> {
    loop {
        let wait = engine
            .next_deadline()
            .map(|d| d.saturating_duration_since(engine.clock().now()));
        let keep_going = match inbox.recv_until(wait) {
            Ok(Some(msg)) => engine.handle(msg),
            Ok(None) => true,
            Err(_) => {
                tracing::debug!("all engine handles dropped");
                false
            }
        };
        engine.poll();
        for n in engine.take_notices() {
            // Nobody listening is fine; warnings were already logged.
            let _ = notices.send(n);
        }
        if !keep_going {
            break;
        }
    }
    tracing::info!("engine thread exiting");
    engine
}

impl<Y: Synthesizer + Send + 'static> Drop for EngineRunner<Y> {
    fn drop(&mut self) {
        if let Some(jh) = self.join_handle.take() {
            let _ = self.handle.shutdown();
            if let Err(e) = jh.join() {
                tracing::warn!(?e, "engine thread panicked during shutdown");
            }
        }
    }
}
