//! Single-consumer speech queue.
//!
//! Exactly one utterance is in flight at a time. The queue is a two-state
//! machine (`Idle`, `Speaking`) driven by typed synthesizer events; each
//! utterance carries an `UtteranceId` so late callbacks for an utterance
//! that was already interrupted are recognised and ignored.
//!
//! After a normal completion the queue waits a short grace period before
//! starting the next item or reporting that it went idle. The grace deadline
//! is serviced by `poll`, which the owner calls whenever it wakes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use echowalk_traits::{Synthesizer, UtteranceId};

use crate::error::map_synth_error;

/// Callback from the synthesizer collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished(UtteranceId),
    Cancelled(UtteranceId),
    Failed(UtteranceId, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking(UtteranceId),
}

/// Notification raised by the queue towards its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechNotice {
    /// Grace period elapsed after the last utterance and nothing is pending.
    QueueIdle,
}

pub struct SpeechQueue<Y: Synthesizer> {
    synth: Y,
    pending: VecDeque<String>,
    state: SpeechState,
    current_text: Option<String>,
    next_id: u64,
    grace: Duration,
    resume_at: Option<Instant>,
}

impl<Y: Synthesizer> core::fmt::Debug for SpeechQueue<Y> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpeechQueue")
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("resume_at", &self.resume_at)
            .finish()
    }
}

impl<Y: Synthesizer> SpeechQueue<Y> {
    pub fn new(synth: Y, grace: Duration) -> Self {
        Self {
            synth,
            pending: VecDeque::new(),
            state: SpeechState::Idle,
            current_text: None,
            next_id: 0,
            grace,
            resume_at: None,
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SpeechState::Idle
    }

    pub fn is_speaking(&self) -> bool {
        !self.is_idle()
    }

    /// Utterance currently in flight.
    pub fn current(&self) -> Option<(UtteranceId, &str)> {
        match self.state {
            SpeechState::Speaking(id) => self.current_text.as_deref().map(|t| (id, t)),
            SpeechState::Idle => None,
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// When `poll` next has work to do, if ever.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resume_at
    }

    pub fn synthesizer(&self) -> &Y {
        &self.synth
    }

    pub fn synthesizer_mut(&mut self) -> &mut Y {
        &mut self.synth
    }

    /// Nothing in flight and nothing waiting for the grace deadline.
    pub fn is_free(&self) -> bool {
        self.is_idle() && self.pending.is_empty()
    }

    /// Append an ordinary utterance. Starts at once only when the queue is
    /// free; items already waiting out a grace period keep their turn.
    pub fn enqueue(&mut self, text: impl Into<String>) {
        let start = self.is_free();
        self.pending.push_back(text.into());
        if start {
            self.resume_at = None;
            self.start_next();
        }
    }

    /// Best-effort warning: accepted only when the queue is free, dropped
    /// otherwise. Never waits behind other speech.
    pub fn enqueue_warning(&mut self, text: impl Into<String>) -> bool {
        if !self.is_free() {
            tracing::debug!(
                speaking = self.is_speaking(),
                pending = self.pending.len(),
                "warning dropped, queue busy"
            );
            return false;
        }
        self.enqueue(text);
        true
    }

    /// Drop everything pending, interrupt the current utterance and speak `text`.
    pub fn clear_and_speak_now(&mut self, text: impl Into<String>) {
        self.pending.clear();
        self.interrupt();
        self.pending.push_back(text.into());
        self.start_next();
    }

    /// Interrupt and clear without raising `QueueIdle`.
    pub fn stop(&mut self) {
        self.pending.clear();
        self.interrupt();
    }

    fn interrupt(&mut self) {
        self.resume_at = None;
        if let SpeechState::Speaking(id) = self.state {
            if let Err(e) = self.synth.stop() {
                let err = map_synth_error(&*e);
                tracing::warn!(utterance = %id, error = %err, "synthesizer stop failed");
            }
            tracing::debug!(utterance = %id, "utterance interrupted");
        }
        self.state = SpeechState::Idle;
        self.current_text = None;
    }

    fn start_next(&mut self) {
        while let Some(text) = self.pending.pop_front() {
            self.next_id += 1;
            let id = UtteranceId(self.next_id);
            match self.synth.speak(id, &text) {
                Ok(()) => {
                    tracing::debug!(utterance = %id, text = %text, "speaking");
                    self.state = SpeechState::Speaking(id);
                    self.current_text = Some(text);
                    return;
                }
                Err(e) => {
                    let err = map_synth_error(&*e);
                    tracing::warn!(utterance = %id, error = %err, "speak failed; skipping");
                }
            }
        }
        self.state = SpeechState::Idle;
        self.current_text = None;
    }

    fn is_current(&self, id: UtteranceId) -> bool {
        self.state == SpeechState::Speaking(id)
    }

    /// Apply a synthesizer callback.
    pub fn on_event(&mut self, event: SpeechEvent, now: Instant) -> Option<SpeechNotice> {
        match event {
            SpeechEvent::Finished(id) if self.is_current(id) => self.finish(now),
            SpeechEvent::Failed(id, reason) if self.is_current(id) => {
                tracing::warn!(utterance = %id, %reason, "synthesis failed");
                self.finish(now)
            }
            SpeechEvent::Cancelled(id) if self.is_current(id) => {
                self.state = SpeechState::Idle;
                self.current_text = None;
                self.resume_at = None;
                self.start_next();
                None
            }
            SpeechEvent::Finished(id) | SpeechEvent::Failed(id, _) | SpeechEvent::Cancelled(id) => {
                tracing::debug!(utterance = %id, "stale speech callback ignored");
                None
            }
        }
    }

    fn finish(&mut self, now: Instant) -> Option<SpeechNotice> {
        self.state = SpeechState::Idle;
        self.current_text = None;
        self.resume_at = Some(now + self.grace);
        self.poll(now)
    }

    /// Service the grace deadline.
    pub fn poll(&mut self, now: Instant) -> Option<SpeechNotice> {
        let due = self.resume_at?;
        if now < due {
            return None;
        }
        self.resume_at = None;
        if self.is_speaking() {
            return None;
        }
        if self.pending.is_empty() {
            tracing::trace!("speech queue idle");
            return Some(SpeechNotice::QueueIdle);
        }
        self.start_next();
        None
    }
}
