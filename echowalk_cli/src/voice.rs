//! Stand-in synthesizers for replays.
//!
//! Both "speak" for `ms_per_char` per character. `SimVoice` lives on a
//! `ManualClock` and is polled by the replay loop; `ThreadVoice` runs a worker
//! thread on the wall clock and reports back through a `SpeechCallback`.

use std::time::{Duration, Instant};

use crossbeam_channel as xch;
use echowalk_core::{SpeechCallback, SpeechEvent, Synthesizer, UtteranceId};
use echowalk_traits::clock::Clock;

type SynthResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn speaking_time(text: &str, ms_per_char: u64) -> Duration {
    let chars = text.chars().count().max(1) as u64;
    Duration::from_millis(chars.saturating_mul(ms_per_char))
}

/// Utterance as it started, with its offset from the replay start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    pub at: Duration,
    pub text: String,
}

#[derive(Debug)]
pub struct SimVoice<C: Clock> {
    clock: C,
    epoch: Instant,
    ms_per_char: u64,
    current: Option<(UtteranceId, Instant)>,
    interrupted: Vec<UtteranceId>,
    started: Vec<Started>,
}

impl<C: Clock> SimVoice<C> {
    pub fn new(clock: C, ms_per_char: u64) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            ms_per_char,
            current: None,
            interrupted: Vec::new(),
            started: Vec::new(),
        }
    }

    /// Callbacks that are due at `now`: interruptions first, then completion.
    pub fn take_due(&mut self, now: Instant) -> Vec<SpeechEvent> {
        let mut out: Vec<SpeechEvent> = self
            .interrupted
            .drain(..)
            .map(SpeechEvent::Cancelled)
            .collect();
        if let Some((id, done)) = self.current
            && done <= now
        {
            self.current = None;
            out.push(SpeechEvent::Finished(id));
        }
        out
    }

    /// Utterances started since the last call.
    pub fn drain_started(&mut self) -> Vec<Started> {
        std::mem::take(&mut self.started)
    }
}

impl<C: Clock> Synthesizer for SimVoice<C> {
    fn speak(&mut self, id: UtteranceId, text: &str) -> SynthResult {
        let now = self.clock.now();
        self.current = Some((id, now + speaking_time(text, self.ms_per_char)));
        self.started.push(Started {
            at: now.saturating_duration_since(self.epoch),
            text: text.to_string(),
        });
        Ok(())
    }

    fn stop(&mut self) -> SynthResult {
        if let Some((id, _)) = self.current.take() {
            self.interrupted.push(id);
        }
        Ok(())
    }
}

enum VoiceCmd {
    Speak(UtteranceId, String),
    Stop,
}

/// Wall-clock voice on its own thread. Started utterances are published on
/// `started()`.
pub struct ThreadVoice {
    tx: Option<xch::Sender<VoiceCmd>>,
    started: xch::Receiver<Started>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl ThreadVoice {
    pub fn spawn(callback: SpeechCallback, ms_per_char: u64) -> eyre::Result<Self> {
        let (tx, rx) = xch::unbounded::<VoiceCmd>();
        let (started_tx, started) = xch::unbounded();
        let epoch = Instant::now();
        let join_handle = std::thread::Builder::new()
            .name("echowalk-voice".into())
            .spawn(move || {
                let mut current: Option<(UtteranceId, Instant)> = None;
                loop {
                    let cmd = match current {
                        Some((_, done)) => {
                            match rx.recv_timeout(done.saturating_duration_since(Instant::now())) {
                                Ok(c) => Some(c),
                                Err(xch::RecvTimeoutError::Timeout) => None,
                                Err(xch::RecvTimeoutError::Disconnected) => break,
                            }
                        }
                        None => match rx.recv() {
                            Ok(c) => Some(c),
                            Err(_) => break,
                        },
                    };
                    match cmd {
                        Some(VoiceCmd::Speak(id, text)) => {
                            let now = Instant::now();
                            current = Some((id, now + speaking_time(&text, ms_per_char)));
                            let _ = started_tx.send(Started {
                                at: now.saturating_duration_since(epoch),
                                text,
                            });
                        }
                        Some(VoiceCmd::Stop) => {
                            if let Some((id, _)) = current.take() {
                                callback.cancelled(id);
                            }
                        }
                        None => {
                            if let Some((id, _)) = current.take() {
                                callback.finished(id);
                            }
                        }
                    }
                }
                tracing::trace!("voice thread exiting");
            })?;
        Ok(Self {
            tx: Some(tx),
            started,
            join_handle: Some(join_handle),
        })
    }

    pub fn started(&self) -> xch::Receiver<Started> {
        self.started.clone()
    }

    fn send(&self, cmd: VoiceCmd) -> SynthResult {
        match &self.tx {
            Some(tx) => tx
                .send(cmd)
                .map_err(|_| std::io::Error::other("voice thread stopped").into()),
            None => Err(std::io::Error::other("voice thread stopped").into()),
        }
    }
}

impl Synthesizer for ThreadVoice {
    fn speak(&mut self, id: UtteranceId, text: &str) -> SynthResult {
        self.send(VoiceCmd::Speak(id, text.to_string()))
    }

    fn stop(&mut self) -> SynthResult {
        self.send(VoiceCmd::Stop)
    }
}

impl Drop for ThreadVoice {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(h) = self.join_handle.take()
            && h.join().is_err()
        {
            tracing::warn!("voice thread panicked during shutdown");
        }
    }
}
