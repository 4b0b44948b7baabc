//! Test and helper mocks for echowalk_core

use echowalk_traits::{Synthesizer, UtteranceId};

/// A synthesizer that never produces sound and remembers every request.
///
/// Completion is not simulated; drive it by feeding `SpeechEvent`s to the
/// engine or queue. Utterances whose text equals `fail_on` are rejected.
#[derive(Debug, Default, Clone)]
pub struct RecordingSynthesizer {
    spoken: Vec<(UtteranceId, String)>,
    stops: usize,
    fail_on: Option<String>,
}

impl RecordingSynthesizer {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> &[(UtteranceId, String)] {
        &self.spoken
    }

    pub fn spoken_texts(&self) -> Vec<&str> {
        self.spoken.iter().map(|(_, t)| t.as_str()).collect()
    }

    pub fn last(&self) -> Option<(UtteranceId, &str)> {
        self.spoken.last().map(|(id, t)| (*id, t.as_str()))
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl Synthesizer for RecordingSynthesizer {
    fn speak(
        &mut self,
        id: UtteranceId,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_on.as_deref() == Some(text) {
            return Err(Box::new(std::io::Error::other("recording synthesizer rejected text")));
        }
        self.spoken.push((id, text.to_string()));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.stops += 1;
        Ok(())
    }
}

/// A synthesizer that "finishes" every utterance instantly by reporting back
/// through a `SpeechCallback`. The spoken log is shared so it can be read
/// while the engine runs on its own thread.
#[derive(Debug, Clone)]
pub struct InstantSynthesizer {
    callback: crate::runner::SpeechCallback,
    log: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl InstantSynthesizer {
    pub fn new(callback: crate::runner::SpeechCallback) -> Self {
        Self {
            callback,
            log: std::sync::Arc::default(),
        }
    }

    /// Shared view of everything spoken so far.
    pub fn log(&self) -> std::sync::Arc<std::sync::Mutex<Vec<String>>> {
        self.log.clone()
    }
}

impl Synthesizer for InstantSynthesizer {
    fn speak(
        &mut self,
        id: UtteranceId,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log
            .lock()
            .map_err(|_| std::io::Error::other("speech log poisoned"))?
            .push(text.to_string());
        self.callback.finished(id);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
