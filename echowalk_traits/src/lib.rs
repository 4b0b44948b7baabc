pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Identifier handed to the synthesizer with every utterance.
///
/// Completion and cancellation callbacks carry it back so the speech queue
/// can tell the current utterance apart from one it already interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtteranceId(pub u64);

impl std::fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// External text-to-speech collaborator.
///
/// `speak` must return promptly; completion is reported asynchronously
/// through the engine's speech callback. `stop` interrupts the current
/// utterance, which is then reported as cancelled.
pub trait Synthesizer {
    fn speak(
        &mut self,
        id: UtteranceId,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Synthesizer + ?Sized> Synthesizer for Box<T> {
    fn speak(
        &mut self,
        id: UtteranceId,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).speak(id, text)
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}
