use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("speech synthesis error: {0}")]
    Synthesis(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("engine is no longer running")]
    Disconnected,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing synthesizer")]
    MissingSynthesizer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map an error from the `Synthesizer` trait boundary to a typed `EngineError`.
pub fn map_synth_error(e: &(dyn std::error::Error + 'static)) -> EngineError {
    if let Some(typed) = e.downcast_ref::<EngineError>() {
        return typed.clone();
    }
    EngineError::Synthesis(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_errors_become_synthesis_errors() {
        let io = std::io::Error::other("audio device busy");
        match map_synth_error(&io) {
            EngineError::Synthesis(msg) => assert!(msg.contains("busy")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn typed_errors_pass_through() {
        let e = EngineError::Disconnected;
        assert!(matches!(map_synth_error(&e), EngineError::Disconnected));
    }
}
