/// Domain-specific error types for the analytics engine.
///
/// Malformed numeric input is never an error here -- the pricer clamps bad
/// numbers to safe floors (see `models::norm`). These variants cover the
/// structural failures only: unknown catalog keys, bad leg indices, host
/// plumbing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("leg index {index} out of range ({len} legs)")]
    LegIndex { index: usize, len: usize },

    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
