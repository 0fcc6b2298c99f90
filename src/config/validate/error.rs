//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid {name}: {value} (must be > 0)")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("Unsupported number of layers: {0} (only 1 is supported)")]
    UnsupportedLayers(usize),

    #[error("Invalid {name}: {value} (must be in [0.0, 1.0))")]
    InvalidDropout { name: &'static str, value: f32 },

    #[error("Invalid keep rate: {0} (must be in [0.0, 1.0])")]
    InvalidKeepRate(f32),

    #[error("Invalid learning rate: {0} (must be finite and > 0.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid sequence length: {0} (must be > 0)")]
    InvalidSeqLen(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid KL anneal rate: {0} (must be >= 0.0)")]
    InvalidAnnealRate(f32),

    #[error("Invalid KL anneal range: start {start}, cap {cap} (need 0.0 <= start <= cap)")]
    InvalidAnnealRange { start: f32, cap: f32 },

    #[error("Invalid {name}: {value} (must be >= 0.0)")]
    NegativeCoefficient { name: &'static str, value: f32 },

    #[error("Invalid LR decay factor: {0} (must be in [0.0, 1.0])")]
    InvalidLrGamma(f32),

    #[error("Invalid nonmono window: {0} (must be > 0)")]
    InvalidNonmono(usize),

    #[error("Invalid log interval: {0} (must be > 0)")]
    InvalidLogInterval(usize),

    #[error("Unsupported device: {0} (only 'cpu' is available)")]
    UnsupportedDevice(String),

    #[error("Dataset name cannot be empty")]
    EmptyDataset,
}
