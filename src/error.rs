use thiserror::Error;

/// Ошибки модели интерферометра и восстановления фазы
#[derive(Debug, Error)]
pub enum PdiError {
    #[error("unsupported grating type: {0:?}, expected one of \"sin_amp\", \"ronchi\"")]
    UnsupportedGrating(String),
    #[error("unsupported grating axis: {0:?}, expected \"x\" or \"y\"")]
    UnsupportedAxis(String),
    #[error("{frames} frames given, but the weight tables hold {weights} terms")]
    FrameCountMismatch { frames: usize, weights: usize },
    #[error("numerator table holds {ss} weights, denominator table holds {cs}")]
    WeightTableMismatch { ss: usize, cs: usize },
    #[error("field of shape {shape:?} is not square")]
    NonSquareField { shape: [usize; 2] },
    #[error("no frames to reconstruct the phase from")]
    EmptyFrameStack,
    #[error("frame shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        found: [usize; 2],
    },
    #[error("invalid PS/PDI configuration")]
    Config(#[from] toml::de::Error),
    #[error("failed to read configuration file")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdiError>;
