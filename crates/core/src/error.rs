/// Result alias that carries the custom [`SelectorError`] type.
pub type Result<T> = std::result::Result<T, SelectorError>;

/// Common error type for the core crate.
///
/// Every configuration problem is reported when a component is built.
/// Once the pipeline is running nothing can fail: backpressure is not an
/// error, it simply stalls the producer.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// Free-form message, mostly used by the command line front end.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that fail to parse.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("boxcar depth {0} is not a power of two")]
    DepthNotPowerOfTwo(usize),
    #[error("a bar graph needs at least two thresholds, got {0}")]
    TooFewThresholds(usize),
    #[error("threshold {index} ({value:#x}) does not exceed the one before it")]
    ThresholdsNotAscending { index: usize, value: i32 },
    #[error("segment {lo:#x}..{hi:#x} is too wide for a non-zero multiplier")]
    ZeroMultiplier { lo: i32, hi: i32 },
    #[error("invalid width: {0}")]
    InvalidWidth(String),
    #[error("{0} must be at least one")]
    ZeroCount(&'static str),
    #[error("{chans} channels cannot be shown on a ring of {leds} LEDs")]
    RingTooSmall { chans: usize, leds: usize },
}

impl SelectorError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
