// Error type shared by the renderer, the hosts and the config loader.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the native window failed.
    #[error("window init error: {0}")]
    WindowInit(String),
    /// Pushing a frame to the window or canvas failed.
    #[error("present error: {0}")]
    Present(String),
    /// Two buffers that must share dimensions did not.
    #[error("{what}: size mismatch ({expected_w}x{expected_h} vs {actual_w}x{actual_h})")]
    SizeMismatch {
        what: &'static str,
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The TOML config file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn size_mismatch(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Error::SizeMismatch {
            what,
            expected_w: expected.0,
            expected_h: expected.1,
            actual_w: actual.0,
            actual_h: actual.1,
        }
    }
}
