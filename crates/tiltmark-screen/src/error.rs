use tiltmark_core::config::ConfigError;

#[derive(Debug)]
pub enum ScreenError {
    /// The screen's event loop has exited; nothing will consume the event.
    Closed,
    InvalidConfig(String),
}

impl std::fmt::Display for ScreenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "screen is closed"),
            Self::InvalidConfig(m) => write!(f, "invalid config: {m}"),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<ConfigError> for ScreenError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}
