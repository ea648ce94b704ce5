use reversi_engine::ReversiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { var, value } => write!(f, "Invalid value for {var}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptchaError {
    /// The challenge refused the action; nothing changed.
    Rejected(ReversiError),
    /// The challenge task is gone.
    Closed,
    Config(ConfigError),
}

impl std::fmt::Display for CaptchaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptchaError::Rejected(e) => write!(f, "Rejected: {e}"),
            CaptchaError::Closed => write!(f, "Challenge closed"),
            CaptchaError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for CaptchaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptchaError::Rejected(e) => Some(e),
            CaptchaError::Config(e) => Some(e),
            CaptchaError::Closed => None,
        }
    }
}

impl From<ReversiError> for CaptchaError {
    fn from(e: ReversiError) -> Self {
        CaptchaError::Rejected(e)
    }
}

impl From<ConfigError> for CaptchaError {
    fn from(e: ConfigError) -> Self {
        CaptchaError::Config(e)
    }
}
