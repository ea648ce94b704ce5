pub mod config;
pub mod error;
pub mod session;

pub use config::CaptchaConfig;
pub use error::{CaptchaError, ConfigError};
pub use session::ChallengeHandle;
