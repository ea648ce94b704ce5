use std::time::Duration;

use reversi_engine::challenge::{OPPONENT_DELAY, SUCCESS_DELAY};
use reversi_engine::{Challenge, RandomOpponent, Timings};

use crate::error::ConfigError;

pub const OPPONENT_DELAY_VAR: &str = "CAPTCHA_OPPONENT_DELAY_MS";
pub const SUCCESS_DELAY_VAR: &str = "CAPTCHA_SUCCESS_DELAY_MS";
pub const SEED_VAR: &str = "CAPTCHA_SEED";

/// Challenge settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptchaConfig {
    pub timings: Timings,
    /// Fixed opponent seed; random when unset.
    pub seed: Option<u64>,
}

impl CaptchaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opponent_delay = parse_var(&lookup, OPPONENT_DELAY_VAR)?
            .map(Duration::from_millis)
            .unwrap_or(OPPONENT_DELAY);
        let success_delay = parse_var(&lookup, SUCCESS_DELAY_VAR)?
            .map(Duration::from_millis)
            .unwrap_or(SUCCESS_DELAY);
        let seed = parse_var(&lookup, SEED_VAR)?;

        Ok(CaptchaConfig {
            timings: Timings {
                opponent_delay,
                success_delay,
            },
            seed,
        })
    }

    pub fn opponent(&self) -> RandomOpponent {
        match self.seed {
            Some(seed) => RandomOpponent::seeded(seed),
            None => RandomOpponent::new(),
        }
    }

    pub fn challenge(&self) -> Challenge<RandomOpponent> {
        Challenge::new(self.opponent(), self.timings)
    }
}

fn parse_var<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CaptchaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CaptchaConfig::default());
        assert_eq!(config.timings.opponent_delay, Duration::from_millis(700));
        assert_eq!(config.timings.success_delay, Duration::from_millis(3000));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn reads_overrides() {
        let config = CaptchaConfig::from_lookup(lookup(&[
            (OPPONENT_DELAY_VAR, "50"),
            (SUCCESS_DELAY_VAR, " 1000 "),
            (SEED_VAR, "42"),
        ]))
        .unwrap();
        assert_eq!(config.timings.opponent_delay, Duration::from_millis(50));
        assert_eq!(config.timings.success_delay, Duration::from_secs(1));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CaptchaConfig::from_lookup(lookup(&[(SEED_VAR, "")])).unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rejects_garbage() {
        let err = CaptchaConfig::from_lookup(lookup(&[(OPPONENT_DELAY_VAR, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: OPPONENT_DELAY_VAR,
                value: "soon".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid value for CAPTCHA_OPPONENT_DELAY_MS: \"soon\""
        );
    }

    #[test]
    fn builds_challenge_with_configured_timings() {
        let config = CaptchaConfig::from_lookup(lookup(&[(SUCCESS_DELAY_VAR, "5000")])).unwrap();
        let challenge = config.challenge();
        assert_eq!(challenge.timings().success_delay, Duration::from_secs(5));
    }
}
