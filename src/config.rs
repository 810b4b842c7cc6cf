//! Runtime configuration resolved from the process environment.

use crate::errors::{CoreError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable naming an explicit staging directory.
pub const RECYCLE_BIN_ENV: &str = "FILENAV_RECYCLE_BIN";

/// Environment variable selecting the collision policy (`overwrite` or `fail`).
pub const COLLISION_ENV: &str = "FILENAV_ON_COLLISION";

/// Staging directory name under the user's home directory.
pub const DEFAULT_BIN_DIR_NAME: &str = ".recycle_bin";

/// What to do when a move would replace an existing file of the same name.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum CollisionPolicy {
    /// Last move wins; the existing file is replaced.
    #[default]
    Overwrite,
    /// Refuse the move with `CoreError::Conflict`.
    Fail,
}

impl CollisionPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "fail" => Ok(Self::Fail),
            other => Err(CoreError::invalid_input(format!(
                "{COLLISION_ENV} must be `overwrite` or `fail`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub staging_dir: PathBuf,
    pub collision_policy: CollisionPolicy,
}

impl Config {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            collision_policy: CollisionPolicy::default(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Resolves configuration from the current process environment.
    pub fn from_env() -> Result<Self> {
        let environ = std::env::vars().collect::<HashMap<String, String>>();
        Self::from_environ(&environ)
    }

    /// Resolves configuration from an explicit environment map.
    ///
    /// The staging directory is `$FILENAV_RECYCLE_BIN` when set, otherwise
    /// `$HOME/.recycle_bin`, otherwise the platform home directory.
    pub fn from_environ(environ: &HashMap<String, String>) -> Result<Self> {
        let staging_dir = match environ.get(RECYCLE_BIN_ENV).filter(|v| !v.is_empty()) {
            Some(explicit) => PathBuf::from(explicit),
            None => {
                let home = environ
                    .get("HOME")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .or_else(dirs::home_dir)
                    .ok_or_else(|| CoreError::invalid_input("cannot determine home directory"))?;
                home.join(DEFAULT_BIN_DIR_NAME)
            }
        };

        let collision_policy = match environ.get(COLLISION_ENV) {
            Some(value) => CollisionPolicy::parse(value)?,
            None => CollisionPolicy::default(),
        };

        Ok(Self {
            staging_dir,
            collision_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environ(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn explicit_bin_dir_wins() {
        let config = Config::from_environ(&environ(&[
            ("HOME", "/home/alice"),
            (RECYCLE_BIN_ENV, "/srv/bin"),
        ]))
        .unwrap();
        assert_eq!(config.staging_dir, PathBuf::from("/srv/bin"));
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    }

    #[test]
    fn home_dir_fallback() {
        let config = Config::from_environ(&environ(&[("HOME", "/home/alice")])).unwrap();
        assert_eq!(config.staging_dir, PathBuf::from("/home/alice/.recycle_bin"));
    }

    #[test]
    fn collision_policy_from_env() {
        let config = Config::from_environ(&environ(&[
            ("HOME", "/home/alice"),
            (COLLISION_ENV, "FAIL"),
        ]))
        .unwrap();
        assert_eq!(config.collision_policy, CollisionPolicy::Fail);
    }

    #[test]
    fn unknown_collision_policy_is_rejected() {
        let err = Config::from_environ(&environ(&[
            ("HOME", "/home/alice"),
            (COLLISION_ENV, "rename"),
        ]))
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
