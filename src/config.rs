use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DAYPLAN_DATA_DIR";

const APP_DIR: &str = "dayplan";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolves the data directory: `--data-dir` flag, then the
    /// environment, then the platform's local data directory.
    pub fn resolve(flag: Option<PathBuf>) -> Self {
        let env_value = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::resolve_with(flag, env_value, dirs::data_local_dir())
    }

    pub fn resolve_with(
        flag: Option<PathBuf>,
        env_value: Option<PathBuf>,
        platform_dir: Option<PathBuf>,
    ) -> Self {
        let data_dir = flag
            .or(env_value.filter(|p| !p.as_os_str().is_empty()))
            .unwrap_or_else(|| {
                platform_dir
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(APP_DIR)
            });
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let config = Config::resolve_with(
            Some(PathBuf::from("/flag")),
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/flag"));
    }

    #[test]
    fn test_env_before_platform() {
        let config = Config::resolve_with(
            None,
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/env"));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let config = Config::resolve_with(
            None,
            Some(PathBuf::new()),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/platform/dayplan"));
    }

    #[test]
    fn test_falls_back_to_current_dir() {
        let config = Config::resolve_with(None, None, None);
        assert_eq!(config.data_dir, PathBuf::from("./dayplan"));
    }
}
