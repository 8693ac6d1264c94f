//! Configuration loader with environment variable expansion

use super::{Config, ConfigError};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let expanded = Self::expand_env_vars(&content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in the config text.
    ///
    /// Supports `${VAR_NAME}` (keeps the placeholder if the variable is not
    /// set) and `${VAR_NAME:-default}`. Variable names must start with a
    /// letter or underscore and contain only uppercase letters, digits, and
    /// underscores.
    fn expand_env_vars(content: &str) -> String {
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").unwrap();
        let mut last_match = 0;
        let mut result = String::with_capacity(content.len());

        for cap in re.captures_iter(content) {
            let full_match = cap.get(0).unwrap();
            let var_name = cap.get(1).unwrap().as_str();

            result.push_str(&content[last_match..full_match.start()]);

            let value = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match cap.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => full_match.as_str().to_string(),
                },
            };
            result.push_str(&value);

            last_match = full_match.end();
        }

        result.push_str(&content[last_match..]);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("SHUTTLR_TEST_VAR", "test_value");
        let content = "key: ${SHUTTLR_TEST_VAR}";
        let expanded = ConfigLoader::expand_env_vars(content);
        assert_eq!(expanded, "key: test_value");
        std::env::remove_var("SHUTTLR_TEST_VAR");
    }

    #[test]
    fn test_expand_with_default() {
        let expanded = ConfigLoader::expand_env_vars("region: ${SHUTTLR_NO_SUCH_VAR:-us-east-1}");
        assert_eq!(expanded, "region: us-east-1");
    }

    #[test]
    fn test_missing_var_without_default_kept() {
        let content = "key: ${SHUTTLR_NO_SUCH_VAR}";
        assert_eq!(ConfigLoader::expand_env_vars(content), content);
    }
}
