//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of environment-specific sections.

use super::error::{ConfigResult, ConfigurationError};
use super::MonitorConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAMES: [&str; 2] = ["shop-monitor.yaml", "shop-monitor.yml"];
const ENVIRONMENT_SECTIONS: [&str; 3] = ["development", "test", "production"];

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: MonitorConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = environment,
            check_interval_minutes = config.monitor.check_interval_minutes,
            webhook_configured = config.webhook_url().is_some(),
            cache_backends = config.cache_backends.len(),
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Sanitized configuration for debugging output; secrets are masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Detect current environment from environment variables
    fn detect_environment() -> String {
        env::var("SHOP_MONITOR_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var("SHOP_MONITOR_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// Find the configuration file
    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.exists() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    /// Safely read a configuration file with a size limit
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                "Configuration file larger than 1MB",
            ));
        }

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file",
                "Configuration path must point to a regular file",
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<MonitorConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content = Self::read_config_file_safely(&config_file)?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!(
                "Applying environment-specific overrides for: {}",
                environment
            );
            Self::merge_yaml_values(&mut yaml_data, env_overrides)?;
        }

        // Remove environment sections to avoid confusion
        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for section in ENVIRONMENT_SECTIONS {
                map.remove(YamlValue::String(section.to_string()));
            }
        }

        let mut config: MonitorConfig = serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                config_file.display().to_string(),
                format!("Failed to deserialize configuration: {e}"),
            )
        })?;

        config.environment = environment.to_string();

        Ok(config)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) -> ConfigResult<()> {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value)?;
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            // An empty environment section overrides nothing
            (YamlValue::Mapping(_), YamlValue::Null) => {}
            (YamlValue::Mapping(_), _) => {
                return Err(ConfigurationError::ConfigMergeError {
                    error: "cannot replace a mapping with a scalar".to_string(),
                });
            }
            (base_ref, override_val) => {
                // For non-mapping values, override completely
                *base_ref = override_val;
            }
        }
        Ok(())
    }

    /// Sanitize configuration for safe logging by masking sensitive fields
    fn sanitize_config_for_logging(config: &MonitorConfig) -> serde_json::Value {
        let mut config_json = serde_json::to_value(config).unwrap_or(serde_json::Value::Null);
        let sensitive_patterns = ["webhook", "secret", "token", "password", "headers"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    /// Recursively sanitize sensitive fields in JSON configuration
    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive && !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackendKind;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config_yaml() -> &'static str {
        r#"
monitor:
  check_interval_minutes: 5
  recovery_check_delay_seconds: 10

alerts:
  admin_email: "ops@example.com"
  site_url: "https://shop.example.com"
  webhook_timeout_seconds: 5

catalog:
  products_url: "http://localhost:9000/api/products?status=publish&limit=1"
  storefront_url: "http://localhost:9000/shop.json"

cache_backends:
  - name: "Edge Cache"
    kind: http_purge
    url: "https://cdn.example.com/purge_all"
  - name: "Object Cache"
    kind: object_cache

test:
  monitor:
    check_interval_minutes: 1
  alerts:
    webhook_url: "https://hooks.example.com/services/T000/B000/XXXX"

production:
  monitor:
    reprobe_delay_ms: 2000
"#
    }

    fn setup_test_config_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().to_path_buf();
        fs::write(config_dir.join("shop-monitor.yaml"), create_test_config_yaml()).unwrap();
        (temp_dir, config_dir)
    }

    #[test]
    fn test_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let result = ConfigManager::find_config_file(temp_dir.path());
        if let Err(ConfigurationError::ConfigFileNotFound { searched_paths }) = result {
            assert_eq!(searched_paths.len(), 2);
        } else {
            panic!("Expected ConfigFileNotFound error");
        }
    }

    #[test]
    fn test_yml_extension_is_found() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shop-monitor.yml"), "{}").unwrap();

        let found = ConfigManager::find_config_file(temp_dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "shop-monitor.yml");
    }

    #[test]
    fn test_base_config_loading() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "development").unwrap();
        let config = manager.config();

        assert_eq!(manager.environment(), "development");
        assert_eq!(config.environment, "development");
        assert_eq!(config.monitor.check_interval_minutes, 5);
        assert_eq!(config.alerts.admin_email, "ops@example.com");
        assert!(config.webhook_url().is_none());
        assert_eq!(config.cache_backends.len(), 2);
        assert!(matches!(
            config.cache_backends[1].kind,
            CacheBackendKind::ObjectCache { .. }
        ));
    }

    #[test]
    fn test_environment_specific_overrides() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        let test_manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir.clone()), "test").unwrap();
        assert_eq!(test_manager.config().monitor.check_interval_minutes, 1);
        // untouched siblings survive the merge
        assert_eq!(test_manager.config().monitor.recovery_check_delay_seconds, 10);
        assert!(test_manager.config().webhook_url().is_some());

        let prod_manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "production").unwrap();
        assert_eq!(prod_manager.config().monitor.reprobe_delay_ms, 2000);
        assert_eq!(prod_manager.config().monitor.check_interval_minutes, 5);
    }

    #[test]
    fn test_validation_runs_on_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("shop-monitor.yaml"),
            "alerts:\n  admin_email: \"\"\n",
        )
        .unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test");
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shop-monitor.yaml"), "monitor: [unclosed").unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test");
        assert!(matches!(result, Err(ConfigurationError::InvalidYaml { .. })));
    }

    #[test]
    fn test_config_sanitization() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "test").unwrap();

        let sanitized = manager.debug_config();
        assert_eq!(sanitized["alerts"]["webhook_url"], "[MASKED]");
        assert_eq!(sanitized["alerts"]["admin_email"], "ops@example.com");
        assert!(!sanitized.to_string().contains("hooks.example.com"));
    }
}
