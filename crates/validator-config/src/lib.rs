pub mod error;
pub mod model;

pub use error::*;
pub use model::{CpiSettings, OpenStackSettings, ReadinessConfig, ValidatorConfig};

use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "VALIDATOR_CONFIG_PATH";
const CONFIG_DIR: &str = ".validator";
const GLOBAL_DIR: &str = "openstack-validator";
const CANDIDATES: [&str; 2] = ["validator.local.yml", "validator.yml"];

/// Locate the validator configuration file
///
/// Search order:
/// 1. `VALIDATOR_CONFIG_PATH` (direct path)
/// 2. current directory: validator.local.yml, validator.yml
/// 3. `./.validator/`, same order
/// 4. `~/.config/openstack-validator/validator.yml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points at {}, which does not exist",
            CONFIG_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = current_dir.join(CONFIG_DIR);
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join(GLOBAL_DIR).join("validator.yml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Parse and validate the configuration at `path`
pub fn load_config(path: impl AsRef<Path>) -> Result<ValidatorConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let config: ValidatorConfig = if content.trim().is_empty() {
        ValidatorConfig::default()
    } else {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    config.validate()?;
    tracing::debug!("Loaded validator config from {}", path.display());
    Ok(config)
}

/// Discover the configuration file and load it
pub fn load() -> Result<ValidatorConfig> {
    let path = find_config_file()?;
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn enter(dir: &Path) -> Self {
            let original = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self(original)
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    #[serial]
    fn test_find_config_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("validator.yml"), "{}").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        let found = find_config_file().unwrap();
        assert!(found.ends_with("validator.yml"));
    }

    #[test]
    #[serial]
    fn test_local_file_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("validator.yml"), "{}").unwrap();
        fs::write(temp_dir.path().join("validator.local.yml"), "{}").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        let found = find_config_file().unwrap();
        assert!(found.ends_with("validator.local.yml"));
    }

    #[test]
    #[serial]
    fn test_find_config_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dot_dir = temp_dir.path().join(CONFIG_DIR);
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("validator.yml"), "{}").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        let found = find_config_file().unwrap();
        assert!(found.ends_with(".validator/validator.yml"));
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let custom = temp_dir.path().join("custom.yml");
        fs::write(&custom, "{}").unwrap();
        fs::write(temp_dir.path().join("validator.yml"), "{}").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        unsafe {
            std::env::set_var(CONFIG_ENV, custom.to_str().unwrap());
        }
        let found = find_config_file();
        unsafe {
            std::env::remove_var(CONFIG_ENV);
        }

        assert_eq!(found.unwrap(), custom);
    }

    #[test]
    fn test_load_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("validator.yml");
        fs::write(
            &path,
            r#"
openstack:
  cloud: devstack
  region: RegionOne
cpi:
  bin: /var/vcap/packages/openstack_cpi/bin/cpi
readiness:
  timeout_secs: 600
  max_delay_ms: 5000
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.openstack.region.as_deref(), Some("RegionOne"));
        assert_eq!(
            config.cpi.bin,
            Some(PathBuf::from("/var/vcap/packages/openstack_cpi/bin/cpi"))
        );
        assert_eq!(config.readiness.timeout_secs, 600);
        assert_eq!(config.readiness.delay_for_attempt(10), 5000);
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("validator.yml");
        fs::write(&path, "").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("validator.yml");
        fs::write(&path, "readiness:\n  timeout_secs: 0\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("validator.yml");
        fs::write(&path, "openstack: [not, a, map]\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }
}
