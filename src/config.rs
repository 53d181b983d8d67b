use std::time::Duration;

use crate::error::Result;
use anyhow::anyhow;
use rocket::figment::Figment;

const DEFAULT_API_ROOT: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the REST backend lives, read from the `backend` table of the
/// selected profile. `ALTERRA_API_ROOT` wins over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub api_root: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    pub fn from_figment(config: &Figment) -> Result<Self> {
        let mut backend_config = Self::default();

        let section = match config.find_value("backend") {
            Ok(section) => Some(section),
            Err(e) if e.missing() => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(section) = section {
            let section = section
                .as_dict()
                .ok_or(anyhow!("backend section isn't a map"))?;

            if let Some(api_root) = section.get("api_root") {
                backend_config.api_root = api_root
                    .as_str()
                    .ok_or(anyhow!("api_root isn't a string"))?
                    .to_string();
            }

            if let Some(timeout) = section.get("timeout_secs") {
                let timeout: u64 = timeout.deserialize()?;
                backend_config.timeout = Duration::from_secs(timeout);
            }
        }

        if let Ok(api_root) = std::env::var("ALTERRA_API_ROOT") {
            backend_config.api_root = api_root;
        }

        if backend_config.api_root.trim().is_empty() {
            return Err(anyhow!("api_root can't be empty").into());
        }

        Ok(backend_config)
    }
}
