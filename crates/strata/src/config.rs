use std::path::Path;

use anyhow::{Context, Result};
use strata_backend::RegistryConfig;

const DEFAULT_CONFIG: &str = "strata.toml";

/// Load backend configuration: an explicit `--config` path must exist, an
/// implicit `./strata.toml` is optional, and `STRATA_<SERVICE>_TOKEN`
/// environment variables overlay whatever the file set.
pub fn load(path: Option<&Path>) -> Result<RegistryConfig> {
    let config = match path {
        Some(path) => parse(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                parse(default)?
            } else {
                RegistryConfig::default()
            }
        }
    };
    Ok(config.from_env())
}

fn parse(path: &Path) -> Result<RegistryConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
