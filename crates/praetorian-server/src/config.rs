use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use praetorian_keystore::{ConfigError, KeyConfig};
use serde::Deserialize;
use tracing::debug;

/// Environment variable holding the key configuration as JSON.
pub const CONFIG_ENV: &str = "PRAETORIAN_CONFIG";
/// Environment variable holding the listen port.
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 3000;

/// Everything the server needs before it can accept traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub keys: KeyConfig,
}

/// On-disk form, e.g.
///
/// ```toml
/// port = 8080
/// active_key_id = "1"
///
/// [root_keys]
/// 1 = "kSRFQxepULO9UC5SL5pA/mXjbI1GXu9ha2T0yPr3scU="
/// ```
#[derive(Debug, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    active_key_id: String,
    #[serde(default)]
    root_keys: BTreeMap<String, String>,
}

/// Load from `path` when given, otherwise from the environment.
pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        Some(path) => load_from_path(path),
        None => load_from_env(),
    }
}

/// Load from `PRAETORIAN_CONFIG` and `PORT`.
pub fn load_from_env() -> Result<ServerConfig> {
    from_values(
        std::env::var(CONFIG_ENV).ok().as_deref(),
        std::env::var(PORT_ENV).ok().as_deref(),
    )
}

/// Build a config from raw environment values.
pub fn from_values(keys: Option<&str>, port: Option<&str>) -> Result<ServerConfig> {
    let keys = KeyConfig::from_json(keys.unwrap_or_default())
        .wrap_err_with(|| format!("reading {CONFIG_ENV}"))?;
    let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| eyre!("invalid {PORT_ENV} value `{raw}`"))?,
        None => DEFAULT_PORT,
    };
    Ok(ServerConfig { port, keys })
}

/// Load from a TOML file. Unlike the environment there is no fallback: the
/// file must exist and name the root keys.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading config file");
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Err(color_eyre::Report::new(ConfigError::Empty).wrap_err(describe(path)));
    }
    let file: FileConfig = toml::from_str(&contents)
        .map_err(|e| ConfigError::Invalid(e.to_string()))
        .wrap_err_with(|| describe(path))?;

    Ok(ServerConfig {
        port: file.port.unwrap_or(DEFAULT_PORT),
        keys: KeyConfig {
            active_key_id: file.active_key_id,
            root_keys: file.root_keys,
        },
    })
}

fn describe(path: &Path) -> String {
    format!("parsing config file {}", path.display())
}
