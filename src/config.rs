use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/lockedtube-env";
pub const DEFAULT_LOCKEDTUBE_PORT: u16 = 8080;
pub const DEFAULT_LOCKEDTUBE_HOST: &str = "127.0.0.1";
pub const DEFAULT_SEARCH_MAX_RESULTS: u8 = 15;
/// Cookies carry `Secure` unless the deployment opts out for plain HTTP.
pub const DEFAULT_SECURE_COOKIES: bool = true;
const MAX_SEARCH_RESULTS_LIMIT: u8 = 50;

/// Raw values found in the env file or the process environment. Every field is
/// optional; `RuntimeConfig` fills in the defaults.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub yt_api_key: Option<String>,
    pub lockedtube_host: Option<String>,
    pub lockedtube_port: Option<u16>,
    pub secure_cookies: Option<bool>,
    pub search_max_results: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub yt_api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub secure_cookies: bool,
    pub search_max_results: u8,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            yt_api_key: None,
            host: DEFAULT_LOCKEDTUBE_HOST.to_string(),
            port: DEFAULT_LOCKEDTUBE_PORT,
            secure_cookies: DEFAULT_SECURE_COOKIES,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }
}

impl EnvConfig {
    /// Applies one `KEY=VALUE` pair. Unknown keys are ignored; `origin` only
    /// feeds error messages.
    fn apply(&mut self, key: &str, value: &str, origin: &str) -> Result<()> {
        match key {
            "YT_API_KEY" => {
                if !value.is_empty() {
                    self.yt_api_key = Some(value.to_string());
                }
            }
            "LOCKEDTUBE_HOST" => {
                if !value.is_empty() {
                    self.lockedtube_host = Some(value.to_string());
                }
            }
            "LOCKEDTUBE_PORT" => {
                let port: u16 = value
                    .parse()
                    .with_context(|| format!("Parsing LOCKEDTUBE_PORT from {origin}"))?;
                self.lockedtube_port = Some(port);
            }
            "LOCKEDTUBE_SECURE_COOKIES" => {
                self.secure_cookies = Some(parse_bool(value).with_context(|| {
                    format!("Parsing LOCKEDTUBE_SECURE_COOKIES from {origin}")
                })?);
            }
            "SEARCH_MAX_RESULTS" => {
                let max: u8 = value
                    .parse()
                    .with_context(|| format!("Parsing SEARCH_MAX_RESULTS from {origin}"))?;
                if max == 0 || max > MAX_SEARCH_RESULTS_LIMIT {
                    bail!(
                        "SEARCH_MAX_RESULTS must be between 1 and {MAX_SEARCH_RESULTS_LIMIT} (got {max}) in {origin}"
                    );
                }
                self.search_max_results = Some(max);
            }
            _ => {}
        }
        Ok(())
    }

    /// Overlays process environment variables (or any key/value source) on
    /// top of the values read from disk.
    pub fn merge_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.apply(key.as_ref(), value.as_ref().trim(), "the environment")?;
        }
        Ok(())
    }

    pub fn into_runtime(self) -> RuntimeConfig {
        let defaults = RuntimeConfig::default();
        RuntimeConfig {
            yt_api_key: self.yt_api_key,
            host: self.lockedtube_host.unwrap_or(defaults.host),
            port: self.lockedtube_port.unwrap_or(defaults.port),
            secure_cookies: self.secure_cookies.unwrap_or(defaults.secure_cookies),
            search_max_results: self
                .search_max_results
                .unwrap_or(defaults.search_max_results),
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let origin = path.display().to_string();
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = value_raw.trim().trim_matches('"');
            cfg.apply(key.trim(), value, &origin)?;
        }
    }
    Ok(Some(cfg))
}

/// Loads the config file (a missing file means "all defaults") and then lets
/// the process environment override it.
pub fn load_runtime_config(path: Option<PathBuf>) -> Result<RuntimeConfig> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut cfg = read_env_config(&path)?.unwrap_or_default();
    cfg.merge_env(std::env::vars())?;
    Ok(cfg.into_runtime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn read_env_config_extracts_port_and_key() {
        let cfg = make_config("# comment\nYT_API_KEY=\"abc\"\nLOCKEDTUBE_PORT=\"4242\"\n");
        let parsed = read_env_config(cfg.path()).unwrap().unwrap();
        assert_eq!(parsed.lockedtube_port, Some(4242));
        assert_eq!(parsed.yt_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = read_env_config(&dir.path().join("absent")).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn runtime_defaults_fill_gaps() {
        let cfg = make_config("YT_API_KEY=k\n");
        let runtime = read_env_config(cfg.path())
            .unwrap()
            .unwrap()
            .into_runtime();
        assert_eq!(runtime.port, DEFAULT_LOCKEDTUBE_PORT);
        assert_eq!(runtime.host, DEFAULT_LOCKEDTUBE_HOST);
        assert_eq!(runtime.search_max_results, DEFAULT_SEARCH_MAX_RESULTS);
        assert!(runtime.secure_cookies);
    }

    #[test]
    fn secure_cookies_can_be_disabled_for_plain_http() {
        let cfg = make_config("LOCKEDTUBE_SECURE_COOKIES=off\n");
        let runtime = read_env_config(cfg.path())
            .unwrap()
            .unwrap()
            .into_runtime();
        assert!(!runtime.secure_cookies);
    }

    #[test]
    fn environment_overrides_file_values() {
        let cfg = make_config("LOCKEDTUBE_HOST=\"10.0.0.1\"\nLOCKEDTUBE_SECURE_COOKIES=no\n");
        let mut parsed = read_env_config(cfg.path()).unwrap().unwrap();
        parsed
            .merge_env([
                ("LOCKEDTUBE_HOST", "0.0.0.0"),
                ("LOCKEDTUBE_SECURE_COOKIES", "true"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();
        let runtime = parsed.into_runtime();
        assert_eq!(runtime.host, "0.0.0.0");
        assert!(runtime.secure_cookies);
    }

    #[test]
    fn rejects_out_of_range_result_limit() {
        let cfg = make_config("SEARCH_MAX_RESULTS=80\n");
        assert!(read_env_config(cfg.path()).is_err());
    }

    #[test]
    fn rejects_garbage_port() {
        let cfg = make_config("LOCKEDTUBE_PORT=eighty\n");
        assert!(read_env_config(cfg.path()).is_err());
    }
}
