use std::path::{Path, PathBuf};

use anyhow::Context;
use render_core::{StaticSalt, TokenAuthority};
use serde::Deserialize;

use crate::paths;
use crate::wp_config::WpConfig;

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the site salt.
pub const SALT_ENV: &str = "AUTH_SALT";

/// Parsed `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub site_url: Option<String>,
    pub wp_path: Option<PathBuf>,
    pub mu_plugins_dir: Option<PathBuf>,
    pub auth_salt: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read a config file. A missing file is an empty config; an unreadable
    /// or malformed one is an error.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;
        if cfg.timeout_secs == Some(0) {
            anyhow::bail!(
                "invalid config at {}: timeout_secs must be at least 1",
                path.display()
            );
        }
        Ok(cfg)
    }
}

/// Values supplied on the command line (or their env vars).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub wp_path: Option<PathBuf>,
    pub site_url: Option<String>,
    pub mu_plugins_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved configuration.
///
/// Priority, highest first: command line, `AUTH_SALT` env (salt only),
/// `config.toml`, `wp-config.php`, built-in defaults.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub wp_root: Option<PathBuf>,
    pub site_url: Option<String>,
    pub mu_plugins_dir: Option<PathBuf>,
    pub auth_salt: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wp_root: None,
            site_url: None,
            mu_plugins_dir: None,
            auth_salt: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RenderConfig {
    /// Resolve using the user config file, the process environment and the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load(overrides: Overrides) -> anyhow::Result<Self> {
        let file = match paths::config_file() {
            Some(path) => FileConfig::read(&path)?,
            None => FileConfig::default(),
        };
        let env_salt = std::env::var(SALT_ENV).ok();
        let cwd = std::env::current_dir().ok();
        Ok(Self::resolve(overrides, file, env_salt, cwd.as_deref()))
    }

    /// Merge the sources. `cwd` is where to start searching for a WordPress
    /// root when none is configured.
    pub fn resolve(
        overrides: Overrides,
        file: FileConfig,
        env_salt: Option<String>,
        cwd: Option<&Path>,
    ) -> Self {
        let wp_root = overrides
            .wp_path
            .or(file.wp_path)
            .or_else(|| cwd.and_then(find_wp_root));
        let wp = wp_root
            .as_deref()
            .and_then(WpConfig::load)
            .unwrap_or_default();

        let site_url = overrides
            .site_url
            .or(file.site_url)
            .or_else(|| wp.base_url().map(str::to_string));

        let mu_plugins_dir = overrides
            .mu_plugins_dir
            .or(file.mu_plugins_dir)
            .or(wp.mu_plugin_dir)
            .or_else(|| {
                wp_root
                    .as_ref()
                    .map(|root| root.join("wp-content").join("mu-plugins"))
            });

        let auth_salt = [env_salt, file.auth_salt, wp.auth_salt]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty());

        // Zero never wins.
        let timeout_secs = overrides
            .timeout_secs
            .filter(|&t| t > 0)
            .or(file.timeout_secs.filter(|&t| t > 0))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            wp_root,
            site_url,
            mu_plugins_dir,
            auth_salt,
            timeout_secs,
        }
    }

    /// # Errors
    ///
    /// Returns an error when no source provided a site URL.
    pub fn require_site_url(&self) -> anyhow::Result<&str> {
        self.site_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "no site URL configured: pass --url, set site_url in config.toml, \
                 or define WP_HOME in wp-config.php"
            )
        })
    }

    /// # Errors
    ///
    /// Returns an error when neither a mu-plugins directory nor a WordPress
    /// root could be determined.
    pub fn require_mu_plugins_dir(&self) -> anyhow::Result<&Path> {
        self.mu_plugins_dir.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "could not determine the mu-plugins directory: pass --path or --mu-plugins-dir"
            )
        })
    }

    pub fn token_authority(&self) -> TokenAuthority<StaticSalt> {
        TokenAuthority::new(StaticSalt::from(self.auth_salt.clone()))
    }
}

/// Walk up from `dir` to the nearest ancestor holding `wp-config.php` or
/// `wp-load.php`.
pub fn find_wp_root(dir: &Path) -> Option<PathBuf> {
    let mut current = dir.to_path_buf();
    loop {
        if current.join("wp-load.php").is_file() || current.join("wp-config.php").is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
