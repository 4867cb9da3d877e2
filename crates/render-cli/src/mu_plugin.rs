//! Install / uninstall lifecycle of the generated must-use plugin.
//!
//! The file on disk is the only state: present means installed.

use std::path::{Path, PathBuf};

use render_core::mu_plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Installed,
    NotInstalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// The file already had the expected content.
    AlreadyInstalled,
    /// A file with different content was replaced.
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    NotInstalled,
}

/// The generated plugin file inside a must-use plugins directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuPlugin {
    path: PathBuf,
}

impl MuPlugin {
    pub fn in_dir(mu_plugins_dir: &Path) -> Self {
        Self {
            path: mu_plugins_dir.join(mu_plugin::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> InstallState {
        if self.path.is_file() {
            InstallState::Installed
        } else {
            InstallState::NotInstalled
        }
    }

    /// Write the plugin file, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn install(&self) -> anyhow::Result<InstallOutcome> {
        let existing = std::fs::read_to_string(&self.path).ok();
        if existing.as_deref() == Some(mu_plugin::SOURCE) {
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("could not create {}: {e}", parent.display())
            })?;
        }

        // Write atomically: write to temp file then rename
        let tmp_path = self.path.with_extension("php.tmp");
        std::fs::write(&tmp_path, mu_plugin::SOURCE)
            .map_err(|e| anyhow::anyhow!("could not write {}: {e}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| anyhow::anyhow!("could not write {}: {e}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "wrote mu-plugin");
        Ok(if existing.is_some() {
            InstallOutcome::Updated
        } else {
            InstallOutcome::Installed
        })
    }

    /// Remove the plugin file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be deleted.
    pub fn uninstall(&self) -> anyhow::Result<UninstallOutcome> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed mu-plugin");
                Ok(UninstallOutcome::Removed)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UninstallOutcome::NotInstalled),
            Err(e) => Err(anyhow::anyhow!(
                "could not remove {}: {e}",
                self.path.display()
            )),
        }
    }
}
