//! PST extraction through an external `readpst`-compatible tool

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info};

use crate::error::{Error, Result};

/// Default tool name, looked up on `PATH`
pub const DEFAULT_TOOL: &str = "readpst";

/// Runs the external tool that explodes a `.pst` archive into `.eml` files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PstExtractor {
    tool: PathBuf,
}

impl Default for PstExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl PstExtractor {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    #[must_use]
    pub fn tool(&self) -> &Path {
        &self.tool
    }

    /// Arguments passed to the tool: one `.eml` file per message (`-e`)
    /// written under `destination` (`-o`)
    #[must_use]
    pub fn arguments<'a>(pst: &'a Path, destination: &'a Path) -> [&'a std::ffi::OsStr; 4] {
        [
            "-e".as_ref(),
            pst.as_os_str(),
            "-o".as_ref(),
            destination.as_os_str(),
        ]
    }

    /// Convert `pst` into a tree of message files under `destination`
    pub fn extract(&self, pst: &Path, destination: &Path) -> Result<()> {
        if !pst.is_file() {
            error!("pst file path not found: {}", pst.display());
            return Err(Error::Extractor(format!(
                "pst file not found: {}",
                pst.display()
            )));
        }

        std::fs::create_dir_all(destination).map_err(|e| {
            Error::Extractor(format!("cannot create {}: {e}", destination.display()))
        })?;

        info!(
            "extracting {} into {} with {}",
            pst.display(),
            destination.display(),
            self.tool.display()
        );

        let status = Command::new(&self.tool)
            .args(Self::arguments(pst, destination))
            .status()
            .map_err(|e| Error::Extractor(format!("spawn {}: {e}", self.tool.display())))?;

        if !status.success() {
            error!("{} failed with status {status}", self.tool.display());
            return Err(Error::Extractor(format!(
                "{} failed with status {status}",
                self.tool.display()
            )));
        }

        Ok(())
    }
}
