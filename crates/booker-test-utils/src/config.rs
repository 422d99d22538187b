use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Directories a harness run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPaths {
    pub data_dir: PathBuf,
    pub features_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for RunPaths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            features_dir: PathBuf::from("tests/bdd/features"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl RunPaths {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup("BOOKER_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            features_dir: lookup("BOOKER_FEATURES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_dir),
            reports_dir: lookup("BOOKER_REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
        }
    }

    /// Make sure the reports directory exists, removing earlier report files
    /// unless `keep` is set. Anything that is not a report is left in place.
    pub fn prepare_reports_dir(&self, keep: bool) -> io::Result<()> {
        fs::create_dir_all(&self.reports_dir)?;
        if keep {
            return Ok(());
        }

        info!("Cleaning reports folder {}", self.reports_dir.display());
        for entry in fs::read_dir(&self.reports_dir)? {
            let path = entry?.path();
            if path.is_file() && is_report_file(&path) {
                debug!("Removing old report {}", path.display());
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// `<suite>_<stamp>_report.txt` or `.json`, as written by the runner
fn is_report_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_report.txt") || name.ends_with("_report.json"))
}
