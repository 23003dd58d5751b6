use std::path::{Path, PathBuf};

use crate::foundation::error::{WeaselError, WeaselResult};

/// Script used when none is named on the command line.
pub const DEFAULT_SCRIPT: &str = "default.sps";
/// Extension tried when a script name is given without one.
pub const SCRIPT_EXTENSION: &str = "sps";
/// Environment variable naming an extra script directory.
pub const SCRIPT_PATH_ENV: &str = "SPS_PATH";
/// System-wide script directory.
pub const SHARED_SCRIPT_DIR: &str = "/usr/local/share/spiceweasel";

/// Directories searched for a script name, in priority order.
#[derive(Clone, Debug, Default)]
pub struct ScriptSearch {
    dirs: Vec<PathBuf>,
}

impl ScriptSearch {
    /// Standard search: working directory, `scripts/`, the shared directory, `$SPS_PATH`, then the
    /// directory holding the running executable.
    pub fn standard() -> Self {
        let mut dirs = vec![
            PathBuf::new(),
            PathBuf::from("scripts"),
            PathBuf::from(SHARED_SCRIPT_DIR),
        ];
        if let Some(extra) = std::env::var_os(SCRIPT_PATH_ENV) {
            dirs.push(PathBuf::from(extra));
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        {
            dirs.push(exe_dir);
        }
        Self { dirs }
    }

    /// Search only `dirs`, in order.
    pub fn in_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Candidate paths for `name`, in the order they are tried.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let with_ext = format!("{name}.{SCRIPT_EXTENSION}");
        let mut out = Vec::with_capacity(self.dirs.len() * 2);
        for dir in &self.dirs {
            out.push(dir.join(name));
            if !name.ends_with(&format!(".{SCRIPT_EXTENSION}")) {
                out.push(dir.join(&with_ext));
            }
        }
        out
    }

    /// First existing candidate for `name`.
    pub fn locate(&self, name: &str) -> WeaselResult<PathBuf> {
        for path in self.candidates(name) {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "script located");
                return Ok(path);
            }
            tracing::debug!(path = %path.display(), "no script here");
        }
        Err(WeaselError::validation(format!(
            "could not find script {name}"
        )))
    }
}

/// Locate `name` using the standard search path.
pub fn locate_script(name: &str) -> WeaselResult<PathBuf> {
    ScriptSearch::standard().locate(name)
}

#[cfg(test)]
#[path = "../../tests/unit/script/locate.rs"]
mod tests;
