use std::{
    ffi::OsString,
    fmt::Debug,
    path::{Path, PathBuf},
};

/// Tool locations and directories for one release run
pub trait BuildConfig: Debug {
    /// Root of all module and plugin sources
    fn source_tree(&self) -> &Path;
    /// Directory the distribution archives are written to
    fn output_path(&self) -> &Path;
    /// Archiver executable
    fn compress_path(&self) -> &Path;
    /// IDE/build driver executable
    fn devenv_path(&self) -> &Path;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    source_tree: PathBuf,
    output_path: PathBuf,
    compress_path: PathBuf,
    devenv_path: PathBuf,
}

impl ReleaseConfig {
    /// Tool paths left as `None` come from `AMXX_COMPRESS` and `DEVENV`,
    /// or default to `zip` and `devenv.com` on the `PATH`.
    pub fn new(
        source_tree: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        compress_path: Option<PathBuf>,
        devenv_path: Option<PathBuf>,
    ) -> Self {
        Self {
            source_tree: source_tree.into(),
            output_path: output_path.into(),
            compress_path: compress_path.unwrap_or_else(|| tool_from_env("AMXX_COMPRESS", "zip")),
            devenv_path: devenv_path.unwrap_or_else(|| tool_from_env("DEVENV", "devenv.com")),
        }
    }
}

fn tool_from_env(var: &str, default: &str) -> PathBuf {
    let path = if let Some(path) = std::env::var_os(var) {
        path
    } else {
        OsString::from(default)
    };
    PathBuf::from(path)
}

impl BuildConfig for ReleaseConfig {
    fn source_tree(&self) -> &Path {
        &self.source_tree
    }

    fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn compress_path(&self) -> &Path {
        &self.compress_path
    }

    fn devenv_path(&self) -> &Path {
        &self.devenv_path
    }
}
