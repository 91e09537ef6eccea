mod build_config;
mod build_error;
mod builder;
mod module;
mod paths;
mod tool;

pub use crate::{
    build_config::{BuildConfig, ReleaseConfig},
    build_error::BuildError,
    builder::{win32::Win32Builder, Builder},
    module::Module,
    paths::{join_segments, normalize_separators},
    tool::{ArtifactCheck, SystemRunner, ToolInvocation, ToolOutcome, ToolRunner},
};
