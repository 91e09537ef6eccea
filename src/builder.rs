use crate::{BuildConfig, BuildError, Module, ToolOutcome, ToolRunner};
use std::fmt::Debug;

pub mod win32;

/// Platform-specific release build steps.
///
/// A builder only exists once `setup` resolved everything it caches, so the
/// other operations can be called any number of times, in any order.
/// Every external tool is waited on before the call returns.
pub trait Builder: Debug {
    /// Resolve the plugin compiler from `config` and return a ready builder
    fn setup(config: Box<dyn BuildConfig>, runner: Box<dyn ToolRunner>) -> Self
    where
        Self: Sized;

    /// Compile the plugin script `input` (without its suffix), passing `extra_args` verbatim.
    ///
    /// The compiler's exit code is not checked, the returned outcome carries it for callers who care.
    fn compile_plugin(&self, input: &str, extra_args: Option<&str>) -> Result<ToolOutcome, BuildError>;

    /// Build a native module with the build driver.
    ///
    /// Success is decided only by the library file existing once the driver exits,
    /// see [`ToolOutcome::artifact`]. Any stale library is deleted first.
    fn build_module(&self, module: &Module) -> Result<ToolOutcome, BuildError>;

    /// Recursively add `dir` to `archive`, both relative to the output directory.
    ///
    /// Like `compile_plugin`, the archiver's exit code is not checked.
    fn compress_dir(&self, archive: &str, dir: &str) -> Result<ToolOutcome, BuildError>;

    /// Filename suffix of native libraries on this platform, dot included
    fn library_extension(&self) -> &'static str;
}
