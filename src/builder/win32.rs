use crate::{
    builder::Builder,
    paths::{join_segments, normalize_separators},
    BuildConfig, BuildError, Module, ToolInvocation, ToolOutcome, ToolRunner,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

const PLUGIN_COMPILER: &str = "amxxpc.exe";
const PLUGIN_DIR: &str = "plugins";
const SCRIPT_EXTENSION: &str = ".sma";
const PROJECT_EXTENSION: &str = ".vcproj";
const LIBRARY_EXTENSION: &str = ".dll";

/// Builds with `amxxpc.exe`, a Visual Studio style build driver, and a zip-like archiver
#[derive(Debug)]
pub struct Win32Builder {
    config: Box<dyn BuildConfig>,
    runner: Box<dyn ToolRunner>,
    source_tree: String,
    compiler_path: PathBuf,
    separator: char,
}

impl Win32Builder {
    /// Like [`Builder::setup`], but writes every path with `separator` instead of the host's
    pub fn setup_with_separator(config: Box<dyn BuildConfig>, runner: Box<dyn ToolRunner>, separator: char) -> Self {
        let source_tree = absolute_tree(config.source_tree()).to_string_lossy().to_string();
        let compiler_path = PathBuf::from(normalize_separators(
            &join_segments(separator, [source_tree.as_str(), PLUGIN_DIR, PLUGIN_COMPILER]),
            separator,
        ));
        info!("Using plugin compiler {}", compiler_path.to_string_lossy());
        Self { config, runner, source_tree, compiler_path, separator }
    }

    pub fn compiler_path(&self) -> &Path {
        &self.compiler_path
    }

    /// The source tree, resolved against the current directory during setup
    pub fn source_tree(&self) -> &str {
        &self.source_tree
    }

    /// `<tree>/<sourcedir>`, followed by `/<bindir>` when the module has one
    pub fn module_dir(&self, module: &Module) -> PathBuf {
        PathBuf::from(normalize_separators(&self.raw_module_dir(module), self.separator))
    }

    fn raw_module_dir(&self, module: &Module) -> String {
        let mut dir = join_segments(self.separator, [self.source_tree(), module.sourcedir.as_str()]);
        if let Some(bindir) = &module.bindir {
            dir.push(self.separator);
            dir.push_str(bindir);
        }
        dir
    }

    /// Where the build driver leaves the library: `<module dir>/<build>/<projname>.dll`.
    ///
    /// A module without `bindir` gets an empty segment in its place,
    /// i.e. `<tree>/<sourcedir>//<build>/<projname>.dll`.
    pub fn artifact_path(&self, module: &Module) -> PathBuf {
        let mut dir = self.raw_module_dir(module);
        if module.bindir.is_none() {
            dir.push(self.separator);
        }
        let library = format!("{}{}", module.projname, LIBRARY_EXTENSION);
        let file = join_segments(self.separator, [dir.as_str(), module.build.as_str(), library.as_str()]);
        PathBuf::from(normalize_separators(&file, self.separator))
    }
}

/// Tools run with their own working directory, so a relative tree would no longer point at the compiler
fn absolute_tree(tree: &Path) -> PathBuf {
    if tree.is_absolute() {
        return tree.to_owned();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(tree),
        Err(e) => {
            warn!("Cannot resolve {} against the current directory: {}", tree.to_string_lossy(), e);
            tree.to_owned()
        },
    }
}

impl Builder for Win32Builder {
    fn setup(config: Box<dyn BuildConfig>, runner: Box<dyn ToolRunner>) -> Self {
        Self::setup_with_separator(config, runner, std::path::MAIN_SEPARATOR)
    }

    fn compile_plugin(&self, input: &str, extra_args: Option<&str>) -> Result<ToolOutcome, BuildError> {
        let working_dir =
            normalize_separators(&join_segments(self.separator, [self.source_tree(), PLUGIN_DIR]), self.separator);

        let mut args = format!("{input}{SCRIPT_EXTENSION}");
        if let Some(extra) = extra_args {
            args.push(' ');
            args.push_str(extra);
        }

        let outcome = self.runner.run(&ToolInvocation::new(&self.compiler_path, working_dir, args))?;
        if !outcome.success() {
            warn!("Plugin compiler exited with {:?} for {}, ignoring", outcome.exit_code(), input);
        }
        Ok(outcome)
    }

    fn build_module(&self, module: &Module) -> Result<ToolOutcome, BuildError> {
        let dir = self.module_dir(module);
        let file = self.artifact_path(module);

        if file.exists() {
            info!("Removing stale {}", file.to_string_lossy());
            fs::remove_file(&file).map_err(|e| BuildError::RemovingStaleArtifact { path: file.clone(), inner: e })?;
        }

        let args = format!("/build {} {}{}", module.build, module.vcproj, PROJECT_EXTENSION);
        let outcome = self
            .runner
            .run(&ToolInvocation::new(self.config.devenv_path(), dir, args))?
            .with_artifact_check(file);

        match outcome.artifact() {
            Some(path) => {
                if !outcome.success() {
                    warn!(
                        "Build driver exited with {:?} but {} exists, treating {} as built",
                        outcome.exit_code(),
                        path.to_string_lossy(),
                        module.projname
                    );
                }
                info!("Built {} in {:.2?}", path.to_string_lossy(), outcome.duration());
            },
            None => error!("Module {} produced no output", module.projname),
        }
        Ok(outcome)
    }

    fn compress_dir(&self, archive: &str, dir: &str) -> Result<ToolOutcome, BuildError> {
        let invocation =
            ToolInvocation::new(self.config.compress_path(), self.config.output_path(), format!("-r {archive} {dir}"));
        let outcome = self.runner.run(&invocation)?;
        if !outcome.success() {
            warn!("Archiver exited with {:?} for {}, ignoring", outcome.exit_code(), archive);
        }
        Ok(outcome)
    }

    fn library_extension(&self) -> &'static str {
        LIBRARY_EXTENSION
    }
}
