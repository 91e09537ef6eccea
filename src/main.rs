use amxx_release::{BuildError, Builder, Module, ReleaseConfig, SystemRunner, ToolOutcome, Win32Builder};
use std::{error::Error, path::PathBuf};
use structopt::StructOpt;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt::time::UtcTime};

#[derive(StructOpt, Debug)]
#[structopt(name = "amxx-release")]
struct Opt {
    /// Root of the plugin and module sources
    #[structopt(long, parse(from_os_str), default_value = ".")]
    source_tree: PathBuf,

    /// Directory the release archives are written to
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    output: PathBuf,

    /// Archiver executable (defaults to $AMXX_COMPRESS, then `zip`)
    #[structopt(long, parse(from_os_str))]
    compress: Option<PathBuf>,

    /// Build driver executable (defaults to $DEVENV, then `devenv.com`)
    #[structopt(long, parse(from_os_str))]
    devenv: Option<PathBuf>,

    /// Fail when the plugin compiler or archiver exits with an error
    #[structopt(long)]
    strict: bool,

    /// Print verbose information
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug)]
enum Cmd {
    /// Compile a plugin script, given without its .sma suffix
    Plugin {
        input: String,
        /// Extra arguments passed verbatim to the compiler
        #[structopt(long, allow_hyphen_values = true)]
        args: Option<String>,
    },
    /// Build a native module with the build driver
    Module {
        #[structopt(long)]
        sourcedir: String,
        #[structopt(long)]
        bindir: Option<String>,
        #[structopt(long, default_value = "Release")]
        build: String,
        #[structopt(long)]
        projname: String,
        #[structopt(long)]
        vcproj: String,
    },
    /// Recursively add a directory of the output path to an archive
    Compress { archive: String, dir: String },
    /// Print the native library extension
    Libext,
}

fn main() {
    let opt = Opt::from_args();
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(Directive::from(if opt.verbose { Level::INFO } else { Level::WARN }))
        .from_env_lossy();

    let time_format = time::format_description::parse("[hour]:[minute]:[second]").unwrap();
    tracing_subscriber::fmt()
        .with_timer(UtcTime::new(time_format))
        .with_env_filter(filter)
        .init();

    if let Err(e) = err_main(opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn err_main(opt: Opt) -> Result<(), Box<dyn Error>> {
    let config = ReleaseConfig::new(opt.source_tree, opt.output, opt.compress, opt.devenv);
    let builder = Win32Builder::setup(Box::new(config), Box::new(SystemRunner));

    match opt.cmd {
        Cmd::Plugin { input, args } => {
            let outcome = builder.compile_plugin(&input, args.as_deref())?;
            checked(outcome, opt.strict, "Failed to compile plugin")?;
        },
        Cmd::Module { sourcedir, bindir, build, projname, vcproj } => {
            let mut module = Module::new(sourcedir, build, projname, vcproj);
            module.bindir = bindir;
            let artifact = builder.build_module(&module)?.ensure_artifact(&module.projname)?;
            println!("{}", artifact.to_string_lossy());
        },
        Cmd::Compress { archive, dir } => {
            let outcome = builder.compress_dir(&archive, &dir)?;
            checked(outcome, opt.strict, "Failed to compress directory")?;
        },
        Cmd::Libext => println!("{}", builder.library_extension()),
    }

    Ok(())
}

fn checked(outcome: ToolOutcome, strict: bool, reason: &str) -> Result<ToolOutcome, BuildError> {
    info!("`{}` took {:.2?}", outcome.invocation, outcome.duration());
    if strict {
        outcome.ensure_success(reason)
    } else {
        Ok(outcome)
    }
}
