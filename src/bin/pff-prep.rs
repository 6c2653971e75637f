//! pff-prep - get a libpff checkout ready for a native MSVC build
//!
//! Usage:
//!   cd libpff-main
//!   pff-prep
//!   python setup.py build_ext --inplace

use anyhow::{Context, Result};
use clap::Parser;
use libpff_prep::{CollisionPolicy, HttpFetcher, Settings, config, output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pff-prep")]
#[command(about = "Download libpff dependencies and generate MSVC configuration headers")]
#[command(version)]
struct Cli {
    /// Project root (detected from setup.py if not given)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Settings file (defaults to <root>/pff-prep.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network timeout per download, in seconds
    #[arg(long, env = "PFF_PREP_HTTP_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// What to do when two archive members flatten to the same file name
    #[arg(long, value_enum)]
    collision: Option<CollisionPolicy>,
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PFF_PREP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether the tree is ready to build.
fn run(cli: Cli) -> Result<bool> {
    let root = match cli.root {
        Some(root) => root,
        None => find_root()?,
    };
    // Not canonicalized: on Windows that turns every reported path into `\\?\C:\...`.
    let root = std::path::absolute(&root)
        .with_context(|| format!("Failed to resolve project root: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Project root not found: {}", root.display());
    }

    let mut settings = match &cli.config {
        Some(path) => {
            let mut settings = Settings::new(&root);
            settings.apply_file(path)?;
            settings
        }
        None => Settings::load(&root)?,
    };
    if let Some(secs) = cli.timeout_secs {
        settings.set_timeout_secs(secs);
    }
    if let Some(policy) = cli.collision {
        settings.collision = policy;
    }

    output::action(&format!("pff-prep {} -- root: {}", env!("CARGO_PKG_VERSION"), root.display()));

    let summary = pipeline::run(&HttpFetcher::new(), &settings)?;

    let ready = summary.ready();
    if ready {
        output::success("Ready! Now run (in this same command prompt window):");
        output::detail("python setup.py build_ext --inplace");
        output::detail("or: pip install .");
    } else {
        output::error("Some files are still missing. See above.");
    }
    Ok(ready)
}

fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from));

    config::detect_root(exe_dir.as_deref(), &cwd).with_context(|| {
        format!(
            "No {} in {}. Run pff-prep from inside the libpff-main directory or pass --root.",
            config::ROOT_MARKER,
            cwd.display()
        )
    })
}
