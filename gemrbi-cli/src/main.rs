//! gemrbi command line
//!
//! Compiles package images into RBI interface files for the type checker
//! version a project runs.

mod lockfile;
mod writer;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gemrbi::{Compiler, CompilerConfig, PackageImage, VersionIdentifier};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "gemrbi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a gemrbi.toml configuration file
    #[arg(short, long, global = true, env = "GEMRBI_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate RBI files for the given package images
    Gem {
        /// Package image JSON files
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Type checker version to target
        #[arg(long, value_name = "VERSION", conflicts_with = "lockfile")]
        runtime_version: Option<String>,

        /// Lockfile to read the type checker version from
        #[arg(long, value_name = "PATH", default_value = "Gemfile.lock")]
        lockfile: PathBuf,

        /// Directory the RBI files are written to
        #[arg(long, value_name = "DIR", default_value = "sorbet/rbi/gems")]
        outdir: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "gemrbi=debug" } else { "gemrbi=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match &cli.config {
        Some(path) => CompilerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => CompilerConfig::default(),
    }
    .with_env_overrides();

    match cli.command {
        Commands::Gem {
            images,
            runtime_version,
            lockfile,
            outdir,
        } => {
            let version = resolve_version(runtime_version.as_deref(), &lockfile)?;
            run_gem(config, &images, &version, &outdir)
        }
    }
}

fn resolve_version(explicit: Option<&str>, lockfile: &Path) -> Result<VersionIdentifier> {
    if let Some(raw) = explicit {
        return Ok(raw.parse()?);
    }
    let content = fs::read_to_string(lockfile)
        .with_context(|| format!("Failed to read lockfile {}", lockfile.display()))?;
    match lockfile::runtime_version_from_lockfile(&content) {
        Some(version) => Ok(version),
        None => bail!(
            "No {} entry in {}; pass --runtime-version",
            lockfile::CHECKER_GEMS.join(" or "),
            lockfile.display()
        ),
    }
}

fn load_image(path: &Path) -> Result<PackageImage> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    PackageImage::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse package image {}", path.display()))
}

fn run_gem(
    config: CompilerConfig,
    paths: &[PathBuf],
    version: &VersionIdentifier,
    outdir: &Path,
) -> Result<ExitCode> {
    let mut failed = false;
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match load_image(path) {
            Ok(image) => images.push(image),
            Err(e) => {
                eprintln!("error {}: {:#}", path.display(), e);
                failed = true;
            }
        }
    }

    let compiler = Compiler::new(config);
    info!("Targeting type checker {}", version);
    debug!(
        "Capabilities: {:?}",
        compiler.capabilities_for(version).iter().collect::<Vec<_>>()
    );

    for (image, result) in images.iter().zip(compiler.compile_batch(&images, version)) {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                eprintln!("error {}: {}", image.name, e);
                failed = true;
                continue;
            }
        };
        println!("Compiled {}", image.name);
        match writer::write_interface(outdir, &file) {
            Ok((status, path)) => {
                if let Some(line) = writer::status_line(status, &path) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                eprintln!("error {}: {:#}", image.name, e);
                failed = true;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
