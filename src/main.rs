use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sfvcrc::hash::{
    Algorithm, ChecksumEngine, ChecksumOutcome, Console, EngineConfig, LogType, ScanEngine, VerifyEngine,
};

#[derive(Parser)]
#[command(name = "sfvcrc", version, about = "Create and verify SFV checksum manifests")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Manifest to verify (same as `sfvcrc verify <MANIFEST>`)
    manifest: Option<PathBuf>,

    /// Worker threads per file: 0 = all cores, 1 = serial scan
    #[arg(short, long, global = true, env = "SFVCRC_THREADS")]
    threads: Option<u32>,

    /// Only print final results, not a line per file
    #[arg(short = 'r', long, global = true)]
    results_only: bool,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write uppercase digests
    #[arg(long, global = true)]
    uppercase: bool,

    /// Print machine-readable JSON instead of result lines
    #[arg(long, global = true)]
    json: bool,

    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Check every file listed in an .sfv or .md5 manifest
    Verify { manifest: PathBuf },
    /// Create a manifest for a file or directory
    Create {
        path: PathBuf,
        /// Manifest path (default: the target with a .sfv/.md5 extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Digest to write (default: from the output extension, else crc32)
        #[arg(short, long)]
        algorithm: Option<Algorithm>,
    },
    /// Print the digest of each file
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long, default_value = "crc32")]
        algorithm: Algorithm,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "[Critical Error]".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    config.uppercase |= cli.uppercase;
    Ok(config)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let console = if cli.json {
        Console::silent()
    } else {
        Console::new(cli.results_only)
    };
    let start = Instant::now();

    let code = match &cli.command {
        Some(Command::Verify { manifest }) => verify(manifest, config, console, cli.json)?,
        Some(Command::Create { path, output, algorithm }) => {
            create(path, output.clone(), *algorithm, config, console, cli.json)?
        }
        Some(Command::Hash { files, algorithm }) => hash(files, *algorithm, config, console, cli.json)?,
        None => match &cli.manifest {
            Some(manifest) if is_manifest(manifest) => verify(manifest, config, console, cli.json)?,
            Some(other) => bail!(
                "Can't find manifest : {} (expected an existing .sfv or .md5 file)",
                other.display()
            ),
            None => {
                Cli::command().print_help()?;
                return Ok(ExitCode::SUCCESS);
            }
        },
    };

    if !cli.json {
        let elapsed = start.elapsed();
        println!(
            "[Finished] Time taken: {:.3} seconds ({} milliseconds)",
            elapsed.as_secs_f64(),
            elapsed.as_millis()
        );
    }
    Ok(code)
}

fn is_manifest(path: &Path) -> bool {
    let known_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("sfv") || ext.eq_ignore_ascii_case("md5"))
        .unwrap_or(false);
    known_extension && path.is_file()
}

fn verify(manifest: &Path, config: EngineConfig, console: Console, json: bool) -> Result<ExitCode> {
    let report = VerifyEngine::new(config)
        .with_console(console)
        .with_progress(true)
        .verify(manifest)
        .with_context(|| format!("verifying {}", manifest.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn create(
    path: &Path,
    output: Option<PathBuf>,
    algorithm: Option<Algorithm>,
    config: EngineConfig,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    let mut engine = ScanEngine::new(config);
    if let Some(algorithm) = algorithm {
        engine = engine.with_algorithm(algorithm);
    }
    let report = engine
        .with_console(console)
        .with_output(output)
        .with_progress(true)
        .scan(path)
        .with_context(|| format!("creating manifest for {}", path.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        console.log(
            LogType::Completed,
            &format!(
                "{} files, {} checksummed",
                report.files_processed,
                humansize::format_size(report.total_bytes, humansize::BINARY)
            ),
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn hash(
    files: &[PathBuf],
    algorithm: Algorithm,
    config: EngineConfig,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    let lowercase = !config.uppercase;
    let engine = ChecksumEngine::with_algorithm(config, algorithm)?;
    let outcomes = engine.checksum_files(files);
    let failed = outcomes.iter().any(ChecksumOutcome::is_failed);

    if json {
        // Failures stay in the array as {path, error, message} records
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            match outcome {
                ChecksumOutcome::Computed(result) => {
                    println!("{}  {}", result.digest.clone().with_case(lowercase), result.path.display())
                }
                ChecksumOutcome::Failed { path, message, .. } => {
                    console.log(LogType::Error, &format!("{}: {}", path.display(), message))
                }
            }
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
