use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stubjar::{canonical_class, Config, StubJar};

#[derive(Parser)]
#[command(name = "stubjar")]
#[command(about = "Deterministic ABI stubs for JVM class files")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stub every class of a jar or class directory
    Stub {
        /// Input jar, zip or directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output jar (if it ends in .jar) or directory
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Stub classes one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Print the filtered, ordered model of one class file as JSON
    Dump {
        #[arg(value_name = "CLASS_FILE")]
        class_file: PathBuf,
    },

    /// Print a digest of the stubs of a jar or directory
    Hash {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match &cli.command {
        Commands::Stub { input, output, sequential } => stub(input, output, *sequential),
        Commands::Dump { class_file } => dump(class_file),
        Commands::Hash { input } => hash(input),
    }
}

fn stub(input: &Path, output: &Path, sequential: bool) -> Result<()> {
    let config = Config::default().with_parallelism(!sequential);
    let report = StubJar::new(input)
        .run(&config)
        .with_context(|| format!("cannot stub {}", input.display()))?;

    if output.extension().is_some_and(|ext| ext == "jar") {
        report.write_jar(output)?;
    } else {
        report.write_dir(output)?;
    }

    if !report.is_success() {
        for (name, err) in &report.failures {
            eprintln!("error: {}: {}", name, err);
        }
        bail!("{} classes could not be stubbed", report.failures.len());
    }
    Ok(())
}

fn dump(class_file: &Path) -> Result<()> {
    let bytes = fs::read(class_file).with_context(|| format!("cannot read {}", class_file.display()))?;
    match canonical_class(&bytes)? {
        Some(class) => println!("{}", serde_json::to_string_pretty(&class)?),
        None => log::info!("{} is local or anonymous and has no stub", class_file.display()),
    }
    Ok(())
}

fn hash(input: &Path) -> Result<()> {
    let report = StubJar::new(input).run(&Config::default())?;
    if !report.is_success() {
        bail!("{} classes could not be stubbed", report.failures.len());
    }
    println!("{}  {}", report.digest(), input.display());
    Ok(())
}
