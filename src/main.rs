//! CLI entry point for `bouncelog`.
//!
//! Meant to be installed as a mail-transport pipe command: the bounce arrives
//! on stdin, and a record is appended to the hourly log when it carries any
//! delivery information. Only a failed read or a failed log write exits
//! non-zero.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};

use bouncelog::config::{self, Config};
use bouncelog::error::BounceError;
use bouncelog::process::{process_message, Destination, Outcome};

#[derive(Parser)]
#[command(name = "bouncelog", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read the message from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Configuration file (falls back to defaults if unusable)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the hourly bounce logs
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Print the record to stdout instead of logging it
    #[arg(long)]
    print: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        return cmd_generate(command);
    }

    let loaded = config::load_config(cli.config.as_deref());
    let mut config = loaded.config.clone();
    if let Some(dir) = cli.log_dir {
        config.sink.log_dir = Some(dir);
    }

    setup_logging(cli.verbose, &config);
    loaded.log_outcome();

    let destination = if cli.print {
        Destination::Print
    } else {
        Destination::Log
    };
    cmd_process(cli.input.as_deref(), destination, &config)
}

/// Diagnostics go to stderr and, when the cache directory is usable, to
/// `<cache dir>/bouncelog.log`. `RUST_LOG` overrides `-v`, which overrides
/// `general.log_level`.
fn setup_logging(verbose: u8, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let cache_dir = config::cache_dir(config);
    let file_layer = std::fs::create_dir_all(&cache_dir).is_ok().then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::never(&cache_dir, "bouncelog.log"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

/// Write shell completions or the man page to stdout.
fn cmd_generate(command: Commands) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let mut stdout = std::io::stdout();
    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut cmd, "bouncelog", &mut stdout);
        }
        Commands::Manpage => clap_mangen::Man::new(cmd).render(&mut stdout)?,
    }
    Ok(())
}

/// Read one message from `input` (stdin when `None`) and route its report.
fn cmd_process(
    input: Option<&Path>,
    destination: Destination,
    config: &Config,
) -> anyhow::Result<()> {
    let received = Local::now();
    let outcome = match input {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| BounceError::io(path, e))?;
            process_message(
                &mut BufReader::new(file),
                path,
                config,
                destination,
                received,
            )?
        }
        None => process_message(
            &mut std::io::stdin().lock(),
            Path::new("<stdin>"),
            config,
            destination,
            received,
        )?,
    };

    if let Outcome::Printed(line) = outcome {
        println!("{line}");
    }
    Ok(())
}
