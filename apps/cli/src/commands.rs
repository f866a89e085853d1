//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use userdb_core::{MAX_PROGRESS, ProgressObserver, WriteSummary};
use userdb_shared::{AppConfig, OutputFormat, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Merge public DMR registries into one radio user database.
#[derive(Parser)]
#[command(
    name = "userdb",
    version,
    about = "Merge public DMR user registries into a database file for radio programming tools.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.userdb/userdb.toml.
    #[arg(long, global = true, env = "USERDB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output layout selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FormatArg {
    /// Length-prefixed file for md380tools.
    Md380tools,
    /// Plain file for the MD-2017 CPS.
    Md2017,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Md380tools => OutputFormat::Md380Tools,
            FormatArg::Md2017 => OutputFormat::Md2017,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch all registries and write the merged database.
    Write {
        /// Output file (overwritten if present).
        file: PathBuf,

        /// Output layout (defaults to the config file's `defaults.format`).
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Minimum line count accepted from each quoted CSV registry.
        #[arg(long)]
        min_quoted_lines: Option<usize>,
    },

    /// Write the length-prefixed md380tools layout.
    #[command(name = "md380tools")]
    Md380Tools {
        /// Output file (overwritten if present).
        file: PathBuf,
    },

    /// Write the plain MD-2017 layout.
    #[command(name = "md2017")]
    Md2017 {
        /// Output file (overwritten if present).
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "userdb=info",
        1 => "userdb=debug",
        _ => "userdb=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Write {
            file,
            format,
            min_quoted_lines,
        } => cmd_write(config_path, &file, format.map(Into::into), min_quoted_lines).await,
        Command::Md380Tools { file } => {
            cmd_write(config_path, &file, Some(OutputFormat::Md380Tools), None).await
        }
        Command::Md2017 { file } => {
            cmd_write(config_path, &file, Some(OutputFormat::Md2017), None).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load the config from `--config` or the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_write(
    config_path: Option<&Path>,
    file: &Path,
    format: Option<OutputFormat>,
    min_quoted_lines: Option<usize>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if let Some(min) = min_quoted_lines {
        config.sanity.min_quoted_lines = min;
    }
    let format = format.unwrap_or(config.defaults.format);

    info!(file = %file.display(), ?format, "building user database");

    let reporter = CliProgress::new();
    let result = userdb_core::write_users_file(file, format, &config, Some(&reporter)).await;
    reporter.finish();

    print_summary(&result?);
    Ok(())
}

fn print_summary(summary: &WriteSummary) {
    println!();
    println!("  User database written!");
    println!("  Path:   {}", summary.path.display());
    println!("  Format: {:?}", summary.format);
    println!("  Users:  {}", summary.user_count);
    println!("  Bytes:  {}", summary.bytes);
    println!("  Time:   {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar driven by the pipeline's progress observer.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(MAX_PROGRESS);
        let style = ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {percent:>3}% {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for CliProgress {
    fn report(&self, current: u64) -> bool {
        self.bar.set_position(current);
        true
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
