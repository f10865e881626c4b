mod cli;
mod config;
mod error;
mod logging;
mod normalize;
mod registry;
mod replay;
mod resolve;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use cli::batch::{BatchArgs, InputFormat, OutputFormat};
use cli::EngineOptions;
use config::Config;

#[derive(Parser)]
#[command(name = "gpumatch")]
#[command(about = "Resolve secondhand GPU listing titles to canonical hardware models")]
#[command(version)]
struct Cli {
    /// Registry JSON to use instead of the cached or embedded one
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Minimum fuzzy score (0-100) for a fuzzy match to be accepted
    #[arg(long, global = true)]
    min_confidence_score: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more titles
    Resolve {
        /// Listing titles
        #[arg(required = true)]
        titles: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve every title in a CSV, JSONL or plain-text file
    Batch {
        /// Input file, or `-` for stdin
        input: PathBuf,
        /// Input format
        #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
        format: InputFormat,
        /// Column (CSV) or field (JSONL) holding the title
        #[arg(long)]
        title_column: Option<String>,
        /// Write results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
        output_format: OutputFormat,
        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// List registry models, exclusion keywords or pattern rules
    List {
        #[command(subcommand)]
        what: ListCommands,
    },
    /// Re-run the false-positive replay set and fail on any regression
    Replay {
        /// Replay fixture (defaults to the bundled set)
        fixture: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the fetched registry cache
    Registry {
        #[command(subcommand)]
        action: RegistryCommands,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// List canonical models and their display variants
    Models {
        /// Only models whose ID or variants contain this text
        filter: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List exclusion keywords
    Exclusions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pattern rules in evaluation order
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RegistryCommands {
    /// Download the registry and store it in the cache
    Update {
        /// Registry URL (defaults to [registry] url in config.toml)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show where the registry comes from and how old the cache is
    Status,
    /// Delete the cached registry
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    let options = EngineOptions {
        registry: cli.registry,
        min_confidence_score: cli.min_confidence_score,
    };

    match cli.command {
        Commands::Resolve { titles, json } => {
            let resolver = cli::build_resolver(&config, &options)?;
            cli::resolve::titles(&resolver, &titles, json)?;
        }
        Commands::Batch {
            input,
            format,
            title_column,
            output,
            output_format,
            jobs,
        } => {
            let resolver = cli::build_resolver(&config, &options)?;
            let args = BatchArgs {
                input,
                format,
                title_column: title_column.unwrap_or_else(|| config.batch.title_column.clone()),
                output,
                output_format,
                jobs: jobs.unwrap_or(config.batch.jobs),
            };
            cli::batch::run(&resolver, &args)?;
        }
        Commands::List { what } => match what {
            ListCommands::Models { filter, json } => {
                let resolver = cli::build_resolver(&config, &options)?;
                cli::list::models(resolver.registry(), filter.as_deref(), json)?;
            }
            ListCommands::Exclusions { json } => {
                let resolver = cli::build_resolver(&config, &options)?;
                cli::list::exclusions(resolver.registry(), json)?;
            }
            ListCommands::Rules { json } => {
                let resolver = cli::build_resolver(&config, &options)?;
                cli::list::rules(&resolver, json)?;
            }
        },
        Commands::Replay { fixture, json } => {
            let resolver = cli::build_resolver(&config, &options)?;
            cli::replay::run(&resolver, fixture.as_deref(), json)?;
        }
        Commands::Registry { action } => match action {
            RegistryCommands::Update { url } => cli::registry::update(&config, url.as_deref())?,
            RegistryCommands::Status => cli::registry::status(&config)?,
            RegistryCommands::Clear => cli::registry::clear()?,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "gpumatch", &mut std::io::stdout());
        }
    }

    Ok(())
}
