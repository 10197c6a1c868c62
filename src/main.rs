mod commands;

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catmap")]
#[command(about = "Map one retailer's category tree onto another's using semantic embeddings", long_about = None)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source category tree (JSON) to map onto the target tree
    source: Option<PathBuf>,

    #[arg(long, help = "Where to write the mapping (default: category_mapping.json)")]
    output: Option<PathBuf>,

    #[arg(long, help = "Minimum score a match must exceed (default: 0.5)")]
    threshold: Option<f32>,

    #[command(flatten)]
    run: RunArgs,
}

/// Options shared by every command that touches the target cache
#[derive(Args)]
pub struct RunArgs {
    #[arg(long, help = "Config file (default: ./catmap.json if present)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Target category tree (JSON)")]
    pub target: Option<PathBuf>,

    #[arg(long, help = "Embedding cache file")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Rebuild the embedding cache even if it exists")]
    pub rebuild: bool,

    #[arg(short, long, help = "Verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the best target categories for a query
    Rank {
        /// Category name or path to look up
        query: String,
        #[arg(short = 'k', long, help = "Number of results (default: 5)")]
        top_k: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the flattened paths of a category tree
    Flatten {
        /// Category tree (JSON)
        tree: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Write a catmap.json with default settings
    Init {
        #[arg(long, help = "Overwrite an existing catmap.json")]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Some(Commands::Rank { run, .. }) => run.verbose,
        Some(_) => false,
        None => cli.run.verbose,
    };
    init_logging(verbose);

    run(cli)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => match cli.source {
            Some(source) => commands::map::run(&source, &cli.run, cli.output, cli.threshold),
            None => {
                eprintln!("{}", Cli::command().render_usage());
                Err(category_mapper::Error::Usage(
                    "missing <SOURCE> category tree file".to_string(),
                )
                .into())
            }
        },
        Some(Commands::Rank {
            query,
            top_k,
            json,
            run,
        }) => commands::rank::run(&query, top_k, json, &run),
        Some(Commands::Flatten { tree, json }) => commands::flatten::run(&tree, json),
        Some(Commands::Init { force }) => commands::init::run(force),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "category_mapper=debug,catmap=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
