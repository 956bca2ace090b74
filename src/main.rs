use clap::{Parser as ClapParser, Subcommand};
use insight_query::cli::{self, CliError, QueryOptions};
use insight_query::output::{to_json, to_json_pretty};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "insight")]
#[command(about = "Insight - query course section and room datasets with JSON queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query against dataset files
    Query {
        /// The query document (reads from stdin if not provided)
        query: Option<String>,

        /// Dataset file to load (repeatable)
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the datasets contained in dataset files
    Datasets {
        /// Dataset file to load (repeatable)
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'insight docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query {
            query,
            data,
            pretty,
        } => run_query(query, data, pretty),
        Commands::Datasets { data } => run_datasets(&data),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_query(query: Option<String>, data: Vec<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let query = match query {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = QueryOptions { query, data };
    let rows = cli::execute_query(&options)?;

    let json = if pretty {
        to_json_pretty(&rows)
    } else {
        to_json(&rows)
    };
    println!("{}", json);
    Ok(())
}

fn run_datasets(data: &[PathBuf]) -> Result<(), CliError> {
    let catalog = cli::load_catalog(data)?;
    for dataset in catalog.list_datasets() {
        println!("{}\t{}\t{}", dataset.id, dataset.kind, dataset.row_count);
    }
    Ok(())
}
