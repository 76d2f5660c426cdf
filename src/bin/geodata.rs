use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use geodatasets::registry::{Registry, RegistryEntry};
use geodatasets::store::Store;
use geodatasets::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "geodata")]
#[command(about = "Fetch and cache open geophysical datasets")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download one registry file into the cache and print its path")]
    Fetch { name: String },
    #[command(about = "List the logical filenames and digests in the registry")]
    List {
        /// Emit the registry as JSON instead of one line per entry.
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Probe remote availability of one entry, or all of them")]
    Check { name: Option<String> },
    #[command(about = "Print the cache root directory")]
    Dir,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<ExitCode> {
    let cli = Cli::parse();
    let registry = Registry::builtin();

    match cli.command {
        Commands::Fetch { name } => {
            let store = Store::new(registry, HttpTransport::new()?)?;
            let (path, action) = store.fetch(&name)?;
            eprintln!("{name}: {action:?}");
            println!("{path}");
        }
        Commands::List { json } => {
            if json {
                let entries: BTreeMap<&str, &RegistryEntry> = registry
                    .names()
                    .map(|name| registry.lookup(name).map(|entry| (name, entry)))
                    .collect::<Result<_, _>>()?;
                println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
            } else {
                for name in registry.names() {
                    let entry = registry.lookup(name)?;
                    println!("{name} sha256:{}", entry.sha256);
                }
            }
        }
        Commands::Check { name } => {
            let transport = HttpTransport::new()?;
            let names: Vec<String> = match name {
                Some(name) => vec![name],
                None => registry.names().map(str::to_string).collect(),
            };
            let mut missing = false;
            for name in names {
                let available = registry.is_available(&name, &transport)?;
                println!("{name}: {}", if available { "available" } else { "MISSING" });
                missing |= !available;
            }
            if missing {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Dir => {
            let store = Store::new(registry, HttpTransport::new()?)?;
            println!("{}", store.cache_root());
        }
    }
    Ok(ExitCode::SUCCESS)
}
