mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{fmt, EnvFilter};

use kinship_core::{open_store, Config, Person, PersonDraft, PersonId, PersonRegistry};

#[derive(Parser)]
#[command(name = "kinship")]
#[command(about = "Genealogical graph service", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create a person; without a name a placeholder is created
    Add {
        name: Vec<String>,
    },
    /// List all named persons
    List,
    /// Show one person with parents and children
    Show {
        id: String,
    },
    /// Make PARENT a parent of CHILD
    Link {
        parent: String,
        child: String,
    },
    /// Remove the parent relation between PARENT and CHILD
    Unlink {
        parent: String,
        child: String,
    },
    /// Print a person's genealogical subtree
    Tree {
        id: String,
    },
    /// Recompute the generation order of every person
    Reorder,
    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => Config::load().wrap_err("failed to load configuration")?,
    };
    init_logging(cli.verbose, &config.logging.filter);

    if matches!(cli.command, Commands::Config) {
        print!("{}", Config::default_config_string());
        return Ok(());
    }

    let store = open_store(&config.storage)
        .await
        .wrap_err("failed to open record store")?;
    let registry = Arc::new(PersonRegistry::new(store, config.guard));

    match cli.command {
        Commands::Serve { port } => {
            let mut server = config.server.clone();
            if let Some(port) = port {
                server.port = port;
            }
            serve::start_server(registry, &server).await?;
        }
        Commands::Add { name } => {
            let draft = if name.is_empty() {
                PersonDraft::default()
            } else {
                PersonDraft::named(name.join(" "))
            };
            let person = registry.create(draft).await?;
            println!("Created person {}", person.id);
        }
        Commands::List => {
            let persons = registry.list_all().await?;
            if persons.is_empty() {
                println!("No persons found. Use 'kinship add <name>' to create one.");
            }
            for person in &persons {
                print_summary(person);
            }
        }
        Commands::Show { id } => {
            let id = PersonId::parse(&id)?;
            let person = registry.get(&id).await?;
            print_summary(&person);
            println!("  Parents:");
            for parent in registry.parents(&id).await? {
                print!("    ");
                print_summary(&parent);
            }
            println!("  Children:");
            for child in registry.children(&id).await? {
                print!("    ");
                print_summary(&child);
            }
        }
        Commands::Link { parent, child } => {
            let parent = PersonId::parse(&parent)?;
            let child = PersonId::parse(&child)?;
            let report = registry.add_edge(&parent, &child).await?;
            println!("{} is now a parent of {} ({} generations)", parent, child, report.layers);
        }
        Commands::Unlink { parent, child } => {
            let parent = PersonId::parse(&parent)?;
            let child = PersonId::parse(&child)?;
            registry.remove_edge(&parent, &child).await?;
            println!("{} is no longer a parent of {}", parent, child);
        }
        Commands::Tree { id } => {
            let id = PersonId::parse(&id)?;
            let mut tree = registry.subtree(&id).await?;
            tree.sort_by(|a, b| b.order.cmp(&a.order).then(a.id.cmp(&b.id)));
            for person in &tree {
                print_summary(person);
            }
        }
        Commands::Reorder => {
            let report = registry.reorder().await?;
            println!(
                "Order recomputed: {} generations, {} writes",
                report.layers, report.writes
            );
        }
        // printed before the store is opened
        Commands::Config => {}
    }

    Ok(())
}

fn print_summary(person: &Person) {
    println!(
        "{}  {:<24}  order {}",
        person.id,
        person.name.as_deref().unwrap_or("(unnamed)"),
        person.order
    );
}

/// Installs the tracing subscriber.
///
/// `-v` flags win over `RUST_LOG`, which wins over the configured filter.
fn init_logging(verbose: u8, configured: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
        1 => EnvFilter::new("kinship=debug,kinship_core=debug,tower_http=debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
