use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use coexgraph_cli::commands::{self, ExportFormat, ExportOptions, GraphOptions};
use coexgraph_common::context::SessionContext;
use coexgraph_common::entities::GeneId;
use coexgraph_common::settings::{CoexSettings, CONFIG_ENV_VAR};
use coexgraph_search::http::HttpSearchService;
use coexgraph_search::service::InMemorySearchService;
use coexgraph_store::gene_sets::GeneSetStore;
use coexgraph_store::kv::JsonFileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Explore gene coexpression networks", long_about = None)]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<String>,

    /// User whose saved gene sets are used
    #[arg(long, global = true, env = "COEXGRAPH_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct GraphArgs {
    /// Query gene ids
    #[arg(long, value_delimiter = ',')]
    genes: Vec<GeneId>,

    /// Take the query genes from a saved set
    #[arg(long, conflicts_with = "genes")]
    set: Option<String>,

    /// Minimum support for a link to be shown
    #[arg(long, default_value_t = 2)]
    stringency: u32,

    /// Only show links among the query genes
    #[arg(long)]
    query_genes_only: bool,

    /// Extend the graph with these genes, one search each
    #[arg(long, value_delimiter = ',')]
    extend: Vec<GeneId>,

    /// Drop the oldest query genes when an extension exceeds the cap
    #[arg(long)]
    truncate: bool,

    /// Highlight these genes
    #[arg(long, value_delimiter = ',')]
    overlay: Vec<GeneId>,

    /// Uniform node color instead of specificity shading
    #[arg(long)]
    plain: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search a coexpression server and draw the graph
    Search {
        #[command(flatten)]
        graph: GraphArgs,

        /// Server base URL, overriding the settings file
        #[arg(long)]
        base_url: Option<String>,

        /// Save the loaded results as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Browse previously saved search results offline
    Filter {
        /// Results JSON written by `search --save`
        #[arg(long)]
        results: PathBuf,

        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Write saved results as a tab-separated table or GraphML
    Export {
        #[arg(long)]
        results: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::Tsv)]
        format: ExportFormat,

        /// Keep only links with at least this support
        #[arg(long)]
        stringency: Option<u32>,

        #[arg(long)]
        query_genes_only: bool,

        /// Output file, stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the `#` comment block
        #[arg(long)]
        no_preamble: bool,
    },
    /// Manage saved gene sets
    Sets {
        #[command(subcommand)]
        action: SetsAction,
    },
    /// Print the effective settings as TOML
    Config,
}

#[derive(Subcommand)]
enum SetsAction {
    List,
    Save {
        name: String,
        #[arg(long, value_delimiter = ',', required = true)]
        genes: Vec<GeneId>,
        #[arg(long)]
        description: Option<String>,
    },
    Show {
        name: String,
    },
    Remove {
        name: String,
    },
}

fn load_settings(path: Option<&str>) -> CoexSettings {
    let loaded = match path {
        Some(p) => CoexSettings::from_path(p),
        None => CoexSettings::load(),
    };
    match loaded {
        Ok(settings) => {
            info!("Settings loaded");
            settings
        }
        Err(e) => {
            warn!("Could not load settings: {e}");
            warn!("Using built-in defaults.");
            CoexSettings::default()
        }
    }
}

fn graph_options(args: &GraphArgs, genes: Vec<GeneId>) -> GraphOptions {
    GraphOptions {
        genes,
        stringency: args.stringency,
        query_genes_only: args.query_genes_only,
        extend: args.extend.clone(),
        truncate: args.truncate,
        overlay: args.overlay.clone(),
        plain: args.plain,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coexgraph=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref());

    let mut ctx = SessionContext::new(settings.clone());
    if let Some(user) = &cli.user {
        ctx = ctx.with_user(user.clone());
    }
    let store = GeneSetStore::new(Arc::new(JsonFileStore::new(&settings.store.path)));

    match cli.command {
        Command::Search { graph, base_url, save } => {
            if let Some(url) = base_url {
                settings.search.base_url = url;
            }
            let genes = commands::resolve_genes(&store, &ctx, graph.genes.clone(), graph.set.as_deref()).await?;
            let service = Arc::new(HttpSearchService::new(&settings.search)?);
            info!(url = service.url(), "Searching");
            let session = commands::run_graph(&settings, service, &graph_options(&graph, genes)).await?;
            print!("{}", session.output);
            if let (Some(path), Some(response)) = (save, session.engine.last_response()) {
                tokio::fs::write(&path, serde_json::to_string_pretty(response)?).await?;
                info!(path = %path.display(), "Results saved");
            }
        }
        Command::Filter { results, graph } => {
            let response = commands::read_response(&results).await?;
            let genes = match graph.set.as_deref() {
                Some(_) => commands::resolve_genes(&store, &ctx, Vec::new(), graph.set.as_deref()).await?,
                None if graph.genes.is_empty() => response.query_genes.iter().map(|g| g.id).collect(),
                None => graph.genes.clone(),
            };
            let service = Arc::new(InMemorySearchService::from_response(&response));
            let session = commands::run_graph(&settings, service, &graph_options(&graph, genes)).await?;
            print!("{}", session.output);
        }
        Command::Export { results, format, stringency, query_genes_only, output, no_preamble } => {
            let response = commands::read_response(&results).await?;
            let opts = ExportOptions { stringency, query_genes_only, preamble: !no_preamble, format };
            let text = commands::export(&settings, &response, &opts)?;
            match output {
                Some(path) => tokio::fs::write(&path, text).await?,
                None => print!("{text}"),
            }
        }
        Command::Sets { action } => match action {
            SetsAction::List => print!("{}", commands::sets_list(&store, &ctx).await?),
            SetsAction::Save { name, genes, description } => {
                let set = store.save(&ctx, &name, &genes, description.as_deref()).await?;
                println!("Saved {} ({} genes)", set.name, set.gene_ids.len());
            }
            SetsAction::Show { name } => print!("{}", commands::sets_show(&store, &ctx, &name).await?),
            SetsAction::Remove { name } => {
                if store.remove(&ctx, &name).await? {
                    println!("Removed {name}");
                } else {
                    println!("No gene set named {name:?}");
                }
            }
        },
        Command::Config => print!("{}", settings.to_toml()?),
    }

    Ok(())
}
