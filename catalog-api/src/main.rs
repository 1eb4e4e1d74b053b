use anyhow::{Context, Result};
use catalog_api::{config::ApiConfig, create_app, pool::StorePool, store::MemoryConnector};
use clap::{Parser, Subcommand};
use filter_query::FilterCompiler;
use poem::{listener::TcpListener, Server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "catalog-api")]
#[command(about = "Paginated, filterable document catalog API")]
struct Cli {
    /// Environment file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Compile a filter string and print the resulting predicate
    Compile {
        filter: String,
        /// Accept `field_op_value_and|or_op2_value2` expressions
        #[arg(long)]
        joined: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve => serve_command().await,
        Commands::Compile { filter, joined } => compile_command(&filter, joined),
    }
}

async fn serve_command() -> Result<()> {
    let config = Arc::new(ApiConfig::from_env()?);
    let addr = config.listen_addr();

    let pool = Arc::new(StorePool::new(MemoryConnector::new(
        config.data_dir.clone(),
    )));
    // Connect eagerly so configuration problems show up at startup; requests
    // retry through the pool either way.
    if let Err(e) = pool.acquire().await {
        tracing::error!("Initial store connection failed: {:#}", e);
    }

    tracing::info!(
        "Starting catalog API on {} serving collection {}",
        addr,
        config.collection
    );

    let app = create_app(pool.clone(), config);
    let server_result = Server::new(TcpListener::bind(&addr)).run(app).await;

    pool.disconnect().await;
    server_result.context("Server terminated with an error")
}

fn compile_command(filter: &str, joined: bool) -> Result<()> {
    let compiler = FilterCompiler::builder().joined_expressions(joined).build()?;
    let compiled = compiler.compile_with_diagnostics(filter);

    println!("{}", serde_json::to_string_pretty(&compiled.predicate)?);
    for diagnostic in &compiled.diagnostics {
        eprintln!("dropped: {}", diagnostic);
    }
    Ok(())
}
