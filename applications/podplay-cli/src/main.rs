//! Podplay - command-line front end for favorites, history and the catalog API
use clap::{Args, Parser, Subcommand};
use podplay_core::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "podplay")]
#[command(about = "Podplay podcast client", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./podplay.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory holding favorites and history
    #[arg(long, global = true, env = "PODPLAY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage favorite podcasts
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Show or clear listening history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Search the catalog
    Search {
        /// Free-text query
        query: String,
        #[command(flatten)]
        paging: Paging,
    },

    /// Browse podcasts
    Podcasts {
        /// Only podcasts in this category
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        paging: Paging,
    },

    /// List categories
    Categories,

    /// Sign in and show the profile
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "PODPLAY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    /// List favorites, most recently added first
    List,
    /// Add a favorite
    Add(FavoriteArgs),
    /// Remove a favorite
    Remove {
        id: String,
    },
    /// Add if absent, remove if present
    Toggle(FavoriteArgs),
    /// Remove all favorites
    Clear,
    /// Repair and migrate favorites written by older versions
    Migrate,
}

#[derive(Args)]
struct FavoriteArgs {
    id: String,
    #[arg(short, long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    thumbnail: String,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List recently played podcasts
    List,
    /// Record a listen
    Record {
        id: String,
        #[arg(short, long, default_value = "")]
        title: String,
    },
    /// Clear listening history
    Clear,
}

#[derive(Args, Clone, Copy)]
struct Paging {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podplay=info,podplay_storage=info,podplay_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    match cli.command {
        Commands::Favorites(command) => commands::favorites(&config, command).await,
        Commands::History(command) => commands::history(&config, command).await,
        Commands::Search { query, paging } => commands::search(&config, &query, paging).await,
        Commands::Podcasts { category, paging } => {
            commands::podcasts(&config, category.as_deref(), paging).await
        }
        Commands::Categories => commands::categories(&config).await,
        Commands::Login { email, password } => commands::login(&config, &email, &password).await,
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        }
    }
}
