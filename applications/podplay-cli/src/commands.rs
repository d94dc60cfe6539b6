//! Subcommand handlers

use crate::{FavoriteArgs, FavoritesCommand, HistoryCommand, Paging};
use anyhow::Context;
use podplay_client::{ApiConfig, Page, Podcast, PodcastClient, SearchGate};
use podplay_core::types::sort_most_recent_first;
use podplay_core::{AppConfig, DirectoryStore, FavoriteItem, ListenItem, PodcastId};
use podplay_storage::{FavoritesRepository, HistoryRepository};
use std::time::Duration;
use tracing::info;

async fn open_store(config: &AppConfig) -> anyhow::Result<DirectoryStore> {
    let root = &config.storage.data_dir;
    DirectoryStore::open(root)
        .await
        .with_context(|| format!("Failed to open data directory {}", root.display()))
}

fn client(config: &AppConfig) -> anyhow::Result<PodcastClient> {
    PodcastClient::new(ApiConfig::from_settings(&config.api)).context("Invalid API configuration")
}

fn favorite_item(args: FavoriteArgs) -> FavoriteItem {
    FavoriteItem::new(args.id, args.title, args.thumbnail)
}

pub async fn favorites(config: &AppConfig, command: FavoritesCommand) -> anyhow::Result<()> {
    let repo = FavoritesRepository::new(open_store(config).await?);

    match command {
        FavoritesCommand::List => {
            let mut details = repo.get_favorite_details().await;
            sort_most_recent_first(&mut details);

            if details.is_empty() {
                println!("No favorites yet");
            }
            for detail in details {
                println!(
                    "{}  {}  (added {})",
                    detail.id,
                    detail.title,
                    detail.added_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        FavoritesCommand::Add(args) => {
            let item = favorite_item(args);
            repo.add_to_favorites(&item).await?;
            println!("Added {}", item.id);
        }
        FavoritesCommand::Remove { id } => {
            repo.remove_from_favorites(&PodcastId::new(id.as_str()))
                .await?;
            println!("Removed {id}");
        }
        FavoritesCommand::Toggle(args) => {
            let item = favorite_item(args);
            let now_favorite = repo.toggle_favorite(&item).await?;
            println!(
                "{} is {}",
                item.id,
                if now_favorite {
                    "now a favorite"
                } else {
                    "no longer a favorite"
                }
            );
        }
        FavoritesCommand::Clear => {
            repo.clear_all_favorites().await?;
            println!("Cleared all favorites");
        }
        FavoritesCommand::Migrate => {
            let report = repo.migrate_favorite_ids().await?;
            if report.is_noop() {
                println!("Favorites are up to date");
            } else {
                println!(
                    "Migrated favorites: {} ids coerced, {} details rebuilt, {} records dropped",
                    report.coerced, report.rebuilt, report.dropped
                );
            }
        }
    }

    Ok(())
}

pub async fn history(config: &AppConfig, command: HistoryCommand) -> anyhow::Result<()> {
    let repo = HistoryRepository::with_capacity(open_store(config).await?, config.history.capacity);

    match command {
        HistoryCommand::List => {
            let entries = repo.get_history().await;
            if entries.is_empty() {
                println!("Nothing played yet");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.listened_at.format("%Y-%m-%d %H:%M"),
                    entry.id(),
                    entry.item.title
                );
            }
        }
        HistoryCommand::Record { id, title } => {
            repo.record_listen(ListenItem::new(id.as_str(), title)).await;
            println!("Recorded {id}");
        }
        HistoryCommand::Clear => {
            repo.clear_history().await;
            println!("Cleared history");
        }
    }

    Ok(())
}

pub async fn search(config: &AppConfig, query: &str, paging: Paging) -> anyhow::Result<()> {
    let client = client(config)?;
    let gate = SearchGate::new(Duration::from_millis(config.search.debounce_ms));

    match gate.search(&client, query, paging.page, paging.limit).await {
        Some(page) => print_page(&page?),
        // Only one search per invocation, so nothing can supersede it
        None => info!("Search superseded"),
    }
    Ok(())
}

pub async fn podcasts(
    config: &AppConfig,
    category: Option<&str>,
    paging: Paging,
) -> anyhow::Result<()> {
    let client = client(config)?;
    let page = match category {
        Some(category) => {
            client
                .category_podcasts(category, paging.page, paging.limit)
                .await?
        }
        None => client.podcasts(paging.page, paging.limit).await?,
    };
    print_page(&page);
    Ok(())
}

pub async fn categories(config: &AppConfig) -> anyhow::Result<()> {
    for category in client(config)?.categories().await? {
        println!("{}  {}", category.id, category.name);
    }
    Ok(())
}

pub async fn login(config: &AppConfig, email: &str, password: &str) -> anyhow::Result<()> {
    let client = client(config)?;
    let login = client.login(email, password).await?;
    let profile = client.profile().await?;

    println!("Signed in as {} <{}>", profile.name, profile.email);
    info!(user_id = %login.user.id, "Login verified");
    Ok(())
}

fn print_page(page: &Page<Podcast>) {
    if page.items.is_empty() {
        println!("No podcasts found");
        return;
    }

    for podcast in &page.items {
        match &podcast.author {
            Some(author) => println!("{}  {}  ({})", podcast.id, podcast.title, author),
            None => println!("{}  {}", podcast.id, podcast.title),
        }
    }
    println!(
        "Page {} of {} ({} total)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
    );
}
