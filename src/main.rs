//! shelf-rs client entry point.

use clap::Parser;
use shelf_rs::{
    config::{BookmarkCommand, Cli, Command, Config},
    library::{Book, Bookmark, NewBookmark},
    persist::{FileStore, MemoryStore, PersistenceAdapter},
    remote::HttpBookService,
    store::LibraryStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let mut config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Books { category } => cmd_books(&config, category.as_deref()).await,
        Command::Categories => cmd_categories(&config).await,
        Command::Open { id } => cmd_open(&config, id).await,
        Command::Resume => cmd_resume(&config).await,
        Command::Scan { update } => cmd_scan(&config, update).await,
        Command::Bookmark { action } => cmd_bookmark(&config, action).await,
        Command::Delete { id } => cmd_delete(&config, id).await,
    }
}

/// Build the store from config: HTTP backend plus file-backed session state.
fn build_store(config: &Config) -> anyhow::Result<LibraryStore> {
    let remote = HttpBookService::new(
        &config.server.base_url,
        config.server.timeout(),
        config.server.scan_timeout(),
    )?;
    // An unusable state file degrades to a session that does not persist,
    // it never blocks the client from starting.
    let persist: Arc<dyn PersistenceAdapter> = match FileStore::open(&config.state.resolved_path())
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "State file unusable, session will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(LibraryStore::new(Arc::new(remote), persist))
}

/// Create a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());
    println!("\nEdit config.toml to point at your backend, then run: shelf-rs books");

    Ok(())
}

/// List books, honoring the category filter.
async fn cmd_books(config: &Config, category: Option<&str>) -> anyhow::Result<()> {
    let store = build_store(config)?;

    store.load_books(None).await;
    if let Some(category) = category {
        store.set_selected_category(category);
    }

    let books = store.filtered_books();
    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    println!("{:<6} {:<42} {:<22} {:<8} CATEGORY", "ID", "TITLE", "AUTHOR", "FORMAT");
    println!("{}", "-".repeat(96));
    for book in &books {
        println!(
            "{:<6} {:<42} {:<22} {:<8} {}",
            book.id,
            truncate(&book.title, 40),
            truncate(book.author.as_deref().unwrap_or("-"), 20),
            book.file_format,
            book.category.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// List categories with their book counts.
async fn cmd_categories(config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;

    store.load_categories().await;

    let categories = store.categories();
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    println!("{:<30} BOOKS", "CATEGORY");
    println!("{}", "-".repeat(40));
    for (name, count) in &categories {
        println!("{:<30} {}", name, count);
    }

    Ok(())
}

/// Open a book and show its details and bookmarks.
async fn cmd_open(config: &Config, id: i64) -> anyhow::Result<()> {
    let store = build_store(config)?;

    store.open_book(id).await?;

    if let Some(book) = store.current_book() {
        print_book(&book);
        print_bookmarks(&store.bookmarks());
    }

    Ok(())
}

/// Reopen the book from the previous session.
async fn cmd_resume(config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;

    store.restore_last_book().await;

    match store.current_book() {
        Some(book) => {
            print_book(&book);
            print_bookmarks(&store.bookmarks());
        }
        None => println!("No previous book to restore."),
    }

    Ok(())
}

/// Trigger a backend scan and report the summary.
async fn cmd_scan(config: &Config, update: bool) -> anyhow::Result<()> {
    let store = build_store(config)?;

    println!("Scanning library (this can take a while on a large catalog)...");
    let summary = store.scan_library(update).await?;

    println!(
        "Scan complete: {} added, {} updated, {} deleted, {} total.",
        summary.added, summary.updated, summary.deleted, summary.total
    );

    Ok(())
}

/// Bookmark management commands.
async fn cmd_bookmark(config: &Config, action: BookmarkCommand) -> anyhow::Result<()> {
    let store = build_store(config)?;

    match action {
        BookmarkCommand::Add {
            book_id,
            page,
            position,
            note,
        } => {
            store.open_book(book_id).await?;
            store
                .add_bookmark(&NewBookmark {
                    page_number: page,
                    position,
                    note,
                })
                .await?;

            if let Some(bookmark) = store.bookmarks().first() {
                println!("Added bookmark {} to book {}.", bookmark.id, book_id);
            }
        }

        BookmarkCommand::Del {
            book_id,
            bookmark_id,
        } => {
            store.open_book(book_id).await?;
            store.remove_bookmark(bookmark_id).await?;
            println!("Deleted bookmark {}.", bookmark_id);
        }

        BookmarkCommand::List { book_id } => {
            store.open_book(book_id).await?;
            print_bookmarks(&store.bookmarks());
        }
    }

    Ok(())
}

/// Delete a book from the backend.
async fn cmd_delete(config: &Config, id: i64) -> anyhow::Result<()> {
    let store = build_store(config)?;

    store.load_books(None).await;
    store.delete_book(id).await?;
    println!("Deleted book {}.", id);

    Ok(())
}

/// Print a book's details.
fn print_book(book: &Book) {
    println!("{} (id {})", book.title, book.id);
    if let Some(ref author) = book.author {
        println!("  author:   {}", author);
    }
    if let Some(ref category) = book.category {
        println!("  category: {}", category);
    }
    if let Some(year) = book.year {
        println!("  year:     {}", year);
    }
    println!("  format:   {}", book.file_format);
    if let Some(size) = book.file_size {
        println!("  size:     {} bytes", size);
    }
}

/// Print a bookmark table, newest first.
fn print_bookmarks(bookmarks: &[Bookmark]) {
    if bookmarks.is_empty() {
        println!("\nNo bookmarks.");
        return;
    }

    println!("\n{:<6} {:<8} {:<20} NOTE", "ID", "PAGE", "CREATED");
    println!("{}", "-".repeat(60));
    for bookmark in bookmarks {
        println!(
            "{:<6} {:<8} {:<20} {}",
            bookmark.id,
            bookmark
                .page_number
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            bookmark.created_at.format("%Y-%m-%d %H:%M"),
            bookmark.note.as_deref().unwrap_or(""),
        );
    }
}

/// Truncate a string for table display.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
