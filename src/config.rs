use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Reading client for a remote book library.
#[derive(Parser, Debug, Clone)]
#[command(name = "shelf-rs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "SHELF_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides the config file).
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List books in the catalog.
    Books {
        /// Only show books in this category.
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// List categories and their book counts.
    Categories,

    /// Open a book and show its details and bookmarks.
    Open {
        /// Book id.
        id: i64,
    },

    /// Reopen the book from the previous session.
    Resume,

    /// Ask the backend to rescan its book directory.
    Scan {
        /// Also refresh metadata of books already in the catalog.
        #[arg(short, long)]
        update: bool,
    },

    /// Bookmark management commands.
    Bookmark {
        /// Bookmark subcommand action.
        #[command(subcommand)]
        action: BookmarkCommand,
    },

    /// Delete a book from the backend.
    Delete {
        /// Book id.
        id: i64,
    },

    /// Create a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Bookmark management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BookmarkCommand {
    /// Add a bookmark to a book.
    Add {
        /// Book id.
        book_id: i64,
        /// Page number.
        #[arg(short, long)]
        page: Option<i64>,
        /// Opaque position descriptor (e.g. an EPUB CFI).
        #[arg(long)]
        position: Option<String>,
        /// Note text.
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Delete a bookmark.
    Del {
        /// Book id the bookmark belongs to.
        book_id: i64,
        /// Bookmark id to delete.
        bookmark_id: i64,
    },

    /// List bookmarks of a book.
    List {
        /// Book id.
        book_id: i64,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Local state configuration.
    #[serde(default)]
    pub state: StateConfig,
}

/// Backend server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the book backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for interactive requests, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Timeout for the library scan, in seconds. Scanning a large catalog
    /// is expected to be slow, so this budget is separate from the
    /// interactive one.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            scan_timeout_seconds: default_scan_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_scan_timeout() -> u64 {
    300
}

impl ServerConfig {
    /// Interactive request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Scan request timeout.
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_seconds)
    }
}

/// Local state configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON state file. Defaults to
    /// `<data dir>/shelf-rs/state.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StateConfig {
    /// Resolve the state file path.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("shelf-rs")
                .join("state.json")
        })
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("shelf-rs.toml"),
            dirs::config_dir()
                .map(|p| p.join("shelf-rs").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/shelf-rs/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# shelf-rs configuration

[server]
base_url = "http://localhost:5000"
# Timeout for interactive requests (seconds)
timeout_seconds = 30
# Timeout for the library scan (seconds) - scans of large catalogs are slow
scan_timeout_seconds = 300

[state]
# Where the reading session (last book, category filter) is kept.
# path = "/home/user/.local/share/shelf-rs/state.json"
"#
        .to_string()
    }
}
