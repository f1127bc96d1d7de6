//! Remote backend capability consumed by the store.

mod http;

pub use http::HttpBookService;

use crate::error::Result;
use crate::library::{Book, Bookmark, BookmarkPatch, CategoryIndex, NewBookmark, ScanSummary};
use async_trait::async_trait;

/// Operations the book backend exposes to the client.
///
/// The store depends on this trait rather than on a concrete transport so
/// tests can substitute an in-memory fake. [`HttpBookService`] is the real
/// implementation.
#[async_trait]
pub trait RemoteBookService: Send + Sync {
    /// List the catalog, optionally filtered server-side by category.
    async fn list_books(&self, category: Option<&str>) -> Result<Vec<Book>>;

    /// Fetch the category index (name to book count).
    async fn list_categories(&self) -> Result<CategoryIndex>;

    /// Fetch a single book. Fails with [`crate::AppError::NotFound`] when
    /// no book has the given id.
    async fn get_book(&self, book_id: i64) -> Result<Book>;

    /// Fetch all bookmarks of a book, newest first.
    async fn get_bookmarks(&self, book_id: i64) -> Result<Vec<Bookmark>>;

    /// Create a bookmark for a book and return it as stored.
    async fn create_bookmark(&self, book_id: i64, data: &NewBookmark) -> Result<Bookmark>;

    /// Update fields of an existing bookmark.
    async fn update_bookmark(&self, bookmark_id: i64, patch: &BookmarkPatch) -> Result<()>;

    /// Delete a bookmark.
    async fn delete_bookmark(&self, bookmark_id: i64) -> Result<()>;

    /// Trigger a backend library scan. Long-running: implementations must
    /// allow a far larger timeout than for the interactive calls.
    async fn scan_library(&self, update: bool) -> Result<ScanSummary>;

    /// Delete a book from the backend catalog and disk.
    async fn delete_book(&self, book_id: i64) -> Result<()>;
}
