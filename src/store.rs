//! Canonical in-memory view of the catalog and the reading session.

use crate::error::Result;
use crate::library::{Book, Bookmark, BookmarkPatch, CategoryIndex, NewBookmark, ScanSummary};
use crate::persist::PersistenceAdapter;
use crate::remote::RemoteBookService;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Persisted key for the id of the last open book.
const KEY_CURRENT_BOOK_ID: &str = "current-book-id";
/// Persisted key for the selected category filter.
const KEY_SELECTED_CATEGORY: &str = "selected-category";

/// Single source of truth for catalog and reading state.
///
/// Every read and write between the UI and the backend goes through here.
/// Collections are swapped wholesale under their own lock, so a reader
/// never observes a half-applied update. List-style reads fail open (log,
/// reset to empty); detail reads and all writes fail closed (the error
/// reaches the caller). Persistence failures are logged and never abort
/// the in-memory change they accompany.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct LibraryStore {
    remote: Arc<dyn RemoteBookService>,
    persist: Arc<dyn PersistenceAdapter>,
    books: Arc<RwLock<Vec<Book>>>,
    categories: Arc<RwLock<CategoryIndex>>,
    current_book: Arc<RwLock<Option<Book>>>,
    bookmarks: Arc<RwLock<Vec<Bookmark>>>,
    selected_category: Arc<RwLock<String>>,
    loading: Arc<AtomicBool>,
}

impl LibraryStore {
    /// Create a store. The category filter saved by a previous run is
    /// restored immediately; the last open book is only restored by an
    /// explicit [`LibraryStore::restore_last_book`] call.
    pub fn new(remote: Arc<dyn RemoteBookService>, persist: Arc<dyn PersistenceAdapter>) -> Self {
        let selected_category = match persist.get(KEY_SELECTED_CATEGORY) {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load saved category filter");
                String::new()
            }
        };

        Self {
            remote,
            persist,
            books: Arc::new(RwLock::new(Vec::new())),
            categories: Arc::new(RwLock::new(CategoryIndex::new())),
            current_book: Arc::new(RwLock::new(None)),
            bookmarks: Arc::new(RwLock::new(Vec::new())),
            selected_category: Arc::new(RwLock::new(selected_category)),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run a persistence side effect, logging instead of propagating.
    fn persist_quietly(&self, op: impl FnOnce(&dyn PersistenceAdapter) -> Result<()>, what: &str) {
        if let Err(e) = op(self.persist.as_ref()) {
            tracing::warn!(error = %e, "Failed to {}", what);
        }
    }

    /// Replace the catalog with a fresh server snapshot, optionally
    /// filtered server-side. Fails open: on error the catalog resets to
    /// empty and nothing propagates.
    pub async fn load_books(&self, category: Option<&str>) {
        self.loading.store(true, Ordering::SeqCst);

        match self.remote.list_books(category).await {
            Ok(books) => {
                tracing::info!(books = books.len(), "Loaded book list");
                *self.books.write() = books;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load book list");
                *self.books.write() = Vec::new();
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    /// Replace the category index with a fresh server snapshot. Fails
    /// open: on error the index resets to empty and nothing propagates.
    pub async fn load_categories(&self) {
        match self.remote.list_categories().await {
            Ok(categories) => *self.categories.write() = categories,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories");
                *self.categories.write() = CategoryIndex::new();
            }
        }
    }

    /// Open a book for reading: fetch it, then its bookmarks, then save
    /// the id for the next session.
    ///
    /// Fails closed. When the bookmark fetch fails the book itself stays
    /// current, so callers must treat an error as "book state partially
    /// applied, bookmarks unknown".
    pub async fn open_book(&self, book_id: i64) -> Result<()> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.do_open_book(book_id).await;
        self.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn do_open_book(&self, book_id: i64) -> Result<()> {
        let book = self.remote.get_book(book_id).await?;
        *self.current_book.write() = Some(book);

        // Bookmarks strictly after the book itself: never fetch them for
        // a book that failed to load.
        let bookmarks = self.remote.get_bookmarks(book_id).await?;
        *self.bookmarks.write() = bookmarks;

        self.persist_quietly(
            |p| p.set(KEY_CURRENT_BOOK_ID, &book_id.to_string()),
            "save current book id",
        );
        Ok(())
    }

    /// Set the category filter. The empty string means "no filter" and
    /// removes the persisted key instead of storing it.
    pub fn set_selected_category(&self, category: &str) {
        *self.selected_category.write() = category.to_string();

        if category.is_empty() {
            self.persist_quietly(|p| p.remove(KEY_SELECTED_CATEGORY), "clear saved category");
        } else {
            self.persist_quietly(
                |p| p.set(KEY_SELECTED_CATEGORY, category),
                "save selected category",
            );
        }
    }

    /// Run a backend library scan and pick up its changes.
    ///
    /// Fails closed: scan failures are user-actionable. On success the
    /// catalog and category index are refreshed (concurrently, both
    /// fail-open) before the summary is returned.
    pub async fn scan_library(&self, update: bool) -> Result<ScanSummary> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.do_scan_library(update).await;
        self.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn do_scan_library(&self, update: bool) -> Result<ScanSummary> {
        let summary = self.remote.scan_library(update).await?;

        tracing::info!(
            added = summary.added,
            updated = summary.updated,
            deleted = summary.deleted,
            total = summary.total,
            "Library scan complete"
        );

        tokio::join!(self.load_books(None), self.load_categories());
        Ok(summary)
    }

    /// Create a bookmark in the current book and prepend it locally
    /// (newest first). A no-op when no book is open. Fails closed.
    pub async fn add_bookmark(&self, data: &NewBookmark) -> Result<()> {
        let Some(book_id) = self.current_book.read().as_ref().map(|b| b.id) else {
            return Ok(());
        };

        let bookmark = self.remote.create_bookmark(book_id, data).await?;
        self.bookmarks.write().insert(0, bookmark);
        Ok(())
    }

    /// Update a bookmark remotely, then patch the local copy. Fails
    /// closed; the local list is untouched when the remote write fails.
    pub async fn update_bookmark(&self, bookmark_id: i64, patch: &BookmarkPatch) -> Result<()> {
        self.remote.update_bookmark(bookmark_id, patch).await?;

        if let Some(bookmark) = self
            .bookmarks
            .write()
            .iter_mut()
            .find(|b| b.id == bookmark_id)
        {
            patch.apply(bookmark);
        }
        Ok(())
    }

    /// Delete a bookmark remotely, then drop it from the local list.
    /// Fails closed; no optimistic removal.
    pub async fn remove_bookmark(&self, bookmark_id: i64) -> Result<()> {
        self.remote.delete_bookmark(bookmark_id).await?;
        self.bookmarks.write().retain(|b| b.id != bookmark_id);
        Ok(())
    }

    /// Delete a book from the backend, prune it locally, and close it if
    /// it was the open book. Fails closed.
    pub async fn delete_book(&self, book_id: i64) -> Result<()> {
        self.remote.delete_book(book_id).await?;
        self.books.write().retain(|b| b.id != book_id);

        let was_current = self
            .current_book
            .read()
            .as_ref()
            .is_some_and(|b| b.id == book_id);
        if was_current {
            self.clear_current_book();
        }
        Ok(())
    }

    /// Leave the reading view: clear the current book, its bookmarks and
    /// the persisted id.
    pub fn clear_current_book(&self) {
        *self.current_book.write() = None;
        self.bookmarks.write().clear();
        self.persist_quietly(|p| p.remove(KEY_CURRENT_BOOK_ID), "clear saved book id");
    }

    /// Reopen the book from the previous session, if any. Best-effort:
    /// every failure is logged and swallowed so startup never blocks on
    /// it. A saved id that no longer matches a catalog book is removed so
    /// later restores become no-ops.
    pub async fn restore_last_book(&self) {
        if let Err(e) = self.do_restore_last_book().await {
            tracing::warn!(error = %e, "Failed to restore last book");
        }
    }

    async fn do_restore_last_book(&self) -> Result<()> {
        let Some(saved) = self.persist.get(KEY_CURRENT_BOOK_ID)? else {
            return Ok(());
        };

        let Ok(book_id) = saved.parse::<i64>() else {
            // An unreadable id is as stale as a deleted book.
            self.persist_quietly(|p| p.remove(KEY_CURRENT_BOOK_ID), "clear saved book id");
            return Ok(());
        };

        if self.books.read().is_empty() {
            self.load_books(None).await;
        }

        let exists = self.books.read().iter().any(|b| b.id == book_id);
        if exists {
            self.open_book(book_id).await?;
        } else {
            tracing::info!(book_id, "Saved book is no longer in the catalog");
            self.persist_quietly(|p| p.remove(KEY_CURRENT_BOOK_ID), "clear saved book id");
        }
        Ok(())
    }

    /// Current catalog snapshot.
    pub fn books(&self) -> Vec<Book> {
        self.books.read().clone()
    }

    /// Current category index snapshot.
    pub fn categories(&self) -> CategoryIndex {
        self.categories.read().clone()
    }

    /// The open book, if any.
    pub fn current_book(&self) -> Option<Book> {
        self.current_book.read().clone()
    }

    /// Bookmarks of the open book, newest first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.read().clone()
    }

    /// The active category filter; empty means "no filter".
    pub fn selected_category(&self) -> String {
        self.selected_category.read().clone()
    }

    /// Whether a book-list or book-detail fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// The catalog restricted to the selected category, or the whole
    /// catalog when no filter is set. Recomputed on every call.
    pub fn filtered_books(&self) -> Vec<Book> {
        let selected = self.selected_category.read().clone();
        let books = self.books.read();

        if selected.is_empty() {
            books.clone()
        } else {
            books
                .iter()
                .filter(|b| b.category.as_deref() == Some(selected.as_str()))
                .cloned()
                .collect()
        }
    }

    /// Category names, sorted. Recomputed on every call.
    pub fn category_list(&self) -> Vec<String> {
        self.categories.read().keys().cloned().collect()
    }
}
