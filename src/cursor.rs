//! Cursor pagination over the table collection.
//!
//! The pager walks the collection in one global strict order by document
//! identifier, advancing an opaque cursor derived from the last identifier
//! of each page. An empty page ends the scan; a short page marks itself as
//! last so the trailing empty fetch can be skipped.
//!
//! Known weakness: correctness requires that identifiers (and their sort
//! positions) do not change while a run is in flight. A concurrent writer
//! mutating identifiers can cause documents to be missed or visited twice;
//! the pager only detects the cases that break local ordering.

use crate::document::{DocId, TableDoc};
use crate::storage::{DocumentSource, StorageError};

/// Opaque scan position: "start" or "strictly after this identifier".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(Option<DocId>);

impl Cursor {
    /// The position before the first document.
    #[must_use]
    pub const fn start() -> Self {
        Self(None)
    }

    /// The position immediately after the given identifier.
    #[must_use]
    pub const fn after(id: DocId) -> Self {
        Self(Some(id))
    }

    /// The identifier this cursor sits after, if any.
    #[must_use]
    pub fn position(&self) -> Option<&DocId> {
        self.0.as_ref()
    }
}

/// One fetched page and the cursor to continue from.
#[derive(Debug)]
pub struct Page {
    /// Documents in identifier order.
    pub docs: Vec<TableDoc>,
    /// Position after the last document of this page.
    pub next_cursor: Cursor,
    /// True when the source cannot have more documents after this page.
    pub is_last: bool,
}

/// Lazy, restartable page sequence over a [`DocumentSource`].
pub struct Pager<'a> {
    source: &'a dyn DocumentSource,
    page_size: usize,
    cursor: Cursor,
    done: bool,
}

impl<'a> Pager<'a> {
    /// Creates a pager starting at the beginning of the collection.
    ///
    /// # Panics
    /// Panics if `page_size` is zero.
    #[must_use]
    pub fn new(source: &'a dyn DocumentSource, page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            source,
            page_size,
            cursor: Cursor::start(),
            done: false,
        }
    }

    /// Fetches the next page, or `None` once the scan is exhausted.
    ///
    /// # Errors
    /// Propagates source fetch faults; no partial-page state is kept, so
    /// the same pager can be retried by the caller if it chooses to.
    /// Also fails when the source violates the strict ordering contract,
    /// since a non-advancing cursor would re-visit documents forever.
    pub fn next_page(&mut self) -> Result<Option<Page>, StorageError> {
        if self.done {
            return Ok(None);
        }

        let docs = self.source.fetch_after(self.cursor.position(), self.page_size)?;
        if docs.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let mut prev = self.cursor.position();
        for doc in &docs {
            if prev.is_some_and(|p| p >= &doc.id) {
                return Err(StorageError::Backend(format!(
                    "source violated id ordering: {:?} did not advance past {:?}",
                    doc.id,
                    prev.map(DocId::as_str)
                )));
            }
            prev = Some(&doc.id);
        }

        let last = docs
            .last()
            .map(|d| d.id.clone())
            .unwrap_or_default();
        let is_last = docs.len() < self.page_size;

        self.cursor = Cursor::after(last);
        if is_last {
            self.done = true;
        }

        Ok(Some(Page {
            docs,
            next_cursor: self.cursor.clone(),
            is_last,
        }))
    }
}
