pub mod document;
pub mod memory;

use async_trait::async_trait;

use crate::error::Error;
use crate::query::exec::FindResult;
use crate::query::plan::{FilterExpr, ReadPlan};
use document::Document;

pub use memory::MemoryStore;

/// Data-access seam the query and domain layers run against. The store must
/// support conjunctive equality and comparison filtering, multi-key sort,
/// field projection, and skip/limit pagination over named collections.
///
/// Store calls are the only suspension points in a request; failures
/// propagate unchanged and are never retried here.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Applies a read plan, optionally pre-constrained by a base filter
    /// combined conjunctively with the plan's own predicate.
    async fn find(
        &self,
        collection: &str,
        plan: &ReadPlan,
        base: Option<&FilterExpr>,
    ) -> Result<FindResult, Error>;

    /// Point lookup by id. An absent document is not a store failure.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error>;

    /// Inserts a document, generating an id when none is present, and
    /// returns the stored form.
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, Error>;

    /// Merges a patch into the identified document and returns the updated
    /// form, or `None` when the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>, Error>;

    /// Removes the identified document, returning the removed form when it
    /// existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, Error>;
}
