//! In-process document store. Collections are created on first write and an
//! unknown collection reads as empty, so the read path has no failure modes
//! of its own; the trait still carries `Result` for real backends.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::Error;
use crate::query::exec::{self, FindResult};
use crate::query::plan::{FilterExpr, ReadPlan};
use crate::store::document::{Document, Value, ID_FIELD, REV_FIELD};
use crate::store::DocumentStore;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        plan: &ReadPlan,
        base: Option<&FilterExpr>,
    ) -> Result<FindResult, Error> {
        let snapshot: Vec<Document> = self
            .collections
            .read()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        Ok(exec::apply(snapshot, plan, base))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document, Error> {
        let id = match doc.get(ID_FIELD) {
            Some(Value::Text(id)) => id.clone(),
            _ => {
                let id = Uuid::new_v4().to_string();
                doc.set(ID_FIELD, Value::Text(id.clone()));
                id
            }
        };
        doc.set(REV_FIELD, Value::Integer(1));

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(Error::Store(format!(
                "duplicate id '{id}' in collection '{collection}'"
            )));
        }
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        mut patch: Document,
    ) -> Result<Option<Document>, Error> {
        // The id and revision are store-owned; a patch cannot move or
        // rewind a document.
        patch.remove(ID_FIELD);
        patch.remove(REV_FIELD);

        let mut collections = self.collections.write();
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };
        let rev = doc.i64(REV_FIELD).unwrap_or(0);
        doc.merge(patch);
        doc.set(REV_FIELD, Value::Integer(rev + 1));
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .and_then(|docs| docs.remove(id)))
    }
}
