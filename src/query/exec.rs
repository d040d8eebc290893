//! Application of a [`ReadPlan`] to a set of documents, and the executor
//! that runs plans against a named collection through the store seam.
//!
//! The pipeline order is filter, sort, project, paginate; the matched count
//! is taken after filtering and before pagination so callers get the true
//! total for the window they requested.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::Error;
use crate::query::plan::{FilterExpr, Order, Projection, ReadPlan};
use crate::store::document::{Document, Value, ID_FIELD};
use crate::store::DocumentStore;

/// One page of documents plus the post-filter, pre-pagination total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindResult {
    pub documents: Vec<Document>,
    pub matched: usize,
}

/// Whether a document satisfies a predicate. Fields absent from the
/// document never satisfy a comparison; mismatched kinds never match.
pub fn matches(doc: &Document, expr: &FilterExpr) -> bool {
    match expr {
        FilterExpr::Eq(field, want) => cmp_field(doc, field, want) == Some(Ordering::Equal),
        FilterExpr::Ne(field, want) => cmp_field(doc, field, want) != Some(Ordering::Equal),
        FilterExpr::Gt(field, want) => cmp_field(doc, field, want) == Some(Ordering::Greater),
        FilterExpr::Gte(field, want) => matches!(
            cmp_field(doc, field, want),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        FilterExpr::Lt(field, want) => cmp_field(doc, field, want) == Some(Ordering::Less),
        FilterExpr::Lte(field, want) => matches!(
            cmp_field(doc, field, want),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        FilterExpr::And(a, b) => matches(doc, a) && matches(doc, b),
    }
}

fn cmp_field(doc: &Document, field: &str, want: &Value) -> Option<Ordering> {
    doc.get(field)?.query_cmp(want)
}

/// Stable multi-key sort. Documents missing a sort field rank as `Null`.
pub fn sort_documents(documents: &mut [Document], keys: &[(String, Order)]) {
    if keys.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for (field, order) in keys {
            let va = a.get(field).unwrap_or(&Value::Null);
            let vb = b.get(field).unwrap_or(&Value::Null);
            let ord = match order {
                Order::Asc => va.sort_cmp(vb),
                Order::Desc => vb.sort_cmp(va),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Applies the plan's projection in place. Inclusion retains the id field;
/// the default mode drops only the store's bookkeeping fields.
pub fn project(doc: &mut Document, projection: &Projection) {
    match projection {
        Projection::Include(fields) => {
            doc.retain(|field, _| field == ID_FIELD || fields.contains(field));
        }
        Projection::DefaultExclude => {
            for field in Projection::excluded_by_default() {
                doc.remove(field);
            }
        }
    }
}

/// Runs the full pipeline over an unordered snapshot of a collection.
pub fn apply(documents: Vec<Document>, plan: &ReadPlan, base: Option<&FilterExpr>) -> FindResult {
    let mut filtered: Vec<Document> = documents
        .into_iter()
        .filter(|doc| {
            base.map_or(true, |expr| matches(doc, expr))
                && plan.predicate.as_ref().map_or(true, |expr| matches(doc, expr))
        })
        .collect();

    let matched = filtered.len();
    sort_documents(&mut filtered, &plan.sort);

    let skip = usize::try_from(plan.skip()).unwrap_or(usize::MAX);
    let limit = usize::try_from(plan.limit).unwrap_or(usize::MAX);
    let mut page: Vec<Document> = filtered.into_iter().skip(skip).take(limit).collect();
    for doc in &mut page {
        project(doc, &plan.projection);
    }

    FindResult {
        documents: page,
        matched,
    }
}

/// Executes read plans against a named collection through the data-access
/// seam. Stateless per call; the base filter lets callers pre-constrain the
/// result set independently of user-supplied filters.
#[derive(Clone)]
pub struct ReadExecutor {
    store: Arc<dyn DocumentStore>,
}

impl ReadExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        collection: &str,
        plan: &ReadPlan,
        base: Option<&FilterExpr>,
    ) -> Result<FindResult, Error> {
        self.store.find(collection, plan, base).await
    }
}
