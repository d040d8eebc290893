use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::store::document::{Value, REV_FIELD};

/// Default page window when the request carries no usable `page`/`limit`.
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Field the default sort order is keyed on, newest first.
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

/// Filter predicate over document fields. The parameter translator only
/// emits `Eq`/`Gt`/`Gte`/`Lt`/`Lte` conjunctions; `Ne` exists for internal
/// base filters such as visibility scoping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    And(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    pub fn and(self, rhs: FilterExpr) -> FilterExpr {
        FilterExpr::And(Box::new(self), Box::new(rhs))
    }

    /// Conjunction of two optional predicates.
    pub fn merge(a: Option<FilterExpr>, b: Option<FilterExpr>) -> Option<FilterExpr> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.and(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

/// Field projection. Inclusion always retains the id field; the default mode
/// keeps everything except the store's bookkeeping field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    Include(BTreeSet<String>),
    DefaultExclude,
}

impl Projection {
    pub fn excluded_by_default() -> &'static [&'static str] {
        &[REV_FIELD]
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::DefaultExclude
    }
}

/// Engine-agnostic description of one filtered/sorted/projected/paginated
/// read. Constructed per request, discarded after execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPlan {
    pub predicate: Option<FilterExpr>,
    pub sort: Vec<(String, Order)>,
    pub projection: Projection,
    pub page: u64,
    pub limit: u64,
}

impl Default for ReadPlan {
    fn default() -> Self {
        Self {
            predicate: None,
            sort: vec![(CREATED_AT_FIELD.to_string(), Order::Desc)],
            projection: Projection::DefaultExclude,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReadPlan {
    /// Plan that visits every matching document: no predicate, no page cap.
    /// Used by internal scans (aggregations, recompute).
    pub fn unpaged() -> Self {
        Self {
            predicate: None,
            sort: Vec::new(),
            projection: Projection::DefaultExclude,
            page: DEFAULT_PAGE,
            limit: u64::MAX,
        }
    }

    pub fn with_predicate(mut self, predicate: FilterExpr) -> Self {
        self.predicate = FilterExpr::merge(self.predicate, Some(predicate));
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: Order) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
