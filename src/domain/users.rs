//! User operations. The activity base filter (`active != false`) is applied
//! explicitly by every read path, mirroring the tour visibility scoping.

use std::sync::Arc;

use tracing::info;

use crate::auth::password;
use crate::domain::user::{fields, sanitize, SignupInput};
use crate::domain::{collections, now_millis};
use crate::error::{Error, Resource};
use crate::query::exec::{self, FindResult, ReadExecutor};
use crate::query::plan::{FilterExpr, Projection, ReadPlan};
use crate::store::document::{Document, Value};
use crate::store::DocumentStore;

pub(crate) fn active_filter() -> FilterExpr {
    FilterExpr::Ne(fields::ACTIVE.to_string(), Value::Boolean(false))
}

#[derive(Clone)]
pub struct Users {
    store: Arc<dyn DocumentStore>,
    executor: ReadExecutor,
}

impl Users {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let executor = ReadExecutor::new(store.clone());
        Self { store, executor }
    }

    pub async fn find_many(&self, plan: &ReadPlan) -> Result<FindResult, Error> {
        let mut result = self
            .executor
            .execute(collections::USERS, plan, Some(&active_filter()))
            .await?;
        for doc in &mut result.documents {
            sanitize(doc);
        }
        Ok(result)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Document, Error> {
        let mut doc = self
            .store
            .get(collections::USERS, id)
            .await?
            .filter(|doc| exec::matches(doc, &active_filter()))
            .ok_or_else(|| Error::not_found(Resource::User, id))?;
        exec::project(&mut doc, &Projection::DefaultExclude);
        sanitize(&mut doc);
        Ok(doc)
    }

    /// Login-path lookup: returns the stored form including the password
    /// hash. Callers must not let the document leave the auth flow.
    pub async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<Document>, Error> {
        let plan = ReadPlan::unpaged().with_predicate(FilterExpr::Eq(
            fields::EMAIL.to_string(),
            Value::Text(email.to_lowercase()),
        ));
        let result = self
            .executor
            .execute(collections::USERS, &plan, Some(&active_filter()))
            .await?;
        Ok(result.documents.into_iter().next())
    }

    /// Raw point lookup for the request-authentication path; applies the
    /// activity filter but keeps credential fields for the staleness check.
    pub async fn find_for_auth(&self, id: &str) -> Result<Option<Document>, Error> {
        Ok(self
            .store
            .get(collections::USERS, id)
            .await?
            .filter(|doc| exec::matches(doc, &active_filter())))
    }

    pub async fn create(&self, input: SignupInput) -> Result<Document, Error> {
        input.validate()?;
        self.ensure_email_free(&input.email).await?;

        let hash = password::hash(&input.password)?;
        let doc = input.into_document(hash, now_millis());
        let mut stored = self.store.insert(collections::USERS, doc).await?;
        info!(id = stored.id().unwrap_or_default(), "created user");
        exec::project(&mut stored, &Projection::DefaultExclude);
        sanitize(&mut stored);
        Ok(stored)
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), Error> {
        let plan = ReadPlan::unpaged().with_predicate(FilterExpr::Eq(
            fields::EMAIL.to_string(),
            Value::Text(email.to_lowercase()),
        ));
        let existing = self.store.find(collections::USERS, &plan, None).await?;
        if existing.matched > 0 {
            return Err(Error::Conflict("email is already registered".to_string()));
        }
        Ok(())
    }
}
