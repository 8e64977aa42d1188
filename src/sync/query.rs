//! Filtered listing of remote resources.
//!
//! [`Query`] accumulates filter, ordering, and paging parameters and
//! executes a single GET against the type's collection endpoint. Obtain
//! one through [`SyncEngine::load`](crate::sync::SyncEngine::load):
//!
//! ```rust,ignore
//! let overdue = engine
//!     .load("Invoice")?
//!     .filter("Status == \"AUTHORISED\"")
//!     .order_by("DueDate")
//!     .page(1)
//!     .execute()
//!     .await?;
//! ```

use std::sync::Arc;

use crate::clients::{HttpMethod, HttpRequest};
use crate::sync::descriptor::ResourceDescriptor;
use crate::sync::engine::SyncEngine;
use crate::sync::entity::Entity;
use crate::sync::errors::SyncError;
use crate::sync::response::SyncResponse;

/// A lazily-executed filtered listing of one resource type.
#[derive(Debug)]
pub struct Query<'a> {
    engine: &'a SyncEngine,
    descriptor: Arc<ResourceDescriptor>,
    where_clause: String,
    order: Option<String>,
    page: Option<u32>,
    offset: Option<u64>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(engine: &'a SyncEngine, descriptor: Arc<ResourceDescriptor>) -> Self {
        Self {
            engine,
            descriptor,
            where_clause: String::new(),
            order: None,
            page: None,
            offset: None,
        }
    }

    /// Adds a filter clause, joined to any previous clause with `AND`.
    #[must_use]
    pub fn filter(self, clause: impl Into<String>) -> Self {
        self.and_filter(clause)
    }

    /// Adds a filter clause joined with `AND`.
    #[must_use]
    pub fn and_filter(mut self, clause: impl Into<String>) -> Self {
        self.push_clause("AND", &clause.into());
        self
    }

    /// Adds a filter clause joined with `OR`.
    #[must_use]
    pub fn or_filter(mut self, clause: impl Into<String>) -> Self {
        self.push_clause("OR", &clause.into());
        self
    }

    fn push_clause(&mut self, joiner: &str, clause: &str) {
        if !self.where_clause.is_empty() {
            self.where_clause.push(' ');
            self.where_clause.push_str(joiner);
            self.where_clause.push(' ');
        }
        self.where_clause.push_str(clause);
    }

    /// Sets the ordering field.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order = Some(field.into());
        self
    }

    /// Requests one page of results.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Skips records before the given sequence number.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Executes the query and hydrates every returned element.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Http`] if the request fails.
    pub async fn execute(self) -> Result<Vec<Entity>, SyncError> {
        let mut builder = HttpRequest::builder(HttpMethod::Get, self.descriptor.endpoint());

        if !self.where_clause.is_empty() {
            builder = builder.query_param("where", self.where_clause.clone());
        }
        if let Some(order) = &self.order {
            builder = builder.query_param("order", order.clone());
        }
        if let Some(page) = self.page {
            builder = builder.query_param("page", page.to_string());
        }
        if let Some(offset) = self.offset {
            builder = builder.query_param("offset", offset.to_string());
        }

        let request = builder.build().map_err(crate::clients::HttpError::from)?;
        let response = self.engine.http().request(request).await?;
        let decoded = SyncResponse::from_http(&response, &self.descriptor);

        Ok(decoded
            .elements()
            .iter()
            .map(|element| {
                let mut entity = Entity::new(Arc::clone(&self.descriptor));
                entity.hydrate(element, true);
                entity
            })
            .collect())
    }
}
