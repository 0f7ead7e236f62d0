//! Single-attribute query handlers. Each performs one catalog lookup and phrases the
//! result through the response composer.

use std::sync::Arc;

use tracing::warn;

use rentdesk_core::parsing::{EntityIndex, EntityKind, EntityMatcher};
use rentdesk_db::{CatalogRepository, RepositoryError};

use crate::clock::Clock;
use crate::composer::{compose_or_fallback, ResponseComposer, ENRICH_INSTRUCTION};
use crate::reply::Reply;

pub mod availability;
pub mod brand;
pub mod color;
pub mod location;
pub mod price;
pub mod year;

pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Sorry, a database error occurred while looking that up. Please try again shortly.";

/// Collaborators shared by the handlers, the recommender, and booking narrowing.
#[derive(Clone)]
pub struct HandlerContext {
    pub catalog: Arc<dyn CatalogRepository>,
    pub composer: Arc<dyn ResponseComposer>,
    pub matcher: Arc<dyn EntityMatcher>,
    pub clock: Arc<dyn Clock>,
}

impl HandlerContext {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        composer: Arc<dyn ResponseComposer>,
        matcher: Arc<dyn EntityMatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { catalog, composer, matcher, clock }
    }

    /// Catalog value of `kind` mentioned in `text`, per the configured matcher.
    pub async fn detect_entity(
        &self,
        kind: EntityKind,
        text: &str,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self.entity_index(kind).await?.detect(kind, text))
    }

    pub async fn entity_index(&self, kind: EntityKind) -> Result<EntityIndex, RepositoryError> {
        let values = self.catalog.find_distinct_values(kind).await?;
        let mut index = EntityIndex::new(self.matcher.clone());
        index.insert(kind, values);
        Ok(index)
    }

    /// Rephrases a templated answer in the assistant's tone.
    pub async fn enrich(&self, base: String) -> String {
        compose_or_fallback(self.composer.as_ref(), ENRICH_INSTRUCTION, &base, base.clone()).await
    }
}

pub(crate) fn catalog_unavailable(handler: &'static str, error: &RepositoryError) -> Reply {
    warn!(
        event_name = "catalog.unavailable",
        handler,
        error = %error,
        "catalog lookup failed"
    );
    Reply::text(CATALOG_UNAVAILABLE_MESSAGE)
}

/// Upper-cases the first character, leaving the rest as stored.
pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
