//! Scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use rentdesk_core::domain::car::{CarRecord, PriceOperator};
use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::{EntityKind, TokenEntityMatcher};
use rentdesk_db::{CatalogRepository, DemoCatalog, RepositoryError};

use crate::classifier::LlmIntentClassifier;
use crate::clock::FixedClock;
use crate::composer::ResponseComposer;
use crate::extractor::LlmPreferenceExtractor;
use crate::handlers::HandlerContext;
use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::router::Router;

pub(crate) struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    fail: bool,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub(crate) fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self { responses: Mutex::new(VecDeque::new()), fail: true, prompts: Mutex::new(Vec::new()) }
    }

    pub(crate) fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.prompts.lock().expect("prompts lock").push(messages.to_vec());
        if self.fail {
            return Err(LlmError::Transport("connection refused".to_string()));
        }
        self.responses.lock().expect("responses lock").pop_front().ok_or(LlmError::EmptyResponse)
    }
}

/// Echoes the data it was asked to compose, prefixed so tests can tell it ran.
#[derive(Default)]
pub(crate) struct EchoComposer {
    pub(crate) calls: AtomicUsize,
    pub(crate) fail: bool,
    instructions: Mutex<Vec<String>>,
}

impl EchoComposer {
    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn instructions(&self) -> Vec<String> {
        self.instructions.lock().expect("instructions lock").clone()
    }
}

#[async_trait]
impl ResponseComposer for EchoComposer {
    async fn compose(&self, instruction: &str, data: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.instructions.lock().expect("instructions lock").push(instruction.to_string());
        if self.fail {
            return Err(LlmError::Timeout(std::time::Duration::from_secs(1)));
        }
        Ok(format!("composed: {data}"))
    }
}

/// Wraps a catalog and counts lookups; can be switched to fail every call.
pub(crate) struct CountingCatalog {
    inner: Arc<dyn CatalogRepository>,
    pub(crate) lookups: AtomicUsize,
    fail: bool,
}

impl CountingCatalog {
    pub(crate) fn new(inner: Arc<dyn CatalogRepository>) -> Self {
        Self { inner, lookups: AtomicUsize::new(0), fail: false }
    }

    pub(crate) fn unavailable(inner: Arc<dyn CatalogRepository>) -> Self {
        Self { inner, lookups: AtomicUsize::new(0), fail: true }
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<(), RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RepositoryError::Decode("database is locked".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for CountingCatalog {
    async fn find_distinct_values(&self, kind: EntityKind) -> Result<Vec<String>, RepositoryError> {
        self.record()?;
        self.inner.find_distinct_values(kind).await
    }

    async fn find_by_filters(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_filters(filters).await
    }

    async fn find_by_any_one_filter(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_any_one_filter(filters).await
    }

    async fn find_by_price_comparison(
        &self,
        amount: Decimal,
        operator: PriceOperator,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_price_comparison(amount, operator).await
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_year(year).await
    }

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_brand(brand).await
    }

    async fn find_by_model(&self, model: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_model(model).await
    }

    async fn find_by_color(&self, color: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_color(color).await
    }

    async fn find_by_location(&self, location: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_by_location(location).await
    }

    async fn find_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        self.record()?;
        self.inner.find_available(start, end).await
    }
}

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub(crate) async fn demo_catalog() -> Arc<dyn CatalogRepository> {
    Arc::new(DemoCatalog::in_memory().await.expect("demo catalog"))
}

pub(crate) fn context(
    catalog: Arc<dyn CatalogRepository>,
    composer: Arc<dyn ResponseComposer>,
) -> HandlerContext {
    HandlerContext::new(catalog, composer, Arc::new(TokenEntityMatcher), Arc::new(FixedClock(today())))
}

pub(crate) fn router(
    catalog: Arc<dyn CatalogRepository>,
    composer: Arc<dyn ResponseComposer>,
    classifier_llm: ScriptedLlm,
    extractor_llm: ScriptedLlm,
) -> Router {
    Router::new(
        Arc::new(LlmIntentClassifier::new(Arc::new(classifier_llm))),
        Arc::new(LlmPreferenceExtractor::new(Arc::new(extractor_llm), Arc::new(FixedClock(today())))),
        context(catalog, composer),
    )
}
