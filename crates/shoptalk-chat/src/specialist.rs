//! Specialist handlers and their registry.
//!
//! Each specialist owns one retrieval collection and one instruction and
//! follows the same two-phase shape: retrieve evidence for the query, then
//! generate an answer grounded in that evidence. Generation never runs
//! before retrieval has completed, and retrieved evidence is used for one
//! request and then discarded.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use shoptalk_core::types::{HandlerId, HandlerResult, Message};
use shoptalk_vector::retrieval::RetrievalEngine;

use crate::error::ChatError;
use crate::generate::Generator;

/// A domain handler: answers one category of customer question.
#[async_trait]
pub trait Specialist: Send + Sync {
    /// The identifier this specialist is registered under.
    fn id(&self) -> HandlerId;

    /// Answer the query given the conversation history so far.
    async fn handle(&self, query: &str, history: &[Message]) -> Result<HandlerResult, ChatError>;
}

/// Retrieval-then-generation specialist over one named collection.
pub struct DomainSpecialist {
    id: HandlerId,
    collection: String,
    top_k: usize,
    instruction: String,
    engine: Arc<RetrievalEngine>,
    generator: Arc<dyn Generator>,
}

impl DomainSpecialist {
    pub fn new(
        id: HandlerId,
        collection: impl Into<String>,
        top_k: usize,
        instruction: impl Into<String>,
        engine: Arc<RetrievalEngine>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            id,
            collection: collection.into(),
            top_k,
            instruction: instruction.into(),
            engine,
            generator,
        }
    }

    /// The product-catalog specialist: pricing, specs, colors, availability.
    pub fn product(
        collection: impl Into<String>,
        top_k: usize,
        engine: Arc<RetrievalEngine>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self::new(
            HandlerId::Product,
            collection,
            top_k,
            "You are a product consultant for a phone store. Answer customer \
             questions about products, prices, specifications, colors, and \
             availability using the provided product information.",
            engine,
            generator,
        )
    }

    /// The store-information specialist: hours, location, contact, policies.
    pub fn shop_info(
        collection: impl Into<String>,
        top_k: usize,
        engine: Arc<RetrievalEngine>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self::new(
            HandlerId::ShopInfo,
            collection,
            top_k,
            "You are a customer service agent for a phone store. Answer \
             questions about opening hours, addresses, contact details, and \
             store policies using the provided store information.",
            engine,
            generator,
        )
    }
}

#[async_trait]
impl Specialist for DomainSpecialist {
    fn id(&self) -> HandlerId {
        self.id
    }

    async fn handle(&self, query: &str, history: &[Message]) -> Result<HandlerResult, ChatError> {
        // Retrieval always precedes generation.
        let evidence = self
            .engine
            .search(query, &self.collection, self.top_k)
            .await?;
        debug!(
            handler = %self.id,
            collection = %self.collection,
            hits = evidence.len(),
            "Evidence retrieved"
        );

        let answer = self
            .generator
            .generate(&self.instruction, query, history, &evidence.render())
            .await?;

        Ok(HandlerResult { answer })
    }
}

/// Registry mapping handler ids to their specialists.
///
/// Built once at startup; dispatch is a plain map lookup so the same id
/// always reaches the same specialist.
pub struct SpecialistRegistry {
    specialists: HashMap<HandlerId, Arc<dyn Specialist>>,
}

impl SpecialistRegistry {
    pub fn new() -> Self {
        Self {
            specialists: HashMap::new(),
        }
    }

    /// Register a specialist under its own id, replacing any previous one.
    pub fn register(&mut self, specialist: Arc<dyn Specialist>) {
        let id = specialist.id();
        info!(handler = %id, "Specialist registered");
        self.specialists.insert(id, specialist);
    }

    /// Handler ids with a registered specialist, in declaration order.
    pub fn available(&self) -> Vec<HandlerId> {
        HandlerId::ALL
            .into_iter()
            .filter(|id| self.specialists.contains_key(id))
            .collect()
    }

    /// Look up the specialist for a handler id.
    pub fn get(&self, id: HandlerId) -> Result<&Arc<dyn Specialist>, ChatError> {
        self.specialists
            .get(&id)
            .ok_or_else(|| ChatError::UnknownHandler(id.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.specialists.is_empty()
    }
}

impl Default for SpecialistRegistry {
    fn default() -> Self {
        Self::new()
    }
}
