//! Shared domain types for the Shoptalk system.
//!
//! Messages and conversation turns, the closed handler-id enumeration used
//! for routing, and the retrieval types (hits and evidence bundles) that
//! flow from the vector layer into the specialists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation message. Immutable once created; ordering within a
/// conversation equals arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The closed set of specialist identifiers.
///
/// Routing always resolves to exactly one of these; there is deliberately no
/// "unhandled" or "answer directly" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerId {
    /// Product catalog questions: pricing, specs, colors, availability.
    Product,
    /// Store-operational questions: hours, location, contact, policies.
    ShopInfo,
}

impl HandlerId {
    /// All known handler ids, in registry order.
    pub const ALL: [HandlerId; 2] = [HandlerId::Product, HandlerId::ShopInfo];
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerId::Product => write!(f, "product"),
            HandlerId::ShopInfo => write!(f, "shop_info"),
        }
    }
}

impl FromStr for HandlerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(HandlerId::Product),
            "shop_info" => Ok(HandlerId::ShopInfo),
            other => Err(format!("unknown handler id: {}", other)),
        }
    }
}

/// Outcome of intent classification: the one specialist that will handle the
/// query, plus the classifier confidence that picked it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDecision {
    pub handler_id: HandlerId,
    pub confidence: f32,
}

/// One evidence item returned by the retrieval engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Canonical text of the matched document.
    pub text: String,
    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,
    /// 0-based position in the returned ordering (descending score).
    pub rank: usize,
}

/// An ordered bundle of retrieval hits, consumed once by a specialist and
/// then discarded. Scores are non-increasing by rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceBundle {
    pub hits: Vec<RetrievalHit>,
}

impl EvidenceBundle {
    pub fn new(hits: Vec<RetrievalHit>) -> Self {
        Self { hits }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Render the bundle as a grounding blob for the generation call.
    ///
    /// Each hit is labeled with its rank and separated by a blank line.
    /// Downstream generation quality depends on this layout staying stable,
    /// so it is part of the retrieval contract.
    pub fn render(&self) -> String {
        self.hits
            .iter()
            .map(|hit| format!("{}).\n{}", hit.rank, hit.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The answer produced by a specialist. Opaque to the router and
/// orchestrator beyond the answer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResult {
    pub answer: String,
}
