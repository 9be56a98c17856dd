//! Conversational dispatch for Shoptalk.
//!
//! Provides the thread-scoped conversation store, the rule-based intent
//! router, the specialist handlers (product and shop information), the
//! generation collaborator adapters, and the chat orchestrator tying them
//! together per request.

pub mod error;
pub mod generate;
pub mod orchestrator;
pub mod router;
pub mod specialist;
pub mod store;
pub mod tabular;

pub use error::ChatError;
pub use generate::{EchoGenerator, Generator, HttpGenerator};
pub use orchestrator::{ChatOrchestrator, ChatReply};
pub use router::IntentRouter;
pub use specialist::{DomainSpecialist, Specialist, SpecialistRegistry};
pub use store::{ConversationStore, MemoryConversationStore};
pub use tabular::{FileTableSource, TabularSource};
