//! Chat orchestrator: coordinates routing, specialist dispatch, and
//! conversation persistence for one request at a time.
//!
//! Per request: validate the message, resolve the thread, snapshot the
//! history, then under the request deadline route to exactly one specialist
//! and run it, and finally append the completed turn. The whole pipeline runs
//! within the caller's request task, so distinct threads proceed in
//! parallel while each thread's appends serialize in the store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use shoptalk_core::config::ChatConfig;
use shoptalk_core::types::Message;

use crate::error::ChatError;
use crate::router::IntentRouter;
use crate::specialist::SpecialistRegistry;
use crate::store::ConversationStore;

/// The reply returned to the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub thread_id: String,
}

/// Central coordinator for the chat pipeline.
pub struct ChatOrchestrator {
    router: IntentRouter,
    registry: SpecialistRegistry,
    store: Arc<dyn ConversationStore>,
    timeout: Duration,
}

impl ChatOrchestrator {
    /// Create an orchestrator from wired collaborators and the chat section
    /// of the configuration.
    pub fn new(
        router: IntentRouter,
        registry: SpecialistRegistry,
        store: Arc<dyn ConversationStore>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            router,
            registry,
            store,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Handle an incoming chat message.
    ///
    /// A missing thread id starts a fresh conversation under a generated
    /// id; the id used is always echoed in the reply. The turn is appended
    /// only after the specialist produced an answer: a deadline expiry or
    /// specialist failure leaves the conversation untouched. A persistence
    /// failure after a successful answer is logged and the answer is still
    /// returned.
    pub async fn handle_message(
        &self,
        message: &str,
        thread_id: Option<String>,
    ) -> Result<ChatReply, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let thread_id = thread_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.store.get_or_create(&thread_id);
        let history = self.store.snapshot(&thread_id);

        // The deadline covers routing, retrieval, and generation combined.
        let deadline_secs = self.timeout.as_secs();
        let (decision, result) = tokio::time::timeout(self.timeout, async {
            let decision = self.router.route(message, &self.registry.available());
            let specialist = self.registry.get(decision.handler_id)?;
            let result = specialist.handle(message, &history).await?;
            Ok::<_, ChatError>((decision, result))
        })
        .await
        .map_err(|_| ChatError::Timeout(deadline_secs))??;

        info!(
            thread_id = %thread_id,
            handler = %decision.handler_id,
            confidence = decision.confidence,
            "Chat turn completed"
        );

        if let Err(err) = self.store.append_turn(
            &thread_id,
            Message::user(message),
            Message::assistant(&result.answer),
        ) {
            // The customer already has their answer; losing the history
            // entry must not turn the request into a failure.
            warn!(thread_id = %thread_id, error = %err, "Failed to persist chat turn");
        }

        Ok(ChatReply {
            content: result.answer,
            thread_id,
        })
    }

    /// Return the stored history for a thread. Unknown ids give an empty
    /// conversation.
    pub fn history(&self, thread_id: &str) -> Vec<Message> {
        self.store.snapshot(thread_id)
    }
}

// =============================================================================
// Tests
// =============================================================================
