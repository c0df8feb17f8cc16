//! Explicit message-type routing.
//!
//! A [`HandlerRegistry`] maps message-type tags to handlers; it is populated
//! at startup and looked up by key, with no runtime type scanning. The
//! [`RegistryHandler`] adapter implements [`MessageHandler`], reads the tag
//! from a configured header, and dispatches to the registered handler.
//! Unroutable messages go to the optional fallback handler; with no fallback
//! they surface through the dispatch loop's error hook.

use std::collections::HashMap;
use std::sync::Arc;

use crate::transport::{BoxFuture, MessageHandler, ReceivedMessage};
use crate::{CourierError, Result};

/// Startup-populated map from message-type tag to handler.
pub struct HandlerRegistry {
    type_header: String,
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
    fallback: Option<Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry routing on the given header key.
    #[must_use]
    pub fn new(type_header: impl Into<String>) -> Self {
        Self {
            type_header: type_header.into(),
            handlers: HashMap::new(),
            fallback: None,
        }
    }

    /// Register a handler for a message-type tag, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        self.handlers.insert(tag.into(), handler);
    }

    /// Set the handler for messages whose tag is absent or unregistered.
    pub fn set_fallback(&mut self, handler: Arc<dyn MessageHandler>) {
        self.fallback = Some(handler);
    }

    /// Number of registered tags, excluding the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no tags are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Wrap the registry into a dispatchable handler.
    #[must_use]
    pub fn into_handler(self) -> Arc<dyn MessageHandler> {
        Arc::new(RegistryHandler { registry: self })
    }
}

/// [`MessageHandler`] adapter that routes through a [`HandlerRegistry`].
pub struct RegistryHandler {
    registry: HandlerRegistry,
}

impl MessageHandler for RegistryHandler {
    fn handle(&self, message: Box<dyn ReceivedMessage>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let tag = message
                .header(&self.registry.type_header)
                .map(str::to_owned);
            let routed = tag
                .as_deref()
                .and_then(|tag| self.registry.handlers.get(tag))
                .or(self.registry.fallback.as_ref());
            match routed {
                Some(handler) => handler.handle(message).await,
                None => Err(CourierError::Handler(match tag {
                    Some(tag) => format!("no handler registered for message type '{tag}'"),
                    None => format!(
                        "message carries no '{}' header and no fallback is registered",
                        self.registry.type_header
                    ),
                })),
            }
        })
    }
}
