//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ModelProvider` - generative model invocation with retryable/fatal
//!   error classification
//! - `ConversationStore` - keyed load/save of ordered turn logs
//! - `TurnObserver` - advisory progress notifications

mod conversation_store;
mod model_provider;
mod turn_observer;

pub use conversation_store::{ConversationStore, StoreError};
pub use model_provider::{
    MessageRole, ModelError, ModelMessage, ModelProvider, ModelRequest, ModelResponse,
    ProviderInfo, RequestPurpose,
};
pub use turn_observer::{NoOpObserver, TurnObserver};
