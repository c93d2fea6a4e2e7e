//! Interface to an external state transition tool.
//!
//! The harness never executes transactions itself. It hands the parent
//! state, the pending block and its transactions to a [`TransitionTool`]
//! and takes the computed roots and post-state back.

pub mod error;
pub mod request;
pub mod response;
pub mod t8n;

pub use error::ToolError;
pub use request::TransitionRequest;
pub use response::ToolResponse;
pub use t8n::T8nTool;

/// Something that can apply a block of transactions to a state.
///
/// Implementations must be deterministic for a given request and keep no
/// state between calls.
pub trait TransitionTool: Send + Sync {
    fn apply(&self, request: &TransitionRequest<'_>) -> Result<ToolResponse, ToolError>;
}

impl<T: TransitionTool + ?Sized> TransitionTool for Box<T> {
    fn apply(&self, request: &TransitionRequest<'_>) -> Result<ToolResponse, ToolError> {
        (**self).apply(request)
    }
}

impl<T: TransitionTool + ?Sized> TransitionTool for std::sync::Arc<T> {
    fn apply(&self, request: &TransitionRequest<'_>) -> Result<ToolResponse, ToolError> {
        (**self).apply(request)
    }
}
