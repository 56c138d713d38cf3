use crate::models::WorkflowStep;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown evidence item {0}")]
    UnknownItem(String),

    #[error("item {item_id} cannot {action} while {step}")]
    InvalidTransition {
        item_id: String,
        step: WorkflowStep,
        action: &'static str,
    },

    #[error("item {item_id} has no plate to look up")]
    MissingPlate { item_id: String },

    #[error("item {item_id} has no violation selected")]
    MissingSelection { item_id: String },

    #[error("backend rejected {operation} ({status}): {message}")]
    Backend {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("transport failure during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
}
