use thiserror::Error;

use crate::dom::NodeType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No root element was given")]
    MissingElement,
    #[error("Expected a DOM element, found a {0} node")]
    InvalidElement(NodeType),
    #[error("Expected a boolean loading state, found {found}")]
    InvalidStateArgument { found: &'static str },
    #[error("Invalid loading options")]
    Options(#[from] serde_json::Error),
    #[error("The loading instance has been released")]
    Released,
    #[error("The node cannot be inserted here")]
    Hierarchy,
    #[error("Malformed markup at byte {position}: {reason}")]
    Markup {
        position: usize,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
