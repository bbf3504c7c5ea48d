use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Markup parse error: {0}")]
    Markup(#[from] quick_xml::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route pattern: {0}")]
    Route(#[from] regex::Error),

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Node not found: {0}")]
    NodeNotFound(u64),

    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
