//! Error kinds surfaced by the fetcher and the display settings store.
//!
//! Every variant is terminal for a single CLI invocation; `main` turns it into a
//! message on stderr and a non-zero exit status.
use std::collections::BTreeSet;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Connection failure, timeout or non-2xx status from the exchange.
    #[error("unable to open the link {url}: {reason}")]
    Network { url: String, reason: String },

    /// The quote page did not carry a decodable payload for this code.
    #[error("\"{0}\" is invalid stock code")]
    InvalidCode(String),

    /// An expected setting row is missing or unreadable; re-bootstrap required.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Field names rejected by `add_fields` or `remove_fields`.
    #[error("{}", validation_message(.already_exists, .invalid))]
    Validation {
        already_exists: BTreeSet<String>,
        invalid: BTreeSet<String>,
    },

    /// No catalog row matches the security code.
    #[error("no company found for code {0}")]
    NotFound(String),

    /// The security catalog CSV could not be imported.
    #[error("error while importing the security catalog: {0}")]
    Import(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        Error::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn validation_message(already_exists: &BTreeSet<String>, invalid: &BTreeSet<String>) -> String {
    let mut lines = Vec::with_capacity(3);

    if !already_exists.is_empty() {
        lines.push(format!("field {:?} already exists", already_exists));
    }

    if !invalid.is_empty() {
        lines.push(format!("field {:?} is invalid", invalid));
    }

    lines.push("please provide valid inputs".to_string());
    lines.join("\n")
}
