//! Error types for beanc.
use std::io;

use thiserror::Error;

/// Failures of a single broker primitive.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("i/o error")]
    Io(#[from] io::Error),

    #[error("connection closed by broker")]
    Closed,

    /// The broker answered with an error response, e.g. `NOT_IGNORED`.
    #[error("broker replied {0}")]
    Rejected(&'static str),

    #[error("unexpected response: {0}")]
    Unexpected(String),

    /// Caught before anything was sent.
    #[error("invalid tube name {0:?}")]
    InvalidTubeName(String),

    #[error("malformed tube list")]
    BadListing(#[from] serde_yaml::Error),
}

/// A fatal failure of a push or pull, naming the step that failed. The
/// underlying cause is left to the error's `source`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connect to {addr} failed")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("use {tube} failed")]
    Use {
        tube: String,
        #[source]
        source: BrokerError,
    },

    #[error("watch {tube} failed")]
    Watch {
        tube: String,
        #[source]
        source: BrokerError,
    },

    #[error("ignore {tube} failed")]
    Ignore {
        tube: String,
        #[source]
        source: BrokerError,
    },

    #[error("stdin read error")]
    ReadInput(#[source] io::Error),

    #[error("stdin has no data")]
    EmptyInput,

    #[error("put failed")]
    Put(#[source] BrokerError),

    #[error("reserve failed")]
    Reserve(#[source] BrokerError),

    #[error("delete failed, job id {id}")]
    Delete {
        id: u64,
        #[source]
        source: BrokerError,
    },

    #[error("writing job {id} to stdout failed")]
    WriteOutput {
        id: u64,
        #[source]
        source: io::Error,
    },

    #[error("unrecognised action {0:?}, expected push or pull")]
    UnknownAction(String),
}

impl Error {
    /// Whether this is a mistake in how beanc was invoked, rather than a
    /// failure talking to the broker.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::UnknownAction(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
