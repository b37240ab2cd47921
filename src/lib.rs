//! A command line client for beanstalkd-compatible work queues.
//!
//! `push` enqueues standard input as one job, or one job per line; `pull`
//! reserves a single job from a set of watched tubes, deletes it, and hands
//! back its body.

pub mod config;
pub mod connection;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod line_reader;
pub mod parser;
pub mod producer;
pub mod util;

pub mod types {
    pub mod job;
    pub(crate) mod protocol;
    pub mod serialisable;
}

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BrokerError, Error, Result};
