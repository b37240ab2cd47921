//! An in-memory stand-in for the broker that records every primitive called
//! on it and models the session's used tube and watch set.
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::subscriber::DefaultGuard;
use tracing::Level;

use crate::connection::{Broker, DEFAULT_TUBE};
use crate::error::BrokerError;
use crate::types::job::{Job, PutParams};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Call {
    Use(String),
    Watch(String),
    Ignore(String),
    Put(Bytes, PutParams),
    Reserve,
    Delete(u64),
    ListTubesWatched,
}

pub(crate) struct FakeBroker {
    pub(crate) calls: Vec<Call>,
    pub(crate) used: String,
    pub(crate) watched: Vec<String>,
    /// Jobs handed out by `reserve`, front first.
    pub(crate) ready: VecDeque<Job>,
    next_id: u64,

    /// Tube names whose `use` or `watch` the broker rejects.
    pub(crate) bad_tubes: Vec<String>,
    /// Zero-based index of the `put` that is rejected.
    pub(crate) fail_put_at: Option<usize>,
    /// Rejects every `ignore`, whatever is being watched.
    pub(crate) fail_ignore: bool,
    pub(crate) fail_delete: bool,
}

impl FakeBroker {
    pub(crate) fn new() -> Self {
        Self {
            calls: Vec::new(),
            used: DEFAULT_TUBE.to_owned(),
            watched: vec![DEFAULT_TUBE.to_owned()],
            ready: VecDeque::new(),
            next_id: 1,
            bad_tubes: Vec::new(),
            fail_put_at: None,
            fail_ignore: false,
            fail_delete: false,
        }
    }

    /// A broker with one ready job per body, with IDs counting up from 100.
    pub(crate) fn with_ready(bodies: &[&'static str]) -> Self {
        let mut broker = Self::new();
        broker.ready = bodies
            .iter()
            .zip(100..)
            .map(|(body, id)| Job {
                id,
                body: Bytes::from_static(body.as_bytes()),
            })
            .collect();
        broker
    }

    /// The bodies of every job put, in order.
    pub(crate) fn put_bodies(&self) -> Vec<Bytes> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Put(body, _) => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_tube(&self, tube: &str) -> Result<(), BrokerError> {
        if self.bad_tubes.iter().any(|bad| bad == tube) {
            Err(BrokerError::Rejected("BAD_FORMAT"))
        } else {
            Ok(())
        }
    }
}

impl Broker for FakeBroker {
    async fn use_tube(&mut self, tube: &str) -> Result<(), BrokerError> {
        self.calls.push(Call::Use(tube.to_owned()));
        self.check_tube(tube)?;
        self.used = tube.to_owned();
        Ok(())
    }

    async fn watch(&mut self, tube: &str) -> Result<u32, BrokerError> {
        self.calls.push(Call::Watch(tube.to_owned()));
        self.check_tube(tube)?;
        if !self.watched.iter().any(|t| t == tube) {
            self.watched.push(tube.to_owned());
        }
        Ok(self.watched.len() as u32)
    }

    async fn ignore(&mut self, tube: &str) -> Result<u32, BrokerError> {
        self.calls.push(Call::Ignore(tube.to_owned()));
        if self.fail_ignore || self.watched == [tube] {
            return Err(BrokerError::Rejected("NOT_IGNORED"));
        }
        self.watched.retain(|t| t != tube);
        Ok(self.watched.len() as u32)
    }

    async fn put(
        &mut self,
        body: &[u8],
        params: PutParams,
    ) -> Result<u64, BrokerError> {
        let n_puts = self.put_bodies().len();
        self.calls
            .push(Call::Put(Bytes::copy_from_slice(body), params));
        if self.fail_put_at == Some(n_puts) {
            return Err(BrokerError::Rejected("JOB_TOO_BIG"));
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    async fn reserve(&mut self) -> Result<Job, BrokerError> {
        self.calls.push(Call::Reserve);
        // A real broker would block here; there's nobody to wait for.
        self.ready.pop_front().ok_or(BrokerError::Rejected("TIMED_OUT"))
    }

    async fn delete(&mut self, id: u64) -> Result<(), BrokerError> {
        self.calls.push(Call::Delete(id));
        if self.fail_delete {
            Err(BrokerError::Rejected("NOT_FOUND"))
        } else {
            Ok(())
        }
    }

    async fn list_tubes_watched(&mut self) -> Result<Vec<String>, BrokerError> {
        self.calls.push(Call::ListTubesWatched);
        Ok(self.watched.clone())
    }
}

/// Log output collected by [`capture_logs`].
#[derive(Clone, Default)]
pub(crate) struct Logs(Arc<Mutex<Vec<u8>>>);

impl Logs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Logs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sends this thread's log events at `level` and above to the returned
/// buffer, for as long as the guard lives.
pub(crate) fn capture_logs(level: Level) -> (Logs, DefaultGuard) {
    let logs = Logs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}
