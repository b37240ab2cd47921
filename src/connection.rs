//! The client end of a beanstalkd session.
use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

use crate::error::BrokerError;
use crate::line_reader::LineReader;
use crate::parser::is_valid_tube_name;
use crate::types::job::{Job, PutParams};
use crate::types::protocol::{BeanstalkCommand, BeanstalkResponse};
use crate::types::serialisable::BeanstalkSerialisable;
use crate::util::bytes_to_human_str;

/// The tube a fresh session uses, and the only tube it watches.
pub const DEFAULT_TUBE: &str = "default";

/// The broker primitives push and pull are built from.
///
/// A fresh session uses, and watches only, [`DEFAULT_TUBE`].
#[allow(async_fn_in_trait)]
pub trait Broker {
    /// Selects the tube subsequent `put`s are placed on.
    async fn use_tube(&mut self, tube: &str) -> Result<(), BrokerError>;

    /// Adds a tube to the watch set, returning how many tubes are now watched.
    /// Watching an already-watched tube changes nothing.
    async fn watch(&mut self, tube: &str) -> Result<u32, BrokerError>;

    /// Removes a tube from the watch set, returning how many tubes are now
    /// watched. Fails rather than leave the watch set empty.
    async fn ignore(&mut self, tube: &str) -> Result<u32, BrokerError>;

    /// Enqueues a job on the used tube, returning its ID once the broker has
    /// accepted it.
    async fn put(
        &mut self,
        body: &[u8],
        params: PutParams,
    ) -> Result<u64, BrokerError>;

    /// Waits, with no time limit, for a ready job on any watched tube.
    async fn reserve(&mut self) -> Result<Job, BrokerError>;

    async fn delete(&mut self, id: u64) -> Result<(), BrokerError>;

    /// Lists the tubes currently in the watch set.
    async fn list_tubes_watched(&mut self) -> Result<Vec<String>, BrokerError>;
}

/// A session with a broker over any byte stream, usually a `TcpStream`.
pub struct Connection<S: AsyncRead + AsyncWrite + Unpin> {
    stream: LineReader<S>,
}

impl Connection<TcpStream> {
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let conn = TcpStream::connect(addr).await?;

        // Every request is a single small write awaiting a reply.
        conn.set_nodelay(true)?;

        Ok(conn.into())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> From<S> for Connection<S> {
    fn from(value: S) -> Self {
        Self {
            stream: value.into(),
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Writes out a command and reads back the response line.
    async fn request(
        &mut self,
        cmd: BeanstalkCommand<'_>,
    ) -> Result<BeanstalkResponse, BrokerError> {
        let w = self.stream.get_mut();
        w.write_all(&cmd.serialise_beanstalk()).await?;
        w.flush().await?;

        let line = self.stream.read_line().await?.ok_or(BrokerError::Closed)?;

        trace!(line = bytes_to_human_str(&line), "received response");

        BeanstalkResponse::try_from(&line as &[u8]).map_err(|error| {
            BrokerError::Unexpected(format!(
                "{error}: {}",
                bytes_to_human_str(&line)
            ))
        })
    }

    /// Reads the data block following a `RESERVED` or `OK` response.
    async fn read_data(&mut self, n_bytes: u32) -> Result<Bytes, BrokerError> {
        let n = n_bytes as usize;

        let data = match self.stream.read_exact_bytes(n + 2).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(BrokerError::Closed);
            },
            Err(e) => return Err(e.into()),
        };

        if &data[n..] != b"\r\n" {
            return Err(BrokerError::Unexpected(
                "data block not terminated by CRLF".to_owned(),
            ));
        }

        Ok(data.slice(..n))
    }
}

/// Rejects a name the broker would answer with `BAD_FORMAT`.
fn check_tube_name(tube: &str) -> Result<(), BrokerError> {
    if is_valid_tube_name(tube.as_bytes()) {
        Ok(())
    } else {
        Err(BrokerError::InvalidTubeName(tube.to_owned()))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Broker for Connection<S> {
    async fn use_tube(&mut self, tube: &str) -> Result<(), BrokerError> {
        check_tube_name(tube)?;

        match self.request(BeanstalkCommand::Use { tube }).await? {
            BeanstalkResponse::Using { .. } => Ok(()),
            other => Err(other.into_error()),
        }
    }

    async fn watch(&mut self, tube: &str) -> Result<u32, BrokerError> {
        check_tube_name(tube)?;

        match self.request(BeanstalkCommand::Watch { tube }).await? {
            BeanstalkResponse::Watching { count } => Ok(count),
            other => Err(other.into_error()),
        }
    }

    async fn ignore(&mut self, tube: &str) -> Result<u32, BrokerError> {
        check_tube_name(tube)?;

        match self.request(BeanstalkCommand::Ignore { tube }).await? {
            BeanstalkResponse::Watching { count } => Ok(count),
            other => Err(other.into_error()),
        }
    }

    async fn put(
        &mut self,
        body: &[u8],
        params: PutParams,
    ) -> Result<u64, BrokerError> {
        match self.request(BeanstalkCommand::Put { params, body }).await? {
            BeanstalkResponse::Inserted { id } => Ok(id),
            other => Err(other.into_error()),
        }
    }

    async fn reserve(&mut self) -> Result<Job, BrokerError> {
        match self.request(BeanstalkCommand::Reserve).await? {
            BeanstalkResponse::Reserved { id, n_bytes } => {
                let body = self.read_data(n_bytes).await?;
                Ok(Job { id, body })
            },
            other => Err(other.into_error()),
        }
    }

    async fn delete(&mut self, id: u64) -> Result<(), BrokerError> {
        match self.request(BeanstalkCommand::Delete { id }).await? {
            BeanstalkResponse::Deleted => Ok(()),
            other => Err(other.into_error()),
        }
    }

    async fn list_tubes_watched(&mut self) -> Result<Vec<String>, BrokerError> {
        match self.request(BeanstalkCommand::ListTubesWatched).await? {
            BeanstalkResponse::OkData { n_bytes } => {
                let data = self.read_data(n_bytes).await?;
                Ok(serde_yaml::from_slice(&data)?)
            },
            other => Err(other.into_error()),
        }
    }
}
