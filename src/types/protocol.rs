use super::job::PutParams;
use super::serialisable::BeanstalkSerialisable;
use crate::error::BrokerError;

/// A command sent by the client to the server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum BeanstalkCommand<'a> {
    /// Places a job onto the currently `use`d tube. The body follows the
    /// command line and is itself terminated by a CRLF.
    ///
    /// On the wire: `put <pri> <delay> <ttr> <n_bytes>`
    Put { params: PutParams, body: &'a [u8] },
    /// Awaits a job from all the `watch`ed tubes, blocking until one appears.
    ///
    /// On the wire: `reserve`
    Reserve,
    /// Deletes a job reserved by this client.
    ///
    /// On the wire: `delete <id>`
    Delete { id: u64 },
    /// Adds a tube to the watchlist for this client.
    ///
    /// On the wire: `watch <tube>`
    Watch { tube: &'a str },
    /// Reverses the effect of `watch` on this client.
    ///
    /// On the wire: `ignore <tube>`
    Ignore { tube: &'a str },
    /// Asks for the tubes this client is currently watching.
    ///
    /// On the wire: `list-tubes-watched`
    ListTubesWatched,
    /// Selects the tube subsequent `put`s are placed on.
    ///
    /// On the wire: `use <tube>`
    Use { tube: &'a str },
}

impl BeanstalkSerialisable for BeanstalkCommand<'_> {
    fn serialise_beanstalk(&self) -> Vec<u8> {
        use BeanstalkCommand::*;

        match self {
            Put { params, body } => [
                format!(
                    "put {} {} {} {}\r\n",
                    params.pri,
                    params.delay,
                    params.ttr,
                    body.len()
                )
                .into_bytes(),
                body.to_vec(),
                b"\r\n".to_vec(),
            ]
            .concat(),
            Reserve => b"reserve\r\n".to_vec(),
            Delete { id } => format!("delete {id}\r\n").into(),
            Watch { tube } => format!("watch {tube}\r\n").into(),
            Ignore { tube } => format!("ignore {tube}\r\n").into(),
            ListTubesWatched => b"list-tubes-watched\r\n".to_vec(),
            Use { tube } => format!("use {tube}\r\n").into(),
        }
    }
}

/// The responses a client can receive to the commands it sends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum BeanstalkResponse {
    /// The server cannot handle the command due to memory pressure. Can be
    /// sent in response to any command.
    ///
    /// On the wire: `OUT_OF_MEMORY`.
    OutOfMemory,
    /// Indicates a server bug. Can be sent in response to any command.
    ///
    /// On the wire: `INTERNAL_ERROR`.
    InternalError,
    /// The server rejected a malformed command, such as a tube name it does
    /// not accept or an out of range number.
    ///
    /// On the wire: `BAD_FORMAT`.
    BadFormat,
    /// On the wire: `UNKNOWN_COMMAND`.
    UnknownCommand,
    /// In response to a `put`, a job was created with the given ID.
    ///
    /// On the wire: `INSERTED <id>`.
    Inserted { id: u64 },
    /// In response to a `put`, the server was out of memory and buried the
    /// job immediately.
    ///
    /// On the wire: `BURIED <id>`.
    BuriedId { id: u64 },
    /// In response to a `put`, the body was not terminated by a CRLF.
    ///
    /// On the wire: `EXPECTED_CRLF`.
    ExpectedCRLF,
    /// In response to a `put`, the body exceeded the server's maximum job
    /// size.
    ///
    /// On the wire: `JOB_TOO_BIG`.
    JobTooBig,
    /// In response to a `put`, the server is not accepting new jobs.
    ///
    /// On the wire: `DRAINING`.
    Draining,
    /// In response to a `use`, names the tube now in use.
    ///
    /// On the wire: `USING <tube>`.
    Using { tube: Vec<u8> },
    /// In response to a `reserve`, a job this client already holds is about
    /// to exceed its TTR.
    ///
    /// On the wire: `DEADLINE_SOON`.
    DeadlineSoon,
    /// On the wire: `TIMED_OUT`.
    TimedOut,
    /// In response to a `reserve`, the ID and length of the reserved job. The
    /// body follows on the wire.
    ///
    /// On the wire: `RESERVED <id> <n_bytes>` plus data.
    Reserved { id: u64, n_bytes: u32 },
    /// In response to a `delete`, the job is unknown or isn't reserved by this
    /// client.
    ///
    /// On the wire: `NOT_FOUND`.
    NotFound,
    /// On the wire: `DELETED`.
    Deleted,
    /// In response to a `watch` or `ignore`, the number of tubes now watched.
    ///
    /// On the wire: `WATCHING <count>`.
    Watching { count: u32 },
    /// In response to an `ignore`, the command would have left the client
    /// with an empty watchlist.
    ///
    /// On the wire: `NOT_IGNORED`.
    NotIgnored,
    /// In response to a `list-tubes-watched`, the length of the YAML list that
    /// follows on the wire.
    ///
    /// On the wire: `OK <n_bytes>` plus data.
    OkData { n_bytes: u32 },
}

impl BeanstalkResponse {
    /// The response keyword as sent on the wire.
    pub(crate) fn name(&self) -> &'static str {
        use BeanstalkResponse::*;

        match self {
            OutOfMemory => "OUT_OF_MEMORY",
            InternalError => "INTERNAL_ERROR",
            BadFormat => "BAD_FORMAT",
            UnknownCommand => "UNKNOWN_COMMAND",
            Inserted { .. } => "INSERTED",
            BuriedId { .. } => "BURIED",
            ExpectedCRLF => "EXPECTED_CRLF",
            JobTooBig => "JOB_TOO_BIG",
            Draining => "DRAINING",
            Using { .. } => "USING",
            DeadlineSoon => "DEADLINE_SOON",
            TimedOut => "TIMED_OUT",
            Reserved { .. } => "RESERVED",
            NotFound => "NOT_FOUND",
            Deleted => "DELETED",
            Watching { .. } => "WATCHING",
            NotIgnored => "NOT_IGNORED",
            OkData { .. } => "OK",
        }
    }

    /// Converts a response that didn't match what the command expected into
    /// an error. Error responses become `Rejected`; success responses that
    /// belong to some other command become `Unexpected`.
    pub(crate) fn into_error(self) -> BrokerError {
        use BeanstalkResponse::*;

        match self {
            OutOfMemory | InternalError | BadFormat | UnknownCommand
            | BuriedId { .. } | ExpectedCRLF | JobTooBig | Draining
            | DeadlineSoon | TimedOut | NotFound | NotIgnored => {
                BrokerError::Rejected(self.name())
            },
            Inserted { .. }
            | Using { .. }
            | Reserved { .. }
            | Deleted
            | Watching { .. }
            | OkData { .. } => BrokerError::Unexpected(self.name().to_owned()),
        }
    }
}
