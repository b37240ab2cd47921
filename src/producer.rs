//! Turns input into jobs on the broker.
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument};

use crate::connection::Broker;
use crate::error::{Error, Result};
use crate::types::job::PutParams;
use crate::util::bytes_to_human_str;

/// How input is divided into jobs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// The whole input, unmodified, is one job.
    #[default]
    Single,
    /// Each newline-separated line is its own job; blank lines are skipped.
    Multiline,
}

/// Splits input into job bodies according to `mode`, without copying. Never
/// yields an empty body.
pub fn job_bodies(data: &Bytes, mode: Mode) -> Vec<Bytes> {
    match mode {
        Mode::Single if data.is_empty() => Vec::new(),
        Mode::Single => vec![data.clone()],
        Mode::Multiline => data
            .split(|&c| c == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| data.slice_ref(line))
            .collect(),
    }
}

/// Reads all of `input` and enqueues it as one or more jobs, returning the IDs
/// the broker assigned, in input order.
///
/// A non-empty `tube` is `use`d before anything is read. The first failed put
/// stops the push; jobs the broker accepted before it stay enqueued.
#[instrument(name = "push", skip_all, fields(tube = %tube, mode = ?mode))]
pub async fn push<B, R>(
    broker: &mut B,
    tube: &str,
    mode: Mode,
    params: PutParams,
    mut input: R,
) -> Result<Vec<u64>>
where
    B: Broker,
    R: AsyncRead + Unpin,
{
    if !tube.is_empty() {
        broker.use_tube(tube).await.map_err(|source| Error::Use {
            tube: tube.to_owned(),
            source,
        })?;
        debug!("using tube");
    }

    let mut data = Vec::new();
    input.read_to_end(&mut data).await.map_err(Error::ReadInput)?;
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    let data = Bytes::from(data);

    debug!(data = bytes_to_human_str(&data), "read input");

    let mut ids = Vec::new();
    for body in job_bodies(&data, mode) {
        let id = broker.put(&body, params).await.map_err(Error::Put)?;
        debug!(id, n_bytes = body.len(), "inserted job");
        ids.push(id);
    }

    Ok(ids)
}
