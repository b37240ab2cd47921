//! Runs the one push or pull an invocation asks for.
use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::config::Config;
use crate::connection::{Broker, Connection};
use crate::consumer::{self, WatchSet};
use crate::error::{Error, Result};
use crate::producer;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Enqueue input as jobs.
    Push,
    /// Dequeue one job to output.
    Pull,
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            _ => Err(Error::UnknownAction(s.to_owned())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Push => "push",
            Self::Pull => "pull",
        })
    }
}

/// Connects to the broker named in `config` and performs its action, reading
/// jobs from `input` or writing one to `output`.
pub async fn run<R, W>(config: &Config, input: R, output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut conn = Connection::connect(config.host.as_str())
        .await
        .map_err(|source| Error::Connect {
            addr: config.host.clone(),
            source,
        })?;
    debug!(host = %config.host, "connected");

    dispatch(config, &mut conn, input, output).await
}

/// Performs the action in `config` against an already-open session.
pub async fn dispatch<B, R, W>(
    config: &Config,
    broker: &mut B,
    input: R,
    mut output: W,
) -> Result<()>
where
    B: Broker,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match config.action {
        Action::Push => {
            let ids = producer::push(
                broker,
                &config.tube,
                config.mode,
                config.put,
                input,
            )
            .await?;
            debug!(?ids, "pushed jobs");
        },
        Action::Pull => {
            let watch_set = WatchSet::parse(&config.tube);
            let job =
                consumer::pull(broker, &watch_set, config.verbose).await?;

            // The body goes out exactly as reserved, with nothing added.
            let written = async {
                output.write_all(&job.body).await?;
                output.flush().await
            };
            written.await.map_err(|source| Error::WriteOutput {
                id: job.id,
                source,
            })?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;

    use crate::producer::Mode;
    use crate::testing::{Call, FakeBroker};
    use crate::types::job::PutParams;

    #[test]
    fn test_parse_action() {
        assert_eq!("push".parse::<Action>().unwrap(), Action::Push);
        assert_eq!("pull".parse::<Action>().unwrap(), Action::Pull);

        for bad in ["", "PUSH", "peek", "push "] {
            let err = bad.parse::<Action>().unwrap_err();
            assert!(err.is_usage());
            assert!(matches!(err, Error::UnknownAction(s) if s == bad));
        }
    }

    #[tokio::test]
    async fn test_dispatch_push() {
        let config = Config {
            tube: "jobs".into(),
            mode: Mode::Multiline,
            put: PutParams {
                pri: 1024,
                delay: 0,
                ttr: 60,
            },
            ..Config::new(Action::Push)
        };
        let mut broker = FakeBroker::new();
        let mut output = Vec::<u8>::new();

        dispatch(&config, &mut broker, &b"one\ntwo\n"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(
            broker.calls,
            vec![
                Call::Use("jobs".into()),
                Call::Put(Bytes::from_static(b"one"), config.put),
                Call::Put(Bytes::from_static(b"two"), config.put),
            ]
        );
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_pull_writes_body_verbatim() {
        let config = Config {
            tube: "jobs".into(),
            ..Config::new(Action::Pull)
        };
        let mut broker = FakeBroker::with_ready(&["first\r\nsecond\n\n"]);
        let mut output = Vec::<u8>::new();

        dispatch(&config, &mut broker, &b"ignored"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(output, b"first\r\nsecond\n\n");
        assert_eq!(
            broker.calls,
            vec![
                Call::Watch("jobs".into()),
                Call::Ignore("default".into()),
                Call::Reserve,
                Call::Delete(100),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_pull_delete_fails_writes_nothing() {
        let config = Config::new(Action::Pull);
        let mut broker = FakeBroker::with_ready(&["payload"]);
        broker.fail_delete = true;
        let mut output = Vec::<u8>::new();

        let err = dispatch(&config, &mut broker, &b""[..], &mut output)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Delete { id: 100, .. }));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_run_connect_fails() {
        // Bind then drop a listener to find a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let config = Config {
            host: addr.clone(),
            ..Config::new(Action::Pull)
        };

        let err = run(&config, &b""[..], Vec::<u8>::new()).await.unwrap_err();

        assert!(matches!(err, Error::Connect { addr: a, .. } if a == addr));
    }
}
