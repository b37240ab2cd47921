//! Takes a single job off the broker.
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::connection::{Broker, DEFAULT_TUBE};
use crate::error::{Error, Result};
use crate::types::job::Job;
use crate::util::bytes_to_human_str;

/// The tubes a pull should draw from, in the order given, each named once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WatchSet {
    tubes: Vec<String>,
}

impl WatchSet {
    /// Parses a comma-separated list of tube names. Names are not checked
    /// here: an invalid one fails when it's watched.
    pub fn parse(spec: &str) -> Self {
        Self {
            tubes: spec.split(',').unique().map(str::to_owned).collect(),
        }
    }

    pub fn tubes(&self) -> &[String] {
        &self.tubes
    }

    /// Whether the broker's implicit default tube was asked for explicitly.
    pub fn contains_default(&self) -> bool {
        self.tubes.iter().any(|t| t == DEFAULT_TUBE)
    }
}

/// Makes the session's watch set exactly `watch_set`.
///
/// Every requested tube is watched first. Only once all of those succeed is
/// the default tube, which every session starts out watching, ignored, and
/// only if it wasn't requested. A failure part way through leaves whatever
/// was already watched in place.
pub async fn reconcile<B: Broker>(
    broker: &mut B,
    watch_set: &WatchSet,
) -> Result<()> {
    for tube in watch_set.tubes() {
        let count = broker.watch(tube).await.map_err(|source| Error::Watch {
            tube: tube.clone(),
            source,
        })?;
        debug!(tube, count, "watching tube");
    }

    if !watch_set.contains_default() {
        let count = broker.ignore(DEFAULT_TUBE).await.map_err(|source| {
            Error::Ignore {
                tube: DEFAULT_TUBE.to_owned(),
                source,
            }
        })?;
        debug!(count, "ignored default tube");
    }

    Ok(())
}

/// Reserves one job from the tubes in `watch_set` and deletes it, returning
/// the job so its body can be written out.
///
/// Reserving waits for as long as it takes a job to become ready. The delete
/// follows straight away; if it fails the job stays reserved on the broker
/// until its TTR runs out, and the body is not returned.
///
/// With `verbose`, the broker's own view of the watch set is logged once it's
/// reconciled.
#[instrument(name = "pull", skip_all, fields(tubes = ?watch_set.tubes()))]
pub async fn pull<B: Broker>(
    broker: &mut B,
    watch_set: &WatchSet,
    verbose: bool,
) -> Result<Job> {
    reconcile(broker, watch_set).await?;

    if verbose {
        match broker.list_tubes_watched().await {
            Ok(watched) => debug!(?watched, "watch set reconciled"),
            Err(error) => warn!(
                error = &error as &dyn std::error::Error,
                "listing watched tubes failed"
            ),
        }
    }

    debug!("awaiting job");
    let job = broker.reserve().await.map_err(Error::Reserve)?;
    debug!(
        id = job.id,
        body = bytes_to_human_str(&job.body),
        "reserved job"
    );

    broker.delete(job.id).await.map_err(|source| Error::Delete {
        id: job.id,
        source,
    })?;
    debug!(id = job.id, "deleted job");

    Ok(job)
}
