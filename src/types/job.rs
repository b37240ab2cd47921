use bytes::Bytes;

/// A job reserved from the broker.
///
/// Only the id and body ever reach the client: state, timings and counters
/// are owned by the broker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    pub id: u64,
    pub body: Bytes,
}

/// Settings applied to every job enqueued by one invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PutParams {
    /// Job priority, where lower values are more urgent.
    pub pri: u32,
    /// Seconds before the job becomes ready.
    pub delay: u32,
    /// Seconds allowed between reserving the job and deleting or releasing
    /// it, after which the broker requeues it.
    pub ttr: u32,
}

impl Default for PutParams {
    fn default() -> Self {
        Self {
            pri: 0,
            delay: 0,
            ttr: 10,
        }
    }
}
