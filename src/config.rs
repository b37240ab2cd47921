use crate::connection::DEFAULT_TUBE;
use crate::dispatcher::Action;
use crate::producer::Mode;
use crate::types::job::PutParams;

pub const DEFAULT_HOST: &str = "127.0.0.1:11300";

/// Everything one invocation needs, fixed once the arguments are parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub action: Action,
    /// Broker address as `host:port`.
    pub host: String,
    /// For `push`, the tube to use, where empty means the connection's
    /// default. For `pull`, a comma-separated list of tubes to watch.
    pub tube: String,
    /// How `push` splits its input into jobs.
    pub mode: Mode,
    /// Also asks the broker for its watch list after reconciling it, for the
    /// logs.
    pub verbose: bool,
    pub put: PutParams,
}

impl Config {
    /// A configuration with every setting at its command line default.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            host: DEFAULT_HOST.to_owned(),
            tube: DEFAULT_TUBE.to_owned(),
            mode: Mode::Single,
            verbose: false,
            put: PutParams::default(),
        }
    }
}
