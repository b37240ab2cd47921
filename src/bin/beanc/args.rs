use beanc::config::{Config, DEFAULT_HOST};
use beanc::connection::DEFAULT_TUBE;
use beanc::producer::Mode;
use beanc::types::job::PutParams;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
pub(crate) struct Args {
    /// What to do: `push` enqueues stdin, `pull` reserves and deletes one job
    /// and writes its body to stdout.
    pub(crate) action: String,
    /// Logs each step to stderr.
    #[arg(short, long, default_value_t)]
    pub(crate) verbose: bool,
    /// Creates a new job for each line of stdin when pushing.
    #[arg(short, long, default_value_t)]
    pub(crate) multiline: bool,
    /// The broker's address and port.
    #[arg(short = 'H', long, env = "BEANC_HOST", default_value = DEFAULT_HOST)]
    pub(crate) host: String,
    /// The tube to use when pushing (empty for the connection's default), or a
    /// comma-separated list of tubes to watch when pulling.
    #[arg(short, long, env = "BEANC_TUBE", default_value = DEFAULT_TUBE)]
    pub(crate) tube: String,
    /// The job priority, used when pushing. Lower is more urgent.
    #[arg(short, long, default_value_t = 0)]
    pub(crate) pri: u32,
    /// The job delay in seconds, used when pushing.
    #[arg(short, long, default_value_t = 0)]
    pub(crate) delay: u32,
    /// The job time-to-run in seconds, used when pushing.
    #[arg(long, default_value_t = 10)]
    pub(crate) ttr: u32,
    /// Emits logs as JSON.
    #[arg(long, default_value_t)]
    pub(crate) json: bool,
}

impl Args {
    /// Builds the immutable configuration for this run. Fails only on an
    /// unrecognised action.
    pub(crate) fn into_config(self) -> beanc::Result<Config> {
        Ok(Config {
            action: self.action.parse()?,
            host: self.host,
            tube: self.tube,
            mode: if self.multiline {
                Mode::Multiline
            } else {
                Mode::Single
            },
            verbose: self.verbose,
            put: PutParams {
                pri: self.pri,
                delay: self.delay,
                ttr: self.ttr,
            },
        })
    }
}
