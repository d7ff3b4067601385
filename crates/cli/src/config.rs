#![forbid(unsafe_code)]

use clap::{Parser, Subcommand, ValueEnum};
use jobtrack_engine::EngineConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "jobtrack")]
#[command(version)]
#[command(about = "Track job applications through their hiring pipeline")]
pub(crate) struct Args {
    /// Directory holding the job database and the listing cache
    #[arg(long, env = "JOBTRACK_DATA_DIR", default_value = ".jobtrack", global = true)]
    pub(crate) data_dir: PathBuf,

    /// Verified identity the request acts for
    #[arg(long, env = "JOBTRACK_OWNER", global = true)]
    pub(crate) owner: Option<String>,

    /// Listing cache backend
    #[arg(
        long,
        env = "JOBTRACK_CACHE",
        value_enum,
        default_value_t = CacheBackend::Sqlite,
        global = true
    )]
    pub(crate) cache: CacheBackend,

    /// Lifetime of a cached listing, in seconds
    #[arg(long, env = "JOBTRACK_CACHE_TTL_SECS", default_value_t = 3600, global = true)]
    pub(crate) cache_ttl_secs: u64,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "jobtrack_engine=debug"
    #[arg(long, env = "JOBTRACK_LOG", global = true)]
    pub(crate) log_level: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Args {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            listing_ttl: Duration::from_secs(self.cache_ttl_secs),
            ..EngineConfig::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CacheBackend {
    /// Cache file next to the database, shared across invocations
    Sqlite,
    /// Process-local cache, gone when the command exits
    Memory,
    /// No caching; every listing reads the store
    Off,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List the owner's applications, one per title and company
    List,

    /// Record a new application
    Add(AddArgs),

    /// Change fields of an existing application
    Edit(EditArgs),

    /// Delete an application
    Remove {
        /// The job id (UUID)
        job_id: String,
    },
}

#[derive(clap::Args, Debug, Default)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) title: String,

    #[arg(long)]
    pub(crate) company: String,

    /// Wishlist, Applied, Interviewing, Offer or Rejected
    #[arg(long, default_value = "Wishlist")]
    pub(crate) status: String,

    #[arg(long)]
    pub(crate) salary: Option<String>,

    #[arg(long)]
    pub(crate) notes: Option<String>,

    /// http:// or https:// URL of the posting
    #[arg(long)]
    pub(crate) link: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub(crate) struct EditArgs {
    /// The job id (UUID)
    pub(crate) job_id: String,

    #[arg(long)]
    pub(crate) title: Option<String>,

    #[arg(long)]
    pub(crate) company: Option<String>,

    #[arg(long)]
    pub(crate) status: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub(crate) salary: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub(crate) notes: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub(crate) link: Option<String>,
}
