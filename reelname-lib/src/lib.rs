//! Planning, applying and reverting batch renames of media files.
//!
//! The usual flow is [`scanner::discover`] → [`MetadataPipeline::enrich`] →
//! [`PlanBuilder::build_from_report`] → [`ApplyExecutor::apply`], with every
//! applied rename recorded in a [`StateStore`] so it can be reverted later.

pub mod apply;
pub mod async_util;
pub mod conflict;
pub mod error;
pub mod formatter;
pub mod journal;
pub mod pipeline;
pub mod plan;
pub mod provider;
pub mod rate_limit;
pub mod scanner;
pub mod settings;
pub mod worker_pool;

pub use apply::{ApplyExecutor, ApplyFailure, ApplyReport, FsRenamer, JournalWarning};
pub use conflict::{ConflictDetector, ConflictResolver};
pub use error::{DiscoveryError, JournalError, PipelineError, ResolveError, RevertError, SettingsError};
pub use formatter::PlexFormatter;
pub use journal::{RevertOutcome, RevertReport, StateStore};
pub use pipeline::{EnrichEvent, EnrichReport, MetadataFailure, MetadataPipeline, PipelineConfig};
pub use plan::{PlanBuilder, PlanOptions};
pub use provider::FilenameProvider;
pub use rate_limit::{RateLimited, RateLimiter};
pub use scanner::{ScanOptions, discover};
pub use settings::{DirectoryConfig, Settings};
pub use worker_pool::WorkerPool;

pub use reelname_core;
