//! Store traits and implementations.

pub mod interaction;
pub mod job;
pub mod site;

pub use interaction::{CommentRecord, PgInteractionStore, RecordedVote, VoteTally};
pub use job::{JobRecord, JobStore, PgJobStore, QueueStats};
pub use site::{HostnameRecord, PgSiteStore, SiteRecord};
