//! Application use cases / business logic

pub mod digest;
pub mod ingest;
pub mod query;
pub mod render;
pub mod resummarize;
pub mod scheduler;

pub use digest::{DigestAssembler, DigestError, latest_digest};
pub use ingest::{IngestConfig, IngestError, IngestPipeline};
pub use query::{ArticleQuery, QueryEngine};
pub use resummarize::{Resummarizer, ResummarizeError};
pub use scheduler::{PipelineScheduler, ScheduleConfig};
