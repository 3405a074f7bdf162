//! The transformation pipeline tying the engine together: platform
//! routing, per-post transformation, bounded parallel batches, and
//! record sinks.

pub mod error;
pub mod pipeline;
pub mod router;
pub mod sink;

pub use error::{PipelineError, SinkError};
pub use pipeline::{
    BatchResult, DEFAULT_CONCURRENCY, InsertResult, PROCESSING_VERSION, PipelineOptions,
    RejectedRecord, TransformationPipeline, TransformedRecord, transform_post,
};
pub use router::{PlatformRouter, RouteTarget};
pub use sink::{MemorySink, NdjsonSink, RecordSink, RowResult};
pub use unipost_validate::ValidationOutcome;
