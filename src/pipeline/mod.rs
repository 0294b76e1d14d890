// Pipeline execution and monitoring module
// Runs consolidation, annotation, and graph building as one traced build

pub mod build;
pub mod trace;

// Re-export main types
pub use build::{build_graph, GraphStats, PipelineError, PipelineOutput};
pub use trace::{read_trace_file, PipelineStage, TraceEntry, TraceError, TraceWriter};
