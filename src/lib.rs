// Chartgraph - Piano roll to note graph synthesis
// Module declarations

pub mod config;
pub mod graph;
pub mod levels;
pub mod midi;
pub mod pipeline;
pub mod roll;

pub use config::{ConfigError, GraphConfig, GraphMode};
pub use pipeline::{build_graph, GraphStats, PipelineError, PipelineOutput};
