pub mod answer;
pub mod crew;
pub mod pipeline;
pub mod runner;

pub use crew::{AgentSpec, CrewSpec, TaskSpec, DEFAULT_CREW};
pub use pipeline::{CrewPipeline, Pipeline};
pub use runner::StageRunner;
