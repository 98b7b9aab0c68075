pub mod ask;
pub mod doctor;
pub mod fetch_cmd;
pub mod onboard;
pub mod run_cmd;
pub mod serve;
pub mod snapshot;
pub mod tools_cmd;

use dalal_agent::{CrewPipeline, CrewSpec, Pipeline, StageRunner};
use dalal_core::{Config, Paths};
use dalal_providers::{create_provider, Provider};
use dalal_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;

/// Config file (or defaults) with environment overrides applied.
pub(crate) fn load_config(paths: &Paths) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(paths)?;
    config.apply_env();
    Ok(config)
}

/// Provider, tools and crew wired into one pipeline.
pub(crate) fn build_pipeline(config: &Config, paths: &Paths) -> anyhow::Result<Arc<dyn Pipeline>> {
    let provider: Arc<dyn Provider> = Arc::from(create_provider(config)?);
    let registry = Arc::new(ToolRegistry::with_defaults());
    let ctx = ToolContext::from_config(config.clone());
    let runner = StageRunner::new(provider, registry, ctx, &config.agents.defaults);
    let crew = CrewSpec::load_or_default(paths)?;
    Ok(Arc::new(CrewPipeline::new(crew, runner)?))
}
