use async_trait::async_trait;
use dalal_core::{Error, Result};
use tracing::info;

use crate::crew::CrewSpec;
use crate::runner::StageRunner;

/// One free-text question in, one answer out.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn kickoff(&self, question: &str) -> Result<String>;
}

/// Runs the crew's tasks in order; each stage sees the outputs of the earlier ones.
pub struct CrewPipeline {
    crew: CrewSpec,
    runner: StageRunner,
}

impl CrewPipeline {
    /// Fails if the crew refers to unknown agents or tools.
    pub fn new(crew: CrewSpec, runner: StageRunner) -> Result<Self> {
        crew.validate(runner.registry())?;
        Ok(Self { crew, runner })
    }

    pub fn crew(&self) -> &CrewSpec {
        &self.crew
    }
}

fn with_context(prompt: String, earlier: &[(String, String)]) -> String {
    if earlier.is_empty() {
        return prompt;
    }
    let mut out = prompt;
    out.push_str("\n\nContext from earlier tasks:");
    for (name, output) in earlier {
        out.push_str(&format!("\n\n## {}\n{}", name, output.trim()));
    }
    out
}

#[async_trait]
impl Pipeline for CrewPipeline {
    async fn kickoff(&self, question: &str) -> Result<String> {
        let mut outputs: Vec<(String, String)> = Vec::new();

        for task in &self.crew.tasks {
            let agent = self.crew.agent(&task.agent).ok_or_else(|| {
                Error::Pipeline(format!("task '{}' refers to unknown agent '{}'", task.name, task.agent))
            })?;

            info!(task = %task.name, agent = %task.agent, tools = agent.tools.len(), "Starting task");
            let prompt = with_context(task.render(question), &outputs);
            let output = self.runner.run(&agent.system_prompt(), &prompt, &agent.tools).await?;
            info!(task = %task.name, output_len = output.len(), "Task finished");

            outputs.push((task.name.clone(), output));
        }

        outputs
            .pop()
            .map(|(_, output)| output)
            .ok_or_else(|| Error::Pipeline("crew has no tasks".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::{call, runner, text, ScriptedProvider};
    use dalal_core::config::AgentDefaults;
    use serde_json::json;

    #[tokio::test]
    async fn test_stages_run_in_order_with_context() {
        let provider = ScriptedProvider::new(vec![
            Ok(text("TCS is Tata Consultancy Services, symbol TCS")),
            Ok(call("get_stock_details", json!({"symbol": "TCS"}))),
            Ok(text("NSE price 3499.95")),
            Ok(text("TCS trades at ₹3499.95")),
        ]);
        let pipeline = CrewPipeline::new(
            CrewSpec::builtin().unwrap(),
            runner(
                provider.clone(),
                json!({"companyName": "Tata Consultancy Services", "currentPrice": {"NSE": "3499.95"}}),
                &AgentDefaults::default(),
            ),
        )
        .unwrap();

        let answer = pipeline.kickoff("Current price of TCS").await.unwrap();
        assert_eq!(answer, "TCS trades at ₹3499.95");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);

        // researcher only sees web_search
        let names: Vec<&str> = seen[0].1.iter().map(|t| t["function"]["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["web_search"]);

        // analyst gets the research as context and the market tools
        assert_eq!(seen[1].1.len(), 7);
        assert!(seen[1].0[1].text().contains("symbol TCS"));
        assert!(seen[2].0.last().unwrap().text().contains("NSE Price: ₹3499.95"));

        // coordinator has no tools and sees both earlier outputs
        assert!(seen[3].1.is_empty());
        let prompt = seen[3].0[1].text();
        assert!(prompt.contains("## research_indian_stock_task"));
        assert!(prompt.contains("## analyze_nse_data_task\nNSE price 3499.95"));
    }

    #[tokio::test]
    async fn test_stage_failure_aborts() {
        let provider = ScriptedProvider::new(vec![Err(Error::Provider("bad key".to_string()))]);
        let pipeline = CrewPipeline::new(
            CrewSpec::builtin().unwrap(),
            runner(provider.clone(), json!({}), &AgentDefaults::default()),
        )
        .unwrap();
        let err = pipeline.kickoff("q").await.unwrap_err();
        assert!(err.to_string().contains("bad key"));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_with_context() {
        assert_eq!(with_context("p".to_string(), &[]), "p");
        let out = with_context("p".to_string(), &[("a".to_string(), " out \n".to_string())]);
        assert_eq!(out, "p\n\nContext from earlier tasks:\n\n## a\nout");
    }
}
