//! Crew definition: who works on the question, in which order, with which tools.

use dalal_core::{Error, Paths, Result};
use dalal_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Embedded crew definition, also written out by `dalal onboard`.
pub const DEFAULT_CREW: &str = include_str!("crew.yaml");

/// Placeholder replaced by the user's question in task descriptions.
pub const QUESTION_PLACEHOLDER: &str = "{user_question}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AgentSpec {
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are the {}.\n\nYour goal: {}", self.role.trim(), self.goal.trim());
        if !self.backstory.trim().is_empty() {
            prompt.push_str(&format!("\n\nBackground: {}", self.backstory.trim()));
        }
        prompt
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub name: String,
    pub agent: String,
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
}

impl TaskSpec {
    /// Task prompt for one question.
    pub fn render(&self, question: &str) -> String {
        let mut prompt = self.description.trim().replace(QUESTION_PLACEHOLDER, question);
        if !self.expected_output.trim().is_empty() {
            prompt.push_str("\n\nExpected output: ");
            prompt.push_str(self.expected_output.trim());
        }
        prompt
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewSpec {
    pub agents: BTreeMap<String, AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl CrewSpec {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// The built-in researcher / analyst / coordinator crew.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_CREW)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let path = paths.crew_file();
        if path.exists() {
            info!(path = %path.display(), "Loading crew definition");
            Self::load(&path)
        } else {
            Self::builtin()
        }
    }

    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.get(name)
    }

    /// Every task names a known agent and every agent tool is registered.
    pub fn validate(&self, registry: &ToolRegistry) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::Validation("crew has no tasks".to_string()));
        }
        for task in &self.tasks {
            if !self.agents.contains_key(&task.agent) {
                return Err(Error::Validation(format!(
                    "task '{}' refers to unknown agent '{}'",
                    task.name, task.agent
                )));
            }
        }
        for (name, agent) in &self.agents {
            if let Some(tool) = agent.tools.iter().find(|t| !registry.contains(t)) {
                return Err(Error::Validation(format!(
                    "agent '{}' uses unknown tool '{}'",
                    name, tool
                )));
            }
        }
        Ok(())
    }
}
