use crate::error::{Result, RulekitError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// AgentTool
// ---------------------------------------------------------------------------

/// Supported agent configuration entry points.
///
/// Cursor consumes symlinked rule files; Claude and Codex consume a
/// marker-managed pointer section in their respective instruction files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTool {
    Cursor,
    Claude,
    Codex,
}

impl AgentTool {
    pub fn all() -> &'static [AgentTool] {
        &[AgentTool::Cursor, AgentTool::Claude, AgentTool::Codex]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentTool::Cursor => "cursor",
            AgentTool::Claude => "claude",
            AgentTool::Codex => "codex",
        }
    }
}

impl fmt::Display for AgentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentTool {
    type Err = RulekitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cursor" => Ok(AgentTool::Cursor),
            "claude" => Ok(AgentTool::Claude),
            "codex" => Ok(AgentTool::Codex),
            _ => Err(RulekitError::UnknownAgentTool(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CursorConfig
// ---------------------------------------------------------------------------

/// Filters for which rule documents get symlinked into `.cursor/rules/`.
/// Patterns are simple wildcards (`*` matches any run of characters) applied
/// to the rule file name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CursorConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CursorConfig {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentTool>,
    #[serde(default, skip_serializing_if = "CursorConfig::is_empty")]
    pub cursor: CursorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulekit_version: Option<String>,
}

fn default_version() -> u32 {
    1
}

fn default_agents() -> Vec<AgentTool> {
    AgentTool::all().to_vec()
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            agents: default_agents(),
            cursor: CursorConfig::default(),
            rulekit_version: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RulekitError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("my-project");
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "my-project");
        assert_eq!(loaded.agents, AgentTool::all().to_vec());
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(RulekitError::NotInitialized)
        ));
    }

    #[test]
    fn agent_tool_parse() {
        assert_eq!("cursor".parse::<AgentTool>().unwrap(), AgentTool::Cursor);
        assert_eq!("claude".parse::<AgentTool>().unwrap(), AgentTool::Claude);
        assert!("copilot".parse::<AgentTool>().is_err());
    }

    #[test]
    fn agents_serialize_snake_case() {
        let yaml = serde_yaml::to_string(&AgentTool::Codex).unwrap();
        assert_eq!(yaml.trim(), "codex");
    }
}
