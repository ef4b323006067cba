use mailframe_bridge::CommandCompiler;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "mailframe.config.json";

/// Mailframe configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// External markup compiler
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Disable pointer events on compiled markup outside children containers
    #[serde(default = "default_mask_interaction")]
    pub mask_interaction: bool,
}

fn default_mask_interaction() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_command")]
    pub command: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_command() -> String {
    "mjml".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-i".to_string(), "-s".to_string()]
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
        }
    }
}

impl CompilerConfig {
    pub fn command_compiler(&self) -> CommandCompiler {
        CommandCompiler::new(self.command.clone(), self.args.clone())
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            mask_interaction: default_mask_interaction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "compiler": { "command": "npx", "args": ["mjml", "-i", "-s"] },
            "maskInteraction": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.compiler.command, "npx");
        assert_eq!(config.compiler.args, vec!["mjml", "-i", "-s"]);
        assert!(!config.mask_interaction);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.compiler.command, "mjml");
        assert_eq!(config.compiler.args, vec!["-i", "-s"]);
        assert!(config.mask_interaction);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "compiler": { "command": "/opt/mjml/bin/mjml" } }"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.compiler.command, "/opt/mjml/bin/mjml");
        assert_eq!(config.compiler.args, vec!["-i", "-s"]);
        assert!(config.mask_interaction);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
