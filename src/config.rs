//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::codec::{DotExporter, GraphMlWriter};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub exchange: ExchangeConfig,

    #[serde(default)]
    pub visualization: VisualizationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// GraphML export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Spaces per nesting level, 0 for single-line output
    #[serde(default = "default_indent")]
    pub indent: usize,
}

/// DOT export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_graph_name")]
    pub graph_name: String,

    /// Graphviz rankdir; empty to leave it out
    #[serde(default = "default_rankdir")]
    pub rankdir: String,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_indent() -> usize {
    2
}

fn default_graph_name() -> String {
    "Automaton".to_string()
}

fn default_rankdir() -> String {
    "LR".to_string()
}

// Default implementations

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            graph_name: default_graph_name(),
            rankdir: default_rankdir(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./automata.toml
    /// 2. ~/.automata-engine/config.toml
    /// 3. /etc/automata-engine/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("automata.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".automata-engine").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/automata-engine/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.exchange.indent > 8 {
            return Err(Error::Config(format!(
                "exchange.indent must be at most 8, got {}",
                self.exchange.indent
            )));
        }
        if self.visualization.graph_name.trim().is_empty() {
            return Err(Error::Config(
                "visualization.graph_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// GraphML writer with the configured indentation
    pub fn graphml_writer(&self) -> GraphMlWriter {
        GraphMlWriter::new().with_indent(self.exchange.indent)
    }

    /// DOT exporter with the configured graph name and layout
    pub fn dot_exporter(&self) -> DotExporter {
        let exporter = DotExporter::new(self.visualization.graph_name.clone());
        if self.visualization.rankdir.is_empty() {
            exporter
        } else {
            exporter.with_rankdir(self.visualization.rankdir.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.exchange.indent, 2);
        assert_eq!(config.visualization.graph_name, "Automaton");
        assert_eq!(config.visualization.rankdir, "LR");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[logging]
level = "debug"

[exchange]
indent = 0

[visualization]
graph_name = "Parity"
rankdir = ""
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.exchange.indent, 0);
        assert_eq!(config.visualization.graph_name, "Parity");

        let automaton: crate::automaton::Automaton<char> = crate::automaton::Automaton::new();
        let dot = config.dot_exporter().to_dot_string(&automaton).unwrap();
        assert_eq!(dot, "digraph Parity {\n}\n");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[visualization]\ngraph_name = \"G\"\n").unwrap();
        assert_eq!(config.visualization.rankdir, "LR");
        assert_eq!(config.exchange.indent, 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.exchange.indent = 9;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.visualization.graph_name = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/automata.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
