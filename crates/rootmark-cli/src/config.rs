//! Configuration file parsing for rootmark.toml.

use rootmark_gc::{DEFAULT_HEAP_BUDGET, DEFAULT_TRIGGER_RATIO, GcConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Heap and collection policy
    #[serde(default)]
    pub heap: HeapConfig,
}

/// Heap configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeapConfig {
    /// Heap budget in bytes (0 means the 1MB default)
    #[serde(default = "default_budget")]
    pub budget: usize,

    /// Occupancy ratio that triggers a collection before allocating
    #[serde(default = "default_trigger_ratio")]
    pub trigger_ratio: f64,

    /// Maximum root entries
    pub max_roots: Option<usize>,

    /// Maximum edge records
    pub max_edges: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_HEAP_BUDGET,
            trigger_ratio: DEFAULT_TRIGGER_RATIO,
            max_roots: None,
            max_edges: None,
        }
    }
}

fn default_budget() -> usize {
    DEFAULT_HEAP_BUDGET
}

fn default_trigger_ratio() -> f64 {
    DEFAULT_TRIGGER_RATIO
}

impl Config {
    /// Collector config, with a command-line budget taking precedence
    pub fn gc_config(&self, budget_override: Option<usize>) -> GcConfig {
        GcConfig {
            heap_budget: budget_override.unwrap_or(self.heap.budget),
            trigger_ratio: self.heap.trigger_ratio,
            max_roots: self.heap.max_roots,
            max_edges: self.heap.max_edges,
        }
    }
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return read_config(path);
    }

    match find_config_file() {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Search for configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_ancestors(&cwd)
}

fn find_config_in_ancestors(start: &Path) -> Option<PathBuf> {
    const CONFIG_NAMES: &[&str] = &["rootmark.toml", ".rootmarkrc.toml"];

    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [heap]
            budget = 4096
            trigger_ratio = 0.5
            max_roots = 16
            "#,
        )
        .unwrap();

        let gc = config.gc_config(None);
        assert_eq!(gc.heap_budget, 4096);
        assert_eq!(gc.trigger_ratio, 0.5);
        assert_eq!(gc.max_roots, Some(16));
        assert_eq!(gc.max_edges, None);
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        let gc = config.gc_config(Some(2048));
        assert_eq!(gc.heap_budget, 2048);
        assert_eq!(gc.trigger_ratio, DEFAULT_TRIGGER_RATIO);
    }

    #[test]
    fn test_unknown_heap_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[heap]\nbudgte = 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[heap]\nbudget = 512\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.heap.budget, 512);

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("rootmark.toml"), "").unwrap();

        let found = find_config_in_ancestors(&nested).unwrap();
        assert_eq!(found, dir.path().join("rootmark.toml"));
    }
}
