//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["govbot.toml", ".govbot.toml"];
const ENV_PREFIX: &str = "GOVBOT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `GOVBOT_SECTION__KEY=value`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./govbot.toml` or `./.govbot.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/govbot/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File-backed layers, without the environment
    fn figment(global: Option<&Path>, project_dir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(path) = Self::find_project_config(project_dir) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/govbot/config.toml if set,
    /// otherwise falls back to ~/.config/govbot/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("govbot").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::find_project_config(Path::new("."))
    }

    fn find_project_config(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Environment: {}SECTION__KEY", ENV_PREFIX);

        // Project config
        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./govbot.toml or ./.govbot.toml");
        }

        // Global config
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govbot_domain::ThresholdTier;
    use std::fs;

    fn extract(figment: Figment) -> FileConfig {
        figment.extract().unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.vote.threshold, ThresholdTier::Majority);
        assert!(config.vote.managers.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("govbot"));
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = extract(ConfigLoader::figment(None, dir.path(), None));
        assert_eq!(config.vote.labels.open, "vote/open");
        assert_eq!(config.lifecycle.max_requeue_attempts, 5);
    }

    #[test]
    fn test_project_file_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[vote]\nthreshold = \"all\"\nmanagers = [\"chair\"]\n",
        )
        .unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(
            project.join(".govbot.toml"),
            "[vote]\nthreshold = \"twothirds\"\n",
        )
        .unwrap();

        let config = extract(ConfigLoader::figment(Some(&global), &project, None));
        assert_eq!(config.vote.threshold, ThresholdTier::SupermajorityTwoThirds);
        // keys the project file does not set keep the global value
        assert_eq!(config.vote.managers, vec!["chair".to_string()]);
    }

    #[test]
    fn test_visible_project_file_preferred() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("govbot.toml"), "[vote]\nthreshold = \"all\"\n").unwrap();
        fs::write(
            dir.path().join(".govbot.toml"),
            "[vote]\nthreshold = \"fourfifths\"\n",
        )
        .unwrap();

        let config = extract(ConfigLoader::figment(None, dir.path(), None));
        assert_eq!(config.vote.threshold, ThresholdTier::Unanimous);
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("govbot.toml"), "[report]\npath = \"a.jsonl\"\n").unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[report]\npath = \"b.jsonl\"\n").unwrap();

        let config = extract(ConfigLoader::figment(None, dir.path(), Some(&explicit)));
        assert_eq!(config.report.path.as_deref(), Some("b.jsonl"));
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("govbot.toml"),
            "[vote]\nthreshold = \"most\"\n",
        )
        .unwrap();
        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, dir.path(), None).extract();
        assert!(result.is_err());
    }
}
