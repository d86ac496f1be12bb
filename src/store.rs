// todo-pdf: named configurations saved as JSON files

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Configuration;
use crate::error::AppError;

/// Directory of `<name>.json` configuration files.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        let clean = sanitize_name(name);
        if clean.is_empty() {
            return Err(AppError::ConfigError(format!("invalid configuration name '{}'", name)));
        }
        Ok(self.dir.join(format!("{}.json", clean)))
    }

    /// Writes `config` under `name`, returning the file path.
    pub fn save(&self, name: &str, config: &Configuration) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name)?;
        fs::write(&path, config.to_json_pretty()?)?;
        log::info!("saved configuration to {}", path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Configuration, AppError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(AppError::ConfigNotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Configuration::from_json(&content)
    }

    /// Saved configuration names, sorted.
    pub fn list(&self) -> Result<Vec<String>, AppError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(AppError::ConfigNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        log::info!("deleted configuration {}", path.display());
        Ok(())
    }
}

/// Keeps alphanumerics, `-` and `_`; spaces become `-`.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Reads a configuration file from an arbitrary path.
pub fn load_file(path: &Path) -> Result<Configuration, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
    Configuration::from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NumberPlacement, PageFormat};
    use pretty_assertions::assert_eq;

    fn temp_store() -> ConfigStore {
        let dir = std::env::temp_dir().join(format!("todo-pdf-store-{}", uuid::Uuid::new_v4()));
        ConfigStore::new(dir)
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store();
        let config = Configuration {
            page_format: PageFormat::B5,
            landscape: true,
            margin_left: 12.5,
            dot_radius: 0.45,
            dot_color_intensity: 0.55,
            num_placement: NumberPlacement::Hidden,
            color_line: "#112233".to_string(),
            output_filename: "week.pdf".to_string(),
            ..Configuration::default()
        };
        store.save("my config", &config).unwrap();
        assert_eq!(store.load("my config").unwrap(), config);
        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn list_and_delete() {
        let store = temp_store();
        assert!(store.list().unwrap().is_empty());
        store.save("zeta", &Configuration::default()).unwrap();
        store.save("alpha", &Configuration::default()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);

        store.delete("zeta").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha".to_string()]);
        assert!(matches!(store.delete("zeta"), Err(AppError::ConfigNotFound(_))));
        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn missing_and_invalid_names() {
        let store = temp_store();
        assert!(matches!(store.load("nope"), Err(AppError::ConfigNotFound(_))));
        assert!(matches!(store.save("../../", &Configuration::default()), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_name(" Boox Note/Max "), "Boox-NoteMax");
        assert_eq!(sanitize_name("a.b_c"), "ab_c");
    }
}
