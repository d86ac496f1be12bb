// todo-pdf: public gallery of shared configurations
//
// Layout on disk: `<dir>/gallery_index.json` plus one `<id>.json` per entry.
// Ids are content hashes, so publishing the same configuration twice yields
// the same entry.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Configuration;
use crate::error::AppError;

const INDEX_FILE: &str = "gallery_index.json";

// ============================================================================
// Data Structures
// ============================================================================

/// At-a-glance summary stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub format: String,
    pub items: u32,
    pub columns: u32,
    pub guide_lines: bool,
    pub landscape: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created: String,
    pub views: u32,
    pub likes: u32,
    pub preview: PreviewSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryStats {
    pub total: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GalleryIndex {
    configs: BTreeMap<String, EntryMeta>,
    tags: BTreeMap<String, Vec<String>>,
    stats: GalleryStats,
}

/// A published configuration with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub config: Configuration,
    pub created: String,
}

/// One search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(flatten)]
    pub meta: EntryMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Recent,
    Popular,
    Name,
}

// ============================================================================
// Gallery
// ============================================================================

pub struct Gallery {
    dir: PathBuf,
    index: GalleryIndex,
}

impl Gallery {
    /// Opens (or starts) the gallery in `dir`. A corrupt index starts empty.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("gallery index {} unreadable ({}), starting empty", index_path.display(), e);
                GalleryIndex::default()
            })
        } else {
            GalleryIndex::default()
        };
        Ok(Self { dir, index })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn save_index(&self) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(&self.index)?;
        fs::write(self.dir.join(INDEX_FILE), json)?;
        Ok(())
    }

    /// Adds `config` to the gallery. Returns its id and whether it was new.
    pub fn publish(
        &mut self,
        config: &Configuration,
        name: &str,
        description: &str,
        tags: &[String],
    ) -> Result<(String, bool), AppError> {
        let id = config_id(config)?;
        if self.index.configs.contains_key(&id) {
            return Ok((id, false));
        }

        let created = Utc::now().to_rfc3339();
        let entry = GalleryEntry {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.to_vec(),
            config: config.clone(),
            created: created.clone(),
        };
        fs::write(self.entry_path(&id), serde_json::to_string_pretty(&entry)?)?;

        self.index.configs.insert(
            id.clone(),
            EntryMeta {
                name: entry.name,
                description: entry.description,
                tags: entry.tags,
                created,
                views: 0,
                likes: 0,
                preview: preview_summary(config),
            },
        );
        for tag in tags {
            self.index.tags.entry(tag.clone()).or_default().push(id.clone());
        }
        self.index.stats.total += 1;
        self.save_index()?;
        log::info!("published gallery entry {} ({})", id, name);
        Ok((id, true))
    }

    /// Loads an entry and counts the view.
    pub fn load(&mut self, id: &str) -> Result<GalleryEntry, AppError> {
        let path = self.entry_path(id);
        if !is_valid_id(id) || !path.exists() {
            return Err(AppError::GalleryNotFound(id.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        let entry: GalleryEntry = serde_json::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;

        if let Some(meta) = self.index.configs.get_mut(id) {
            meta.views += 1;
            self.save_index()?;
        }
        Ok(entry)
    }

    /// Entries whose name or description contains `query` (case-insensitive)
    /// and that carry at least one of `tags` (when any are given).
    pub fn search(&self, query: &str, tags: &[String], sort: SortOrder) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        let mut results: Vec<SearchResult> = self
            .index
            .configs
            .iter()
            .filter(|(_, meta)| {
                query.is_empty()
                    || meta.name.to_lowercase().contains(&query)
                    || meta.description.to_lowercase().contains(&query)
            })
            .filter(|(_, meta)| tags.is_empty() || tags.iter().any(|t| meta.tags.contains(t)))
            .map(|(id, meta)| SearchResult { id: id.clone(), meta: meta.clone() })
            .collect();

        match sort {
            SortOrder::Recent => results.sort_by(|a, b| b.meta.created.cmp(&a.meta.created)),
            SortOrder::Popular => results.sort_by(|a, b| b.meta.views.cmp(&a.meta.views)),
            SortOrder::Name => results.sort_by(|a, b| a.meta.name.cmp(&b.meta.name)),
        }
        results
    }

    /// Most used tags with their entry counts.
    pub fn popular_tags(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> =
            self.index.tags.iter().map(|(tag, ids)| (tag.clone(), ids.len())).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        counts
    }

    pub fn stats(&self) -> &GalleryStats {
        &self.index.stats
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

/// First 8 hex characters of the SHA-256 of the key-sorted JSON.
pub fn config_id(config: &Configuration) -> Result<String, AppError> {
    // serde_json's default map is ordered, so keys come out sorted.
    let value = serde_json::to_value(config)?;
    let digest = Sha256::digest(value.to_string().as_bytes());
    let hex = format!("{:x}", digest);
    Ok(hex[..8].to_string())
}

fn is_valid_id(id: &str) -> bool {
    id.len() == 8 && id.chars().all(|c| c.is_ascii_hexdigit())
}

fn preview_summary(config: &Configuration) -> PreviewSummary {
    PreviewSummary {
        format: config.page_format.label().to_string(),
        items: config.items_per_col,
        columns: config.columns,
        guide_lines: config.guide_lines_enabled,
        landscape: config.landscape,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageFormat;

    fn temp_gallery() -> Gallery {
        let dir = std::env::temp_dir().join(format!("todo-pdf-gallery-{}", uuid::Uuid::new_v4()));
        Gallery::open(dir).unwrap()
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn publish_is_idempotent() {
        let mut gallery = temp_gallery();
        let config = Configuration::default();
        let (id, is_new) = gallery.publish(&config, "Default", "", &tags(&["a4"])).unwrap();
        assert!(is_new);
        assert_eq!(id.len(), 8);
        let (again, is_new) = gallery.publish(&config, "Other name", "", &[]).unwrap();
        assert_eq!(again, id);
        assert!(!is_new);
        assert_eq!(gallery.stats().total, 1);
        fs::remove_dir_all(gallery.dir()).ok();
    }

    #[test]
    fn load_counts_views_and_survives_reopen() {
        let mut gallery = temp_gallery();
        let config = Configuration { page_format: PageFormat::A5, ..Configuration::default() };
        let (id, _) = gallery.publish(&config, "Pocket", "small planner", &tags(&["a5"])).unwrap();

        let entry = gallery.load(&id).unwrap();
        assert_eq!(entry.config, config);
        gallery.load(&id).unwrap();

        let reopened = Gallery::open(gallery.dir().to_path_buf()).unwrap();
        let hits = reopened.search("", &[], SortOrder::Popular);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].meta.views, 2);
        assert_eq!(hits[0].meta.preview.format, "A5");
        assert!(matches!(gallery.load("deadbeef"), Err(AppError::GalleryNotFound(_))));
        assert!(matches!(gallery.load("../etc"), Err(AppError::GalleryNotFound(_))));
        fs::remove_dir_all(gallery.dir()).ok();
    }

    #[test]
    fn search_filters_and_sorts() {
        let mut gallery = temp_gallery();
        let a = Configuration { columns: 1, ..Configuration::default() };
        let b = Configuration { columns: 3, ..Configuration::default() };
        let c = Configuration { columns: 2, items_per_col: 12, ..Configuration::default() };
        gallery.publish(&a, "Zen", "minimal single column", &tags(&["minimal"])).unwrap();
        gallery.publish(&b, "Atlas", "three columns", &tags(&["dense", "business"])).unwrap();
        gallery.publish(&c, "Meeting", "business notes", &tags(&["business"])).unwrap();

        let by_name: Vec<_> = gallery.search("", &[], SortOrder::Name).into_iter().map(|r| r.meta.name).collect();
        assert_eq!(by_name, vec!["Atlas", "Meeting", "Zen"]);

        let business = gallery.search("", &tags(&["business"]), SortOrder::Name);
        assert_eq!(business.len(), 2);

        let query = gallery.search("MINIMAL", &[], SortOrder::Recent);
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].meta.name, "Zen");

        assert_eq!(
            gallery.popular_tags(2),
            vec![("business".to_string(), 2), ("dense".to_string(), 1)]
        );
        fs::remove_dir_all(gallery.dir()).ok();
    }

    #[test]
    fn id_depends_on_content_only() {
        let a = config_id(&Configuration::default()).unwrap();
        let b = config_id(&Configuration::default()).unwrap();
        let c = config_id(&Configuration { columns: 1, ..Configuration::default() }).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
