//! On-disk cache of paper search results.
//!
//! Layout: `<root>/<topic_slug>/papers_info.json`, each file mapping arXiv
//! short IDs to [`PaperInfo`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::arxiv::{ArxivPaper, PaperInfo};
use crate::domains::tools::{ToolError, ToolResult};

const PAPERS_FILE: &str = "papers_info.json";

type PaperMap = BTreeMap<String, PaperInfo>;

/// Topic directory name: lower-cased, spaces and path separators replaced by `_`.
pub fn topic_slug(topic: &str) -> String {
    let slug: String = topic
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();

    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        slug
    }
}

/// Paper cache rooted at a directory.
pub struct PaperStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl PaperStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cache file for a topic.
    pub fn topic_file(&self, topic: &str) -> PathBuf {
        self.root.join(topic_slug(topic)).join(PAPERS_FILE)
    }

    /// Merge search results into the topic's cache file.
    pub async fn save_topic(&self, topic: &str, papers: &[ArxivPaper]) -> ToolResult<PathBuf> {
        let _guard = self.write_lock.lock().await;

        let file = self.topic_file(topic);
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error("create paper directory", dir, e))?;
        }

        // A missing or corrupt file starts a fresh map.
        let mut map = read_map(&file).await.unwrap_or_default();
        for paper in papers {
            map.insert(paper.paper_id.clone(), paper.info.clone());
        }

        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| ToolError::internal(format!("Failed to serialize papers: {}", e)))?;
        tokio::fs::write(&file, json)
            .await
            .map_err(|e| io_error("write", &file, e))?;

        debug!("Stored {} paper(s) in {}", papers.len(), file.display());
        Ok(file)
    }

    /// Look a paper up across every topic file.
    pub async fn find(&self, paper_id: &str) -> ToolResult<Option<PaperInfo>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read", &self.root, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("read", &self.root, e))?
        {
            let file = entry.path().join(PAPERS_FILE);
            if tokio::fs::try_exists(&file).await.unwrap_or(false) {
                files.push(file);
            }
        }
        files.sort();

        for file in files {
            match read_map(&file).await {
                Some(mut map) => {
                    if let Some(info) = map.remove(paper_id) {
                        return Ok(Some(info));
                    }
                }
                None => warn!("Skipping unreadable paper cache {}", file.display()),
            }
        }

        Ok(None)
    }
}

async fn read_map(file: &Path) -> Option<PaperMap> {
    let content = tokio::fs::read_to_string(file).await.ok()?;
    serde_json::from_str(&content).ok()
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> ToolError {
    ToolError::internal(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, title: &str) -> ArxivPaper {
        ArxivPaper {
            paper_id: id.to_string(),
            info: PaperInfo {
                title: title.to_string(),
                authors: vec!["Ada Lovelace".to_string()],
                summary: "Abstract".to_string(),
                pdf_url: format!("http://arxiv.org/pdf/{}", id),
                published: "2023-01-02".to_string(),
                categories: vec!["cs.LG".to_string()],
            },
        }
    }

    #[test]
    fn test_topic_slug() {
        assert_eq!(topic_slug("Machine Learning"), "machine_learning");
        assert_eq!(topic_slug("a/b"), "a_b");
        assert_eq!(topic_slug(".."), "_");
        assert_eq!(topic_slug("   "), "_");
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = PaperStore::new(dir.path());

        let file = store
            .save_topic("Quantum Computing", &[paper("2301.00001v1", "Qubits")])
            .await
            .unwrap();
        assert!(file.ends_with("quantum_computing/papers_info.json"));

        let found = store.find("2301.00001v1").await.unwrap().unwrap();
        assert_eq!(found.title, "Qubits");
        assert!(store.find("9999.99999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_merges_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = PaperStore::new(dir.path());

        store.save_topic("topic", &[paper("a", "First")]).await.unwrap();
        store.save_topic("topic", &[paper("b", "Second")]).await.unwrap();

        assert!(store.find("a").await.unwrap().is_some());
        assert!(store.find("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = PaperStore::new(dir.path());

        let corrupt = dir.path().join("aaa");
        std::fs::create_dir_all(&corrupt).unwrap();
        std::fs::write(corrupt.join(PAPERS_FILE), "{not json").unwrap();
        store.save_topic("zzz", &[paper("x", "Kept")]).await.unwrap();

        assert_eq!(store.find("x").await.unwrap().unwrap().title, "Kept");
    }

    #[tokio::test]
    async fn test_find_without_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PaperStore::new(dir.path().join("missing"));
        assert!(store.find("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_file_uses_abstract_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = PaperStore::new(dir.path());
        let file = store.save_topic("t", &[paper("p", "T")]).await.unwrap();

        let raw = std::fs::read_to_string(file).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["p"]["abstract"], "Abstract");
    }
}
