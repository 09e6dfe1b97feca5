// JSON mirror file storage
// Decision: Whole collection lives in memory; every create rewrites the full file
// Decision: Mirror write failures are logged and swallowed (the create still succeeds)
// Decision: Append + rewrite run under one async mutex so rewrites never interleave

use async_trait::async_trait;
use firewatch_core::traits::sort_newest_first;
use firewatch_core::{Incident, IncidentError, IncidentStore, NewIncident, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

// ============================================================================
// JsonFileIncidentStore - In-memory collection mirrored to a JSON file
// ============================================================================

/// One element of the mirror array.
///
/// Elements that do not parse as incidents are kept verbatim and written back
/// on every rewrite, so loading never loses data on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum MirrorEntry {
    Incident(Incident),
    Unreadable(Value),
}

/// Incident store backed by a flat JSON array on disk.
///
/// The in-memory collection is canonical. The mirror file is only read once,
/// in [`JsonFileIncidentStore::open`].
#[derive(Debug)]
pub struct JsonFileIncidentStore {
    path: PathBuf,
    entries: Mutex<Vec<MirrorEntry>>,
}

impl JsonFileIncidentStore {
    /// Load the mirror file at `path`, starting empty if it is missing,
    /// unreadable, or not a JSON array.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_mirror(&path).await;
        let unreadable = entries
            .iter()
            .filter(|e| matches!(e, MirrorEntry::Unreadable(_)))
            .count();
        tracing::info!(
            path = %path.display(),
            count = entries.len() - unreadable,
            unreadable,
            "Loaded incident mirror"
        );
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Rewrite the whole mirror file via a sibling temp file + rename.
    async fn persist(&self, entries: &[MirrorEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = temp_path(&self.path);

        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| IncidentError::store(format!("write {}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| IncidentError::store(format!("rename {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for JsonFileIncidentStore {
    async fn list(&self) -> Result<Vec<Incident>> {
        let snapshot = self
            .entries
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                MirrorEntry::Incident(incident) => Some(incident.clone()),
                MirrorEntry::Unreadable(_) => None,
            })
            .collect();
        Ok(sort_newest_first(snapshot))
    }

    async fn create(&self, input: NewIncident) -> Result<Incident> {
        let incident = Incident::new(input);

        let mut entries = self.entries.lock().await;
        entries.push(MirrorEntry::Incident(incident.clone()));

        // In-memory state is kept even when the mirror cannot be written
        if let Err(e) = self.persist(&entries).await {
            tracing::error!(
                path = %self.path.display(),
                incident_id = %incident.id,
                error = %e,
                "Failed to write incident mirror"
            );
        }

        Ok(incident)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "incidents.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

async fn load_mirror(path: &Path) -> Vec<MirrorEntry> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No incident mirror yet, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable incident mirror, starting empty");
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Incident mirror is not an array, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt incident mirror, starting empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match serde_json::from_value::<Incident>(entry.clone()) {
            Ok(incident) => MirrorEntry::Incident(incident),
            Err(e) => {
                tracing::warn!(index, error = %e, "Keeping unreadable incident record as-is");
                MirrorEntry::Unreadable(entry)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_core::IncidentType;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn input(title: &str, incident_type: IncidentType) -> NewIncident {
        NewIncident {
            title: title.to_string(),
            description: Some(format!("{title} description")),
            incident_type,
            location: None,
            image_url: None,
        }
    }

    fn mirror_path(dir: &TempDir) -> PathBuf {
        dir.path().join("incidents.json")
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert!(store.list().await.unwrap().is_empty());
        assert!(!mirror_path(&dir).exists());
    }

    #[tokio::test]
    async fn test_open_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(mirror_path(&dir), "{not json").unwrap();
        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_non_array_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(mirror_path(&dir), r#"{"id": "x"}"#).unwrap();
        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_skips_malformed_records() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            mirror_path(&dir),
            r#"[
                {"id": "ok", "title": "Barn", "description": null, "incident_type": "structure",
                 "location": null, "image_url": null, "created_at": "2024-05-01T12:00:00.000Z"},
                {"id": "bad", "title": "Quake", "incident_type": "earthquake",
                 "created_at": "2024-05-01T12:00:00.000Z"},
                42
            ]"#,
        )
        .unwrap();

        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "ok");
    }

    #[tokio::test]
    async fn test_create_keeps_unreadable_records_on_disk() {
        let dir = TempDir::new().unwrap();
        let legacy = serde_json::json!({
            "id": "legacy",
            "title": "Old report",
            "incident_type": "structure",
            "created_at": "2024-05-01 12:00:00"
        });
        let valid = serde_json::json!({
            "id": "ok",
            "title": "Barn",
            "description": null,
            "incident_type": "structure",
            "location": null,
            "image_url": null,
            "created_at": "2024-05-01T12:00:00.000Z"
        });
        std::fs::write(
            mirror_path(&dir),
            serde_json::to_string(&vec![legacy.clone(), valid]).unwrap(),
        )
        .unwrap();

        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert_eq!(store.list().await.unwrap().len(), 1);

        let created = store
            .create(input("fresh", IncidentType::Wildfire))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(mirror_path(&dir)).unwrap();
        let on_disk: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk[0], legacy);
        assert_eq!(on_disk[1]["id"], "ok");
        assert_eq!(on_disk[2]["id"], created.id.as_str());

        let reopened = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert_eq!(reopened.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rewrites_full_mirror() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;

        store
            .create(input("one", IncidentType::Structure))
            .await
            .unwrap();
        store
            .create(input("two", IncidentType::Vehicle))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(mirror_path(&dir)).unwrap();
        let on_disk: Vec<Incident> = serde_json::from_str(&raw).unwrap();
        let titles: Vec<_> = on_disk.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two"]);
        assert!(raw.starts_with("[\n  {"));
        assert!(!temp_path(&mirror_path(&dir)).exists());
    }

    #[tokio::test]
    async fn test_reopen_reproduces_records() {
        let dir = TempDir::new().unwrap();
        let created = {
            let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
            for (title, kind) in [
                ("barn", IncidentType::Structure),
                ("truck", IncidentType::Vehicle),
                ("ridge", IncidentType::Wildfire),
            ] {
                let mut new = input(title, kind);
                new.location = Some("Sector 7".to_string());
                new.image_url = Some(format!("/uploads/{title}.jpg"));
                store.create(new).await.unwrap();
            }
            store.list().await.unwrap()
        };

        let reopened = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        assert_eq!(reopened.list().await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        for i in 0..5 {
            store
                .create(input(&format!("incident {i}"), IncidentType::Wildfire))
                .await
                .unwrap();
        }

        let listed = store.list().await.unwrap();
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
        assert_eq!(listed[0].title, "incident 4");
    }

    #[tokio::test]
    async fn test_write_failure_keeps_in_memory_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("incidents.json");
        let store = JsonFileIncidentStore::open(&path).await;

        let created = store
            .create(input("unsaved", IncidentType::Structure))
            .await
            .unwrap();

        assert!(!path.exists());
        assert_eq!(store.list().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_persisted() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileIncidentStore::open(mirror_path(&dir)).await);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(input(&format!("parallel {i}"), IncidentType::Vehicle))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let reopened = JsonFileIncidentStore::open(mirror_path(&dir)).await;
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed.len(), 20);

        let mut ids: Vec<_> = listed.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }
}
