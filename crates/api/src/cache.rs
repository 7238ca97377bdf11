use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// URL-keyed response cache persisted as one JSON file. Loaded at client
/// construction, written through on every insert.
#[derive(Debug)]
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl ResponseCache {
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let entries = match fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body).unwrap_or_default(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(|body| {
            debug!(url, "response cache hit");
            body.as_str()
        })
    }

    pub fn put(&mut self, url: String, body: String) -> io::Result<()> {
        self.entries.insert(url, body);
        let serialized = serde_json::to_string(&self.entries)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        fs::write(&self.path, serialized)
    }
}

/// Directory of cached art images, one `<key>.jpg` per entry.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.jpg"))
    }

    /// Path of a cached image, if it is already on disk.
    pub fn cached(&self, key: &str) -> Option<PathBuf> {
        let path = self.path_for(key);
        path.exists().then_some(path)
    }

    pub fn store(&self, key: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(key);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

pub fn sanitize_cache_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cache_round_trips_across_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");

        let mut cache = ResponseCache::open(path.clone()).expect("open");
        assert!(cache.is_empty());
        cache
            .put("https://example/a".to_string(), "payload".to_string())
            .expect("put");
        assert_eq!(cache.get("https://example/a"), Some("payload"));

        let reopened = ResponseCache::open(path).expect("reopen");
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("https://example/a"), Some("payload"));
        assert_eq!(reopened.get("https://example/b"), None);
    }

    #[test]
    fn corrupt_cache_files_start_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");
        fs::write(&path, "not json").expect("write");
        let cache = ResponseCache::open(path).expect("open");
        assert!(cache.is_empty());
    }

    #[test]
    fn image_store_hits_skip_refetch() {
        let dir = tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path().join("cards")).expect("open");
        assert_eq!(store.cached("46986414"), None);
        let path = store.store("46986414", b"jpeg bytes").expect("store");
        assert_eq!(store.cached("46986414"), Some(path.clone()));
        assert_eq!(fs::read(path).expect("read"), b"jpeg bytes");
    }

    #[test]
    fn sanitizes_cache_keys() {
        assert_eq!(sanitize_cache_component("LOB-EN001"), "LOB_EN001");
        assert_eq!(sanitize_cache_component("abc 123"), "abc_123");
    }
}
