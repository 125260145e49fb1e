use std::future::Future;

use tracing::debug;

use crate::entities::{read_json, FileStore, StoreError, ThreadDocument, MODELS_FILE};

pub trait ThreadStore: Send + Sync + 'static {
    /// Create or overwrite `{id}.json`.
    fn save_thread(
        &self,
        thread_id: &str,
        document: &ThreadDocument,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every saved thread. A single unreadable document fails the whole call.
    fn list_threads(&self) -> impl Future<Output = Result<Vec<ThreadDocument>, StoreError>> + Send;

    /// Remove `{id}.json`; [`StoreError::NotFound`] when it does not exist.
    fn delete_thread(&self, thread_id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl ThreadStore for FileStore {
    async fn save_thread(
        &self,
        thread_id: &str,
        document: &ThreadDocument,
    ) -> Result<(), StoreError> {
        let path = self.thread_path(thread_id)?;
        self.write_json(&path, document).await?;
        debug!(thread_id, "thread saved");
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<ThreadDocument>, StoreError> {
        let root = self.root();
        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(root, e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(root, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if path.file_name().is_some_and(|name| name == MODELS_FILE) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut threads = Vec::with_capacity(paths.len());
        for path in paths {
            // A file removed between listing and reading is no longer a thread.
            if let Some(doc) = read_json::<ThreadDocument>(&path).await? {
                threads.push(doc);
            }
        }
        Ok(threads)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), StoreError> {
        let path = self.thread_path(thread_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(thread_id.to_owned()))
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> (TempDir, FileStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        (tmp, store)
    }

    fn doc(value: serde_json::Value) -> ThreadDocument {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn save_then_list_round_trips() {
        let (_tmp, store) = store().await;
        let thread = doc(json!({
            "id": "t1",
            "title": "Hello",
            "messages": [{ "id": "m1", "content": "hi", "replies": [] }]
        }));
        store.save_thread("t1", &thread).await.unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads, vec![thread]);
    }

    #[tokio::test]
    async fn save_overwrites_existing_thread() {
        let (_tmp, store) = store().await;
        store.save_thread("t1", &doc(json!({ "v": 1 }))).await.unwrap();
        store.save_thread("t1", &doc(json!({ "v": 2 }))).await.unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads, vec![doc(json!({ "v": 2 }))]);
    }

    #[tokio::test]
    async fn list_skips_models_file_and_non_json() {
        let (tmp, store) = store().await;
        std::fs::write(tmp.path().join(MODELS_FILE), "[]").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not a thread").unwrap();
        store.save_thread("t1", &doc(json!({ "id": "t1" }))).await.unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].0["id"], "t1");
    }

    #[tokio::test]
    async fn list_aborts_on_corrupt_document() {
        let (tmp, store) = store().await;
        store.save_thread("good", &doc(json!({ "id": "good" }))).await.unwrap();
        std::fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();

        let err = store.list_threads().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn delete_missing_thread_is_not_found() {
        let (_tmp, store) = store().await;
        let err = store.delete_thread("never-saved").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "never-saved"));
    }

    #[tokio::test]
    async fn delete_removes_thread_from_listing() {
        let (_tmp, store) = store().await;
        store.save_thread("a", &doc(json!({ "id": "a" }))).await.unwrap();
        store.save_thread("b", &doc(json!({ "id": "b" }))).await.unwrap();

        store.delete_thread("a").await.unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads, vec![doc(json!({ "id": "b" }))]);
        assert!(matches!(
            store.delete_thread("a").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn invalid_ids_never_touch_disk() {
        let (_tmp, store) = store().await;
        let err = store
            .save_thread("../escape", &doc(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
        assert!(store.list_threads().await.unwrap().is_empty());
    }
}
