// SPDX-License-Identifier: GPL-3.0-only

//! Ordered photo set with persistence

use super::{KeyValueStore, PhotoSetError};
use crate::constants::{encoding, storage_keys, strip};
use crate::errors::{AppError, AppResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An encoded image and its MIME type
///
/// Immutable once created; a retake replaces the whole photo.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    bytes: Arc<[u8]>,
    mime: String,
}

impl Photo {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    /// JPEG-encoded photo (the capture format)
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, encoding::CAPTURE_MIME)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Parse a base64 `data:` URI
    pub fn from_data_uri(uri: &str) -> AppResult<Self> {
        let corrupt = |what: &str| AppError::PersistenceCorrupt(what.to_string());

        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| corrupt("entry is not a data URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| corrupt("data URI has no payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .filter(|m| !m.is_empty())
            .ok_or_else(|| corrupt("data URI is not base64 encoded"))?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| AppError::PersistenceCorrupt(format!("bad base64 payload: {}", e)))?;

        Ok(Self::new(bytes, mime))
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Photo({}, {} bytes)", self.mime, self.bytes.len())
    }
}

/// Result of a successful append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Index the photo landed at
    pub index: usize,
    /// This append filled the strip
    pub completed: bool,
}

/// Ordered set of up to four photos, backed by a key-value store
///
/// Mutations only change memory; callers decide when to [`persist`].
///
/// [`persist`]: PhotoStore::persist
pub struct PhotoStore {
    photos: Vec<Photo>,
    store: Arc<dyn KeyValueStore>,
}

impl PhotoStore {
    /// Empty set over a store; call [`restore`](Self::restore) to load saved photos
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            photos: Vec::with_capacity(strip::PHOTOS_PER_STRIP),
            store,
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= strip::PHOTOS_PER_STRIP
    }

    /// Photos still missing from a complete strip
    pub fn remaining(&self) -> usize {
        strip::PHOTOS_PER_STRIP.saturating_sub(self.photos.len())
    }

    pub fn append(&mut self, photo: Photo) -> Result<AppendOutcome, PhotoSetError> {
        if self.is_full() {
            return Err(PhotoSetError::Full {
                capacity: strip::PHOTOS_PER_STRIP,
            });
        }
        self.photos.push(photo);
        let index = self.photos.len() - 1;
        Ok(AppendOutcome {
            index,
            completed: self.is_full(),
        })
    }

    pub fn replace_at(&mut self, index: usize, photo: Photo) -> Result<(), PhotoSetError> {
        let len = self.photos.len();
        let slot = self
            .photos
            .get_mut(index)
            .ok_or(PhotoSetError::IndexOutOfRange { index, len })?;
        *slot = photo;
        Ok(())
    }

    /// Remove a photo; later photos shift down by one
    pub fn remove_at(&mut self, index: usize) -> Result<Photo, PhotoSetError> {
        if index >= self.photos.len() {
            return Err(PhotoSetError::IndexOutOfRange {
                index,
                len: self.photos.len(),
            });
        }
        Ok(self.photos.remove(index))
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    /// Write the set as a JSON array of data URIs; an empty set removes the key
    pub fn persist(&self) -> AppResult<()> {
        if self.photos.is_empty() {
            return self.store.remove(storage_keys::PHOTOS);
        }

        let uris: Vec<String> = self.photos.iter().map(Photo::to_data_uri).collect();
        let json = serde_json::to_string(&uris)
            .map_err(|e| AppError::Storage(format!("Failed to serialize photos: {}", e)))?;
        self.store.set(storage_keys::PHOTOS, &json)?;
        debug!(count = self.photos.len(), "Photo set persisted");
        Ok(())
    }

    /// Replace the in-memory set with the persisted one
    ///
    /// Returns the number of photos restored. A corrupt entry is removed from
    /// the store and reported as `PersistenceCorrupt`; the set is empty then.
    pub fn restore(&mut self) -> AppResult<usize> {
        self.photos.clear();

        let stored = match self.store.get(storage_keys::PHOTOS) {
            Ok(Some(json)) => Ok(json),
            Ok(None) => return Ok(0),
            Err(err @ AppError::PersistenceCorrupt(_)) => Err(err),
            Err(err) => return Err(err),
        };

        match stored.and_then(|json| decode_photo_set(&json)) {
            Ok(photos) => {
                self.photos = photos;
                info!(count = self.photos.len(), "Restored saved photos");
                Ok(self.photos.len())
            }
            Err(err) => {
                warn!(error = %err, "Discarding saved photos");
                if let Err(remove_err) = self.store.remove(storage_keys::PHOTOS) {
                    warn!(error = %remove_err, "Failed to remove corrupt photo entry");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("photos", &self.photos)
            .finish_non_exhaustive()
    }
}

fn decode_photo_set(json: &str) -> AppResult<Vec<Photo>> {
    let uris: Vec<String> = serde_json::from_str(json)
        .map_err(|e| AppError::PersistenceCorrupt(format!("malformed photo list: {}", e)))?;

    if uris.len() > strip::PHOTOS_PER_STRIP {
        return Err(AppError::PersistenceCorrupt(format!(
            "{} photos stored, at most {} allowed",
            uris.len(),
            strip::PHOTOS_PER_STRIP
        )));
    }

    uris.iter().map(|uri| Photo::from_data_uri(uri)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn photo(tag: u8) -> Photo {
        Photo::jpeg(vec![0xFF, 0xD8, tag, 0xFF, 0xD9])
    }

    fn store_with(backing: &MemoryStore) -> PhotoStore {
        PhotoStore::new(Arc::new(backing.clone()))
    }

    #[test]
    fn test_append_reports_completion_once() {
        let mut store = store_with(&MemoryStore::new());
        for i in 0..3 {
            let outcome = store.append(photo(i)).unwrap();
            assert_eq!(outcome.index, i as usize);
            assert!(!outcome.completed);
        }
        assert!(store.append(photo(3)).unwrap().completed);
        assert_eq!(
            store.append(photo(4)),
            Err(PhotoSetError::Full { capacity: 4 })
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_replace_and_remove_check_bounds() {
        let mut store = store_with(&MemoryStore::new());
        store.append(photo(0)).unwrap();
        store.append(photo(1)).unwrap();

        assert_eq!(
            store.replace_at(2, photo(9)),
            Err(PhotoSetError::IndexOutOfRange { index: 2, len: 2 })
        );
        store.replace_at(1, photo(9)).unwrap();
        assert_eq!(store.get(1), Some(&photo(9)));

        assert_eq!(store.remove_at(0).unwrap(), photo(0));
        assert_eq!(store.photos(), &[photo(9)]);
        assert!(store.remove_at(1).is_err());
    }

    #[test]
    fn test_persist_restore_is_byte_identical() {
        let backing = MemoryStore::new();
        let mut store = store_with(&backing);
        for i in 0..4 {
            store.append(photo(i)).unwrap();
        }
        store.persist().unwrap();

        let mut restored = store_with(&backing);
        assert_eq!(restored.restore().unwrap(), 4);
        assert_eq!(restored.photos(), store.photos());
    }

    #[test]
    fn test_empty_set_removes_key() {
        let backing = MemoryStore::new();
        let mut store = store_with(&backing);
        store.append(photo(0)).unwrap();
        store.persist().unwrap();
        assert!(backing.get(storage_keys::PHOTOS).unwrap().is_some());

        store.clear();
        store.persist().unwrap();
        assert_eq!(backing.get(storage_keys::PHOTOS).unwrap(), None);
    }

    #[test]
    fn test_restore_missing_key_is_empty() {
        let mut store = store_with(&MemoryStore::new());
        assert_eq!(store.restore().unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_discards_corrupt_entries() {
        let five = serde_json::to_string(&vec![photo(0).to_data_uri(); 5]).unwrap();
        let cases = [
            "not json".to_string(),
            r#"["https://example.com/a.jpg"]"#.to_string(),
            r#"["data:image/jpeg;base64,@@@"]"#.to_string(),
            r#"["data:image/jpeg,plain"]"#.to_string(),
            five,
        ];

        for json in cases {
            let backing = MemoryStore::new();
            backing.set(storage_keys::PHOTOS, &json).unwrap();

            let mut store = store_with(&backing);
            let err = store.restore().unwrap_err();
            assert!(matches!(err, AppError::PersistenceCorrupt(_)), "{json}");
            assert!(store.is_empty());
            assert_eq!(backing.get(storage_keys::PHOTOS).unwrap(), None);
        }
    }

    #[test]
    fn test_data_uri_format() {
        let uri = Photo::new(vec![1u8, 2, 3], "image/png").to_data_uri();
        assert_eq!(uri, "data:image/png;base64,AQID");
        let parsed = Photo::from_data_uri(&uri).unwrap();
        assert_eq!(parsed.mime(), "image/png");
        assert_eq!(parsed.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_restore_discards_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(storage_keys::PHOTOS), [0xFF, 0xFE, 0x00, 0x80]).unwrap();

        let backing = Arc::new(crate::storage::FileStore::new(dir.path()));
        let mut store = PhotoStore::new(backing.clone());
        let err = store.restore().unwrap_err();
        assert!(matches!(err, AppError::PersistenceCorrupt(_)));
        assert!(store.is_empty());

        // Gone for good: the next start is clean
        assert!(!dir.path().join(storage_keys::PHOTOS).exists());
        assert_eq!(store.restore().unwrap(), 0);
    }
}
