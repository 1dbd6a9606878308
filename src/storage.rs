//! Per-image persistence of annotation sets.
//!
//! Records are keyed by image file name plus natural dimensions, so the
//! same file name at a different resolution never resurrects annotations
//! drawn against other pixels. The backing store is abstracted behind
//! [`AnnotationArchive`]; [`MemoryArchive`] is the in-process default and
//! the test double.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, epoch_millis};

/// Prefix shared by every archive key this crate writes.
pub const KEY_PREFIX: &str = "polymark-annotations-";

/// String key/value store for annotation records.
///
/// Implementations are free to put records anywhere (browser storage, a
/// file, a database row). Keys always carry [`KEY_PREFIX`].
pub trait AnnotationArchive {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Archive backed by a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, String>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AnnotationArchive for MemoryArchive {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One persisted annotation set, with the dimensions it was drawn against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub annotations: Vec<Annotation>,
    /// Epoch milliseconds of the save.
    pub timestamp: u64,
    pub natural_width: u32,
    pub natural_height: u32,
}

/// Derive the archive key for an image.
///
/// Query strings and fragments in the file name are dropped so URLs with
/// cache busters map to the same record.
pub fn image_key(file_name: &str, natural_width: u32, natural_height: u32) -> String {
    let base = file_name.split(['?', '#']).next().unwrap_or(file_name);
    format!("{KEY_PREFIX}{base}_{natural_width}x{natural_height}")
}

/// Load the annotation set stored under `key`, if it exists and was drawn
/// against the same dimensions. Dimension mismatches and unparseable
/// records are both treated as a miss.
pub fn load_annotations(
    archive: &dyn AnnotationArchive,
    key: &str,
    natural_width: u32,
    natural_height: u32,
) -> Option<Vec<Annotation>> {
    let raw = archive.read(key)?;
    match serde_json::from_str::<StoredRecord>(&raw) {
        Ok(record) if record.natural_width == natural_width
            && record.natural_height == natural_height =>
        {
            log::debug!(
                "🔍 Loaded {} stored annotations for {}",
                record.annotations.len(),
                key
            );
            Some(record.annotations)
        }
        Ok(record) => {
            log::warn!(
                "Stored annotations for {} were drawn at {}x{}, current image is {}x{}; ignoring",
                key,
                record.natural_width,
                record.natural_height,
                natural_width,
                natural_height
            );
            None
        }
        Err(error) => {
            log::warn!("Could not parse stored annotations for {}: {}", key, error);
            None
        }
    }
}

/// Persist an annotation set under `key`. Empty sets are not written, so a
/// previous record survives a transient cleared state. Returns whether a
/// record was written.
pub fn save_annotations(
    archive: &mut dyn AnnotationArchive,
    key: &str,
    annotations: &[Annotation],
    natural_width: u32,
    natural_height: u32,
) -> bool {
    if annotations.is_empty() {
        return false;
    }

    let record = StoredRecord {
        annotations: annotations.to_vec(),
        timestamp: epoch_millis(),
        natural_width,
        natural_height,
    };
    match serde_json::to_string(&record) {
        Ok(json) => {
            archive.write(key, &json);
            log::debug!("💾 Saved {} annotations under {}", annotations.len(), key);
            true
        }
        Err(error) => {
            log::error!("Could not serialize annotations for {}: {}", key, error);
            false
        }
    }
}

/// Remove the record stored under `key`, if any.
pub fn remove_annotations(archive: &mut dyn AnnotationArchive, key: &str) {
    archive.remove(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn triangle() -> Annotation {
        Annotation::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
        ])
        .expect("triangle is valid")
    }

    #[test]
    fn test_image_key_includes_dimensions() {
        assert_eq!(
            image_key("photo.jpg", 800, 600),
            "polymark-annotations-photo.jpg_800x600"
        );
    }

    #[test]
    fn test_image_key_strips_query_and_fragment() {
        assert_eq!(
            image_key("photo.jpg?v=2", 800, 600),
            "polymark-annotations-photo.jpg_800x600"
        );
        assert_eq!(
            image_key("photo.jpg#section", 800, 600),
            "polymark-annotations-photo.jpg_800x600"
        );
        assert_eq!(
            image_key("photo.jpg?v=2#section", 800, 600),
            "polymark-annotations-photo.jpg_800x600"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut archive = MemoryArchive::new();
        let key = image_key("photo.jpg", 800, 600);
        let annotations = vec![triangle()];

        assert!(save_annotations(&mut archive, &key, &annotations, 800, 600));

        let loaded = load_annotations(&archive, &key, 800, 600).expect("record exists");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, annotations[0].id);
        assert_eq!(loaded[0].points, annotations[0].points);
    }

    #[test]
    fn test_empty_set_is_not_saved() {
        let mut archive = MemoryArchive::new();
        let key = image_key("photo.jpg", 800, 600);

        assert!(!save_annotations(&mut archive, &key, &[], 800, 600));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_a_miss() {
        let mut archive = MemoryArchive::new();
        let key = image_key("photo.jpg", 800, 600);
        save_annotations(&mut archive, &key, &[triangle()], 800, 600);

        assert!(load_annotations(&archive, &key, 1024, 768).is_none());
    }

    #[test]
    fn test_corrupt_record_is_a_miss() {
        let mut archive = MemoryArchive::new();
        let key = image_key("photo.jpg", 800, 600);
        archive.write(&key, "not json at all");

        assert!(load_annotations(&archive, &key, 800, 600).is_none());
    }

    #[test]
    fn test_remove() {
        let mut archive = MemoryArchive::new();
        let key = image_key("photo.jpg", 800, 600);
        save_annotations(&mut archive, &key, &[triangle()], 800, 600);

        remove_annotations(&mut archive, &key);
        assert!(load_annotations(&archive, &key, 800, 600).is_none());
    }

    #[test]
    fn test_stored_record_field_names() {
        let record = StoredRecord {
            annotations: Vec::new(),
            timestamp: 123,
            natural_width: 800,
            natural_height: 600,
        };
        let json = serde_json::to_string(&record).expect("serializes");

        assert!(json.contains("\"naturalWidth\":800"));
        assert!(json.contains("\"naturalHeight\":600"));
        assert!(json.contains("\"timestamp\":123"));
    }
}
