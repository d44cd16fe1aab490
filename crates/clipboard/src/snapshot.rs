//! Captured clipboard payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Maximum preview length for text entries (chars).
pub const PREVIEW_TEXT_LEN: usize = 100;

/// Classification of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    Text,
    Image,
    FileList,
}

/// The captured content. Exactly one representation per snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotPayload {
    /// UTF-8 text.
    Text { text: String },
    /// PNG-encoded raster image.
    Image {
        #[serde(with = "base64_bytes")]
        png: Vec<u8>,
    },
    /// Ordered, non-empty list of absolute paths.
    FileList { paths: Vec<PathBuf> },
}

impl SnapshotPayload {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            SnapshotPayload::Text { .. } => SnapshotKind::Text,
            SnapshotPayload::Image { .. } => SnapshotKind::Image,
            SnapshotPayload::FileList { .. } => SnapshotKind::FileList,
        }
    }
}

/// One immutable captured clipboard payload.
///
/// Equality compares payloads only: two captures of the same text are
/// equal whatever their ids and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    id: Uuid,
    captured_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: SnapshotPayload,
}

impl ClipboardSnapshot {
    fn with_payload(payload: SnapshotPayload, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            captured_at,
            payload,
        }
    }

    pub fn text(text: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self::with_payload(SnapshotPayload::Text { text: text.into() }, captured_at)
    }

    pub fn image(png: Vec<u8>, captured_at: DateTime<Utc>) -> Self {
        Self::with_payload(SnapshotPayload::Image { png }, captured_at)
    }

    /// File-list snapshot; `None` when `paths` is empty.
    pub fn files(paths: Vec<PathBuf>, captured_at: DateTime<Utc>) -> Option<Self> {
        if paths.is_empty() {
            return None;
        }
        Some(Self::with_payload(
            SnapshotPayload::FileList { paths },
            captured_at,
        ))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn kind(&self) -> SnapshotKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &SnapshotPayload {
        &self.payload
    }

    /// Same entry (same id), stamped with a new capture time.
    pub fn restamped(&self, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            captured_at,
            payload: self.payload.clone(),
        }
    }

    /// Whether the payload satisfies its kind's constraints.
    ///
    /// Used when loading persisted data, which bypasses the constructors.
    pub fn is_well_formed(&self) -> bool {
        match &self.payload {
            SnapshotPayload::Text { text } => !text.is_empty(),
            SnapshotPayload::Image { png } => !png.is_empty(),
            SnapshotPayload::FileList { paths } => !paths.is_empty(),
        }
    }

    /// Case-insensitive substring match against the searchable content.
    ///
    /// `needle` must already be lowercase. Images never match.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        match &self.payload {
            SnapshotPayload::Text { text } => text.to_lowercase().contains(needle),
            SnapshotPayload::FileList { paths } => paths
                .iter()
                .any(|p| p.to_string_lossy().to_lowercase().contains(needle)),
            SnapshotPayload::Image { .. } => false,
        }
    }

    /// Short label for list views.
    pub fn preview(&self) -> String {
        match &self.payload {
            SnapshotPayload::Text { text } => {
                if text.chars().count() > PREVIEW_TEXT_LEN {
                    let head: String = text.chars().take(PREVIEW_TEXT_LEN).collect();
                    format!("{head}...")
                } else {
                    text.clone()
                }
            }
            SnapshotPayload::Image { .. } => "Image".to_string(),
            SnapshotPayload::FileList { paths } => {
                let first = paths.first().map(|p| file_name(p)).unwrap_or_default();
                if paths.len() > 1 {
                    format!("{first} (+{} more)", paths.len() - 1)
                } else {
                    first
                }
            }
        }
    }
}

impl PartialEq for ClipboardSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Eq for ClipboardSnapshot {}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_id_and_time() {
        let a = ClipboardSnapshot::text("hello", Utc::now());
        let b = ClipboardSnapshot::text("hello", Utc::now() + chrono::Duration::seconds(5));
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_is_per_kind() {
        let now = Utc::now();
        let text = ClipboardSnapshot::text("/tmp/f", now);
        let files = ClipboardSnapshot::files(vec![PathBuf::from("/tmp/f")], now).unwrap();
        assert_ne!(text, files);

        let img_a = ClipboardSnapshot::image(vec![1, 2, 3], now);
        let img_b = ClipboardSnapshot::image(vec![1, 2, 4], now);
        assert_ne!(img_a, img_b);

        let order_a =
            ClipboardSnapshot::files(vec![PathBuf::from("/a"), PathBuf::from("/b")], now).unwrap();
        let order_b =
            ClipboardSnapshot::files(vec![PathBuf::from("/b"), PathBuf::from("/a")], now).unwrap();
        assert_ne!(order_a, order_b);
    }

    #[test]
    fn test_empty_file_list_rejected() {
        assert!(ClipboardSnapshot::files(Vec::new(), Utc::now()).is_none());
    }

    #[test]
    fn test_restamped_keeps_identity() {
        let a = ClipboardSnapshot::text("x", Utc::now());
        let later = a.captured_at() + chrono::Duration::seconds(1);
        let b = a.restamped(later);
        assert_eq!(a.id(), b.id());
        assert_eq!(b.captured_at(), later);
    }

    #[test]
    fn test_serialized_shape() {
        let snap = ClipboardSnapshot::image(vec![0xde, 0xad], Utc::now());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["png"], "3q0=");
        assert!(json["id"].is_string());

        let back: ClipboardSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snap);
        assert_eq!(back.id(), snap.id());
    }

    #[test]
    fn test_matches_lowercase() {
        let now = Utc::now();
        let text = ClipboardSnapshot::text("Hello World", now);
        assert!(text.matches_lowercase("world"));
        assert!(!text.matches_lowercase("planet"));

        let files = ClipboardSnapshot::files(vec![PathBuf::from("/Users/me/Report.PDF")], now)
            .unwrap();
        assert!(files.matches_lowercase("report.pdf"));

        let image = ClipboardSnapshot::image(vec![1], now);
        assert!(!image.matches_lowercase("image"));
    }

    #[test]
    fn test_preview() {
        let now = Utc::now();
        let long = "a".repeat(150);
        let preview = ClipboardSnapshot::text(long, now).preview();
        assert_eq!(preview.chars().count(), PREVIEW_TEXT_LEN + 3);
        assert!(preview.ends_with("..."));

        let files = ClipboardSnapshot::files(
            vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")],
            now,
        )
        .unwrap();
        assert_eq!(files.preview(), "a.txt (+1 more)");
        assert_eq!(ClipboardSnapshot::image(vec![1], now).preview(), "Image");
    }
}
