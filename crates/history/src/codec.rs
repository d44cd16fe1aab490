//! History blob encoding.
//!
//! The blob is a JSON array of snapshots, newest first. Image payloads are
//! base64 strings inside each entry.

use clipline_clipboard::ClipboardSnapshot;

pub fn encode(entries: &[ClipboardSnapshot]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(entries)
}

/// Decode a stored blob.
///
/// Anything unreadable yields an empty history. Malformed and duplicate
/// entries are dropped (first occurrence wins) and the result is cut to
/// `max_items`.
pub fn decode(bytes: &[u8], max_items: usize) -> Vec<ClipboardSnapshot> {
    let decoded: Vec<ClipboardSnapshot> = match serde_json::from_slice(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, bytes = bytes.len(), "stored history unreadable, starting empty");
            return Vec::new();
        }
    };

    let total = decoded.len();
    let mut entries: Vec<ClipboardSnapshot> = Vec::with_capacity(total.min(max_items));
    for entry in decoded {
        if entries.len() == max_items {
            break;
        }
        if entry.is_well_formed() && !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    if entries.len() != total {
        tracing::debug!(stored = total, kept = entries.len(), "normalized stored history");
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn mixed() -> Vec<ClipboardSnapshot> {
        let now = Utc::now();
        vec![
            ClipboardSnapshot::text("hello", now),
            ClipboardSnapshot::image(vec![0x89, b'P', b'N', b'G', 0, 1, 2], now),
            ClipboardSnapshot::files(vec![PathBuf::from("/tmp/f"), PathBuf::from("/tmp/g")], now)
                .unwrap(),
        ]
    }

    #[test]
    fn test_roundtrip_mixed_kinds() {
        let original = mixed();
        let bytes = encode(&original).unwrap();
        let restored = decode(&bytes, 50);

        assert_eq!(restored, original);
        let ids: Vec<_> = restored.iter().map(|e| e.id()).collect();
        let expected: Vec<_> = original.iter().map(|e| e.id()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_corrupt_blob_is_empty() {
        assert!(decode(b"\x00\x01garbage", 50).is_empty());
        assert!(decode(br#"{"not":"a list"}"#, 50).is_empty());
        assert!(decode(b"", 50).is_empty());
    }

    #[test]
    fn test_bad_base64_is_empty() {
        let blob = br#"[{"id":"6f2a1f0e-6a8e-4c43-9d8e-0b8f6f3f6a11","captured_at":"2024-01-01T00:00:00Z","kind":"image","png":"%%%"}]"#;
        assert!(decode(blob, 50).is_empty());
    }

    #[test]
    fn test_decode_dedupes_and_truncates() {
        let now = Utc::now();
        let entries = vec![
            ClipboardSnapshot::text("a", now),
            ClipboardSnapshot::text("a", now),
            ClipboardSnapshot::text("b", now),
            ClipboardSnapshot::text("c", now),
        ];
        let restored = decode(&encode(&entries).unwrap(), 2);
        let previews: Vec<_> = restored.iter().map(|e| e.preview()).collect();
        assert_eq!(previews, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_drops_empty_payloads() {
        let blob = br#"[
            {"id":"6f2a1f0e-6a8e-4c43-9d8e-0b8f6f3f6a11","captured_at":"2024-01-01T00:00:00Z","kind":"text","text":""},
            {"id":"6f2a1f0e-6a8e-4c43-9d8e-0b8f6f3f6a12","captured_at":"2024-01-01T00:00:00Z","kind":"file_list","paths":[]},
            {"id":"6f2a1f0e-6a8e-4c43-9d8e-0b8f6f3f6a13","captured_at":"2024-01-01T00:00:00Z","kind":"text","text":"ok"}
        ]"#;
        let restored = decode(blob, 50);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].preview(), "ok");
    }
}
