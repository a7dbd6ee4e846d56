//! Inline attachment descriptors for the message builder.
//!
//! Each asset is attached inline with a content id equal to its archive name,
//! which is what `cid:<name>` references in the document resolve against.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Disposition used for every embedded asset.
pub const INLINE_DISPOSITION: &str = "inline";

/// One asset ready to be attached to the outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineAttachment {
    pub filename: String,
    pub content_id: String,
    pub content_type: &'static str,
    pub disposition: &'static str,
    pub size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl InlineAttachment {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: name.to_owned(),
            content_id: name.to_owned(),
            content_type: detect_content_type(name, &bytes),
            disposition: INLINE_DISPOSITION,
            size: bytes.len(),
            bytes,
        }
    }
}

/// Build descriptors for every asset, in name order.
pub fn inline_attachments(assets: &BTreeMap<String, Vec<u8>>) -> Vec<InlineAttachment> {
    assets
        .iter()
        .map(|(name, bytes)| InlineAttachment::new(name, bytes.clone()))
        .collect()
}

/// Sniff the MIME type from magic bytes, falling back to the extension.
pub fn detect_content_type(name: &str, bytes: &[u8]) -> &'static str {
    sniff_content_type(bytes).unwrap_or_else(|| content_type_from_extension(Path::new(name)))
}

fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
    ];
    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
        return Some(*mime);
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some("image/svg+xml");
    }
    None
}

fn content_type_from_extension(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "avif" => "image/avif",
            "css" => "text/css",
            "html" | "htm" => "text/html",
            _ => "application/octet-stream",
        })
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffs_magic_bytes() {
        assert_eq!(detect_content_type("x", b"\x89PNG\r\n\x1a\nrest"), "image/png");
        assert_eq!(detect_content_type("x", b"\xff\xd8\xff\xe0"), "image/jpeg");
        assert_eq!(detect_content_type("x", b"GIF89a.."), "image/gif");
        assert_eq!(detect_content_type("x", b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(
            detect_content_type("x", b"<?xml version=\"1.0\"?><svg></svg>"),
            "image/svg+xml"
        );
    }

    #[test]
    fn test_magic_bytes_beat_extension() {
        // Exports sometimes name jpeg data .png
        assert_eq!(detect_content_type("images/image1.png", b"\xff\xd8\xff"), "image/jpeg");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(detect_content_type("images/a.JPG", b"??"), "image/jpeg");
        assert_eq!(detect_content_type("images/a.avif", b""), "image/avif");
        assert_eq!(detect_content_type("blob", b"??"), "application/octet-stream");
    }

    #[test]
    fn test_attachment_uses_name_as_content_id() {
        let mut assets = BTreeMap::new();
        assets.insert("images/image1.png".to_string(), b"\x89PNG\r\n\x1a\n".to_vec());
        let attachments = inline_attachments(&assets);

        assert_eq!(attachments.len(), 1);
        let a = &attachments[0];
        assert_eq!(a.content_id, "images/image1.png");
        assert_eq!(a.filename, "images/image1.png");
        assert_eq!(a.disposition, "inline");
        assert_eq!(a.content_type, "image/png");
        assert_eq!(a.size, 8);
    }

    #[test]
    fn test_manifest_serialization_skips_bytes() {
        let a = InlineAttachment::new("a.gif", b"GIF87a".to_vec());
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["content_type"], "image/gif");
        assert!(json.get("bytes").is_none());
    }
}
