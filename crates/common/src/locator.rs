//! Classification of storage-provider URLs.
//!
//! The storage provider exposes a handful of distinct URL shapes: direct
//! files, containers (folders), and rich-document sub-types that each embed
//! through their own preview endpoint. Everything here is pure string work,
//! no I/O.

const DRIVE_ORIGIN: &str = "https://drive.google.com";
const DOCS_ORIGIN: &str = "https://docs.google.com";

/// What a storage-provider URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Container,
    Unknown,
}

/// Result of classifying a URL.
///
/// Containers have no preview address (they cannot be embedded directly;
/// callers browse them through the navigator instead). Unknown shapes pass
/// the original URL through as a best-effort preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ResourceKind,
    pub preview_url: Option<String>,
}

/// Grab the path segment that follows `marker`, terminated by a separator.
fn capture_after<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let start = url.find(marker)? + marker.len();
    let rest = &url[start..];
    let end = rest
        .find(['/', '?', '#'])
        .unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(&rest[..end])
    }
}

/// Classify a storage-provider URL into a resource kind and preview address.
pub fn classify(url: &str) -> Classification {
    if let Some(id) = capture_after(url, "/file/d/") {
        return Classification {
            kind: ResourceKind::File,
            preview_url: Some(format!("{DRIVE_ORIGIN}/file/d/{id}/preview")),
        };
    }
    if let Some(id) = capture_after(url, "document/d/") {
        return Classification {
            kind: ResourceKind::File,
            preview_url: Some(format!("{DOCS_ORIGIN}/document/d/{id}/preview")),
        };
    }
    if let Some(id) = capture_after(url, "spreadsheets/d/") {
        return Classification {
            kind: ResourceKind::File,
            preview_url: Some(format!("{DOCS_ORIGIN}/spreadsheets/d/{id}/preview")),
        };
    }
    if let Some(id) = capture_after(url, "presentation/d/") {
        return Classification {
            kind: ResourceKind::File,
            preview_url: Some(format!("{DOCS_ORIGIN}/presentation/d/{id}/preview")),
        };
    }
    if capture_after(url, "/folders/").is_some() {
        return Classification {
            kind: ResourceKind::Container,
            preview_url: None,
        };
    }
    Classification {
        kind: ResourceKind::Unknown,
        preview_url: Some(url.to_string()),
    }
}

/// Build the canonical share link for a storage item.
pub fn resource_url(is_container: bool, id: &str) -> String {
    if is_container {
        format!("{DRIVE_ORIGIN}/drive/folders/{id}")
    } else {
        format!("{DRIVE_ORIGIN}/file/d/{id}/view")
    }
}

/// Recover the storage item id from a file or folder URL.
pub fn extract_item_id(url: &str) -> Option<String> {
    capture_after(url, "/file/d/")
        .or_else(|| capture_after(url, "/folders/"))
        .map(|id| id.to_string())
}

/// Recover the share id from a `{origin}/qr/{id}` URL.
pub fn extract_share_id(url: &str) -> Option<String> {
    capture_after(url, "/qr/").map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_file() {
        let c = classify("https://drive.google.com/file/d/abc123/view");
        assert_eq!(c.kind, ResourceKind::File);
        assert_eq!(
            c.preview_url.as_deref(),
            Some("https://drive.google.com/file/d/abc123/preview")
        );
    }

    #[test]
    fn test_classify_container_has_no_preview() {
        let c = classify("https://drive.google.com/drive/folders/xyz?usp=sharing");
        assert_eq!(c.kind, ResourceKind::Container);
        assert_eq!(c.preview_url, None);
    }

    #[test]
    fn test_classify_rich_document_subtypes() {
        let doc = classify("https://docs.google.com/document/d/d1/edit");
        assert_eq!(
            doc.preview_url.as_deref(),
            Some("https://docs.google.com/document/d/d1/preview")
        );

        let sheet = classify("https://docs.google.com/spreadsheets/d/s1/edit#gid=0");
        assert_eq!(
            sheet.preview_url.as_deref(),
            Some("https://docs.google.com/spreadsheets/d/s1/preview")
        );

        let slides = classify("https://docs.google.com/presentation/d/p1");
        assert_eq!(
            slides.preview_url.as_deref(),
            Some("https://docs.google.com/presentation/d/p1/preview")
        );
    }

    #[test]
    fn test_classify_unknown_passes_through() {
        let c = classify("https://example.com/some/other/link");
        assert_eq!(c.kind, ResourceKind::Unknown);
        assert_eq!(
            c.preview_url.as_deref(),
            Some("https://example.com/some/other/link")
        );
    }

    #[test]
    fn test_extract_ids() {
        assert_eq!(
            extract_item_id("https://drive.google.com/file/d/abc/view"),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_item_id("https://drive.google.com/drive/folders/def?x=1"),
            Some("def".to_string())
        );
        assert_eq!(extract_item_id("https://example.com/nothing"), None);

        assert_eq!(
            extract_share_id("https://share.example.com/qr/Ab3_x9-Z"),
            Some("Ab3_x9-Z".to_string())
        );
        assert_eq!(extract_share_id("https://share.example.com/qr/"), None);
    }

    #[test]
    fn test_resource_url() {
        assert_eq!(
            resource_url(true, "f1"),
            "https://drive.google.com/drive/folders/f1"
        );
        assert_eq!(
            resource_url(false, "f2"),
            "https://drive.google.com/file/d/f2/view"
        );
    }
}
