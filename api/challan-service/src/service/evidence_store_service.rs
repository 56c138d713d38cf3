use crate::module::evidence::model::MediaKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn media_kind_for(file_name: &str) -> Option<MediaKind> {
    let ext = extension_of(file_name)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Stored names are generated by the service; anything else is refused before touching disk.
pub fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

pub fn stored_name_for(id: &str, original_name: &str) -> String {
    match extension_of(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

pub async fn save_evidence(dir: &str, stored_name: &str, bytes: &[u8]) -> Result<(), String> {
    if !is_safe_stored_name(stored_name) {
        return Err(format!("refusing unsafe evidence name `{stored_name}`"));
    }
    fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("failed to create evidence dir: {e}"))?;
    fs::write(path_in(dir, stored_name), bytes)
        .await
        .map_err(|e| format!("failed to write evidence file: {e}"))
}

pub async fn read_evidence(dir: &str, stored_name: &str) -> Result<Option<Vec<u8>>, String> {
    if !is_safe_stored_name(stored_name) {
        return Ok(None);
    }
    match fs::read(path_in(dir, stored_name)).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("failed to read evidence file: {e}")),
    }
}

fn path_in(dir: &str, stored_name: &str) -> PathBuf {
    Path::new(dir).join(stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_media_by_extension() {
        assert_eq!(media_kind_for("cam1.JPG"), Some(MediaKind::Image));
        assert_eq!(media_kind_for("clip.mp4"), Some(MediaKind::Video));
        assert_eq!(media_kind_for("notes.txt"), None);
        assert_eq!(media_kind_for("noext"), None);
    }

    #[test]
    fn rejects_path_traversal() {
        assert!(!is_safe_stored_name("../etc/passwd"));
        assert!(!is_safe_stored_name(".env"));
        assert!(!is_safe_stored_name("a/b.jpg"));
        assert!(is_safe_stored_name("0190a1b2-c3d4.jpg"));
    }
}
