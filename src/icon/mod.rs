/// Image side of the site icon workflow
///
/// This module handles:
/// - Validating uploads and generating the crop preview (preview.rs)
/// - Cropping the published master and its size variants (processor.rs)
/// - Coordinate math between preview and source (geometry.rs)
/// - Which variant sizes exist (sizes.rs) and how they are written (thumbnail.rs)

pub mod codec;
pub mod geometry;
pub mod preview;
pub mod processor;
pub mod sizes;
pub mod thumbnail;

use std::path::{Path, PathBuf};

/// First free path for `file_name` in `dir`, appending `-1`, `-2`, ...
/// to the stem when the name is taken.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = name.extension().map(|e| e.to_string_lossy().to_string());

    (1u32..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{}-{}.{}", stem, n, ext)),
            None => dir.join(format!("{}-{}", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// File name reduced to characters safe for a public URL
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_path(dir.path(), "logo.png"), dir.path().join("logo.png"));

        fs::write(dir.path().join("logo.png"), b"x").unwrap();
        fs::write(dir.path().join("logo-1.png"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "logo.png"), dir.path().join("logo-2.png"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Logo (final).png"), "My-Logo--final-.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etc-passwd");
        assert_eq!(sanitize_file_name("???"), "upload");
    }
}
