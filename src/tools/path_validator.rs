use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 整理使用者輸入的路徑：去除前後空白與拖放時帶入的引號
#[must_use]
pub fn normalize_user_path(input: &str) -> PathBuf {
    let trimmed = input.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    PathBuf::from(unquoted.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory_exists() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_directory_exists(temp_dir.path()).is_ok());

        let file = temp_dir.path().join("photo.jpg");
        std::fs::write(&file, "x").unwrap();
        assert!(validate_directory_exists(&file).is_err());
        assert!(validate_directory_exists(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_normalize_user_path() {
        assert_eq!(
            normalize_user_path("  \"/pics/Day 1\"  "),
            PathBuf::from("/pics/Day 1")
        );
        assert_eq!(normalize_user_path("'/pics'"), PathBuf::from("/pics"));
        assert_eq!(normalize_user_path("/plain "), PathBuf::from("/plain"));
        assert_eq!(normalize_user_path("\"unbalanced"), PathBuf::from("\"unbalanced"));
    }
}
