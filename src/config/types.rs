use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 10;

/// 自動儲存的預設週期（秒）
pub const DEFAULT_AUTO_SAVE_SECONDS: u64 = 5;

/// 儲存清單的資料夾名稱（位於「文件」資料夾下）
pub const STORAGE_FOLDER_NAME: &str = "photo-organiser";

/// 單一分類規則：路徑包含 `pattern` 時歸入 `bucket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRule {
    pub pattern: String,
    pub bucket: String,
}

/// 依序比對的分類規則表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRuleTable {
    pub rules: Vec<BucketRule>,
    pub fallback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
}

impl ImageTypeTable {
    #[must_use]
    pub fn image_extensions_set(&self) -> HashSet<String> {
        self.image_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        let image_extensions = self.image_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| image_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    /// 清單存放資料夾，未設定時使用 `~/Documents/photo-organiser`
    pub storage_directory: Option<String>,
    pub auto_save_interval_secs: u64,
    /// 最近加入的圖片資料夾
    pub recent_folders: Vec<String>,
    /// 最近使用的匯出目標資料夾
    pub recent_destinations: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            storage_directory: None,
            auto_save_interval_secs: DEFAULT_AUTO_SAVE_SECONDS,
            recent_folders: Vec::new(),
            recent_destinations: Vec::new(),
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn storage_directory(&self) -> PathBuf {
        if let Some(dir) = self
            .storage_directory
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
        {
            return PathBuf::from(dir);
        }

        dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORAGE_FOLDER_NAME)
    }

    /// 自動儲存週期，至少一秒
    #[must_use]
    pub fn auto_save_period(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bucket_rules: BucketRuleTable,
    pub image_types: ImageTypeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_file_case_insensitive() {
        let table = ImageTypeTable {
            image_file: vec![".jpg".to_string(), ".PNG".to_string()],
        };

        assert!(table.is_image_file(Path::new("/a/photo.JPG")));
        assert!(table.is_image_file(Path::new("/a/photo.png")));
        assert!(!table.is_image_file(Path::new("/a/notes.txt")));
        assert!(!table.is_image_file(Path::new("/a/no_extension")));
    }

    #[test]
    fn test_settings_missing_fields_use_defaults() {
        let settings: UserSettings = serde_json::from_str(r#"{"language":"zh-TW"}"#).unwrap();

        assert_eq!(settings.language, Language::ZhTw);
        assert_eq!(settings.auto_save_interval_secs, DEFAULT_AUTO_SAVE_SECONDS);
        assert!(settings.recent_destinations.is_empty());
    }

    #[test]
    fn test_storage_directory_override() {
        let settings = UserSettings {
            storage_directory: Some("/data/lists".to_string()),
            ..UserSettings::default()
        };
        assert_eq!(settings.storage_directory(), PathBuf::from("/data/lists"));

        let blank = UserSettings {
            storage_directory: Some("   ".to_string()),
            ..UserSettings::default()
        };
        assert!(blank.storage_directory().ends_with(STORAGE_FOLDER_NAME));
    }

    #[test]
    fn test_auto_save_period_never_zero() {
        let settings = UserSettings {
            auto_save_interval_secs: 0,
            ..UserSettings::default()
        };
        assert_eq!(settings.auto_save_period(), Duration::from_secs(1));
    }
}
