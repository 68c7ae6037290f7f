use crate::config::types::{BucketRuleTable, Config, ImageTypeTable, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 設定檔位於目前工作目錄
pub const SETTINGS_FILE: &str = "settings.json";

/// 編譯時嵌入的分類規則（不需要外部檔案）
const BUCKET_RULES_JSON: &str = include_str!("../data/bucket_rules.json");

/// 編譯時嵌入的圖片類型設定
const IMAGE_TYPE_TABLE_JSON: &str = include_str!("../data/image_type_table.json");

impl Config {
    pub fn new() -> Result<Self> {
        let bucket_rules = Self::load_embedded_bucket_rules()?;
        let image_types = Self::load_embedded_image_types()?;
        let settings = load_settings_from(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            log::warn!("{e:#}，改用預設設定");
            UserSettings::default()
        });

        Ok(Self {
            bucket_rules,
            image_types,
            settings,
        })
    }

    /// 從編譯時嵌入的 JSON 載入分類規則
    pub fn load_embedded_bucket_rules() -> Result<BucketRuleTable> {
        serde_json::from_str(BUCKET_RULES_JSON).context("無法解析嵌入的分類規則")
    }

    pub fn load_embedded_image_types() -> Result<ImageTypeTable> {
        serde_json::from_str(IMAGE_TYPE_TABLE_JSON).context("無法解析嵌入的圖片類型設定")
    }
}

pub fn load_settings_from(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}
