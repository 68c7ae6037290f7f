//! 路徑分類器
//!
//! 依照規則宣告的順序比對路徑中的子字串，決定匯出時的子資料夾

use crate::config::{BucketRule, BucketRuleTable, Config};
use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathClassifier {
    rules: Vec<BucketRule>,
    fallback: String,
}

impl PathClassifier {
    pub fn from_table(table: BucketRuleTable) -> Result<Self> {
        if table.fallback.trim().is_empty() {
            bail!("預設分類名稱不可為空");
        }
        if let Some(rule) = table
            .rules
            .iter()
            .find(|rule| rule.pattern.is_empty() || rule.bucket.trim().is_empty())
        {
            bail!("分類規則不完整: {rule:?}");
        }

        Ok(Self {
            rules: table.rules,
            fallback: table.fallback,
        })
    }

    /// 使用編譯時嵌入的規則（Day 1 ~ Day 4，其餘歸入 Others）
    pub fn embedded() -> Result<Self> {
        Self::from_table(Config::load_embedded_bucket_rules()?)
    }

    /// 回傳第一條「宣告順序」符合的規則，而不是路徑中最先出現的子字串
    #[must_use]
    pub fn classify(&self, path: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| path.contains(rule.pattern.as_str()))
            .map_or(self.fallback.as_str(), |rule| rule.bucket.as_str())
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// 所有可能的分類名稱，依規則順序，最後是預設分類
    #[must_use]
    pub fn buckets(&self) -> Vec<&str> {
        let mut buckets: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        for rule in &self.rules {
            if !buckets.contains(&rule.bucket.as_str()) {
                buckets.push(&rule.bucket);
            }
        }
        if !buckets.contains(&self.fallback.as_str()) {
            buckets.push(&self.fallback);
        }
        buckets
    }
}
