use crate::error::{CurationError, Result};
use std::collections::HashSet;

/// 預設清單名稱，程式啟動時一定存在
pub const DEFAULT_LIST_NAME: &str = "Default";

/// 已標記的圖片清單
///
/// 保持加入順序且不允許重複。`dirty` 代表有尚未寫入磁碟的變更
#[derive(Debug, Clone, Default)]
pub struct CurationList {
    name: String,
    entries: Vec<String>,
    index: HashSet<String>,
    dirty: bool,
}

impl PartialEq for CurationList {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries == other.entries
    }
}

impl Eq for CurationList {}

impl CurationList {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 由已儲存的內容建立清單，重複的項目只保留第一個
    #[must_use]
    pub fn from_entries<I, S>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new(name);
        for entry in entries {
            let entry = entry.into();
            if list.index.insert(entry.clone()) {
                list.entries.push(entry);
            }
        }
        list
    }

    pub fn add(&mut self, path: &str) -> Result<()> {
        if self.index.contains(path) {
            return Err(CurationError::DuplicateEntry(path.to_string()));
        }
        self.index.insert(path.to_string());
        self.entries.push(path.to_string());
        self.dirty = true;
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Result<()> {
        if !self.index.remove(path) {
            return Err(CurationError::NotFound(path.to_string()));
        }
        self.entries.retain(|entry| entry != path);
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
