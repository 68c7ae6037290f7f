//! 標記工作階段
//!
//! 持有所有清單的工作副本與目前使用中的清單，所有來自介面的操作都經過這裡

use crate::error::{CurationError, Result};
use crate::tools::{CurationList, DEFAULT_LIST_NAME, ListStore, validate_list_name};
use log::info;
use std::collections::BTreeMap;

pub struct CurationSession {
    store: ListStore,
    lists: BTreeMap<String, CurationList>,
    active: String,
    /// 目前清單在磁碟上的筆數
    persisted_count: usize,
}

impl CurationSession {
    /// 載入儲存資料夾中的所有清單，並確保 `Default` 清單存在
    pub fn open(mut store: ListStore) -> Result<Self> {
        let mut lists = store.load_all()?.clone();
        lists
            .entry(DEFAULT_LIST_NAME.to_string())
            .or_insert_with(|| CurationList::new(DEFAULT_LIST_NAME));

        let active = DEFAULT_LIST_NAME.to_string();
        let persisted_count = store.get(&active).map_or(0, CurationList::len);

        Ok(Self {
            store,
            lists,
            active,
            persisted_count,
        })
    }

    #[must_use]
    pub fn store(&self) -> &ListStore {
        &self.store
    }

    #[must_use]
    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn active_list(&self) -> Result<&CurationList> {
        self.lists
            .get(&self.active)
            .ok_or_else(|| CurationError::UnknownList(self.active.clone()))
    }

    fn active_list_mut(&mut self) -> Result<&mut CurationList> {
        self.lists
            .get_mut(&self.active)
            .ok_or_else(|| CurationError::UnknownList(self.active.clone()))
    }

    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.lists.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub const fn persisted_count(&self) -> usize {
        self.persisted_count
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.lists.values().any(CurationList::is_dirty)
    }

    /// 加入目前圖片，不會自動寫入磁碟
    pub fn add_current(&mut self, path: &str) -> Result<usize> {
        let list = self.active_list_mut()?;
        list.add(path)?;
        info!("已加入 {} 到清單 '{}'", path, list.name());
        Ok(list.len())
    }

    /// 移除目前圖片並立即寫入磁碟（即使清單因此變成空的）
    pub fn remove_current(&mut self, path: &str) -> Result<usize> {
        let list = self.active_list_mut()?;
        list.remove(path)?;
        info!("已從清單 '{}' 移除 {}", list.name(), path);
        self.save_active()?;
        self.active_list().map(CurationList::len)
    }

    /// 手動匯出（儲存）目前清單，空清單不寫入
    pub fn export_active(&mut self) -> Result<()> {
        if self.active_list()?.is_empty() {
            return Err(CurationError::EmptyList(self.active.clone()));
        }
        self.save_active()
    }

    fn save_active(&mut self) -> Result<()> {
        let list = self
            .lists
            .get_mut(&self.active)
            .ok_or_else(|| CurationError::UnknownList(self.active.clone()))?;
        self.store.save(list)?;
        self.persisted_count = list.len();
        Ok(())
    }

    /// 建立新清單並切換過去
    pub fn create_list(&mut self, name: &str) -> Result<()> {
        // 以去除空白後的名稱比對，尚未寫入磁碟的 Default 也算已存在
        let name = validate_list_name(name)?;
        if self.lists.contains_key(name) {
            return Err(CurationError::AlreadyExists(name.to_string()));
        }
        let list = self.store.create(name)?;
        let name = list.name().to_string();
        self.lists.insert(name.clone(), list);
        self.active = name;
        self.persisted_count = 0;
        Ok(())
    }

    /// 切換清單，並重新讀取磁碟上的筆數
    pub fn switch_list(&mut self, name: &str) -> Result<usize> {
        if !self.lists.contains_key(name) {
            return Err(CurationError::UnknownList(name.to_string()));
        }
        self.active = name.to_string();
        self.persisted_count = self.store.count_entries(name);
        Ok(self.persisted_count)
    }

    /// 寫入所有有未儲存變更的非空清單，回傳寫入的清單數
    pub fn save_pending(&mut self) -> Result<usize> {
        let mut saved = 0;
        for list in self
            .lists
            .values_mut()
            .filter(|list| list.is_dirty() && !list.is_empty())
        {
            self.store.save(list)?;
            if list.name() == self.active {
                self.persisted_count = list.len();
            }
            saved += 1;
        }
        Ok(saved)
    }

    /// 自動儲存：清單非空時寫入，回傳是否有寫入
    pub fn auto_save_tick(&mut self) -> Result<bool> {
        if self.active_list()?.is_empty() {
            return Ok(false);
        }
        self.save_active()?;
        Ok(true)
    }
}
