//! 清單儲存
//!
//! 每個清單對應儲存資料夾中的一個 `<名稱>.txt`，每行一個圖片路徑

use super::curation_list::CurationList;
use super::file_system::{FileSystem, LocalFs};
use crate::error::{CurationError, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

/// 清單檔案的副檔名
pub const LIST_EXTENSION: &str = "txt";

static REGEX_ILLEGAL_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("Invalid regex"));

/// 檢查清單名稱是否可以直接當作檔名使用，回傳去除前後空白的名稱
pub fn validate_list_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.starts_with('.')
        || REGEX_ILLEGAL_NAME_CHARS.is_match(trimmed)
    {
        return Err(CurationError::InvalidListName(name.to_string()));
    }
    Ok(trimmed)
}

pub struct ListStore {
    fs: Arc<dyn FileSystem>,
    directory: PathBuf,
    /// 磁碟上清單的鏡像，每次成功儲存後更新
    lists: BTreeMap<String, CurationList>,
}

impl ListStore {
    pub fn new(fs: Arc<dyn FileSystem>, directory: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            directory: directory.into(),
            lists: BTreeMap::new(),
        }
    }

    /// 使用本機檔案系統
    pub fn local(directory: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(LocalFs), directory)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn file_system(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.fs)
    }

    #[must_use]
    pub fn list_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.{LIST_EXTENSION}"))
    }

    /// 重新從磁碟載入所有清單
    ///
    /// 單一檔案讀取失敗只會記錄警告，不影響其他清單
    pub fn load_all(&mut self) -> Result<&BTreeMap<String, CurationList>> {
        self.fs
            .create_dir_all(&self.directory)
            .map_err(|e| CurationError::io(&self.directory, e))?;

        let files = self
            .fs
            .list_files(&self.directory)
            .map_err(|e| CurationError::io(&self.directory, e))?;

        let mut lists = BTreeMap::new();
        for path in files {
            if path.extension().and_then(|ext| ext.to_str()) != Some(LIST_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("略過無法辨識的清單檔名: {}", path.display());
                continue;
            };
            // 名稱必須與檔名完全一致，否則之後會對應到另一個檔案
            let name = match validate_list_name(stem) {
                Ok(name) if name == stem => name,
                _ => {
                    warn!("略過不合法的清單名稱: {}", path.display());
                    continue;
                }
            };

            match self.read_list(name, &path) {
                Ok(list) => {
                    debug!("載入清單 '{}'，共 {} 張圖片", name, list.len());
                    lists.insert(name.to_string(), list);
                }
                Err(e) => warn!("{e}，已略過"),
            }
        }

        info!(
            "從 {} 載入 {} 個清單",
            self.directory.display(),
            lists.len()
        );
        self.lists = lists;
        Ok(&self.lists)
    }

    /// 讀取單一清單的最新內容
    pub fn load(&self, name: &str) -> Result<CurationList> {
        let name = validate_list_name(name)?;
        self.read_list(name, &self.list_path(name))
    }

    /// 讀取清單檔案的原始路徑（保留重複行），供匯出使用
    pub fn read_entries(&self, name: &str) -> Result<Vec<String>> {
        let name = validate_list_name(name)?;
        self.read_entries_at(name, &self.list_path(name))
    }

    fn read_entries_at(&self, name: &str, path: &Path) -> Result<Vec<String>> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| CurationError::LoadFailed {
                name: name.to_string(),
                source,
            })?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn read_list(&self, name: &str, path: &Path) -> Result<CurationList> {
        let entries = self.read_entries_at(name, path)?;
        let line_count = entries.len();
        let list = CurationList::from_entries(name, entries);
        if list.len() != line_count {
            warn!(
                "清單 '{}' 含有 {} 筆重複路徑，已合併",
                name,
                line_count - list.len()
            );
        }
        Ok(list)
    }

    /// 將清單寫入磁碟，覆蓋舊檔
    ///
    /// 先寫入暫存檔再改名，寫入失敗時舊檔維持原狀
    pub fn save(&mut self, list: &mut CurationList) -> Result<()> {
        let name = validate_list_name(list.name())?.to_string();
        let target = self.list_path(&name);

        self.fs
            .create_dir_all(&self.directory)
            .map_err(|e| CurationError::io(&self.directory, e))?;

        let mut content = String::new();
        for entry in list.entries() {
            content.push_str(entry);
            content.push('\n');
        }

        let temp_path = self
            .directory
            .join(format!(".{name}.{LIST_EXTENSION}.{}.tmp", Uuid::new_v4()));

        if let Err(e) = self.fs.write(&temp_path, content.as_bytes()) {
            self.discard_temp(&temp_path);
            return Err(CurationError::io(&temp_path, e));
        }
        if let Err(e) = self.fs.rename(&temp_path, &target) {
            self.discard_temp(&temp_path);
            return Err(CurationError::io(&target, e));
        }

        list.mark_clean();
        self.lists.insert(name.clone(), list.clone());
        info!("已儲存清單 '{}'（{} 張圖片）", name, list.len());
        Ok(())
    }

    fn discard_temp(&self, temp_path: &Path) {
        match self.fs.remove_file(temp_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                warn!("無法刪除暫存檔 {}: {}", temp_path.display(), e);
            }
            _ => {}
        }
    }

    /// 建立新的空白清單檔案
    pub fn create(&mut self, name: &str) -> Result<CurationList> {
        let name = validate_list_name(name)?;
        let path = self.list_path(name);

        if self.fs.exists(&path) {
            return Err(CurationError::AlreadyExists(name.to_string()));
        }

        self.fs
            .create_dir_all(&self.directory)
            .map_err(|e| CurationError::io(&self.directory, e))?;
        self.fs.create_new(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                CurationError::AlreadyExists(name.to_string())
            } else {
                CurationError::io(&path, e)
            }
        })?;

        let list = CurationList::new(name);
        self.lists.insert(name.to_string(), list.clone());
        info!("建立新清單 '{name}'");
        Ok(list)
    }

    /// 重新讀取檔案並回傳行數，檔案不存在或名稱不合法時回傳 0
    #[must_use]
    pub fn count_entries(&self, name: &str) -> usize {
        let name = match validate_list_name(name) {
            Ok(name) => name,
            Err(e) => {
                warn!("{e}");
                return 0;
            }
        };
        let path = self.list_path(name);
        match self.fs.read_to_string(&path) {
            Ok(content) => content.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) => {
                warn!("無法讀取清單檔案 {}: {}", path.display(), e);
                0
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CurationList> {
        self.lists.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MemoryFs;
    use std::fs;
    use tempfile::TempDir;

    fn memory_store() -> (Arc<MemoryFs>, ListStore) {
        let memory = Arc::new(MemoryFs::new());
        let store = ListStore::new(memory.clone(), "/lists");
        (memory, store)
    }

    #[test]
    fn test_validate_list_name() {
        assert_eq!(validate_list_name("  Wedding ").unwrap(), "Wedding");
        assert_eq!(validate_list_name("Day 1 picks").unwrap(), "Day 1 picks");

        for bad in ["", "   ", ".", "..", ".hidden", "a/b", "a\\b", "what?", "x:y", "tab\there"] {
            assert!(
                matches!(validate_list_name(bad), Err(CurationError::InvalidListName(_))),
                "{bad:?} 應該不合法"
            );
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_memory, mut store) = memory_store();
        let mut list = CurationList::from_entries("Wedding", ["/b.jpg", "/a.jpg", "/c.jpg"]);

        store.save(&mut list).unwrap();
        let loaded = store.load("Wedding").unwrap();

        assert_eq!(loaded.entries(), list.entries());
        assert_eq!(store.get("Wedding"), Some(&list));
    }

    #[test]
    fn test_save_writes_trailing_newlines_and_clears_dirty() {
        let (memory, mut store) = memory_store();
        let mut list = CurationList::new("Wedding");
        list.add("/a.jpg").unwrap();
        list.add("/b.jpg").unwrap();

        store.save(&mut list).unwrap();

        assert!(!list.is_dirty());
        assert_eq!(
            memory.file_contents("/lists/Wedding.txt").unwrap(),
            b"/a.jpg\n/b.jpg\n"
        );
        // 暫存檔不應殘留
        assert_eq!(memory.file_paths(), vec![PathBuf::from("/lists/Wedding.txt")]);
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let (memory, mut store) = memory_store();
        memory.add_file("/lists/Wedding.txt", "/old.jpg\n");
        memory.deny_writes_under("/lists");

        let mut list = CurationList::from_entries("Wedding", ["/new.jpg"]);
        let err = store.save(&mut list).unwrap_err();

        assert!(matches!(err, CurationError::Io { .. }));
        assert_eq!(
            memory.file_contents("/lists/Wedding.txt").unwrap(),
            b"/old.jpg\n"
        );
    }

    #[test]
    fn test_load_all_skips_unreadable_file() {
        let (memory, mut store) = memory_store();
        memory.add_file("/lists/Good.txt", "/a.jpg\n\n  /b.jpg  \n\n");
        memory.add_file("/lists/Broken.txt", vec![0xff, 0xfe, 0xfd]);
        memory.add_file("/lists/notes.md", "/ignored.jpg\n");

        let lists = store.load_all().unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists["Good"].entries(), ["/a.jpg", "/b.jpg"]);
    }

    #[test]
    fn test_load_all_skips_names_that_differ_from_file_name() {
        let (memory, mut store) = memory_store();
        memory.add_file("/lists/Wedding .txt", "/padded.jpg\n");
        memory.add_file("/lists/.hidden.txt", "/hidden.jpg\n");
        memory.add_file("/lists/Trip.txt", "/trip.jpg\n");

        let names: Vec<String> = store.load_all().unwrap().keys().cloned().collect();

        assert_eq!(names, vec!["Trip".to_string()]);
        assert!(!store.contains("Wedding"));
        assert_eq!(store.count_entries("Trip"), 1);
        assert_eq!(store.read_entries("Trip").unwrap(), vec!["/trip.jpg".to_string()]);
    }

    #[test]
    fn test_load_all_creates_missing_directory() {
        let (memory, mut store) = memory_store();
        assert!(store.load_all().unwrap().is_empty());
        assert!(memory.is_dir("/lists"));
    }

    #[test]
    fn test_read_entries_keeps_duplicate_lines() {
        let (memory, store) = memory_store();
        memory.add_file("/lists/Wedding.txt", "/a.jpg\n/b.jpg\n/a.jpg\n");

        assert_eq!(
            store.read_entries("Wedding").unwrap(),
            ["/a.jpg", "/b.jpg", "/a.jpg"]
        );
        assert_eq!(store.load("Wedding").unwrap().entries(), ["/a.jpg", "/b.jpg"]);
    }

    #[test]
    fn test_load_missing_list_is_load_failed() {
        let (_memory, store) = memory_store();
        assert!(matches!(
            store.load("Nope"),
            Err(CurationError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_create_rejects_existing_name() {
        let (memory, mut store) = memory_store();
        memory.add_file("/lists/Wedding.txt", "/a.jpg\n");

        let err = store.create("Wedding").unwrap_err();
        assert!(matches!(err, CurationError::AlreadyExists(_)));
        assert_eq!(
            memory.file_contents("/lists/Wedding.txt").unwrap(),
            b"/a.jpg\n"
        );
    }

    #[test]
    fn test_create_makes_empty_file() {
        let (memory, mut store) = memory_store();

        let list = store.create("Reception").unwrap();

        assert!(list.is_empty());
        assert_eq!(list.name(), "Reception");
        assert_eq!(memory.file_contents("/lists/Reception.txt").unwrap(), b"");
        assert!(store.contains("Reception"));
    }

    #[test]
    fn test_create_rejects_invalid_name() {
        let (memory, mut store) = memory_store();
        assert!(matches!(
            store.create("../escape"),
            Err(CurationError::InvalidListName(_))
        ));
        assert!(memory.file_paths().is_empty());
    }

    #[test]
    fn test_count_entries() {
        let (memory, store) = memory_store();
        memory.add_file("/lists/Wedding.txt", "/a.jpg\n/b.jpg\n\n/c.jpg\n");

        assert_eq!(store.count_entries("Wedding"), 3);
        assert_eq!(store.count_entries("Missing"), 0);
    }

    #[test]
    fn test_count_entries_rejects_names_outside_directory() {
        let (memory, store) = memory_store();
        memory.add_file("/x.txt", "/outside.jpg\n");
        memory.add_file("/lists/.hidden.txt", "/hidden.jpg\n");

        assert_eq!(store.count_entries("../x"), 0);
        assert_eq!(store.count_entries(".hidden"), 0);
    }

    #[test]
    fn test_local_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("photo-organiser");
        let mut store = ListStore::local(&dir);

        let mut list = store.create("Wedding").unwrap();
        list.add("/pics/Day 1/a.jpg").unwrap();
        list.add("/pics/Day 2/b.jpg").unwrap();
        store.save(&mut list).unwrap();

        let mut reopened = ListStore::local(&dir);
        let lists = reopened.load_all().unwrap();
        assert_eq!(lists["Wedding"].entries(), list.entries());

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
