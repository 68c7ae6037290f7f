//! 測試用的記憶體檔案系統
//!
//! 只在測試建置中編譯，不會出現在發行版本

use super::file_system::FileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryFsState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    read_only: Vec<PathBuf>,
}

impl MemoryFsState {
    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() || parent == Path::new("/") => true,
            Some(parent) => self.dirs.contains(parent),
        }
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("唯讀路徑: {}", path.display()),
            ));
        }
        if !self.parent_exists(path) {
            return Err(not_found(path.parent().unwrap_or(path)));
        }
        Ok(())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("找不到路徑: {}", path.display()),
    )
}

/// 記憶體中的檔案系統，供測試使用
///
/// 可以用 `deny_writes_under` 模擬沒有寫入權限的資料夾
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<MemoryFsState>,
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryFsState> {
        // 測試用的替身，鎖中毒時直接沿用內部狀態
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// 新增檔案，並自動建立上層資料夾
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            for ancestor in parent.ancestors() {
                if !ancestor.as_os_str().is_empty() {
                    state.dirs.insert(ancestor.to_path_buf());
                }
            }
        }
        state.files.insert(path.to_path_buf(), contents.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if !ancestor.as_os_str().is_empty() {
                state.dirs.insert(ancestor.to_path_buf());
            }
        }
    }

    /// 之後所有寫到 `prefix` 底下的操作都會回傳 `PermissionDenied`
    pub fn deny_writes_under(&self, prefix: impl AsRef<Path>) {
        self.lock().read_only.push(prefix.as_ref().to_path_buf());
    }

    #[must_use]
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    #[must_use]
    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().dirs.contains(path.as_ref())
    }

    /// 所有檔案路徑（已排序）
    #[must_use]
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self
            .lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.check_writable(to)?;
        let bytes = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.dirs.contains(path) {
            return Ok(());
        }
        if state.read_only.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("唯讀路徑: {}", path.display()),
            ));
        }
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                state.dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn create_new(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.files.contains_key(path) || state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("檔案已存在: {}", path.display()),
            ));
        }
        state.check_writable(path)?;
        state.files.insert(path.to_path_buf(), Vec::new());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut state = self.lock();
        let bytes = state.files.get(from).cloned().ok_or_else(|| not_found(from))?;
        state.check_writable(to)?;
        let len = bytes.len() as u64;
        state.files.insert(to.to_path_buf(), bytes);
        Ok(len)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        if !state.dirs.contains(dir) {
            return Err(not_found(dir));
        }
        Ok(state
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_write_requires_parent() {
        let memory = MemoryFs::new();
        let err = memory
            .write(Path::new("/missing/file.txt"), b"x")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        memory.create_dir_all(Path::new("/missing")).unwrap();
        memory.write(Path::new("/missing/file.txt"), b"x").unwrap();
        assert_eq!(memory.file_contents("/missing/file.txt").unwrap(), b"x");
    }

    #[test]
    fn test_memory_denied_prefix() {
        let memory = MemoryFs::new();
        memory.add_file("/src/a.jpg", "a");
        memory.deny_writes_under("/locked");

        let err = memory
            .create_dir_all(Path::new("/locked/Day 1"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!memory.exists(Path::new("/locked")));
    }

    #[test]
    fn test_memory_read_invalid_utf8() {
        let memory = MemoryFs::new();
        memory.add_file("/lists/bad.txt", vec![0xff, 0xfe, 0x00]);

        let err = memory
            .read_to_string(Path::new("/lists/bad.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_memory_list_files_direct_children_only() {
        let memory = MemoryFs::new();
        memory.add_file("/lists/a.txt", "");
        memory.add_file("/lists/nested/b.txt", "");

        let files = memory.list_files(Path::new("/lists")).unwrap();
        assert_eq!(files, vec![PathBuf::from("/lists/a.txt")]);
    }
}
