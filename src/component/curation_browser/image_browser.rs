//! 圖片瀏覽游標
//!
//! 記錄已加入的資料夾、所有圖片路徑以及目前位置。不負責顯示圖片

use crate::config::ImageTypeTable;
use crate::tools::FileSystem;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ImageBrowser {
    fs: Arc<dyn FileSystem>,
    image_types: ImageTypeTable,
    folders: Vec<PathBuf>,
    image_paths: Vec<PathBuf>,
    current_index: usize,
}

impl ImageBrowser {
    pub fn new(fs: Arc<dyn FileSystem>, image_types: ImageTypeTable) -> Self {
        Self {
            fs,
            image_types,
            folders: Vec::new(),
            image_paths: Vec::new(),
            current_index: 0,
        }
    }

    /// 加入資料夾並重新載入所有圖片，游標回到第一張
    pub fn add_folder(&mut self, folder: PathBuf) -> usize {
        if !self.folders.contains(&folder) {
            self.folders.push(folder);
        }
        self.reload();
        self.image_paths.len()
    }

    fn reload(&mut self) {
        let image_extensions = self.image_types.image_extensions_set();
        self.image_paths.clear();

        for folder in &self.folders {
            match self.fs.list_files(folder) {
                Ok(files) => self.image_paths.extend(files.into_iter().filter(|path| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| {
                            image_extensions.contains(&format!(".{}", ext.to_lowercase()))
                        })
                })),
                Err(e) => warn!("無法讀取資料夾 {}: {}", folder.display(), e),
            }
        }

        self.current_index = 0;
        info!(
            "從 {} 個資料夾載入 {} 張圖片",
            self.folders.len(),
            self.image_paths.len()
        );
    }

    #[must_use]
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.image_paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image_paths.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Path> {
        self.image_paths.get(self.current_index).map(PathBuf::as_path)
    }

    /// 目前圖片的路徑字串，作為清單項目使用
    #[must_use]
    pub fn current_entry(&self) -> Option<String> {
        self.current().map(|path| path.to_string_lossy().into_owned())
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// 下一張，最後一張之後回到第一張
    pub fn next(&mut self) -> Option<&Path> {
        if self.image_paths.is_empty() {
            return None;
        }
        self.current_index = (self.current_index + 1) % self.image_paths.len();
        self.current()
    }

    /// 上一張，第一張之前回到最後一張
    pub fn previous(&mut self) -> Option<&Path> {
        if self.image_paths.is_empty() {
            return None;
        }
        let len = self.image_paths.len();
        self.current_index = (self.current_index + len - 1) % len;
        self.current()
    }

    /// `(目前位置（從 1 開始）, 總數, 檔名)`
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize, String)> {
        let path = self.current()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some((self.current_index + 1, self.image_paths.len(), name))
    }

    /// `Viewing i/n: name`，沒有圖片時回傳 `None`
    #[must_use]
    pub fn status_line(&self) -> Option<String> {
        self.position()
            .map(|(index, total, name)| format!("Viewing {index}/{total}: {name}"))
    }
}
