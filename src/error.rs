//! 清單引擎的錯誤類型
//!
//! 單一項目的複製失敗不在這裡，那些會收集在 `MaterializationReport` 中

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("清單中已有此圖片: {0}")]
    DuplicateEntry(String),

    #[error("清單中找不到此圖片: {0}")]
    NotFound(String),

    #[error("清單已存在: {0}")]
    AlreadyExists(String),

    #[error("不合法的清單名稱: {0:?}")]
    InvalidListName(String),

    #[error("沒有這個清單: {0}")]
    UnknownList(String),

    #[error("清單 '{0}' 中沒有任何圖片")]
    EmptyList(String),

    #[error("無法載入清單 {name}: {source}")]
    LoadFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("無法使用目標資料夾 {}: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("檔案操作失敗 {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CurationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurationError>;
