//! 清單匯出元件
//!
//! 讀取已儲存的清單，依路徑分類把圖片複製到目標資料夾下的子資料夾

mod main;
mod materializer;
mod progress;

pub use main::ListMaterializer;
pub use materializer::{
    EntryOutcome, MaterializationReport, Materializer, RenamedEntry, SkipReason, SkippedEntry,
};
pub use progress::{ChannelObserver, ProgressEvent, ProgressObserver};
