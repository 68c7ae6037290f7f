//! 清單匯出引擎
//!
//! 依序處理清單中的每個路徑：分類、建立子資料夾、處理檔名衝突並複製。
//! 單一檔案的失敗只記錄在報告中，不會中斷整批作業

use super::progress::ProgressObserver;
use crate::error::{CurationError, Result};
use crate::tools::{FileSystem, ListStore, PathClassifier};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 略過某個項目的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SourceMissing,
    CopyFailed(String),
    /// 收到中斷訊號後尚未處理的項目
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing => write!(f, "找不到來源檔案"),
            Self::CopyFailed(cause) => write!(f, "複製失敗: {cause}"),
            Self::Cancelled => write!(f, "已取消"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub source: String,
    pub reason: SkipReason,
}

/// 因檔名衝突而改名的項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedEntry {
    pub original: PathBuf,
    pub renamed: PathBuf,
}

/// 單一項目的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Copied {
        bucket: String,
        destination: PathBuf,
        /// 發生衝突時原本預計的目標路徑
        renamed_from: Option<PathBuf>,
    },
    Skipped(SkipReason),
}

/// 匯出結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializationReport {
    pub total: usize,
    /// 成功複製的數量（包含改名後複製的）
    pub copied: usize,
    pub skipped: Vec<SkippedEntry>,
    pub renamed: Vec<RenamedEntry>,
    /// 各子資料夾成功複製的數量
    pub bucket_counts: BTreeMap<String, usize>,
}

impl MaterializationReport {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.copied + self.skipped.len()
    }

    #[must_use]
    pub fn skipped_for(&self, reason: &SkipReason) -> usize {
        self.skipped.iter().filter(|s| &s.reason == reason).count()
    }

    #[must_use]
    pub fn copy_failures(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::CopyFailed(_)))
            .count()
    }

    fn record(&mut self, source: &str, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Copied {
                bucket,
                destination,
                renamed_from,
            } => {
                self.copied += 1;
                *self.bucket_counts.entry(bucket.clone()).or_insert(0) += 1;
                if let Some(original) = renamed_from {
                    self.renamed.push(RenamedEntry {
                        original: original.clone(),
                        renamed: destination.clone(),
                    });
                }
            }
            EntryOutcome::Skipped(reason) => self.skipped.push(SkippedEntry {
                source: source.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

pub struct Materializer {
    fs: Arc<dyn FileSystem>,
    classifier: PathClassifier,
    shutdown_signal: Arc<AtomicBool>,
}

impl Materializer {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        classifier: PathClassifier,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fs,
            classifier,
            shutdown_signal,
        }
    }

    /// 讀取已儲存的清單後匯出
    pub fn materialize_named(
        &self,
        store: &ListStore,
        name: &str,
        destination_root: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MaterializationReport> {
        let entries = match store.read_entries(name) {
            Ok(entries) => entries,
            Err(e) => {
                observer.on_failed(&e);
                return Err(e);
            }
        };
        info!("匯出清單 '{}'，共 {} 筆", name, entries.len());
        self.materialize(&entries, destination_root, observer)
    }

    /// 依序複製 `entries` 到 `destination_root/<分類>/`
    ///
    /// 只有目標根目錄無法建立時才會回傳錯誤
    pub fn materialize(
        &self,
        entries: &[String],
        destination_root: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MaterializationReport> {
        let total = entries.len();

        if let Err(source) = self.fs.create_dir_all(destination_root) {
            let error = CurationError::DestinationUnavailable {
                path: destination_root.to_path_buf(),
                source,
            };
            observer.on_failed(&error);
            return Err(error);
        }

        let mut report = MaterializationReport {
            total,
            ..MaterializationReport::default()
        };

        for (index, source) in entries.iter().enumerate() {
            let outcome = if self.shutdown_signal.load(Ordering::SeqCst) {
                EntryOutcome::Skipped(SkipReason::Cancelled)
            } else {
                self.copy_entry(source, destination_root)
            };

            report.record(source, &outcome);
            observer.on_entry(source, &outcome);
            observer.on_progress(index + 1, total);
        }

        info!(
            "匯出完成 - 總計: {}, 複製: {}, 改名: {}, 略過: {}",
            report.total,
            report.copied,
            report.renamed.len(),
            report.skipped.len()
        );
        observer.on_finished(&report);

        Ok(report)
    }

    fn copy_entry(&self, source: &str, destination_root: &Path) -> EntryOutcome {
        let source_path = Path::new(source);
        if !self.fs.exists(source_path) {
            warn!("找不到檔案: {source}");
            return EntryOutcome::Skipped(SkipReason::SourceMissing);
        }

        let Some(file_name) = source_path.file_name() else {
            warn!("無法取得檔案名稱: {source}");
            return EntryOutcome::Skipped(SkipReason::CopyFailed("無法取得檔案名稱".to_string()));
        };

        let bucket = self.classifier.classify(source);
        let bucket_dir = destination_root.join(bucket);
        if let Err(e) = self.fs.create_dir_all(&bucket_dir) {
            warn!("無法建立資料夾 {}: {}", bucket_dir.display(), e);
            return EntryOutcome::Skipped(SkipReason::CopyFailed(format!(
                "無法建立資料夾 {}: {e}",
                bucket_dir.display()
            )));
        }

        let original = bucket_dir.join(file_name);
        let destination = self.resolve_collision(&bucket_dir, source_path, &original);

        match self.fs.copy(source_path, &destination) {
            Ok(_) => {
                debug!("複製: {} -> {}", source, destination.display());
                let renamed_from = (destination != original).then_some(original);
                EntryOutcome::Copied {
                    bucket: bucket.to_string(),
                    destination,
                    renamed_from,
                }
            }
            Err(e) => {
                warn!("複製失敗 {}: {}", source, e);
                EntryOutcome::Skipped(SkipReason::CopyFailed(e.to_string()))
            }
        }
    }

    /// 目標已存在時依序嘗試 `<名稱>_1<副檔名>`、`<名稱>_2<副檔名>`…
    fn resolve_collision(&self, bucket_dir: &Path, source: &Path, original: &Path) -> PathBuf {
        if !self.fs.exists(original) {
            return original.to_path_buf();
        }

        let stem = source.file_stem().unwrap_or_default();
        let extension = source.extension();

        let mut counter: u64 = 1;
        loop {
            let mut name = OsString::from(stem);
            name.push(format!("_{counter}"));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }

            let candidate = bucket_dir.join(&name);
            if !self.fs.exists(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
