use super::materializer::{EntryOutcome, MaterializationReport, Materializer, SkipReason};
use super::progress::{ChannelObserver, ProgressEvent};
use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Config, UserSettings};
use crate::tools::{ListStore, PathClassifier, normalize_user_path};
use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rust_i18n::t;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

/// 將清單中的圖片依分類複製到目標資料夾的元件
pub struct ListMaterializer {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl ListMaterializer {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 執行期間更新過的設定（最近使用的目標資料夾）
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.config.settings
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style(t!("materializer.title")).cyan().bold());

        let storage_directory = self.config.settings.storage_directory();
        let mut store = ListStore::local(&storage_directory);
        let names: Vec<String> = store
            .load_all()
            .with_context(|| format!("無法讀取清單資料夾 {}", storage_directory.display()))?
            .keys()
            .cloned()
            .collect();

        if names.is_empty() {
            println!(
                "{}",
                style(t!(
                    "materializer.no_lists",
                    path = storage_directory.display()
                ))
                .yellow()
            );
            return Ok(());
        }

        // 選擇清單
        let Some(name) = Self::prompt_list(&store, &names)? else {
            return Ok(()); // ESC pressed
        };

        // 選擇目標資料夾
        let Some(input) = self.prompt_destination()? else {
            return Ok(());
        };
        let destination = normalize_user_path(&input);
        if destination.as_os_str().is_empty() {
            println!("{}", style(t!("materializer.no_destination")).yellow());
            return Ok(());
        }

        // 更新路徑歷史並儲存
        add_recent_path(
            &mut self.config.settings.recent_destinations,
            &destination.to_string_lossy(),
        );
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存路徑歷史: {e}");
        }

        let classifier = PathClassifier::from_table(self.config.bucket_rules.clone())?;
        let entries = store.read_entries(&name)?;

        if entries.is_empty() {
            println!(
                "{}",
                style(t!("materializer.empty_list", list = &name)).yellow()
            );
            return Ok(());
        }

        Self::print_preview(&classifier, &entries, &destination);

        let confirm = Confirm::new()
            .with_prompt(t!("materializer.confirm"))
            .default(true)
            .interact()?;
        if !confirm {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        // 檢查中斷訊號
        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷訊號，停止處理");
            return Ok(());
        }

        let report = self.materialize_in_background(store, classifier, name, &destination)?;
        Self::print_result(&report, &destination);

        Ok(())
    }

    fn prompt_list(store: &ListStore, names: &[String]) -> Result<Option<String>> {
        let options: Vec<String> = names
            .iter()
            .map(|name| {
                let count = store.get(name).map_or(0, |list| list.len());
                format!("{name} ({})", t!("materializer.entry_count", count = count))
            })
            .collect();

        println!("{}", style(t!("common.esc_hint")).dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("materializer.list_prompt"))
            .items(&options)
            .default(0)
            .interact_opt()?;

        Ok(selection.map(|idx| names[idx].clone()))
    }

    fn prompt_destination(&self) -> Result<Option<String>> {
        let recent_destinations = &self.config.settings.recent_destinations;

        // 如果沒有歷史路徑，直接輸入
        if recent_destinations.is_empty() {
            let path: String = Input::new()
                .with_prompt(t!("materializer.destination_prompt"))
                .interact_text()?;
            return Ok(Some(path));
        }

        let mut options: Vec<String> = recent_destinations
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).is_dir() { "✓" } else { "+" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("common.new_path").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("common.select_path"))
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_destinations.len() => {
                Ok(Some(recent_destinations[idx].clone()))
            }
            Some(_) => {
                let path: String = Input::new()
                    .with_prompt(t!("materializer.destination_prompt"))
                    .interact_text()?;
                Ok(Some(path))
            }
        }
    }

    fn print_preview(classifier: &PathClassifier, entries: &[String], destination: &Path) {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in entries {
            *counts.entry(classifier.classify(entry)).or_insert(0) += 1;
        }

        println!();
        println!(
            "{}",
            style(t!(
                "materializer.preview",
                count = entries.len(),
                path = destination.display()
            ))
            .green()
        );
        println!();

        for bucket in classifier.buckets() {
            if let Some(count) = counts.get(bucket) {
                println!(
                    "  {} {} - {}",
                    style("→").dim(),
                    style(bucket).cyan(),
                    t!("materializer.entry_count", count = count)
                );
            }
        }

        println!();
    }

    /// 在工作執行緒複製檔案，前景依事件更新進度條
    fn materialize_in_background(
        &self,
        store: ListStore,
        classifier: PathClassifier,
        name: String,
        destination: &Path,
    ) -> Result<MaterializationReport> {
        let materializer = Materializer::new(
            store.file_system(),
            classifier,
            Arc::clone(&self.shutdown_signal),
        );
        let worker_destination = destination.to_path_buf();
        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut observer = ChannelObserver::new(sender);
            materializer.materialize_named(&store, &name, &worker_destination, &mut observer)
        });

        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )?
                .progress_chars("#>-"),
        );

        // 工作執行緒結束時 sender 被釋放，迴圈隨之結束
        for event in receiver {
            match event {
                ProgressEvent::Entry {
                    source,
                    outcome: EntryOutcome::Skipped(reason),
                } => {
                    progress_bar.println(format!(
                        "  {} {} ({})",
                        style("✗").red(),
                        source,
                        reason
                    ));
                }
                ProgressEvent::Entry {
                    outcome: EntryOutcome::Copied { destination, .. },
                    ..
                } => {
                    if let Some(file_name) = destination.file_name() {
                        progress_bar.set_message(file_name.to_string_lossy().into_owned());
                    }
                }
                ProgressEvent::Progress { current, total } => {
                    progress_bar.set_length(total as u64);
                    progress_bar.set_position(current as u64);
                }
                ProgressEvent::Finished(_) => {
                    progress_bar.finish_with_message(t!("materializer.done").to_string());
                }
                ProgressEvent::Failed(message) => progress_bar.abandon_with_message(message),
            }
        }

        let result = handle
            .join()
            .map_err(|_| anyhow!("匯出執行緒異常結束"))?;
        Ok(result?)
    }

    fn print_result(report: &MaterializationReport, destination: &Path) {
        println!();
        println!("{}", style(t!("materializer.result_title")).cyan().bold());
        println!(
            "  {} {}",
            t!("materializer.result_copied"),
            style(report.copied).green()
        );

        if !report.renamed.is_empty() {
            println!(
                "  {} {}",
                t!("materializer.result_renamed"),
                style(report.renamed.len()).yellow()
            );
            for renamed in &report.renamed {
                println!(
                    "    {} {} → {}",
                    style("•").dim(),
                    display_name(&renamed.original),
                    display_name(&renamed.renamed)
                );
            }
        }

        let missing = report.skipped_for(&SkipReason::SourceMissing);
        if missing > 0 {
            println!(
                "  {} {}",
                t!("materializer.result_missing"),
                style(missing).yellow()
            );
        }

        let failed = report.copy_failures();
        if failed > 0 {
            println!(
                "  {} {}",
                t!("materializer.result_failed"),
                style(failed).red()
            );
        }

        let cancelled = report.skipped_for(&SkipReason::Cancelled);
        if cancelled > 0 {
            println!(
                "  {} {}",
                t!("materializer.result_cancelled"),
                style(cancelled).yellow()
            );
        }

        // 各分類統計
        if !report.bucket_counts.is_empty() {
            println!();
            println!("{}", style(t!("materializer.result_buckets")).dim());
            for (bucket, count) in &report.bucket_counts {
                println!(
                    "  {} {}: {}",
                    style("•").dim(),
                    destination.join(bucket).display(),
                    count
                );
            }
        }

        info!(
            "清單匯出完成 - 總計: {}, 複製: {}, 改名: {}, 找不到: {}, 失敗: {}, 取消: {}",
            report.total,
            report.copied,
            report.renamed.len(),
            missing,
            failed,
            cancelled
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
