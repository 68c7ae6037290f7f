//! 定時自動儲存
//!
//! 背景執行緒以固定週期檢查是否啟用，啟用時執行儲存工作。
//! `stop()` 之後不會再排程

use anyhow::Result;
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveState {
    Disabled,
    Enabled,
    /// 終止狀態，只在關閉時進入
    Stopped,
}

#[derive(Debug)]
struct SharedState {
    state: AutoSaveState,
    last_saved: Option<DateTime<Local>>,
}

pub struct AutoSaveScheduler {
    shared: Arc<Mutex<SharedState>>,
    stop_sender: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl AutoSaveScheduler {
    /// 啟動排程執行緒，初始為停用狀態
    ///
    /// `save` 回傳 `Ok(true)` 代表確實寫入了檔案
    pub fn start<F>(period: Duration, mut save: F) -> Self
    where
        F: FnMut() -> Result<bool> + Send + 'static,
    {
        let shared = Arc::new(Mutex::new(SharedState {
            state: AutoSaveState::Disabled,
            last_saved: None,
        }));
        let (stop_sender, stop_receiver) = mpsc::channel::<()>();
        let worker_shared = Arc::clone(&shared);

        let handle = thread::spawn(move || {
            loop {
                match stop_receiver.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                if lock(&worker_shared).state != AutoSaveState::Enabled {
                    continue;
                }

                match save() {
                    Ok(true) => {
                        let now = Local::now();
                        lock(&worker_shared).last_saved = Some(now);
                        debug!("自動儲存完成 {}", now.format("%H:%M:%S"));
                    }
                    Ok(false) => {}
                    Err(e) => warn!("自動儲存失敗: {e:#}"),
                }
            }
            debug!("自動儲存執行緒結束");
        });

        Self {
            shared,
            stop_sender: Some(stop_sender),
            handle: Some(handle),
            period,
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn state(&self) -> AutoSaveState {
        lock(&self.shared).state
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state() == AutoSaveState::Enabled
    }

    /// 切換啟用／停用，已停止時不做任何事
    pub fn toggle(&self) -> AutoSaveState {
        let mut shared = lock(&self.shared);
        shared.state = match shared.state {
            AutoSaveState::Disabled => AutoSaveState::Enabled,
            AutoSaveState::Enabled => AutoSaveState::Disabled,
            AutoSaveState::Stopped => AutoSaveState::Stopped,
        };
        info!("自動儲存: {:?}", shared.state);
        shared.state
    }

    pub fn set_enabled(&self, enabled: bool) {
        let mut shared = lock(&self.shared);
        if shared.state != AutoSaveState::Stopped {
            shared.state = if enabled {
                AutoSaveState::Enabled
            } else {
                AutoSaveState::Disabled
            };
        }
    }

    #[must_use]
    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        lock(&self.shared).last_saved
    }

    /// 停止排程並等待執行緒結束
    pub fn stop(&mut self) {
        lock(&self.shared).state = AutoSaveState::Stopped;

        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("自動儲存執行緒異常結束");
            }
        }
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
