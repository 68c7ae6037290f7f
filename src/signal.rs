use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 註冊 Ctrl-C 處理器，回傳共用的中斷旗標
///
/// 匯出時每處理完一個檔案就會檢查一次這個旗標
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    let registered = ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，完成目前的檔案後停止...");
    });

    match registered {
        Ok(()) => info!("已註冊 Ctrl-C 處理器"),
        Err(e) => warn!("無法設定 Ctrl-C 處理器: {e}"),
    }

    shutdown_signal
}
