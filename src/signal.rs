use log::error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 建立 Ctrl-C 中斷旗標
///
/// 旗標同時交給 ProcessRunner，設定後執行中的外部工具會被終止。
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    if let Err(e) = ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，正在安全關閉...");
    }) {
        error!("無法設定 Ctrl-C 處理器: {e}");
    }

    shutdown_signal
}
