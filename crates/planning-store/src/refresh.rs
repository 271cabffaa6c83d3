//! 刷新世代計數：避免較晚回來的舊請求覆蓋新的狀態

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 一次刷新的世代編號
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// 刷新世代計數器（可跨執行緒共用）
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    generation: Arc<AtomicU64>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始新的刷新；之前發出的 ticket 全部作廢
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// ticket 是否仍是最新的一次刷新
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_refresh_invalidates_older_ticket() {
        let guard = RefreshGuard::new();
        let stale = guard.begin();
        assert!(guard.is_current(stale));

        let fresh = guard.clone().begin();
        assert!(!guard.is_current(stale));
        assert!(guard.is_current(fresh));
        assert!(fresh.generation() > stale.generation());
    }
}
