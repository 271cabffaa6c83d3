//! # Planning Store
//!
//! 資料存取介面與寫入操作（計劃訂單、採購單自動產生、產品主檔更新）

pub mod catalog;
pub mod loader;
pub mod memory;
pub mod planned_order;
pub mod po_generation;
pub mod refresh;
pub mod store;

// Re-export 主要類型
pub use catalog::CatalogService;
pub use loader::SnapshotLoader;
pub use memory::MemoryStore;
pub use planned_order::{PlannedOrderService, UpsertOutcome};
pub use po_generation::{
    GeneratedPurchaseOrder, PoGenerationFailure, PoGenerationReport, PurchaseOrderGenerator,
};
pub use refresh::{RefreshGuard, RefreshTicket};
pub use store::{PlanningStore, ProductUpdate};

use planning_core::PlanningError;

/// 資料存取錯誤
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("資料來源無法使用: {0}")]
    Unavailable(String),

    #[error("找不到資料: {0}")]
    NotFound(String),

    #[error("資料衝突: {0}")]
    Conflict(String),
}

impl From<StoreError> for PlanningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => PlanningError::DataFetch(msg),
            other => PlanningError::Store(other.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
