//! # Planning Core
//!
//! 倉儲補貨計劃的核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod inventory;
pub mod plan;
pub mod product;
pub mod snapshot;
pub mod supply;
pub mod transaction;

// Re-export 主要類型
pub use calendar::PlanningMonth;
pub use config::{DemandFactor, ForecastParams, ForecastStrategy, LookbackWindow, RoomFilter};
pub use inventory::{on_hand_by_product, InventoryLot};
pub use plan::PlannedOrder;
pub use product::{purchase_quantity, PlanningRoom, Product};
pub use snapshot::PlanningSnapshot;
pub use supply::{PendingPoLine, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
pub use transaction::{Transaction, TransactionKind};

/// 計劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("欄位驗證失敗 {field}: {message}")]
    Validation { field: String, message: String },

    #[error("找不到產品: {0}")]
    ProductNotFound(String),

    #[error("找不到計劃區: {0}")]
    RoomNotFound(uuid::Uuid),

    #[error("無效的換算率 {rate}（產品 {product_id}），必須 >= 1")]
    InvalidConversionRate {
        product_id: String,
        rate: rust_decimal::Decimal,
    },

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("資料讀取失敗: {0}")]
    DataFetch(String),

    #[error("資料寫入失敗: {0}")]
    Store(String),

    #[error("匯出失敗: {0}")]
    Export(String),
}

impl PlanningError {
    /// 建立欄位驗證錯誤
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
