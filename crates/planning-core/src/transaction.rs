//! 異動紀錄模型

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 異動類型（由上游系統在寫入時決定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// 進貨入庫
    Receipt,
    /// 領用出庫
    Issue,
    /// 銷售出庫
    Sale,
    /// 調撥出庫
    Transfer,
    /// 報廢
    Disposal,
    /// 庫存調整
    Adjustment,
    /// 盤點差異
    CycleCount,
}

impl TransactionKind {
    /// 是否為出庫需求
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            TransactionKind::Issue
                | TransactionKind::Sale
                | TransactionKind::Transfer
                | TransactionKind::Disposal
        )
    }

    /// 是否為入庫供應
    pub fn is_inbound(&self) -> bool {
        *self == TransactionKind::Receipt
    }
}

/// 異動紀錄（只增不改）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// 紀錄ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 原始類型標籤（各資料來源用詞不一，如 OUTBOUND / ADJUST / RECEIPT）
    pub type_tag: String,

    /// 明確的異動類型；舊資料可能沒有
    #[serde(default)]
    pub kind: Option<TransactionKind>,

    /// 帶正負號的數量變化
    pub quantity_change: Decimal,

    /// 發生時間
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// 創建新的異動紀錄（未標註類型）
    pub fn new(
        product_id: impl Into<String>,
        type_tag: impl Into<String>,
        quantity_change: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            type_tag: type_tag.into(),
            kind: None,
            quantity_change,
            timestamp,
        }
    }

    /// 建構器模式：設置明確類型
    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// 依時區換算出的營業日
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(&offset).date_naive()
    }
}
