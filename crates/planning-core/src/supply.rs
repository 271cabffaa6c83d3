//! 採購單與在途供應模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 採購單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    /// 待收貨
    Pending,
    /// 部分收貨
    Partial,
    /// 已收貨
    Received,
    /// 已取消
    Cancelled,
}

impl PurchaseOrderStatus {
    /// 是否仍有在途數量
    pub fn is_open(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Pending | PurchaseOrderStatus::Partial)
    }
}

/// 採購單明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// 產品ID
    pub product_id: String,

    /// 訂購數量（基本單位）
    pub quantity: Decimal,

    /// 訂購數量（採購單位）
    pub purchase_qty: Decimal,

    /// 已收數量（基本單位）
    #[serde(default)]
    pub received_qty: Decimal,

    /// 單價（標準成本）
    pub unit_cost: Decimal,
}

impl PurchaseOrderLine {
    /// 創建新的明細
    pub fn new(product_id: impl Into<String>, quantity: Decimal, purchase_qty: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            purchase_qty,
            received_qty: Decimal::ZERO,
            unit_cost: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置單價
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// 建構器模式：設置已收數量
    pub fn with_received_qty(mut self, received_qty: Decimal) -> Self {
        self.received_qty = received_qty;
        self
    }

    /// 未交數量（不小於 0）
    pub fn outstanding_qty(&self) -> Decimal {
        (self.quantity - self.received_qty).max(Decimal::ZERO)
    }
}

/// 採購單（表頭 + 明細）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// 採購單ID
    pub id: Uuid,

    /// 採購單號
    pub po_number: String,

    /// 狀態
    pub status: PurchaseOrderStatus,

    /// 下單日期
    pub order_date: NaiveDate,

    /// 預計到貨日（舊資料可能缺漏）
    pub delivery_date: Option<NaiveDate>,

    /// 備註
    pub note: Option<String>,

    /// 明細
    pub lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    /// 創建新的待收貨採購單
    pub fn new(
        po_number: impl Into<String>,
        order_date: NaiveDate,
        delivery_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            po_number: po_number.into(),
            status: PurchaseOrderStatus::Pending,
            order_date,
            delivery_date,
            note: None,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: PurchaseOrderStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// 添加明細
    pub fn add_line(&mut self, line: PurchaseOrderLine) {
        self.lines.push(line);
    }

    /// 展開成在途明細（只有待收貨/部分收貨的單據，且未交數量 > 0）
    pub fn pending_lines(&self) -> Vec<PendingPoLine> {
        if !self.status.is_open() {
            return Vec::new();
        }

        self.lines
            .iter()
            .filter(|line| line.outstanding_qty() > Decimal::ZERO)
            .map(|line| PendingPoLine {
                po_id: self.id,
                product_id: line.product_id.clone(),
                outstanding_qty: line.outstanding_qty(),
                delivery_date: self.delivery_date,
            })
            .collect()
    }
}

/// 在途明細（已知的未來供應）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPoLine {
    /// 來源採購單
    pub po_id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 未交數量（基本單位）
    pub outstanding_qty: Decimal,

    /// 預計到貨日
    pub delivery_date: Option<NaiveDate>,
}
