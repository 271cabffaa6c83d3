//! 庫存批次模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 批次庫存（現有庫存 = 同產品所有批次數量加總）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLot {
    /// 批次ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 數量（基本單位）
    pub quantity: Decimal,

    /// 儲位
    pub location: Option<String>,

    /// 批號
    pub lot_number: Option<String>,
}

impl InventoryLot {
    /// 創建新的批次
    pub fn new(product_id: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            quantity,
            location: None,
            lot_number: None,
        }
    }

    /// 建構器模式：設置儲位
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// 建構器模式：設置批號
    pub fn with_lot_number(mut self, lot_number: impl Into<String>) -> Self {
        self.lot_number = Some(lot_number.into());
        self
    }
}

/// 依產品彙總現有庫存
pub fn on_hand_by_product(lots: &[InventoryLot]) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for lot in lots {
        *totals.entry(lot.product_id.clone()).or_insert(Decimal::ZERO) += lot.quantity;
    }
    totals
}
