//! 一次刷新所讀取的資料快照

use serde::{Deserialize, Serialize};

use crate::{InventoryLot, PendingPoLine, PlannedOrder, PlanningRoom, Product, Transaction};

/// 計劃引擎的輸入快照（產品、批次庫存、異動、在途、計劃訂單）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningSnapshot {
    #[serde(default)]
    pub rooms: Vec<PlanningRoom>,

    pub products: Vec<Product>,

    #[serde(default)]
    pub lots: Vec<InventoryLot>,

    /// 尾端歷史視窗內的異動紀錄
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub pending_lines: Vec<PendingPoLine>,

    /// 計劃月份內的計劃訂單
    #[serde(default)]
    pub planned_orders: Vec<PlannedOrder>,
}

impl PlanningSnapshot {
    /// 依ID找產品
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}
