//! 產品主檔與計劃區模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PlanningError, Result};

/// 產品（僅保留計劃引擎需要的欄位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 顯示名稱
    pub name: String,

    /// 類別
    pub category: Option<String>,

    /// 基本單位（庫存與消耗的最小單位，如「個」）
    pub base_uom: String,

    /// 採購單位（如「箱」）
    pub purchase_uom: String,

    /// 換算率：每一採購單位含多少基本單位（>= 1）
    pub conversion_rate: Decimal,

    /// 標準單位成本
    pub standard_cost: Decimal,

    /// 最低庫存
    pub min_stock: Decimal,

    /// 所屬計劃區（未分組時為 None）
    pub planning_room: Option<Uuid>,
}

impl Product {
    /// 創建新的產品（換算率預設為 1）
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_uom: impl Into<String>,
    ) -> Self {
        let base_uom = base_uom.into();
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            purchase_uom: base_uom.clone(),
            base_uom,
            conversion_rate: Decimal::ONE,
            standard_cost: Decimal::ZERO,
            min_stock: Decimal::ZERO,
            planning_room: None,
        }
    }

    /// 建構器模式：設置類別
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// 建構器模式：設置採購單位與換算率
    pub fn with_purchase_uom(
        mut self,
        purchase_uom: impl Into<String>,
        conversion_rate: Decimal,
    ) -> Self {
        self.purchase_uom = purchase_uom.into();
        self.conversion_rate = conversion_rate;
        self
    }

    /// 建構器模式：設置標準成本
    pub fn with_standard_cost(mut self, cost: Decimal) -> Self {
        self.standard_cost = cost;
        self
    }

    /// 建構器模式：設置最低庫存
    pub fn with_min_stock(mut self, min_stock: Decimal) -> Self {
        self.min_stock = min_stock;
        self
    }

    /// 建構器模式：設置計劃區
    pub fn with_planning_room(mut self, room_id: Uuid) -> Self {
        self.planning_room = Some(room_id);
        self
    }

    /// 驗證主檔欄位
    pub fn validate(&self) -> Result<()> {
        if self.conversion_rate < Decimal::ONE {
            return Err(PlanningError::InvalidConversionRate {
                product_id: self.id.clone(),
                rate: self.conversion_rate,
            });
        }
        if self.min_stock < Decimal::ZERO {
            return Err(PlanningError::validation("min_stock", "最低庫存不可為負"));
        }
        Ok(())
    }

    /// 基本單位數量換算成採購單位（無條件進位）
    pub fn purchase_quantity(&self, base_qty: Decimal) -> Result<Decimal> {
        self.validate()?;
        purchase_quantity(base_qty, self.conversion_rate)
    }

    /// 名稱是否包含搜尋字串（不分大小寫）
    pub fn name_matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        needle.is_empty() || self.name.to_lowercase().contains(&needle)
    }
}

/// ceil(base_qty / conversion_rate)，確保不因捨入而少訂
pub fn purchase_quantity(base_qty: Decimal, conversion_rate: Decimal) -> Result<Decimal> {
    if conversion_rate < Decimal::ONE {
        return Err(PlanningError::validation(
            "conversion_rate",
            format!("換算率必須 >= 1，收到 {conversion_rate}"),
        ));
    }
    if base_qty < Decimal::ZERO {
        return Err(PlanningError::validation(
            "qty_base",
            format!("數量不可為負，收到 {base_qty}"),
        ));
    }
    Ok((base_qty / conversion_rate).ceil())
}

/// 計劃區（使用者自訂的產品分組，如「乾貨區」）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningRoom {
    pub id: Uuid,
    pub label: String,
}

impl PlanningRoom {
    /// 創建新的計劃區
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
        }
    }
}
