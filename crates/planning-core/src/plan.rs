//! 手動計劃訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::purchase_quantity;
use crate::Result;

/// 計劃訂單：以 (產品, 日期) 為鍵的手動補貨量
///
/// 數量為 0 代表「沒有計劃」，以不存在紀錄表示，不會存成 0 的資料列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOrder {
    /// 計劃訂單ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 預計到貨日
    pub date: NaiveDate,

    /// 數量（基本單位）
    pub qty_base: Decimal,

    /// 數量（採購單位）= ceil(qty_base / 換算率)
    pub qty_purchase: Decimal,
}

impl PlannedOrder {
    /// 創建新的計劃訂單，同時換算採購單位
    pub fn new(
        product_id: impl Into<String>,
        date: NaiveDate,
        qty_base: Decimal,
        conversion_rate: Decimal,
    ) -> Result<Self> {
        let qty_purchase = purchase_quantity(qty_base, conversion_rate)?;
        Ok(Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            date,
            qty_base,
            qty_purchase,
        })
    }

    /// 更新基本單位數量並重算採購單位
    pub fn set_quantity(&mut self, qty_base: Decimal, conversion_rate: Decimal) -> Result<()> {
        self.qty_purchase = purchase_quantity(qty_base, conversion_rate)?;
        self.qty_base = qty_base;
        Ok(())
    }

    /// 是否為 (產品, 日期) 這一格
    pub fn is_cell(&self, product_id: &str, date: NaiveDate) -> bool {
        self.product_id == product_id && self.date == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_planned_order() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let order =
            PlannedOrder::new("RICE-5KG", date, Decimal::from(10), Decimal::from(3)).unwrap();

        assert_eq!(order.qty_base, Decimal::from(10));
        assert_eq!(order.qty_purchase, Decimal::from(4));
        assert!(order.is_cell("RICE-5KG", date));
        assert!(!order.is_cell("OIL-1L", date));
    }

    #[test]
    fn test_set_quantity_keeps_old_value_on_error() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut order =
            PlannedOrder::new("RICE-5KG", date, Decimal::from(6), Decimal::from(6)).unwrap();

        assert!(order.set_quantity(Decimal::from(-1), Decimal::from(6)).is_err());
        assert_eq!(order.qty_base, Decimal::from(6));

        order.set_quantity(Decimal::from(7), Decimal::from(6)).unwrap();
        assert_eq!(order.qty_purchase, Decimal::from(2));
    }
}
