//! 計劃訂單寫入（新增/更新/刪除單一格）

use chrono::NaiveDate;
use planning_core::{PlannedOrder, PlanningError, Product, Result};
use rust_decimal::Decimal;

use crate::store::PlanningStore;

/// 寫入結果
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// 新增
    Created(PlannedOrder),
    /// 更新既有紀錄
    Updated(PlannedOrder),
    /// 數量設為 0，已刪除
    Deleted,
    /// 數量為 0 且原本就沒有紀錄
    Unchanged,
}

/// 計劃訂單服務
pub struct PlannedOrderService;

impl PlannedOrderService {
    /// 設定 (產品, 日期) 的基本單位數量
    ///
    /// - 負數：驗證錯誤，不寫入
    /// - 0：刪除既有紀錄（不留 0 的資料列）
    /// - 正數：換算採購單位後新增或更新
    pub fn upsert<S: PlanningStore + ?Sized>(
        store: &mut S,
        product_id: &str,
        date: NaiveDate,
        qty_base: Decimal,
    ) -> Result<UpsertOutcome> {
        if qty_base < Decimal::ZERO {
            return Err(PlanningError::validation(
                "qty_base",
                format!("計劃數量不可為負，收到 {qty_base}"),
            ));
        }

        // 0 一律視為刪除，不需要產品主檔（產品已下架或換算率有誤時仍可清除）
        if qty_base.is_zero() {
            let deleted = store.delete_planned_order(product_id, date)?;
            tracing::debug!("計劃訂單 {} {} 設為 0，刪除={}", product_id, date, deleted);
            return Ok(if deleted {
                UpsertOutcome::Deleted
            } else {
                UpsertOutcome::Unchanged
            });
        }

        let product = Self::load_product(store, product_id)?;

        match store.find_planned_order(product_id, date)? {
            Some(mut existing) => {
                existing.set_quantity(qty_base, product.conversion_rate)?;
                store.upsert_planned_order(existing.clone())?;
                tracing::debug!(
                    "更新計劃訂單 {} {}：{} {}（{} {}）",
                    product_id,
                    date,
                    existing.qty_base,
                    product.base_uom,
                    existing.qty_purchase,
                    product.purchase_uom
                );
                Ok(UpsertOutcome::Updated(existing))
            }
            None => {
                let order = PlannedOrder::new(product_id, date, qty_base, product.conversion_rate)?;
                store.upsert_planned_order(order.clone())?;
                tracing::debug!("新增計劃訂單 {} {}：{}", product_id, date, qty_base);
                Ok(UpsertOutcome::Created(order))
            }
        }
    }

    /// 刪除 (產品, 日期) 的計劃訂單；不存在時不做事
    pub fn delete<S: PlanningStore + ?Sized>(
        store: &mut S,
        product_id: &str,
        date: NaiveDate,
    ) -> Result<bool> {
        Ok(store.delete_planned_order(product_id, date)?)
    }

    fn load_product<S: PlanningStore + ?Sized>(store: &S, product_id: &str) -> Result<Product> {
        let product = store
            .get_product(product_id)?
            .ok_or_else(|| PlanningError::ProductNotFound(product_id.to_string()))?;
        product.validate()?;
        Ok(product)
    }
}
