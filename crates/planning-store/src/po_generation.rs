//! 由計劃訂單自動產生採購單
//!
//! 依到貨日分組，每個日期一張待收貨採購單。日期依序處理，不是整批交易：
//! 某天失敗不會回滾已成功的日期，失敗會收集在報告中，不自動重試。

use chrono::NaiveDate;
use planning_core::{
    PlannedOrder, PlanningError, PlanningMonth, Product, PurchaseOrder, PurchaseOrderLine, Result,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::store::PlanningStore;

/// 成功產生的採購單
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPurchaseOrder {
    pub delivery_date: NaiveDate,
    pub po_id: Uuid,
    pub po_number: String,
    pub line_count: usize,
}

/// 某個日期的失敗
#[derive(Debug, Clone, PartialEq)]
pub struct PoGenerationFailure {
    pub delivery_date: NaiveDate,
    pub message: String,
}

/// 產生結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoGenerationReport {
    pub created: Vec<GeneratedPurchaseOrder>,
    pub failed: Vec<PoGenerationFailure>,
    /// 已轉成採購單並刪除的計劃訂單筆數
    pub consumed_planned_orders: usize,
}

impl PoGenerationReport {
    /// 是否全部成功
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// 成功的日期
    pub fn succeeded_dates(&self) -> Vec<NaiveDate> {
        self.created.iter().map(|po| po.delivery_date).collect()
    }
}

/// 採購單產生器
pub struct PurchaseOrderGenerator {
    /// 下單日期
    order_date: NaiveDate,
}

impl PurchaseOrderGenerator {
    pub fn new(order_date: NaiveDate) -> Self {
        Self { order_date }
    }

    /// 將計劃區內、當月採購量 > 0 的計劃訂單轉成採購單
    pub fn generate_for_room<S: PlanningStore + ?Sized>(
        &self,
        store: &mut S,
        room_id: Uuid,
        month: PlanningMonth,
    ) -> Result<PoGenerationReport> {
        if !store.list_rooms()?.iter().any(|r| r.id == room_id) {
            return Err(PlanningError::RoomNotFound(room_id));
        }

        let products: HashMap<String, Product> = store
            .list_products()?
            .into_iter()
            .filter(|p| p.planning_room == Some(room_id))
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut by_date: BTreeMap<NaiveDate, Vec<PlannedOrder>> = BTreeMap::new();
        for order in store.planned_orders_between(month.first_day(), month.last_day())? {
            if products.contains_key(&order.product_id) && order.qty_purchase > Decimal::ZERO {
                by_date.entry(order.date).or_default().push(order);
            }
        }

        tracing::info!(
            "計劃區 {} 產生採購單：{} 個日期，{} 個產品",
            room_id,
            by_date.len(),
            products.len()
        );

        let mut report = PoGenerationReport::default();

        for (date, mut orders) in by_date {
            orders.sort_by(|a, b| a.product_id.cmp(&b.product_id));

            let po = self.build_purchase_order(date, &orders, &products);
            let po_number = po.po_number.clone();
            let line_count = po.lines.len();

            let po_id = match store.create_purchase_order(po) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!("{} 的採購單建立失敗: {}", date, err);
                    report.failed.push(PoGenerationFailure {
                        delivery_date: date,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
            match store.delete_planned_orders(&ids) {
                Ok(deleted) => report.consumed_planned_orders += deleted,
                Err(err) => {
                    // 採購單已存在，計劃訂單仍在：需人工刪除以免重複計算
                    tracing::warn!(
                        "{} 的採購單 {} 已建立，但計劃訂單刪除失敗: {}",
                        date,
                        po_number,
                        err
                    );
                    report.failed.push(PoGenerationFailure {
                        delivery_date: date,
                        message: format!("採購單 {po_number} 已建立，但計劃訂單刪除失敗: {err}"),
                    });
                }
            }

            report.created.push(GeneratedPurchaseOrder {
                delivery_date: date,
                po_id,
                po_number,
                line_count,
            });
        }

        tracing::info!(
            "採購單產生完成：成功 {} 張，失敗 {} 筆",
            report.created.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn build_purchase_order(
        &self,
        date: NaiveDate,
        orders: &[PlannedOrder],
        products: &HashMap<String, Product>,
    ) -> PurchaseOrder {
        let suffix = Uuid::new_v4().simple().to_string();
        let po_number = format!("PO-{}-{}", date.format("%Y%m%d"), &suffix[..6].to_uppercase());

        let mut po = PurchaseOrder::new(po_number, self.order_date, Some(date))
            .with_note("由計劃訂單自動產生");
        for order in orders {
            let unit_cost = products
                .get(&order.product_id)
                .map(|p| p.standard_cost)
                .unwrap_or(Decimal::ZERO);
            po.add_line(
                PurchaseOrderLine::new(order.product_id.clone(), order.qty_base, order.qty_purchase)
                    .with_unit_cost(unit_cost),
            );
        }
        po
    }
}
