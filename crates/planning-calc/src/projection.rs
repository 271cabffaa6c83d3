//! 逐日庫存推演

use chrono::NaiveDate;
use planning_core::calendar::day_label;
use planning_core::{PendingPoLine, PlannedOrder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::ForecastWarning;

/// 時間軸上的一天
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// 日期
    pub date: NaiveDate,
    /// 顯示標籤
    pub label: String,
    /// 當日預測需求
    pub demand: Decimal,
    /// 當日在途到貨（基本單位）
    pub incoming_po_qty: Decimal,
    /// 當日計劃訂單（基本單位）
    pub planned_base_qty: Decimal,
    /// 當日計劃訂單（採購單位）
    pub planned_purchase_qty: Decimal,
    /// 當日結束時的預計庫存（可為負，表示缺貨程度）
    pub projected_stock: Decimal,
    /// 預計庫存是否低於最低庫存
    pub below_min_stock: bool,
}

/// 推演輸入
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    /// 起始現有庫存
    pub starting_stock: Decimal,
    /// 每日需求
    pub applied_demand: Decimal,
    /// 最低庫存
    pub min_stock: Decimal,
    /// 今天
    pub today: NaiveDate,
    /// 推演日期（依序）
    pub horizon: &'a [NaiveDate],
    /// 依日期彙總的在途到貨
    pub incoming: &'a BTreeMap<NaiveDate, Decimal>,
    /// 依日期的計劃訂單
    pub planned: &'a HashMap<NaiveDate, PlannedOrder>,
}

/// 庫存推演器
pub struct StockProjection;

impl StockProjection {
    /// 逐日推演：庫存 = 前日庫存 - 需求 + 在途到貨 + 計劃訂單
    ///
    /// 推演起點在未來時，先扣掉今天到起點之間的消耗。不做歸零處理。
    pub fn simulate(input: ProjectionInput<'_>) -> Vec<TimelineEntry> {
        let mut running_stock = input.starting_stock;

        if let Some(&start) = input.horizon.first() {
            let days_until_start = (start - input.today).num_days();
            if days_until_start > 0 {
                running_stock -= input.applied_demand * Decimal::from(days_until_start);
            }
        }

        input
            .horizon
            .iter()
            .map(|&date| {
                let incoming_po_qty = input.incoming.get(&date).copied().unwrap_or(Decimal::ZERO);
                let (planned_base_qty, planned_purchase_qty) = input
                    .planned
                    .get(&date)
                    .map(|order| (order.qty_base, order.qty_purchase))
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));

                running_stock =
                    running_stock - input.applied_demand + incoming_po_qty + planned_base_qty;

                TimelineEntry {
                    date,
                    label: day_label(date),
                    demand: input.applied_demand,
                    incoming_po_qty,
                    planned_base_qty,
                    planned_purchase_qty,
                    projected_stock: running_stock,
                    below_min_stock: running_stock < input.min_stock,
                }
            })
            .collect()
    }

    /// 彙總單一產品的在途到貨；缺少到貨日的明細略過並產生警告
    pub fn incoming_by_date<'a>(
        product_id: &str,
        lines: impl IntoIterator<Item = &'a PendingPoLine>,
    ) -> (BTreeMap<NaiveDate, Decimal>, Vec<ForecastWarning>) {
        let mut incoming = BTreeMap::new();
        let mut warnings = Vec::new();

        for line in lines.into_iter().filter(|l| l.product_id == product_id) {
            match line.delivery_date {
                Some(date) => {
                    *incoming.entry(date).or_insert(Decimal::ZERO) += line.outstanding_qty;
                }
                None => {
                    tracing::warn!("採購單 {} 的 {} 缺少到貨日，略過", line.po_id, product_id);
                    warnings.push(ForecastWarning::warning(
                        product_id.to_string(),
                        format!("採購單 {} 明細缺少到貨日，已略過", line.po_id),
                    ));
                }
            }
        }

        (incoming, warnings)
    }
}
