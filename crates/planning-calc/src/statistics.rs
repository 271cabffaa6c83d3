//! 需求統計

use chrono::{Duration, FixedOffset, NaiveDate};
use planning_core::{LookbackWindow, Transaction};
use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::classifier::TransactionClassifier;

/// 近期平均的固定視窗（天）
const RECENT_WINDOW_DAYS: u32 = 7;

/// 趨勢判定門檻（%）
const TREND_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// 趨勢方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// 單一產品的需求統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandStatistics {
    /// 基期天數
    pub lookback_days: u32,

    /// 基期總用量
    pub total_base_period: Decimal,

    /// 基期日平均
    pub avg_base: Decimal,

    /// 每日用量的母體標準差（含零用量日）
    pub std_dev: Decimal,

    /// 近 7 日平均
    pub avg7: Decimal,

    /// 基期內單日最大用量
    pub max_daily: Decimal,

    /// 趨勢方向
    pub trend: TrendDirection,

    /// 趨勢百分比
    pub trend_percent: Decimal,

    /// 基期內是否有任何用量（區分「確定為 0」與「沒有資料」）
    pub has_data_in_period: bool,

    /// 基期內每一天的用量（無異動的日子為 0）
    pub daily_usage: BTreeMap<NaiveDate, Decimal>,
}

/// 依產品彙總的每日出庫用量
#[derive(Debug, Clone, Default)]
pub struct DemandHistory {
    usage: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
    orphan_transactions: usize,
}

impl DemandHistory {
    /// 分類異動並依 (產品, 營業日) 累加出庫量
    ///
    /// 參照不存在產品的異動不列入任何產品，只計數。
    pub fn build(
        transactions: &[Transaction],
        known_products: &HashSet<&str>,
        classifier: &dyn TransactionClassifier,
        offset: FixedOffset,
    ) -> Self {
        let mut history = Self::default();

        for tx in transactions {
            if !known_products.contains(tx.product_id.as_str()) {
                history.orphan_transactions += 1;
                tracing::debug!("異動 {} 參照不存在的產品 {}，略過", tx.id, tx.product_id);
                continue;
            }

            if let Some(qty) = classifier.classify(tx).outbound_qty() {
                *history
                    .usage
                    .entry(tx.product_id.clone())
                    .or_default()
                    .entry(tx.local_date(offset))
                    .or_insert(Decimal::ZERO) += qty;
            }
        }

        if history.orphan_transactions > 0 {
            tracing::warn!("{} 筆異動無法對應產品主檔，已排除", history.orphan_transactions);
        }

        history
    }

    /// 該產品的每日用量
    pub fn usage(&self, product_id: &str) -> Option<&BTreeMap<NaiveDate, Decimal>> {
        self.usage.get(product_id)
    }

    /// 無法對應產品的異動筆數
    pub fn orphan_transactions(&self) -> usize {
        self.orphan_transactions
    }
}

/// 需求統計計算器
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// 計算以 today 結尾（含當日）的基期統計
    pub fn calculate(
        usage: Option<&BTreeMap<NaiveDate, Decimal>>,
        today: NaiveDate,
        lookback: LookbackWindow,
    ) -> DemandStatistics {
        let period = lookback.days();
        let daily_usage = Self::dense_window(usage, today, period);

        let total_base_period: Decimal = daily_usage.values().copied().sum();
        let max_daily = daily_usage.values().copied().max().unwrap_or(Decimal::ZERO);
        let has_data_in_period = daily_usage.values().any(|qty| *qty > Decimal::ZERO);

        // period 來自 LookbackWindow，恆大於 0
        let days = Decimal::from(period);
        let avg_base = total_base_period / days;

        let variance = daily_usage
            .values()
            .map(|qty| {
                let diff = *qty - avg_base;
                diff * diff
            })
            .sum::<Decimal>()
            / days;
        let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

        let recent_total: Decimal = Self::dense_window(usage, today, RECENT_WINDOW_DAYS)
            .values()
            .copied()
            .sum();
        let avg7 = recent_total / Decimal::from(RECENT_WINDOW_DAYS);

        let (trend, trend_percent) = Self::classify_trend(avg7, avg_base);

        DemandStatistics {
            lookback_days: period,
            total_base_period,
            avg_base,
            std_dev,
            avg7,
            max_daily,
            trend,
            trend_percent,
            has_data_in_period,
            daily_usage,
        }
    }

    /// 趨勢判定：±20%（含邊界）
    pub fn classify_trend(avg7: Decimal, avg_base: Decimal) -> (TrendDirection, Decimal) {
        if avg_base > Decimal::ZERO {
            let percent = (avg7 - avg_base) / avg_base * Decimal::ONE_HUNDRED;
            let direction = if percent >= TREND_THRESHOLD {
                TrendDirection::Up
            } else if percent <= -TREND_THRESHOLD {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            };
            (direction, percent)
        } else if avg7 > Decimal::ZERO {
            (TrendDirection::Up, Decimal::ONE_HUNDRED)
        } else {
            (TrendDirection::Stable, Decimal::ZERO)
        }
    }

    /// today-(days-1) ..= today 每一天都有一筆（缺的補 0）
    fn dense_window(
        usage: Option<&BTreeMap<NaiveDate, Decimal>>,
        today: NaiveDate,
        days: u32,
    ) -> BTreeMap<NaiveDate, Decimal> {
        (0..days)
            .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
            .map(|date| {
                let qty = usage
                    .and_then(|u| u.get(&date))
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                (date, qty)
            })
            .collect()
    }
}
