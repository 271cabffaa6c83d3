//! # Planning Calculation Engine
//!
//! 需求預測與補貨計劃引擎：
//! 異動分類 → 需求統計 → 策略選擇 → 逐日庫存推演

pub mod calculator;
pub mod classifier;
pub mod export;
pub mod projection;
pub mod statistics;
pub mod strategy;

// Re-export 主要類型
pub use calculator::{ForecastCalculator, ForecastInputs};
pub use classifier::{Classification, KeywordClassifier, KindClassifier, TransactionClassifier};
pub use export::TimelineExporter;
pub use projection::{StockProjection, TimelineEntry};
pub use statistics::{DemandHistory, DemandStatistics, StatisticsCalculator, TrendDirection};
pub use strategy::StrategySelector;

use chrono::NaiveDate;
use planning_core::{DemandFactor, ForecastParams, ForecastStrategy};
use rust_decimal::Decimal;
use serde::Serialize;

/// 單一產品的預測結果（衍生資料，不落地）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub product_id: String,
    pub product_name: String,
    pub base_uom: String,
    pub purchase_uom: String,

    /// 需求統計
    pub stats: DemandStatistics,

    /// 使用的策略
    pub strategy: ForecastStrategy,

    /// 季節係數
    pub demand_factor: DemandFactor,

    /// 套用策略與係數後的每日需求
    pub applied_demand: Decimal,

    /// 起始現有庫存
    pub starting_stock: Decimal,

    /// 逐日時間軸
    pub timeline: Vec<TimelineEntry>,

    /// 警告信息
    pub warnings: Vec<ForecastWarning>,
}

impl ForecastResult {
    /// 參數所選的週視窗（`params.week_offset` 頁，以 `params.month` 切分）
    ///
    /// 頁碼超出月份時回傳空的切片。
    pub fn week_for(&self, params: &ForecastParams) -> &[TimelineEntry] {
        let window = params.month.week_window(params.week_offset);
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return &[];
        };
        let start = self.timeline.iter().position(|e| e.date == *first);
        let end = self.timeline.iter().rposition(|e| e.date == *last);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => &self.timeline[start..=end],
            _ => &[],
        }
    }

    /// 第一個預計庫存為負的日期
    pub fn first_stockout_date(&self) -> Option<NaiveDate> {
        self.timeline
            .iter()
            .find(|entry| entry.projected_stock < Decimal::ZERO)
            .map(|entry| entry.date)
    }

    /// 月底預計庫存
    pub fn ending_stock(&self) -> Decimal {
        self.timeline
            .last()
            .map(|entry| entry.projected_stock)
            .unwrap_or(self.starting_stock)
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ForecastWarning) {
        self.warnings.push(warning);
    }
}

/// 預測警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastWarning {
    pub product_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ForecastWarning {
    pub fn new(product_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            product_id,
            message,
            severity,
        }
    }

    pub fn info(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Info)
    }

    pub fn warning(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use planning_core::{InventoryLot, PlanningMonth, PlanningSnapshot, Product};

    fn forecast(params: &ForecastParams) -> ForecastResult {
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let snapshot = PlanningSnapshot {
            products: vec![Product::new("RICE-5KG", "Jasmine Rice", "bag")],
            lots: vec![InventoryLot::new("RICE-5KG", Decimal::from(12))],
            ..Default::default()
        };
        let calculator = ForecastCalculator::new(today, FixedOffset::east_opt(0).unwrap());
        let inputs = calculator.index(&snapshot);
        calculator.forecast(&inputs, &snapshot.products[0], params)
    }

    #[test]
    fn test_week_page_follows_params() {
        let february = ForecastParams::new(PlanningMonth::new(2025, 2).unwrap());
        let result = forecast(&february);

        let first = result.week_for(&february);
        assert_eq!(first.len(), 7);
        assert_eq!(first[0].date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());

        let fourth = result.week_for(&february.clone().with_week_offset(3));
        assert_eq!(fourth.len(), 7);
        assert_eq!(fourth[6].date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        assert!(result.week_for(&february.with_week_offset(4)).is_empty());
    }
}
