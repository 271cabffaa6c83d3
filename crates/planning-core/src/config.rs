//! 預測參數模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::PlanningMonth;
use crate::product::Product;
use crate::{PlanningError, Result};

/// 預測策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastStrategy {
    /// 基本平均（MA）
    #[serde(rename = "MA")]
    MovingAverage,

    /// 趨勢模式：max(近 7 日平均, 基期平均)
    #[serde(rename = "TREND")]
    Trend,

    /// 尖峰模式：單日最大用量
    #[serde(rename = "PEAK")]
    Peak,

    /// 波動調整（介面上標示為 ARIMA，實際為平均 + 1.28 × 標準差）
    #[default]
    #[serde(rename = "ARIMA")]
    VolatilityAdjusted,
}

impl ForecastStrategy {
    /// 介面代碼
    pub fn code(&self) -> &'static str {
        match self {
            ForecastStrategy::MovingAverage => "MA",
            ForecastStrategy::Trend => "TREND",
            ForecastStrategy::Peak => "PEAK",
            ForecastStrategy::VolatilityAdjusted => "ARIMA",
        }
    }
}

impl fmt::Display for ForecastStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ForecastStrategy {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MA" => Ok(ForecastStrategy::MovingAverage),
            "TREND" => Ok(ForecastStrategy::Trend),
            "PEAK" => Ok(ForecastStrategy::Peak),
            "ARIMA" => Ok(ForecastStrategy::VolatilityAdjusted),
            other => Err(PlanningError::validation(
                "strategy",
                format!("未知的預測策略: {other}，必須是 MA / TREND / PEAK / ARIMA"),
            )),
        }
    }
}

/// 歷史基期長度（天）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LookbackWindow {
    Days7,
    Days14,
    #[default]
    Days30,
}

impl LookbackWindow {
    /// 天數（恆大於 0）
    pub fn days(&self) -> u32 {
        match self {
            LookbackWindow::Days7 => 7,
            LookbackWindow::Days14 => 14,
            LookbackWindow::Days30 => 30,
        }
    }
}

impl TryFrom<u32> for LookbackWindow {
    type Error = PlanningError;

    fn try_from(days: u32) -> Result<Self> {
        match days {
            7 => Ok(LookbackWindow::Days7),
            14 => Ok(LookbackWindow::Days14),
            30 => Ok(LookbackWindow::Days30),
            other => Err(PlanningError::validation(
                "lookback_days",
                format!("基期只能是 7 / 14 / 30 天，收到 {other}"),
            )),
        }
    }
}

impl From<LookbackWindow> for u32 {
    fn from(window: LookbackWindow) -> Self {
        window.days()
    }
}

/// 季節係數：整個預測期間統一乘上的需求倍率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DemandFactor(Decimal);

impl DemandFactor {
    /// 介面提供的預設選項
    pub const PRESETS: [DemandFactor; 4] = [
        DemandFactor(Decimal::from_parts(8, 0, 0, false, 1)),
        DemandFactor(Decimal::ONE),
        DemandFactor(Decimal::from_parts(12, 0, 0, false, 1)),
        DemandFactor(Decimal::from_parts(15, 0, 0, false, 1)),
    ];

    /// 建立係數（必須 > 0）
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(PlanningError::validation(
                "demand_factor",
                format!("季節係數必須大於 0，收到 {value}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for DemandFactor {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl TryFrom<Decimal> for DemandFactor {
    type Error = PlanningError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DemandFactor> for Decimal {
    fn from(factor: DemandFactor) -> Self {
        factor.0
    }
}

/// 計劃區篩選
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomFilter {
    /// 全部產品
    #[default]
    All,
    /// 尚未分組的產品
    Unassigned,
    /// 指定計劃區
    Room(Uuid),
}

impl RoomFilter {
    /// 產品是否符合篩選
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            RoomFilter::All => true,
            RoomFilter::Unassigned => product.planning_room.is_none(),
            RoomFilter::Room(id) => product.planning_room == Some(*id),
        }
    }
}

/// 一次預測所用的參數（來自介面）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// 計劃月份
    pub month: PlanningMonth,

    /// 週視窗頁碼（從 0 起算）
    pub week_offset: u32,

    /// 歷史基期
    pub lookback: LookbackWindow,

    /// 預測策略
    pub strategy: ForecastStrategy,

    /// 季節係數
    pub demand_factor: DemandFactor,

    /// 產品名稱搜尋
    pub search: Option<String>,

    /// 計劃區篩選
    pub room: RoomFilter,
}

impl ForecastParams {
    /// 以預設值創建參數（30 天基期、波動調整策略、係數 1.0）
    pub fn new(month: PlanningMonth) -> Self {
        Self {
            month,
            week_offset: 0,
            lookback: LookbackWindow::default(),
            strategy: ForecastStrategy::default(),
            demand_factor: DemandFactor::default(),
            search: None,
            room: RoomFilter::All,
        }
    }

    /// 建構器模式：設置週視窗頁碼
    pub fn with_week_offset(mut self, offset: u32) -> Self {
        self.week_offset = offset;
        self
    }

    /// 建構器模式：設置歷史基期
    pub fn with_lookback(mut self, lookback: LookbackWindow) -> Self {
        self.lookback = lookback;
        self
    }

    /// 建構器模式：設置預測策略
    pub fn with_strategy(mut self, strategy: ForecastStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// 建構器模式：設置季節係數
    pub fn with_demand_factor(mut self, factor: DemandFactor) -> Self {
        self.demand_factor = factor;
        self
    }

    /// 建構器模式：設置名稱搜尋
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// 建構器模式：設置計劃區篩選
    pub fn with_room(mut self, room: RoomFilter) -> Self {
        self.room = room;
        self
    }

    /// 產品是否通過名稱與計劃區篩選
    pub fn includes(&self, product: &Product) -> bool {
        let name_ok = self
            .search
            .as_deref()
            .map_or(true, |search| product.name_matches(search));
        name_ok && self.room.matches(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MA", ForecastStrategy::MovingAverage)]
    #[case("trend", ForecastStrategy::Trend)]
    #[case("Peak", ForecastStrategy::Peak)]
    #[case("ARIMA", ForecastStrategy::VolatilityAdjusted)]
    fn test_parse_strategy(#[case] input: &str, #[case] expected: ForecastStrategy) {
        assert_eq!(input.parse::<ForecastStrategy>().unwrap(), expected);
        assert_eq!(expected.code().parse::<ForecastStrategy>().unwrap(), expected);
    }

    #[test]
    fn test_strategy_serde_codes() {
        let json = serde_json::to_string(&ForecastStrategy::VolatilityAdjusted).unwrap();
        assert_eq!(json, "\"ARIMA\"");
        assert!("EXP_SMOOTHING".parse::<ForecastStrategy>().is_err());
    }

    #[test]
    fn test_lookback_only_accepts_known_windows() {
        assert_eq!(LookbackWindow::try_from(14).unwrap().days(), 14);
        assert!(LookbackWindow::try_from(0).is_err());
        assert!(LookbackWindow::try_from(21).is_err());

        let parsed: LookbackWindow = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, LookbackWindow::Days7);
    }

    #[test]
    fn test_demand_factor_must_be_positive() {
        assert!(DemandFactor::new(Decimal::ZERO).is_err());
        assert!(DemandFactor::new(Decimal::new(-12, 1)).is_err());
        assert_eq!(DemandFactor::PRESETS[2].value(), Decimal::new(12, 1));
        assert_eq!(DemandFactor::default().value(), Decimal::ONE);
    }

    #[test]
    fn test_params_filter_products() {
        let room = Uuid::new_v4();
        let rice = Product::new("RICE-5KG", "Jasmine Rice", "bag").with_planning_room(room);
        let oil = Product::new("OIL-1L", "Sunflower Oil", "bottle");
        let month = PlanningMonth::new(2025, 6).unwrap();

        let by_room = ForecastParams::new(month).with_room(RoomFilter::Room(room));
        assert!(by_room.includes(&rice));
        assert!(!by_room.includes(&oil));

        let unassigned = ForecastParams::new(month).with_room(RoomFilter::Unassigned);
        assert!(unassigned.includes(&oil));

        let search = ForecastParams::new(month).with_search("rice");
        assert!(search.includes(&rice));
        assert!(!search.includes(&oil));
    }
}
