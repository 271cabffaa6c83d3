//! 預測策略選擇

use planning_core::{DemandFactor, ForecastStrategy};
use rust_decimal::Decimal;

use crate::statistics::DemandStatistics;

/// 單尾約 90 百分位的 z 值
pub const VOLATILITY_Z: Decimal = Decimal::from_parts(128, 0, 0, false, 2);

/// 策略選擇器
pub struct StrategySelector;

impl StrategySelector {
    /// 依策略取得基礎日需求
    pub fn base_demand(stats: &DemandStatistics, strategy: ForecastStrategy) -> Decimal {
        match strategy {
            ForecastStrategy::MovingAverage => stats.avg_base,
            ForecastStrategy::Trend => stats.avg7.max(stats.avg_base),
            ForecastStrategy::Peak => {
                if stats.max_daily > Decimal::ZERO {
                    stats.max_daily
                } else {
                    stats.avg_base
                }
            }
            ForecastStrategy::VolatilityAdjusted => stats.avg_base + VOLATILITY_Z * stats.std_dev,
        }
    }

    /// 套用季節係數後的每日需求（整個預測期間同一個值）
    pub fn applied_demand(
        stats: &DemandStatistics,
        strategy: ForecastStrategy,
        factor: DemandFactor,
    ) -> Decimal {
        Self::base_demand(stats, strategy) * factor.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::StatisticsCalculator;
    use chrono::{Duration, NaiveDate};
    use planning_core::LookbackWindow;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    /// 7 天基期：[10, 0, 0, 0, 0, 0, 4]，平均 2，最大 10
    fn sample_stats() -> DemandStatistics {
        let mut usage = BTreeMap::new();
        usage.insert(today(), Decimal::from(10));
        usage.insert(today() - Duration::days(6), Decimal::from(4));
        StatisticsCalculator::calculate(Some(&usage), today(), LookbackWindow::Days7)
    }

    #[test]
    fn test_strategies_on_sample() {
        let stats = sample_stats();

        assert_eq!(
            StrategySelector::base_demand(&stats, ForecastStrategy::MovingAverage),
            Decimal::from(2)
        );
        assert_eq!(
            StrategySelector::base_demand(&stats, ForecastStrategy::Trend),
            Decimal::from(2)
        );
        assert_eq!(
            StrategySelector::base_demand(&stats, ForecastStrategy::Peak),
            Decimal::from(10)
        );
        assert_eq!(
            StrategySelector::base_demand(&stats, ForecastStrategy::VolatilityAdjusted),
            Decimal::from(2) + VOLATILITY_Z * stats.std_dev
        );
    }

    #[rstest]
    #[case(ForecastStrategy::MovingAverage)]
    #[case(ForecastStrategy::Trend)]
    #[case(ForecastStrategy::Peak)]
    #[case(ForecastStrategy::VolatilityAdjusted)]
    fn test_no_history_means_zero_demand(#[case] strategy: ForecastStrategy) {
        let stats = StatisticsCalculator::calculate(None, today(), LookbackWindow::Days30);
        for factor in DemandFactor::PRESETS {
            assert_eq!(StrategySelector::applied_demand(&stats, strategy, factor), Decimal::ZERO);
        }
    }

    #[test]
    fn test_trend_uses_recent_average_when_higher() {
        // 30 天基期只有近 3 天有用量：平均 1，近 7 日平均 30/7
        let mut usage = BTreeMap::new();
        for back in 0..3 {
            usage.insert(today() - Duration::days(back), Decimal::from(10));
        }
        let stats = StatisticsCalculator::calculate(Some(&usage), today(), LookbackWindow::Days30);

        assert_eq!(stats.avg_base, Decimal::ONE);
        assert_eq!(
            StrategySelector::base_demand(&stats, ForecastStrategy::Trend),
            Decimal::from(30) / Decimal::from(7)
        );
    }

    #[test]
    fn test_demand_factor_scales_uniformly() {
        let stats = sample_stats();
        let factor = DemandFactor::new(Decimal::new(15, 1)).unwrap();

        assert_eq!(
            StrategySelector::applied_demand(&stats, ForecastStrategy::Peak, factor),
            Decimal::from(15)
        );
    }
}
