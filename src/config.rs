//! 應用程式配置
//!
//! 載入順序：
//! 1. 程式內預設值
//! 2. 設定檔 `config/{environment}`（可省略）
//! 3. `WMS_` 開頭的環境變數（巢狀欄位以 `__` 分隔，例如 `WMS_PLANNING__LOOKBACK_DAYS=14`）

use chrono::FixedOffset;
use config::{ConfigError, Environment, File};
use planning_core::{DemandFactor, ForecastStrategy, LookbackWindow, PlanningError, Result};
use planning_store::loader::{DEFAULT_HISTORY_DAYS, DEFAULT_PAGE_SIZE};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// 應用程式配置
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 執行環境（development, production）
    pub environment: String,

    pub planning: PlanningConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// 預測預設值
#[derive(Debug, Deserialize, Clone)]
pub struct PlanningConfig {
    /// 歷史基期天數（7、14、30）
    pub lookback_days: u32,

    /// 策略代碼（MA、TREND、PEAK、ARIMA）
    pub strategy: String,

    /// 季節係數
    pub demand_factor: Decimal,

    /// 讀取的歷史天數
    pub history_days: u32,

    /// 分頁讀取的每頁筆數
    pub page_size: usize,

    /// 營業日時區（相對 UTC 的分鐘數）
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SnapshotConfig {
    /// JSON 快照檔
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// CSV 輸出檔；未設定時寫到標準輸出
    pub output: Option<PathBuf>,
}

impl AppConfig {
    /// 從設定檔與環境變數載入
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let environment = std::env::var("WMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("planning.lookback_days", 30)?
            .set_default("planning.strategy", "ARIMA")?
            .set_default("planning.demand_factor", "1.0")?
            .set_default("planning.history_days", i64::from(DEFAULT_HISTORY_DAYS))?
            .set_default("planning.page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("planning.utc_offset_minutes", 0)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("WMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl PlanningConfig {
    pub fn lookback(&self) -> Result<LookbackWindow> {
        LookbackWindow::try_from(self.lookback_days)
    }

    pub fn strategy(&self) -> Result<ForecastStrategy> {
        self.strategy.parse()
    }

    pub fn demand_factor(&self) -> Result<DemandFactor> {
        DemandFactor::new(self.demand_factor)
    }

    /// 營業日時區
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            PlanningError::validation(
                "utc_offset_minutes",
                format!("時區偏移超出範圍: {}", self.utc_offset_minutes),
            )
        })
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            lookback_days: LookbackWindow::default().days(),
            strategy: ForecastStrategy::default().code().to_string(),
            demand_factor: Decimal::ONE,
            history_days: DEFAULT_HISTORY_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            utc_offset_minutes: 0,
        }
    }
}
