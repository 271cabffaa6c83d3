//! 命令列：讀取 JSON 快照，預測指定月份並輸出 CSV
//!
//! 用法：`wms-planning [YYYY-MM] [YYYY-MM-DD]`（月份預設為本月，第二個參數覆寫今天）

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use planning_calc::TimelineExporter;
use planning_core::{ForecastParams, PlanningMonth};
use planning_store::MemoryStore;
use std::io::Write;
use wms_planning::{logging, AppConfig, Planner};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = AppConfig::load()?;
    tracing::info!("環境: {}", config.environment);

    let offset = config.planning.offset()?;
    let mut args = std::env::args().skip(1);
    let month_arg = args.next();
    let today = match args.next() {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("日期格式錯誤: {raw}"))?,
        None => Utc::now().with_timezone(&offset).date_naive(),
    };
    let month = match month_arg {
        Some(raw) => raw.parse::<PlanningMonth>()?,
        None => PlanningMonth::containing(today),
    };

    let path = config
        .snapshot
        .path
        .as_ref()
        .context("未設定快照檔（WMS_SNAPSHOT__PATH）")?;
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("無法讀取快照檔 {}", path.display()))?;
    let store = MemoryStore::from_json(&json)
        .with_context(|| format!("快照檔格式錯誤 {}", path.display()))?;

    let params = ForecastParams::new(month)
        .with_lookback(config.planning.lookback()?)
        .with_strategy(config.planning.strategy()?)
        .with_demand_factor(config.planning.demand_factor()?);

    let mut planner = Planner::from_config(store, &config.planning)?;
    let run = planner
        .refresh(today, &params)?
        .context("刷新已被較新的請求取代")?;

    let stockouts = run
        .results
        .iter()
        .filter(|r| r.first_stockout_date().is_some())
        .count();
    tracing::info!(
        "{} 預測完成：{} 個產品，{} 個會缺貨，{} 筆異動無對應產品",
        month,
        run.results.len(),
        stockouts,
        run.orphan_transactions
    );

    match &config.export.output {
        Some(output) => {
            let file = std::fs::File::create(output)
                .with_context(|| format!("無法建立 {}", output.display()))?;
            TimelineExporter::write_csv(file, &run.results)?;
            tracing::info!("已輸出 {}", output.display());
        }
        None => {
            let csv = TimelineExporter::to_csv(&run.results)?;
            std::io::stdout().write_all(csv.as_bytes())?;
        }
    }

    Ok(())
}
