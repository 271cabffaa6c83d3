//! # WMS Planning
//!
//! 倉儲補貨計劃：依歷史出庫推估每日需求，逐日推演庫存，
//! 並把計劃訂單轉成採購單。

pub mod config;
pub mod logging;
pub mod planner;

// Re-export 主要類型
pub use config::AppConfig;
pub use planner::{LoadedData, Planner, PlanningRun};
