//! # Planning Cache
//!
//! 預測結果緩存：依 (產品, 參數, 今天, 資料版本) 記憶，
//! 以產品為單位標記失效

pub mod dirty_tracking;
pub mod forecast_cache;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use forecast_cache::{ForecastCache, ForecastKey};
