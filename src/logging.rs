//! 日誌初始化

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 預設過濾條件（可由 `RUST_LOG` 覆寫）
pub const DEFAULT_FILTER: &str = "wms_planning=info,planning_calc=info,planning_store=info";

/// 安裝 fmt 輸出與 EnvFilter；重複呼叫時忽略
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
