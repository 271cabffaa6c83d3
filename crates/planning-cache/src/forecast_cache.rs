//! 預測結果緩存

use chrono::NaiveDate;
use planning_calc::ForecastResult;
use planning_core::{DemandFactor, ForecastParams, ForecastStrategy, LookbackWindow, PlanningMonth};
use std::collections::HashMap;

use crate::dirty_tracking::DirtyTracker;

/// 緩存鍵
///
/// 名稱搜尋、計劃區篩選與週偏移只影響顯示哪些列，不影響單一產品的結果，
/// 因此不列入鍵。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub product_id: String,
    pub month: PlanningMonth,
    pub lookback: LookbackWindow,
    pub strategy: ForecastStrategy,
    pub demand_factor: DemandFactor,
    pub today: NaiveDate,
    pub data_version: u64,
}

impl ForecastKey {
    pub fn new(
        product_id: impl Into<String>,
        params: &ForecastParams,
        today: NaiveDate,
        data_version: u64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            month: params.month,
            lookback: params.lookback,
            strategy: params.strategy,
            demand_factor: params.demand_factor,
            today,
            data_version,
        }
    }
}

/// 預測結果緩存
///
/// 產品被標記失效後，該產品的舊結果在下次寫入時一併清掉；
/// 資料重新載入時遞增版本並清空全部。
#[derive(Debug, Default)]
pub struct ForecastCache {
    entries: HashMap<ForecastKey, ForecastResult>,
    dirty: DirtyTracker,
    data_version: u64,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前資料版本
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// 為目前版本建立鍵
    pub fn key(&self, product_id: &str, params: &ForecastParams, today: NaiveDate) -> ForecastKey {
        ForecastKey::new(product_id, params, today, self.data_version)
    }

    /// 讀取；產品失效或版本不符時視為未命中
    pub fn get(&self, key: &ForecastKey) -> Option<&ForecastResult> {
        if key.data_version != self.data_version || self.dirty.is_dirty(&key.product_id) {
            return None;
        }
        self.entries.get(key)
    }

    /// 寫入；舊版本的結果直接丟棄，回傳是否寫入
    pub fn insert(&mut self, key: ForecastKey, result: ForecastResult) -> bool {
        if key.data_version != self.data_version {
            tracing::debug!(
                "丟棄舊版本預測結果 {}（版本 {}，目前 {}）",
                key.product_id,
                key.data_version,
                self.data_version
            );
            return false;
        }
        if self.dirty.clean(&key.product_id) {
            let product_id = key.product_id.clone();
            self.entries.retain(|k, _| k.product_id != product_id);
        }
        self.entries.insert(key, result);
        true
    }

    /// 命中就回傳緩存，否則計算並寫入
    pub fn get_or_compute<F>(&mut self, key: ForecastKey, compute: F) -> ForecastResult
    where
        F: FnOnce() -> ForecastResult,
    {
        if let Some(hit) = self.get(&key) {
            return hit.clone();
        }
        let result = compute();
        self.insert(key, result.clone());
        result
    }

    /// 標記產品失效（計劃訂單異動、主檔更新）
    pub fn invalidate(&mut self, product_id: &str) {
        tracing::debug!("預測緩存失效: {}", product_id);
        self.dirty.mark_dirty(product_id);
    }

    /// 資料重新載入：遞增版本並清空
    pub fn bump_version(&mut self) -> u64 {
        self.data_version += 1;
        self.clear();
        self.data_version
    }

    /// 清空緩存（不改版本）
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty.clear();
    }

    /// 目前失效的產品
    pub fn dirty_products(&self) -> Vec<String> {
        self.dirty.dirty_products()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
