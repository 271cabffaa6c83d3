//! 計劃頁門面：資料讀取、預測、緩存與寫入操作

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use planning_cache::ForecastCache;
use planning_calc::{
    ForecastCalculator, ForecastInputs, ForecastResult, TimelineEntry, TimelineExporter,
};
use planning_core::{
    ForecastParams, PlanningError, PlanningMonth, PlanningRoom, PlanningSnapshot, Product, Result,
};
use planning_store::{
    CatalogService, PlannedOrderService, PlanningStore, PoGenerationReport, PurchaseOrderGenerator,
    RefreshGuard, RefreshTicket, SnapshotLoader, UpsertOutcome,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::PlanningConfig;

/// 一次預測的輸出
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningRun {
    /// 依產品順序排列的結果
    pub results: Vec<ForecastResult>,

    /// 無法對應產品的異動筆數
    pub orphan_transactions: usize,

    /// 本次使用的資料版本
    pub data_version: u64,

    /// 本次預測的參數（含週視窗頁碼）
    pub params: ForecastParams,
}

impl PlanningRun {
    /// 依ID找結果
    pub fn result(&self, product_id: &str) -> Option<&ForecastResult> {
        self.results.iter().find(|r| r.product_id == product_id)
    }

    /// 目前週視窗：每個產品在 `params.week_offset` 頁的時間軸
    pub fn week_page(&self) -> Vec<(&str, &[TimelineEntry])> {
        self.results
            .iter()
            .map(|r| (r.product_id.as_str(), r.week_for(&self.params)))
            .collect()
    }

    /// 當月週視窗頁數
    pub fn week_count(&self) -> u32 {
        self.params.month.week_count()
    }
}

/// 已讀取但尚未套用的資料
#[derive(Debug)]
pub struct LoadedData {
    ticket: RefreshTicket,
    today: NaiveDate,
    month: PlanningMonth,
    snapshot: PlanningSnapshot,
}

impl LoadedData {
    pub fn ticket(&self) -> RefreshTicket {
        self.ticket
    }
}

struct PlanningState {
    today: NaiveDate,
    month: PlanningMonth,
    calculator: ForecastCalculator,
    snapshot: PlanningSnapshot,
    inputs: ForecastInputs,
}

/// 計劃引擎門面
pub struct Planner<S: PlanningStore> {
    store: S,
    loader: SnapshotLoader,
    offset: FixedOffset,
    guard: RefreshGuard,
    cache: ForecastCache,
    state: Option<PlanningState>,
}

impl<S: PlanningStore> Planner<S> {
    /// 以預設讀取設定創建（UTC 日界）
    pub fn new(store: S) -> Self {
        Self {
            store,
            loader: SnapshotLoader::new(),
            offset: Utc.fix(),
            guard: RefreshGuard::new(),
            cache: ForecastCache::new(),
            state: None,
        }
    }

    /// 依配置創建
    pub fn from_config(store: S, config: &PlanningConfig) -> Result<Self> {
        let offset = config.offset()?;
        let loader = SnapshotLoader::new()
            .with_page_size(config.page_size)
            .with_history_days(config.history_days);
        Ok(Self::new(store).with_loader(loader).with_offset(offset))
    }

    /// 建構器模式：設置快照讀取器
    pub fn with_loader(mut self, loader: SnapshotLoader) -> Self {
        self.loader = loader.with_offset(self.offset);
        self
    }

    /// 建構器模式：設置營業日時區
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self.loader = self.loader.with_offset(offset);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 共用的刷新世代計數器（其他請求可藉此作廢進行中的刷新）
    pub fn refresh_guard(&self) -> RefreshGuard {
        self.guard.clone()
    }

    /// 目前的資料版本
    pub fn data_version(&self) -> u64 {
        self.cache.data_version()
    }

    /// 目前載入的產品
    pub fn products(&self) -> &[Product] {
        self.state
            .as_ref()
            .map(|s| s.snapshot.products.as_slice())
            .unwrap_or(&[])
    }

    /// 目前載入的計劃區
    pub fn rooms(&self) -> &[PlanningRoom] {
        self.state
            .as_ref()
            .map(|s| s.snapshot.rooms.as_slice())
            .unwrap_or(&[])
    }

    /// 讀取資料；每次呼叫都會作廢之前發出的刷新
    pub fn load(&self, today: NaiveDate, month: PlanningMonth) -> Result<LoadedData> {
        let ticket = self.guard.begin();
        let snapshot = self.loader.load(&self.store, today, month)?;
        Ok(LoadedData {
            ticket,
            today,
            month,
            snapshot,
        })
    }

    /// 套用讀取結果；若已有較新的刷新則丟棄並回傳 false
    pub fn apply(&mut self, data: LoadedData) -> bool {
        if !self.guard.is_current(data.ticket) {
            tracing::warn!(
                "丟棄過期的刷新結果（世代 {}）",
                data.ticket.generation()
            );
            return false;
        }

        let calculator = ForecastCalculator::new(data.today, self.offset);
        let inputs = calculator.index(&data.snapshot);

        let version = self.cache.bump_version();
        tracing::info!(
            "套用計劃資料：今天 {}，月份 {}，產品 {} 個，資料版本 {}",
            data.today,
            data.month,
            data.snapshot.products.len(),
            version
        );

        self.state = Some(PlanningState {
            today: data.today,
            month: data.month,
            calculator,
            snapshot: data.snapshot,
            inputs,
        });
        true
    }

    /// 讀取、套用並預測；被較新的刷新取代時回傳 `None`
    pub fn refresh(
        &mut self,
        today: NaiveDate,
        params: &ForecastParams,
    ) -> Result<Option<PlanningRun>> {
        let data = self.load(today, params.month)?;
        if !self.apply(data) {
            return Ok(None);
        }
        self.forecast(params).map(Some)
    }

    /// 以已載入的資料預測；未變動的產品直接使用緩存
    pub fn forecast(&mut self, params: &ForecastParams) -> Result<PlanningRun> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| PlanningError::DataFetch("尚未載入計劃資料，請先刷新".into()))?;

        if params.month != state.month {
            return Err(PlanningError::validation(
                "month",
                format!("已載入 {} 的資料，要預測 {} 需先刷新", state.month, params.month),
            ));
        }

        let selected: Vec<&Product> = state
            .snapshot
            .products
            .iter()
            .filter(|p| params.includes(p))
            .collect();

        let mut results: Vec<Option<ForecastResult>> = selected
            .iter()
            .map(|p| {
                self.cache
                    .get(&self.cache.key(&p.id, params, state.today))
                    .cloned()
            })
            .collect();

        let missing: Vec<Product> = selected
            .iter()
            .zip(&results)
            .filter(|(_, cached)| cached.is_none())
            .map(|(p, _)| (*p).clone())
            .collect();

        tracing::debug!(
            "預測 {} 個產品：緩存命中 {}，重新計算 {}",
            selected.len(),
            selected.len() - missing.len(),
            missing.len()
        );

        let mut computed = state
            .calculator
            .calculate(&state.inputs, &missing, params)
            .into_iter();

        for slot in results.iter_mut().filter(|slot| slot.is_none()) {
            if let Some(result) = computed.next() {
                let key = self.cache.key(&result.product_id, params, state.today);
                self.cache.insert(key, result.clone());
                *slot = Some(result);
            }
        }

        Ok(PlanningRun {
            results: results.into_iter().flatten().collect(),
            orphan_transactions: state.inputs.orphan_transactions(),
            data_version: self.cache.data_version(),
            params: params.clone(),
        })
    }

    /// 匯出目前參數的時間軸
    pub fn export_csv(&mut self, params: &ForecastParams) -> Result<String> {
        let run = self.forecast(params)?;
        TimelineExporter::to_csv(&run.results)
    }

    /// 設定 (產品, 日期) 的計劃數量（0 表示刪除）
    ///
    /// 寫入成功但重新讀取失敗時，已載入的資料作廢，需重新刷新。
    pub fn set_planned_qty(
        &mut self,
        product_id: &str,
        date: NaiveDate,
        qty_base: Decimal,
    ) -> Result<UpsertOutcome> {
        let outcome = PlannedOrderService::upsert(&mut self.store, product_id, date, qty_base)?;
        self.sync_planned(product_id)?;
        Ok(outcome)
    }

    /// 刪除 (產品, 日期) 的計劃訂單
    pub fn delete_planned(&mut self, product_id: &str, date: NaiveDate) -> Result<bool> {
        let deleted = PlannedOrderService::delete(&mut self.store, product_id, date)?;
        self.sync_planned(product_id)?;
        Ok(deleted)
    }

    /// 將計劃區當月的計劃訂單轉成採購單，完成後重新讀取資料
    pub fn generate_purchase_orders(
        &mut self,
        room_id: Uuid,
        month: PlanningMonth,
        order_date: NaiveDate,
    ) -> Result<PoGenerationReport> {
        let report = PurchaseOrderGenerator::new(order_date).generate_for_room(
            &mut self.store,
            room_id,
            month,
        )?;

        if let Some((today, loaded_month)) = self.state.as_ref().map(|s| (s.today, s.month)) {
            match self.load(today, loaded_month) {
                Ok(data) => {
                    self.apply(data);
                }
                Err(err) => self.discard_state(&err),
            }
        }
        Ok(report)
    }

    /// 更新最低庫存
    pub fn set_min_stock(&mut self, product_id: &str, min_stock: Decimal) -> Result<Product> {
        let product = CatalogService::set_min_stock(&mut self.store, product_id, min_stock)?;
        self.sync_product(&product);
        Ok(product)
    }

    /// 指定或移出計劃區
    pub fn assign_room(&mut self, product_id: &str, room_id: Option<Uuid>) -> Result<Product> {
        let product = CatalogService::assign_room(&mut self.store, product_id, room_id)?;
        self.sync_product(&product);
        Ok(product)
    }

    pub fn create_room(&mut self, label: &str) -> Result<PlanningRoom> {
        let room = CatalogService::create_room(&mut self.store, label)?;
        self.sync_rooms()?;
        Ok(room)
    }

    pub fn rename_room(&mut self, room_id: Uuid, label: &str) -> Result<PlanningRoom> {
        let room = CatalogService::rename_room(&mut self.store, room_id, label)?;
        self.sync_rooms()?;
        Ok(room)
    }

    /// 刪除計劃區；所屬產品移出後才刪除
    pub fn delete_room(&mut self, room_id: Uuid) -> Result<usize> {
        let moved = CatalogService::delete_room(&mut self.store, room_id)?;
        self.sync_rooms()?;

        if self.state.is_none() {
            return Ok(moved);
        }
        let products = match self.store.list_products() {
            Ok(products) => products,
            Err(err) => {
                let err = PlanningError::from(err);
                self.discard_state(&err);
                return Err(err);
            }
        };
        if let Some(state) = self.state.as_mut() {
            for product in state
                .snapshot
                .products
                .iter()
                .filter(|p| p.planning_room == Some(room_id))
            {
                self.cache.invalidate(&product.id);
            }
            state.snapshot.products = products;
        }
        Ok(moved)
    }

    fn sync_planned(&mut self, product_id: &str) -> Result<()> {
        self.cache.invalidate(product_id);

        let Some(month) = self.state.as_ref().map(|s| s.month) else {
            return Ok(());
        };
        let orders: Vec<_> = match self
            .store
            .planned_orders_between(month.first_day(), month.last_day())
        {
            Ok(orders) => orders
                .into_iter()
                .filter(|o| o.product_id == product_id)
                .collect(),
            Err(err) => {
                let err = PlanningError::from(err);
                self.discard_state(&err);
                return Err(err);
            }
        };

        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        state.snapshot.planned_orders.retain(|o| o.product_id != product_id);
        state.snapshot.planned_orders.extend(orders.iter().cloned());
        state.inputs.replace_planned(product_id, orders);
        Ok(())
    }

    fn sync_product(&mut self, product: &Product) {
        self.cache.invalidate(&product.id);
        if let Some(state) = self.state.as_mut() {
            let existing = state.snapshot.products.iter_mut().find(|p| p.id == product.id);
            if let Some(existing) = existing {
                *existing = product.clone();
            }
        }
    }

    fn sync_rooms(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Ok(());
        }
        match self.store.list_rooms() {
            Ok(rooms) => {
                if let Some(state) = self.state.as_mut() {
                    state.snapshot.rooms = rooms;
                }
                Ok(())
            }
            Err(err) => {
                let err = PlanningError::from(err);
                self.discard_state(&err);
                Err(err)
            }
        }
    }

    /// 寫入後重新讀取失敗：已載入的資料不再可信，作廢並要求重新刷新
    fn discard_state(&mut self, err: &PlanningError) {
        tracing::warn!("寫入後重新讀取失敗，已載入的計劃資料作廢，需重新刷新: {}", err);
        self.state = None;
        self.cache.bump_version();
    }
}
