//! 快照讀取：分頁讀取歷史異動並組成計劃快照

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use planning_core::{PlanningError, PlanningMonth, PlanningSnapshot, Result, Transaction};

use crate::store::PlanningStore;

/// 預設每頁筆數
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// 預設讀取的歷史天數
pub const DEFAULT_HISTORY_DAYS: u32 = 120;

/// 快照讀取器
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    page_size: usize,
    history_days: u32,
    offset: FixedOffset,
}

impl SnapshotLoader {
    /// 創建讀取器（UTC 日界）
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            history_days: DEFAULT_HISTORY_DAYS,
            offset: Utc.fix(),
        }
    }

    /// 建構器模式：設置每頁筆數（至少 1）
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// 建構器模式：設置歷史天數
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    /// 建構器模式：設置營業日時區
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// 歷史視窗起點：today 往前 history_days 天的當地午夜
    pub fn history_start(&self, today: NaiveDate) -> Result<DateTime<Utc>> {
        let start_day = today - Duration::days(i64::from(self.history_days));
        let midnight = start_day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PlanningError::InvalidDate(start_day.to_string()))?;
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| PlanningError::InvalidDate(midnight.to_string()))
    }

    /// 依序分頁讀取，直到某頁不足 page_size 筆
    ///
    /// 任何一頁失敗就整批放棄，不回傳部分結果。
    pub fn load_transactions<S: PlanningStore + ?Sized>(
        &self,
        store: &S,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let since = self.history_start(today)?;
        let mut transactions = Vec::new();
        let mut page = 0usize;

        loop {
            let batch = store.fetch_transactions(since, transactions.len(), self.page_size)?;
            let fetched = batch.len();
            transactions.extend(batch);
            page += 1;
            tracing::debug!("異動第 {} 頁：{} 筆", page, fetched);

            if fetched < self.page_size {
                break;
            }
        }

        tracing::debug!("共讀取 {} 筆異動（{} 頁）", transactions.len(), page);
        Ok(transactions)
    }

    /// 讀取整份計劃快照
    pub fn load<S: PlanningStore + ?Sized>(
        &self,
        store: &S,
        today: NaiveDate,
        month: PlanningMonth,
    ) -> Result<PlanningSnapshot> {
        tracing::info!("讀取計劃快照：今天 {}，月份 {}", today, month);

        let snapshot = PlanningSnapshot {
            rooms: store.list_rooms()?,
            products: store.list_products()?,
            lots: store.list_lots()?,
            transactions: self.load_transactions(store, today)?,
            pending_lines: store.pending_po_lines()?,
            planned_orders: store.planned_orders_between(month.first_day(), month.last_day())?,
        };

        Ok(snapshot)
    }
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::ProductUpdate;
    use crate::{StoreError, StoreResult};
    use planning_core::{
        InventoryLot, PendingPoLine, PlannedOrder, PlanningRoom, Product, PurchaseOrder,
    };
    use rust_decimal::Decimal;
    use std::cell::Cell;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn store_with(count: i64) -> MemoryStore {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        (0..count).fold(MemoryStore::new(), |store, i| {
            store.with_transaction(Transaction::new(
                "RICE-5KG",
                "OUTBOUND",
                Decimal::from(-1),
                base + Duration::minutes(i),
            ))
        })
    }

    /// 計算讀取次數，可指定第 N 次讀取失敗
    struct CountingStore {
        inner: MemoryStore,
        calls: Cell<usize>,
        fail_on_call: Option<usize>,
    }

    impl PlanningStore for CountingStore {
        fn list_rooms(&self) -> StoreResult<Vec<PlanningRoom>> {
            self.inner.list_rooms()
        }
        fn list_products(&self) -> StoreResult<Vec<Product>> {
            self.inner.list_products()
        }
        fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
            self.inner.get_product(product_id)
        }
        fn list_lots(&self) -> StoreResult<Vec<InventoryLot>> {
            self.inner.list_lots()
        }
        fn fetch_transactions(
            &self,
            since: DateTime<Utc>,
            offset: usize,
            limit: usize,
        ) -> StoreResult<Vec<Transaction>> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if self.fail_on_call == Some(call) {
                return Err(StoreError::Unavailable("連線逾時".to_string()));
            }
            self.inner.fetch_transactions(since, offset, limit)
        }
        fn pending_po_lines(&self) -> StoreResult<Vec<PendingPoLine>> {
            self.inner.pending_po_lines()
        }
        fn planned_orders_between(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> StoreResult<Vec<PlannedOrder>> {
            self.inner.planned_orders_between(start, end)
        }
        fn find_planned_order(
            &self,
            product_id: &str,
            date: NaiveDate,
        ) -> StoreResult<Option<PlannedOrder>> {
            self.inner.find_planned_order(product_id, date)
        }
        fn save_room(&mut self, room: PlanningRoom) -> StoreResult<()> {
            self.inner.save_room(room)
        }
        fn delete_room(&mut self, room_id: Uuid) -> StoreResult<()> {
            self.inner.delete_room(room_id)
        }
        fn update_product(
            &mut self,
            product_id: &str,
            update: ProductUpdate,
        ) -> StoreResult<Product> {
            self.inner.update_product(product_id, update)
        }
        fn upsert_planned_order(&mut self, order: PlannedOrder) -> StoreResult<()> {
            self.inner.upsert_planned_order(order)
        }
        fn delete_planned_order(&mut self, product_id: &str, date: NaiveDate) -> StoreResult<bool> {
            self.inner.delete_planned_order(product_id, date)
        }
        fn delete_planned_orders(&mut self, ids: &[Uuid]) -> StoreResult<usize> {
            self.inner.delete_planned_orders(ids)
        }
        fn create_purchase_order(&mut self, order: PurchaseOrder) -> StoreResult<Uuid> {
            self.inner.create_purchase_order(order)
        }
    }

    #[test]
    fn test_pages_until_short_page() {
        let store = CountingStore {
            inner: store_with(25),
            calls: Cell::new(0),
            fail_on_call: None,
        };
        let loader = SnapshotLoader::new().with_page_size(10);

        let transactions = loader.load_transactions(&store, today()).unwrap();

        assert_eq!(transactions.len(), 25);
        assert_eq!(store.calls.get(), 3);
    }

    #[test]
    fn test_exact_multiple_needs_one_empty_page() {
        let store = CountingStore {
            inner: store_with(20),
            calls: Cell::new(0),
            fail_on_call: None,
        };
        let loader = SnapshotLoader::new().with_page_size(10);

        assert_eq!(loader.load_transactions(&store, today()).unwrap().len(), 20);
        assert_eq!(store.calls.get(), 3);
    }

    #[test]
    fn test_failed_page_aborts_whole_load() {
        let store = CountingStore {
            inner: store_with(25),
            calls: Cell::new(0),
            fail_on_call: Some(2),
        };
        let loader = SnapshotLoader::new().with_page_size(10);

        let err = loader.load_transactions(&store, today()).unwrap_err();
        assert!(matches!(err, PlanningError::DataFetch(_)));
    }

    #[test]
    fn test_history_window_excludes_old_transactions() {
        let old = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let stale = Transaction::new("RICE-5KG", "OUTBOUND", Decimal::from(-9), old);
        let store = store_with(3).with_transaction(stale);

        let transactions = SnapshotLoader::new().load_transactions(&store, today()).unwrap();
        assert_eq!(transactions.len(), 3);
    }

    #[test]
    fn test_history_start_uses_local_midnight() {
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();
        let loader = SnapshotLoader::new().with_history_days(120).with_offset(taipei);

        let start = loader.history_start(today()).unwrap();
        // 2025-03-02 00:00 (+08:00) = 2025-03-01 16:00 UTC
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap());
    }
}
