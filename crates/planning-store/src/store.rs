//! 資料存取介面

use chrono::{DateTime, NaiveDate, Utc};
use planning_core::{
    InventoryLot, PendingPoLine, PlannedOrder, PlanningRoom, Product, PurchaseOrder, Transaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StoreResult;

/// 產品主檔可由計劃頁更新的欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// 新的最低庫存
    pub min_stock: Option<Decimal>,

    /// 新的計劃區（`Some(None)` 表示移出計劃區）
    pub planning_room: Option<Option<Uuid>>,
}

/// 計劃引擎使用的資料存取介面（簡單的篩選讀取與寫入）
///
/// 不做樂觀鎖；同時編輯時以最後寫入為準。
pub trait PlanningStore {
    /// 所有計劃區
    fn list_rooms(&self) -> StoreResult<Vec<PlanningRoom>>;

    /// 所有產品
    fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// 依ID讀取產品
    fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>>;

    /// 所有批次庫存
    fn list_lots(&self) -> StoreResult<Vec<InventoryLot>>;

    /// 分頁讀取 `since` 之後的異動（依時間、ID 排序）
    fn fetch_transactions(
        &self,
        since: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Transaction>>;

    /// 待收貨/部分收貨採購單的未交明細
    fn pending_po_lines(&self) -> StoreResult<Vec<PendingPoLine>>;

    /// 日期區間內（含頭尾）的計劃訂單
    fn planned_orders_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PlannedOrder>>;

    /// 讀取 (產品, 日期) 的計劃訂單
    fn find_planned_order(
        &self,
        product_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<PlannedOrder>>;

    /// 新增或更新計劃區
    fn save_room(&mut self, room: PlanningRoom) -> StoreResult<()>;

    /// 刪除計劃區
    fn delete_room(&mut self, room_id: Uuid) -> StoreResult<()>;

    /// 更新產品欄位，回傳更新後的產品
    fn update_product(&mut self, product_id: &str, update: ProductUpdate) -> StoreResult<Product>;

    /// 以 (產品, 日期) 為鍵新增或覆寫計劃訂單
    fn upsert_planned_order(&mut self, order: PlannedOrder) -> StoreResult<()>;

    /// 刪除 (產品, 日期) 的計劃訂單；回傳是否真的刪除
    fn delete_planned_order(&mut self, product_id: &str, date: NaiveDate) -> StoreResult<bool>;

    /// 依ID批次刪除計劃訂單；回傳刪除筆數
    fn delete_planned_orders(&mut self, ids: &[Uuid]) -> StoreResult<usize>;

    /// 建立採購單（表頭 + 明細）
    fn create_purchase_order(&mut self, order: PurchaseOrder) -> StoreResult<Uuid>;
}
