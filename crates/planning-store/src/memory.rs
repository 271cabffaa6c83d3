//! 記憶體資料存取（測試與離線快照使用）

use chrono::{DateTime, NaiveDate, Utc};
use planning_core::{
    InventoryLot, PendingPoLine, PlannedOrder, PlanningRoom, Product, PurchaseOrder, Transaction,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{PlanningStore, ProductUpdate};
use crate::{StoreError, StoreResult};

/// 記憶體資料存取
///
/// 可直接由 JSON 快照檔反序列化。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    pub rooms: Vec<PlanningRoom>,
    pub products: Vec<Product>,
    pub lots: Vec<InventoryLot>,
    pub transactions: Vec<Transaction>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub planned_orders: Vec<PlannedOrder>,
}

impl MemoryStore {
    /// 創建空的資料存取
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 讀取
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// 建構器模式：加入產品
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// 建構器模式：加入計劃區
    pub fn with_room(mut self, room: PlanningRoom) -> Self {
        self.rooms.push(room);
        self
    }

    /// 建構器模式：加入批次
    pub fn with_lot(mut self, lot: InventoryLot) -> Self {
        self.lots.push(lot);
        self
    }

    /// 建構器模式：加入異動
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// 建構器模式：加入採購單
    pub fn with_purchase_order(mut self, order: PurchaseOrder) -> Self {
        self.purchase_orders.push(order);
        self
    }
}

impl PlanningStore for MemoryStore {
    fn list_rooms(&self) -> StoreResult<Vec<PlanningRoom>> {
        Ok(self.rooms.clone())
    }

    fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.clone())
    }

    fn get_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    fn list_lots(&self) -> StoreResult<Vec<InventoryLot>> {
        Ok(self.lots.clone())
    }

    fn fetch_transactions(
        &self,
        since: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Transaction>> {
        let mut matching: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.timestamp >= since)
            .collect();
        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        Ok(matching.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn pending_po_lines(&self) -> StoreResult<Vec<PendingPoLine>> {
        Ok(self
            .purchase_orders
            .iter()
            .flat_map(|po| po.pending_lines())
            .collect())
    }

    fn planned_orders_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PlannedOrder>> {
        Ok(self
            .planned_orders
            .iter()
            .filter(|o| o.date >= start && o.date <= end)
            .cloned()
            .collect())
    }

    fn find_planned_order(
        &self,
        product_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<PlannedOrder>> {
        Ok(self
            .planned_orders
            .iter()
            .find(|o| o.is_cell(product_id, date))
            .cloned())
    }

    fn save_room(&mut self, room: PlanningRoom) -> StoreResult<()> {
        match self.rooms.iter_mut().find(|r| r.id == room.id) {
            Some(existing) => *existing = room,
            None => self.rooms.push(room),
        }
        Ok(())
    }

    fn delete_room(&mut self, room_id: Uuid) -> StoreResult<()> {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != room_id);
        if self.rooms.len() == before {
            return Err(StoreError::NotFound(format!("計劃區 {room_id}")));
        }
        Ok(())
    }

    fn update_product(&mut self, product_id: &str, update: ProductUpdate) -> StoreResult<Product> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StoreError::NotFound(format!("產品 {product_id}")))?;

        if let Some(min_stock) = update.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(room) = update.planning_room {
            product.planning_room = room;
        }
        Ok(product.clone())
    }

    fn upsert_planned_order(&mut self, order: PlannedOrder) -> StoreResult<()> {
        match self
            .planned_orders
            .iter_mut()
            .find(|o| o.is_cell(&order.product_id, order.date))
        {
            Some(existing) => *existing = order,
            None => self.planned_orders.push(order),
        }
        Ok(())
    }

    fn delete_planned_order(&mut self, product_id: &str, date: NaiveDate) -> StoreResult<bool> {
        let before = self.planned_orders.len();
        self.planned_orders.retain(|o| !o.is_cell(product_id, date));
        Ok(self.planned_orders.len() < before)
    }

    fn delete_planned_orders(&mut self, ids: &[Uuid]) -> StoreResult<usize> {
        let before = self.planned_orders.len();
        self.planned_orders.retain(|o| !ids.contains(&o.id));
        Ok(before - self.planned_orders.len())
    }

    fn create_purchase_order(&mut self, order: PurchaseOrder) -> StoreResult<Uuid> {
        if self.purchase_orders.iter().any(|po| po.po_number == order.po_number) {
            return Err(StoreError::Conflict(format!("採購單號重複: {}", order.po_number)));
        }
        let id = order.id;
        self.purchase_orders.push(order);
        Ok(id)
    }
}
