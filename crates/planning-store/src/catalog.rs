//! 計劃區與產品主檔維護

use planning_core::{PlanningError, PlanningRoom, Product, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::store::{PlanningStore, ProductUpdate};

/// 主檔維護服務
pub struct CatalogService;

impl CatalogService {
    /// 建立計劃區
    pub fn create_room<S: PlanningStore + ?Sized>(
        store: &mut S,
        label: &str,
    ) -> Result<PlanningRoom> {
        let room = PlanningRoom::new(Self::clean_label(label)?);
        store.save_room(room.clone())?;
        tracing::info!("建立計劃區 {}（{}）", room.label, room.id);
        Ok(room)
    }

    /// 重新命名計劃區
    pub fn rename_room<S: PlanningStore + ?Sized>(
        store: &mut S,
        room_id: Uuid,
        label: &str,
    ) -> Result<PlanningRoom> {
        let label = Self::clean_label(label)?;
        let mut room = Self::find_room(store, room_id)?;
        room.label = label;
        store.save_room(room.clone())?;
        Ok(room)
    }

    /// 刪除計劃區；所屬產品先移出（變成未分區）
    ///
    /// 回傳被移出的產品數。
    pub fn delete_room<S: PlanningStore + ?Sized>(store: &mut S, room_id: Uuid) -> Result<usize> {
        Self::find_room(store, room_id)?;

        let members: Vec<Product> = store
            .list_products()?
            .into_iter()
            .filter(|p| p.planning_room == Some(room_id))
            .collect();

        for product in &members {
            store.update_product(
                &product.id,
                ProductUpdate {
                    planning_room: Some(None),
                    ..Default::default()
                },
            )?;
        }
        store.delete_room(room_id)?;

        tracing::info!("刪除計劃區 {}，移出 {} 個產品", room_id, members.len());
        Ok(members.len())
    }

    /// 指定產品的計劃區；`None` 表示移出
    pub fn assign_room<S: PlanningStore + ?Sized>(
        store: &mut S,
        product_id: &str,
        room_id: Option<Uuid>,
    ) -> Result<Product> {
        if let Some(id) = room_id {
            Self::find_room(store, id)?;
        }
        Self::ensure_product(store, product_id)?;

        Ok(store.update_product(
            product_id,
            ProductUpdate {
                planning_room: Some(room_id),
                ..Default::default()
            },
        )?)
    }

    /// 更新最低庫存
    pub fn set_min_stock<S: PlanningStore + ?Sized>(
        store: &mut S,
        product_id: &str,
        min_stock: Decimal,
    ) -> Result<Product> {
        if min_stock < Decimal::ZERO {
            return Err(PlanningError::validation(
                "min_stock",
                format!("最低庫存不可為負，收到 {min_stock}"),
            ));
        }
        Self::ensure_product(store, product_id)?;

        Ok(store.update_product(
            product_id,
            ProductUpdate {
                min_stock: Some(min_stock),
                ..Default::default()
            },
        )?)
    }

    fn clean_label(label: &str) -> Result<String> {
        let label = label.trim();
        if label.is_empty() {
            return Err(PlanningError::validation("label", "計劃區名稱不可為空"));
        }
        Ok(label.to_string())
    }

    fn find_room<S: PlanningStore + ?Sized>(store: &S, room_id: Uuid) -> Result<PlanningRoom> {
        store
            .list_rooms()?
            .into_iter()
            .find(|r| r.id == room_id)
            .ok_or(PlanningError::RoomNotFound(room_id))
    }

    fn ensure_product<S: PlanningStore + ?Sized>(store: &S, product_id: &str) -> Result<()> {
        match store.get_product(product_id)? {
            Some(_) => Ok(()),
            None => Err(PlanningError::ProductNotFound(product_id.to_string())),
        }
    }
}
