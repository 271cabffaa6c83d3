//! 產品失效標記

use std::collections::HashSet;

/// 失效標記追蹤器
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_products: HashSet<String>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記產品失效
    pub fn mark_dirty(&mut self, product_id: impl Into<String>) {
        self.dirty_products.insert(product_id.into());
    }

    pub fn is_dirty(&self, product_id: &str) -> bool {
        self.dirty_products.contains(product_id)
    }

    /// 清除單一產品的標記；回傳原本是否失效
    pub fn clean(&mut self, product_id: &str) -> bool {
        self.dirty_products.remove(product_id)
    }

    /// 清除所有標記
    pub fn clear(&mut self) {
        self.dirty_products.clear();
    }

    /// 所有失效產品（排序後）
    pub fn dirty_products(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.dirty_products.iter().cloned().collect();
        ids.sort();
        ids
    }
}
