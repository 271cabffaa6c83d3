//! 異動分類

use planning_core::Transaction;
use rust_decimal::Decimal;

/// 出庫關鍵字（不分大小寫，子字串比對）
const OUTBOUND_KEYWORDS: [&str; 6] = ["OUT", "TRANS", "DISP", "ISSUE", "SALE", "USE"];

/// 入庫關鍵字
const INBOUND_KEYWORDS: [&str; 3] = ["IN", "RECV", "RECEIPT"];

/// 負數量但不視為出庫的關鍵字（調整、盤點、入庫沖銷）
const NON_DEMAND_KEYWORDS: [&str; 5] = ["ADJUST", "CYCLE", "IN", "RECV", "RECEIPT"];

/// 分類結果（數量一律取絕對值）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 出庫需求
    Outbound(Decimal),
    /// 入庫供應
    Inbound(Decimal),
    /// 與需求無關
    Ignored,
}

impl Classification {
    /// 出庫數量（非出庫為 None）
    pub fn outbound_qty(&self) -> Option<Decimal> {
        match self {
            Classification::Outbound(qty) => Some(*qty),
            _ => None,
        }
    }
}

/// 異動分類器
pub trait TransactionClassifier {
    fn classify(&self, transaction: &Transaction) -> Classification;
}

/// 關鍵字分類器：給沒有明確類型的舊資料使用
///
/// 標籤同時符合出庫與入庫關鍵字時（如 `TRANSFER_IN`），出庫優先。
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// 依類型標籤與帶號數量分類
    pub fn classify_tag(type_tag: &str, quantity_change: Decimal) -> Classification {
        let tag = type_tag.to_uppercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| tag.contains(kw));

        let outbound = contains_any(&OUTBOUND_KEYWORDS)
            || (quantity_change < Decimal::ZERO && !contains_any(&NON_DEMAND_KEYWORDS));

        if outbound {
            Classification::Outbound(quantity_change.abs())
        } else if contains_any(&INBOUND_KEYWORDS) {
            Classification::Inbound(quantity_change.abs())
        } else {
            Classification::Ignored
        }
    }
}

impl TransactionClassifier for KeywordClassifier {
    fn classify(&self, transaction: &Transaction) -> Classification {
        Self::classify_tag(&transaction.type_tag, transaction.quantity_change)
    }
}

/// 明確類型分類器：有 `kind` 時依類型，否則退回關鍵字分類
#[derive(Debug, Clone, Copy, Default)]
pub struct KindClassifier {
    fallback: KeywordClassifier,
}

impl TransactionClassifier for KindClassifier {
    fn classify(&self, transaction: &Transaction) -> Classification {
        match transaction.kind {
            Some(kind) if kind.is_outbound() => {
                Classification::Outbound(transaction.quantity_change.abs())
            }
            Some(kind) if kind.is_inbound() => {
                Classification::Inbound(transaction.quantity_change.abs())
            }
            Some(_) => Classification::Ignored,
            None => self.fallback.classify(transaction),
        }
    }
}
