//! 預測主計算器

use chrono::{FixedOffset, NaiveDate};
use planning_core::{on_hand_by_product, ForecastParams, PlannedOrder, PlanningSnapshot, Product};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::classifier::{KindClassifier, TransactionClassifier};
use crate::projection::{ProjectionInput, StockProjection};
use crate::statistics::{DemandHistory, StatisticsCalculator};
use crate::strategy::StrategySelector;
use crate::{ForecastResult, ForecastWarning};

/// 由快照建立的索引（每次刷新建一次，之後每個參數組合都可重用）
#[derive(Debug, Clone, Default)]
pub struct ForecastInputs {
    history: DemandHistory,
    on_hand: HashMap<String, Decimal>,
    incoming: HashMap<String, (BTreeMap<NaiveDate, Decimal>, Vec<ForecastWarning>)>,
    planned: HashMap<String, HashMap<NaiveDate, PlannedOrder>>,
}

impl ForecastInputs {
    /// 無法對應產品的異動筆數
    pub fn orphan_transactions(&self) -> usize {
        self.history.orphan_transactions()
    }

    /// 產品現有庫存
    pub fn on_hand(&self, product_id: &str) -> Decimal {
        self.on_hand.get(product_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// 以最新讀取的計劃訂單取代某產品的索引（計劃訂單異動後呼叫）
    pub fn replace_planned(
        &mut self,
        product_id: &str,
        orders: impl IntoIterator<Item = PlannedOrder>,
    ) {
        let by_date: HashMap<NaiveDate, PlannedOrder> = orders
            .into_iter()
            .filter(|o| o.product_id == product_id)
            .map(|o| (o.date, o))
            .collect();
        if by_date.is_empty() {
            self.planned.remove(product_id);
        } else {
            self.planned.insert(product_id.to_string(), by_date);
        }
    }
}

/// 預測計算器
pub struct ForecastCalculator {
    /// 今天（日界與時區一致）
    today: NaiveDate,

    /// 營業日時區
    offset: FixedOffset,

    /// 異動分類器
    classifier: Box<dyn TransactionClassifier + Send + Sync>,
}

impl ForecastCalculator {
    /// 創建新的計算器（預設明確類型分類，舊資料退回關鍵字）
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            today,
            offset,
            classifier: Box::new(KindClassifier::default()),
        }
    }

    /// 建構器模式：替換分類器
    pub fn with_classifier(
        mut self,
        classifier: Box<dyn TransactionClassifier + Send + Sync>,
    ) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// 建立索引：分類異動、彙總庫存、在途與計劃訂單
    pub fn index(&self, snapshot: &PlanningSnapshot) -> ForecastInputs {
        tracing::debug!(
            "建立預測索引：產品 {} 筆，異動 {} 筆，在途 {} 筆，計劃訂單 {} 筆",
            snapshot.products.len(),
            snapshot.transactions.len(),
            snapshot.pending_lines.len(),
            snapshot.planned_orders.len()
        );

        let known: HashSet<&str> = snapshot.products.iter().map(|p| p.id.as_str()).collect();
        let history = DemandHistory::build(
            &snapshot.transactions,
            &known,
            self.classifier.as_ref(),
            self.offset,
        );

        let incoming = snapshot
            .products
            .iter()
            .map(|p| {
                (
                    p.id.clone(),
                    StockProjection::incoming_by_date(&p.id, &snapshot.pending_lines),
                )
            })
            .collect();

        let mut planned: HashMap<String, HashMap<NaiveDate, PlannedOrder>> = HashMap::new();
        for order in &snapshot.planned_orders {
            planned
                .entry(order.product_id.clone())
                .or_default()
                .insert(order.date, order.clone());
        }

        ForecastInputs {
            history,
            on_hand: on_hand_by_product(&snapshot.lots),
            incoming,
            planned,
        }
    }

    /// 單一產品預測
    pub fn forecast(
        &self,
        inputs: &ForecastInputs,
        product: &Product,
        params: &ForecastParams,
    ) -> ForecastResult {
        let stats = StatisticsCalculator::calculate(
            inputs.history.usage(&product.id),
            self.today,
            params.lookback,
        );
        let applied_demand =
            StrategySelector::applied_demand(&stats, params.strategy, params.demand_factor);
        let starting_stock = inputs.on_hand(&product.id);

        let empty_incoming = (BTreeMap::new(), Vec::new());
        let (incoming, incoming_warnings) =
            inputs.incoming.get(&product.id).unwrap_or(&empty_incoming);
        let empty_planned = HashMap::new();
        let planned = inputs.planned.get(&product.id).unwrap_or(&empty_planned);

        let horizon = params.month.days();
        let timeline = StockProjection::simulate(ProjectionInput {
            starting_stock,
            applied_demand,
            min_stock: product.min_stock,
            today: self.today,
            horizon: &horizon,
            incoming,
            planned,
        });

        let mut result = ForecastResult {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            base_uom: product.base_uom.clone(),
            purchase_uom: product.purchase_uom.clone(),
            stats,
            strategy: params.strategy,
            demand_factor: params.demand_factor,
            applied_demand,
            starting_stock,
            timeline,
            warnings: incoming_warnings.clone(),
        };

        if !result.stats.has_data_in_period {
            result.add_warning(ForecastWarning::info(
                product.id.clone(),
                format!("近 {} 天沒有出庫紀錄，需求未知", params.lookback.days()),
            ));
        }

        result
    }

    /// 依篩選條件計算所有產品（並行計算，輸出順序與產品順序一致）
    pub fn calculate(
        &self,
        inputs: &ForecastInputs,
        products: &[Product],
        params: &ForecastParams,
    ) -> Vec<ForecastResult> {
        tracing::info!(
            "開始預測：月份 {}，策略 {}，基期 {} 天，係數 {}",
            params.month,
            params.strategy,
            params.lookback.days(),
            params.demand_factor.value()
        );
        let start_time = std::time::Instant::now();

        let selected: Vec<&Product> = products.iter().filter(|p| params.includes(p)).collect();
        let results: Vec<ForecastResult> = selected
            .par_iter()
            .map(|product| self.forecast(inputs, product, params))
            .collect();

        tracing::info!(
            "預測完成：{} 個產品，耗時 {:?}",
            results.len(),
            start_time.elapsed()
        );
        results
    }
}
