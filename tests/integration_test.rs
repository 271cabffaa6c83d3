//! 集成測試

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use planning_core::{
    ForecastParams, ForecastStrategy, InventoryLot, LookbackWindow, PlanningMonth, PlanningRoom,
    Product, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, RoomFilter, Transaction,
};
use planning_store::{MemoryStore, SnapshotLoader};
use rstest::*;
use rust_decimal::Decimal;
use wms_planning::Planner;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
}

fn params() -> ForecastParams {
    ForecastParams::new(PlanningMonth::new(2025, 6).unwrap())
        .with_strategy(ForecastStrategy::MovingAverage)
        .with_lookback(LookbackWindow::Days30)
}

/// 過去 30 天（含今天）每天一筆異動
fn daily(store: MemoryStore, product_id: &str, tag: &str, qty: i64) -> MemoryStore {
    (0..30).fold(store, |store, back| {
        let day = today() - Duration::days(back);
        let at = Utc.from_utc_datetime(&day.and_hms_opt(14, 0, 0).unwrap());
        store.with_transaction(Transaction::new(product_id, tag, Decimal::from(qty), at))
    })
}

/// 一個計劃區、兩個產品；RICE 每天出庫 10，庫存 100
#[fixture]
fn warehouse() -> (MemoryStore, PlanningRoom) {
    let room = PlanningRoom::new("Dry goods");
    let store = MemoryStore::new()
        .with_room(room.clone())
        .with_product(
            Product::new("RICE-5KG", "Jasmine Rice", "bag")
                .with_purchase_uom("case", Decimal::from(4))
                .with_standard_cost(Decimal::new(480, 1))
                .with_planning_room(room.id),
        )
        .with_product(
            Product::new("FLOUR-1KG", "Bread Flour", "pack")
                .with_purchase_uom("carton", Decimal::from(3))
                .with_planning_room(room.id),
        )
        .with_lot(InventoryLot::new("RICE-5KG", Decimal::from(60)).with_location("A-01"))
        .with_lot(InventoryLot::new("RICE-5KG", Decimal::from(40)).with_location("A-02"))
        .with_lot(InventoryLot::new("FLOUR-1KG", Decimal::from(200)));

    let store = daily(store, "RICE-5KG", "OUTBOUND", -10);
    let store = daily(store, "FLOUR-1KG", "SALE", -4);
    (store, room)
}

#[rstest]
fn test_scenario_steady_depletion(warehouse: (MemoryStore, PlanningRoom)) {
    // 庫存 100、每日需求 10、無在途、無計劃 → 90, 80, ..., 0
    let (store, _) = warehouse;
    let mut planner = Planner::new(store);

    let run = planner.refresh(today(), &params()).unwrap().unwrap();
    let rice = run.result("RICE-5KG").unwrap();

    assert_eq!(rice.applied_demand, Decimal::from(10));
    let first_ten: Vec<Decimal> = rice.timeline[..10].iter().map(|e| e.projected_stock).collect();
    let expected: Vec<Decimal> = (0..10).map(|i| Decimal::from(90 - 10 * i)).collect();
    assert_eq!(first_ten, expected);
    assert_eq!(rice.first_stockout_date(), Some(june(11)));
}

#[rstest]
fn test_scenario_planned_order_lifts_stock(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, _) = warehouse;
    let mut planner = Planner::new(store);
    planner.refresh(today(), &params()).unwrap();

    planner.set_planned_qty("RICE-5KG", june(5), Decimal::from(50)).unwrap();
    let run = planner.forecast(&params()).unwrap();
    let rice = run.result("RICE-5KG").unwrap();

    let day4 = rice.timeline[3].projected_stock;
    assert_eq!(day4, Decimal::from(60));
    assert_eq!(rice.timeline[4].projected_stock, day4 - Decimal::from(10) + Decimal::from(50));
    assert_eq!(rice.timeline[4].planned_purchase_qty, Decimal::from(13));
}

#[test]
fn test_scenario_transfer_counts_and_adjustment_does_not() {
    let store = MemoryStore::new().with_product(Product::new("OIL-1L", "Sunflower Oil", "bottle"));
    let store = daily(store, "OIL-1L", "OUTBOUND_TRANSFER", -5);
    let store = daily(store, "OIL-1L", "ADJUST", -3);
    let store = daily(store, "OIL-1L", "RECEIPT", 8);

    let mut planner = Planner::new(store);
    let run = planner.refresh(today(), &params()).unwrap().unwrap();
    let oil = run.result("OIL-1L").unwrap();

    assert_eq!(oil.stats.avg_base, Decimal::from(5));
    assert_eq!(oil.stats.total_base_period, Decimal::from(150));
}

#[rstest]
fn test_po_generation_groups_by_date(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, room) = warehouse;
    let mut planner = Planner::new(store);
    planner.refresh(today(), &params()).unwrap();

    planner.set_planned_qty("RICE-5KG", june(10), Decimal::from(40)).unwrap();
    planner.set_planned_qty("FLOUR-1KG", june(10), Decimal::from(30)).unwrap();
    let before = planner.forecast(&params()).unwrap();

    let report = planner
        .generate_purchase_orders(room.id, PlanningMonth::new(2025, 6).unwrap(), today())
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].delivery_date, june(10));
    assert_eq!(report.created[0].line_count, 2);
    assert_eq!(report.consumed_planned_orders, 2);

    let store = planner.store();
    assert!(store.planned_orders.is_empty());
    let po = &store.purchase_orders[0];
    assert_eq!(po.status, PurchaseOrderStatus::Pending);
    assert_eq!(po.lines.len(), 2);
    assert_eq!(po.lines[1].unit_cost, Decimal::new(480, 1));

    // 計劃訂單變成在途，推演結果不變
    let after = planner.forecast(&params()).unwrap();
    for (old, new) in before.results.iter().zip(&after.results) {
        let old_stock: Vec<Decimal> = old.timeline.iter().map(|e| e.projected_stock).collect();
        let new_stock: Vec<Decimal> = new.timeline.iter().map(|e| e.projected_stock).collect();
        assert_eq!(old_stock, new_stock);
    }
    let rice = after.result("RICE-5KG").unwrap();
    assert_eq!(rice.timeline[9].incoming_po_qty, Decimal::from(40));
    assert_eq!(rice.timeline[9].planned_purchase_qty, Decimal::ZERO);
    assert!(after.data_version > before.data_version);
}

#[rstest]
fn test_repeated_refresh_is_idempotent(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, _) = warehouse;
    let mut planner = Planner::new(store);
    let params = params()
        .with_strategy(ForecastStrategy::VolatilityAdjusted)
        .with_search("rice");

    let first = planner.refresh(today(), &params).unwrap().unwrap();
    let second = planner.refresh(today(), &params).unwrap().unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(first.results.len(), 1);
    assert_eq!(second.data_version, first.data_version + 1);
}

#[rstest]
fn test_mutation_only_recomputes_touched_product(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, _) = warehouse;
    let mut planner = Planner::new(store);
    let before = planner.refresh(today(), &params()).unwrap().unwrap();

    planner.set_planned_qty("FLOUR-1KG", june(2), Decimal::from(9)).unwrap();
    let after = planner.forecast(&params()).unwrap();

    assert_eq!(before.result("RICE-5KG"), after.result("RICE-5KG"));
    assert_ne!(before.result("FLOUR-1KG"), after.result("FLOUR-1KG"));
    assert_eq!(
        after.result("FLOUR-1KG").unwrap().timeline[1].planned_purchase_qty,
        Decimal::from(3)
    );
}

#[rstest]
fn test_incoming_po_and_orphans(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, _) = warehouse;
    let mut po = PurchaseOrder::new("PO-EXISTING", today(), Some(june(3)))
        .with_status(PurchaseOrderStatus::Partial);
    po.add_line(
        PurchaseOrderLine::new("RICE-5KG", Decimal::from(50), Decimal::from(13))
            .with_received_qty(Decimal::from(20)),
    );
    let ghost = Utc.with_ymd_and_hms(2025, 5, 30, 8, 0, 0).unwrap();
    let store = store
        .with_purchase_order(po)
        .with_transaction(Transaction::new("DISCONTINUED-9", "OUTBOUND", Decimal::from(-7), ghost));

    let mut planner = Planner::new(store).with_loader(SnapshotLoader::new().with_page_size(7));
    let run = planner.refresh(today(), &params()).unwrap().unwrap();

    assert_eq!(run.orphan_transactions, 1);
    let rice = run.result("RICE-5KG").unwrap();
    assert_eq!(rice.timeline[2].incoming_po_qty, Decimal::from(30));
    assert_eq!(rice.timeline[2].projected_stock, Decimal::from(100));
}

#[rstest]
fn test_room_filter_and_week_window(warehouse: (MemoryStore, PlanningRoom)) {
    let (store, room) = warehouse;
    let store = store.with_product(Product::new("MILK-1L", "Milk", "carton"));
    let mut planner = Planner::new(store);
    planner.refresh(today(), &params()).unwrap();

    let unassigned = planner.forecast(&params().with_room(RoomFilter::Unassigned)).unwrap();
    assert_eq!(unassigned.results.len(), 1);
    assert_eq!(unassigned.results[0].product_id, "MILK-1L");

    let in_room = planner
        .forecast(&params().with_room(RoomFilter::Room(room.id)).with_week_offset(4))
        .unwrap();
    assert_eq!(in_room.results.len(), 2);
    assert_eq!(in_room.week_count(), 5);
    // 6 月第 5 頁只剩 29、30 兩天
    for (_, last_page) in in_room.week_page() {
        assert_eq!(last_page.len(), 2);
        assert_eq!(last_page[0].date, june(29));
    }

    let past_end = planner
        .forecast(&params().with_room(RoomFilter::Room(room.id)).with_week_offset(5))
        .unwrap();
    assert!(past_end.week_page().iter().all(|(_, page)| page.is_empty()));
}

#[rstest]
fn test_export_from_json_snapshot() {
    let json = r#"{
        "products": [{
            "id": "SALT-500G", "name": "Sea Salt", "category": "Seasoning",
            "base_uom": "pack", "purchase_uom": "case", "conversion_rate": "12",
            "standard_cost": "0.8", "min_stock": "10", "planning_room": null
        }],
        "lots": [{ "id": "0c8f4a1e-54d2-4d43-9d3c-3f4a1e8b7c21", "product_id": "SALT-500G",
                   "quantity": "24", "location": null, "lot_number": "L-0425" }]
    }"#;
    let store = MemoryStore::from_json(json).unwrap();
    let mut planner = Planner::new(store);
    planner.refresh(today(), &params()).unwrap();

    let csv = planner.export_csv(&params()).unwrap();
    let mut lines = csv.lines();
    assert!(lines
        .next()
        .unwrap()
        .starts_with("product_id,product_name,base_uom,2025-06-01 plan,2025-06-01 stock"));
    assert!(lines.next().unwrap().starts_with("SALT-500G,Sea Salt,pack,0,24,0,24"));
}
