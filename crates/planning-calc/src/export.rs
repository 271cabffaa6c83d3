//! 時間軸匯出（一列一個產品，每天兩欄：計劃採購量、預計庫存）

use planning_core::{PlanningError, Result};
use rust_decimal::Decimal;
use std::io;

use crate::ForecastResult;

/// 匯出時保留的小數位
const EXPORT_DECIMALS: u32 = 2;

/// 時間軸匯出器
pub struct TimelineExporter;

impl TimelineExporter {
    /// 匯出成 CSV 字串
    pub fn to_csv(results: &[ForecastResult]) -> Result<String> {
        let mut buffer = Vec::new();
        Self::write_csv(&mut buffer, results)?;
        String::from_utf8(buffer).map_err(|e| PlanningError::Export(e.to_string()))
    }

    /// 寫出 CSV；欄位以第一個產品的時間軸日期為準
    pub fn write_csv<W: io::Write>(writer: W, results: &[ForecastResult]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let dates: Vec<_> = results
            .first()
            .map(|r| r.timeline.iter().map(|e| e.date).collect())
            .unwrap_or_default();

        let mut header = vec![
            "product_id".to_string(),
            "product_name".to_string(),
            "base_uom".to_string(),
        ];
        for date in &dates {
            header.push(format!("{date} plan"));
            header.push(format!("{date} stock"));
        }
        wtr.write_record(&header).map_err(export_error)?;

        for result in results {
            let mut row = vec![
                result.product_id.clone(),
                result.product_name.clone(),
                result.base_uom.clone(),
            ];
            for date in &dates {
                match result.timeline.iter().find(|e| e.date == *date) {
                    Some(entry) => {
                        row.push(format_qty(entry.planned_purchase_qty));
                        row.push(format_qty(entry.projected_stock));
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }
            wtr.write_record(&row).map_err(export_error)?;
        }

        wtr.flush().map_err(|e| PlanningError::Export(e.to_string()))?;
        Ok(())
    }
}

fn format_qty(value: Decimal) -> String {
    value.round_dp(EXPORT_DECIMALS).normalize().to_string()
}

fn export_error(err: csv::Error) -> PlanningError {
    PlanningError::Export(err.to_string())
}
