//! 計劃月份與日期工具

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{PlanningError, Result};

/// 每頁週視窗的天數
pub const WEEK_WINDOW_DAYS: usize = 7;

/// 計劃月份（年-月）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanningMonth {
    year: i32,
    month: u32,
}

impl PlanningMonth {
    /// 創建計劃月份
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| PlanningError::InvalidDate(format!("{year}-{month:02}")))?;
        Ok(Self { year, month })
    }

    /// 日期所在的月份
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 月初
    pub fn first_day(&self) -> NaiveDate {
        // new() 已驗證過
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 月底
    pub fn last_day(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// 當月天數
    pub fn num_days(&self) -> u32 {
        self.last_day().day()
    }

    /// 當月每一天（依序）
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first_day()
            .iter_days()
            .take(self.num_days() as usize)
            .collect()
    }

    /// 第 offset 頁的 7 天視窗（最後一頁可能不足 7 天，超出範圍為空）
    pub fn week_window(&self, offset: u32) -> Vec<NaiveDate> {
        self.days()
            .into_iter()
            .skip(offset as usize * WEEK_WINDOW_DAYS)
            .take(WEEK_WINDOW_DAYS)
            .collect()
    }

    /// 週視窗頁數
    pub fn week_count(&self) -> u32 {
        (self.num_days() as usize).div_ceil(WEEK_WINDOW_DAYS) as u32
    }

    /// 是否包含該日
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PlanningMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PlanningMonth {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| PlanningError::InvalidDate(s.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| PlanningError::InvalidDate(s.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| PlanningError::InvalidDate(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PlanningMonth {
    type Error = PlanningError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PlanningMonth> for String {
    fn from(month: PlanningMonth) -> Self {
        month.to_string()
    }
}

/// 時間軸顯示用標籤，如 `06/10 (Tue)`
pub fn day_label(date: NaiveDate) -> String {
    date.format("%m/%d (%a)").to_string()
}
