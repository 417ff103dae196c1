use crate::core::{ChartPoint, ChartSeries, SaleRecord};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const UNDATED_BUCKET: &str = "sin fecha";

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize).copied())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartView {
    /// Number of sales per seller.
    #[default]
    BySeller,
    /// Number of sales per month.
    SalesByMonth,
    /// Sum of deposit minus balance per month.
    IncomeByMonth,
}

impl FromStr for ChartView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seller" | "vendedor" => Ok(ChartView::BySeller),
            "sales" | "ventas" => Ok(ChartView::SalesByMonth),
            "income" | "ingresos" => Ok(ChartView::IncomeByMonth),
            other => Err(format!(
                "unknown chart view '{}', expected seller, sales or income",
                other
            )),
        }
    }
}

/// Month/year restriction. Only applied when both parts are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodFilter {
    pub fn new(month: Option<u32>, year: Option<i32>) -> Self {
        Self { month, year }
    }

    pub fn is_active(&self) -> bool {
        self.month.is_some() && self.year.is_some()
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        match (self.month, self.year) {
            (Some(month), Some(year)) => record
                .date
                .map(|d| d.month() == month && d.year() == year)
                .unwrap_or(false),
            _ => true,
        }
    }
}

pub fn filter_by_period<'a>(records: &'a [SaleRecord], filter: &PeriodFilter) -> Vec<&'a SaleRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Accumulates values per key, keeping the order in which keys first appear.
#[derive(Default)]
struct OrderedTally {
    index: HashMap<String, usize>,
    points: Vec<ChartPoint>,
}

impl OrderedTally {
    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => self.points[i].value += amount,
            None => {
                self.index.insert(key.to_string(), self.points.len());
                self.points.push(ChartPoint {
                    name: key.to_string(),
                    value: amount,
                });
            }
        }
    }

    fn into_series(self) -> ChartSeries {
        ChartSeries::from_points(self.points)
    }
}

fn month_key(record: &SaleRecord) -> &'static str {
    record
        .date
        .and_then(|d| month_name(d.month()))
        .unwrap_or(UNDATED_BUCKET)
}

pub fn sales_by_seller<'a, I>(records: I) -> ChartSeries
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut tally = OrderedTally::default();
    for record in records {
        tally.add(&record.seller_name, 1.0);
    }
    tally.into_series()
}

pub fn sales_by_month<'a, I>(records: I) -> ChartSeries
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut tally = OrderedTally::default();
    for record in records {
        tally.add(month_key(record), 1.0);
    }
    tally.into_series()
}

pub fn income_by_month<'a, I>(records: I) -> ChartSeries
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut tally = OrderedTally::default();
    for record in records {
        tally.add(month_key(record), record.income());
    }
    tally.into_series()
}

pub fn aggregate(records: &[SaleRecord], view: ChartView, filter: &PeriodFilter) -> ChartSeries {
    let filtered = filter_by_period(records, filter);
    tracing::debug!(
        "Aggregating {} of {} records as {:?}",
        filtered.len(),
        records.len(),
        view
    );

    match view {
        ChartView::BySeller => sales_by_seller(filtered),
        ChartView::SalesByMonth => sales_by_month(filtered),
        ChartView::IncomeByMonth => income_by_month(filtered),
    }
}

/// Distinct years present in the records, in first-seen order.
pub fn available_years(records: &[SaleRecord]) -> Vec<i32> {
    let mut years = Vec::new();
    for year in records.iter().filter_map(|r| r.date.map(|d| d.year())) {
        if !years.contains(&year) {
            years.push(year);
        }
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(seller: &str, price: f64, deposit: f64, date: (i32, u32, u32)) -> SaleRecord {
        SaleRecord {
            seller_name: seller.to_string(),
            price,
            deposit,
            balance: price - deposit,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            ..Default::default()
        }
    }

    fn sample() -> Vec<SaleRecord> {
        vec![
            record("Ana", 100.0, 40.0, (2024, 3, 15)),
            record("Luis", 50.0, 50.0, (2024, 3, 20)),
            record("Ana", 80.0, 80.0, (2024, 4, 2)),
            record("Marta", 30.0, 10.0, (2023, 3, 9)),
        ]
    }

    #[test]
    fn test_seller_example() {
        let records = vec![record("A", 100.0, 40.0, (2024, 1, 1)), record("A", 50.0, 50.0, (2024, 1, 2))];
        let series = aggregate(&records, ChartView::BySeller, &PeriodFilter::default());
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.value_of("A"), Some(2.0));
        assert_eq!(records[0].balance, 60.0);
        assert_eq!(records[1].balance, 0.0);
    }

    #[test]
    fn test_seller_counts_sum_to_total_in_first_seen_order() {
        let records = sample();
        let series = aggregate(&records, ChartView::BySeller, &PeriodFilter::default());
        let names: Vec<&str> = series.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Luis", "Marta"]);
        assert_eq!(series.total, records.len() as f64);
    }

    #[test]
    fn test_period_filter_requires_month_and_year() {
        let records = sample();
        assert_eq!(filter_by_period(&records, &PeriodFilter::new(Some(3), None)).len(), 4);
        assert_eq!(filter_by_period(&records, &PeriodFilter::new(None, Some(2024))).len(), 4);

        let march_2024 = filter_by_period(&records, &PeriodFilter::new(Some(3), Some(2024)));
        assert_eq!(march_2024.len(), 2);
        assert!(march_2024
            .iter()
            .all(|r| r.date.map(|d| d.month() == 3 && d.year() == 2024).unwrap_or(false)));
    }

    #[test]
    fn test_sales_and_income_by_month() {
        let records = sample();
        let sales = aggregate(&records, ChartView::SalesByMonth, &PeriodFilter::default());
        assert_eq!(sales.value_of("marzo"), Some(3.0));
        assert_eq!(sales.value_of("abril"), Some(1.0));

        // income = deposit - balance: (40 - 60) + (50 - 0) + (10 - 20)
        let income = aggregate(&records, ChartView::IncomeByMonth, &PeriodFilter::default());
        assert_eq!(income.value_of("marzo"), Some(20.0));
        assert_eq!(income.value_of("abril"), Some(80.0));
        assert_eq!(income.total, 100.0);
    }

    #[test]
    fn test_undated_records_use_their_own_bucket() {
        let mut records = sample();
        records.push(SaleRecord {
            seller_name: "Ana".to_string(),
            ..Default::default()
        });
        let sales = aggregate(&records, ChartView::SalesByMonth, &PeriodFilter::default());
        assert_eq!(sales.value_of(UNDATED_BUCKET), Some(1.0));

        let filtered = aggregate(&records, ChartView::BySeller, &PeriodFilter::new(Some(4), Some(2024)));
        assert_eq!(filtered.total, 1.0);
    }

    #[test]
    fn test_available_years_unique_in_first_seen_order() {
        assert_eq!(available_years(&sample()), vec![2024, 2023]);
        assert!(available_years(&[]).is_empty());
    }

    #[test]
    fn test_chart_view_parsing_and_month_names() {
        assert_eq!("ventas".parse::<ChartView>(), Ok(ChartView::SalesByMonth));
        assert_eq!("Income".parse::<ChartView>(), Ok(ChartView::IncomeByMonth));
        assert!("pie".parse::<ChartView>().is_err());
        assert_eq!(month_name(1), Some("enero"));
        assert_eq!(month_name(12), Some("diciembre"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
