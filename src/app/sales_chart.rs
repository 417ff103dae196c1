use crate::core::chart::{self, ChartView, PeriodFilter};
use crate::core::notify::{ERROR_TITLE, LOAD_FAILED};
use crate::core::{ChartSeries, Notice, Notifier, SaleRecord, SaleRepository};
use crate::utils::error::Result;
use crate::utils::validation::validate_range;

/// Chart screen: all sales, bucketed by seller or by month.
pub struct SalesChartScreen<R: SaleRepository, N: Notifier> {
    repository: R,
    notifier: N,
    records: Vec<SaleRecord>,
    view: ChartView,
    filter: PeriodFilter,
    years: Vec<i32>,
}

impl<R: SaleRepository, N: Notifier> SalesChartScreen<R, N> {
    /// Starts on the per-seller view with the year preselected and no month.
    pub fn new(repository: R, notifier: N, current_year: i32) -> Self {
        Self {
            repository,
            notifier,
            records: Vec::new(),
            view: ChartView::BySeller,
            filter: PeriodFilter::new(None, Some(current_year)),
            years: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<ChartSeries> {
        match self.repository.list().await {
            Ok(records) => {
                self.years = chart::available_years(&records);
                self.records = records;
                Ok(self.series())
            }
            Err(e) => {
                tracing::error!("Failed to load chart data: {}", e);
                self.notifier.notify(Notice::error(LOAD_FAILED, ERROR_TITLE));
                Err(e)
            }
        }
    }

    pub fn select_view(&mut self, view: ChartView) -> ChartSeries {
        self.view = view;
        self.series()
    }

    pub fn set_period(&mut self, month: Option<u32>, year: Option<i32>) -> Result<ChartSeries> {
        if let Some(month) = month {
            validate_range("month", month, 1, 12)?;
        }
        self.filter = PeriodFilter::new(month, year);
        Ok(self.series())
    }

    pub fn series(&self) -> ChartSeries {
        chart::aggregate(&self.records, self.view, &self.filter)
    }

    pub fn view(&self) -> ChartView {
        self.view
    }

    pub fn filter(&self) -> PeriodFilter {
        self.filter
    }

    pub fn is_income_view(&self) -> bool {
        self.view == ChartView::IncomeByMonth
    }

    pub fn available_years(&self) -> &[i32] {
        &self.years
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }
}
