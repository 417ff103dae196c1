pub mod chart;
pub mod client;
pub mod export;
pub mod form;
pub mod notify;
pub mod pdf;

pub use crate::domain::model::{
    compute_balance, ChartPoint, ChartSeries, LineItem, SaleId, SaleRecord, MAX_LINE_ITEMS,
};
pub use crate::domain::ports::{
    ConfigProvider, Notice, NoticeLevel, Notifier, SaleRepository, Storage,
};
pub use crate::utils::error::Result;
