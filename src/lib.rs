pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use app::{ReturnRoute, SaleEditorScreen, SaleListScreen, SalesChartScreen};
pub use core::client::ProductoClient;
pub use domain::model::{LineItem, SaleId, SaleRecord};
pub use utils::error::{LedgerError, Result};
