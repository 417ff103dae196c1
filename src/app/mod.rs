// Screen controllers: the list, the create/edit form and the charts.

pub mod sale_editor;
pub mod sale_list;
pub mod sales_chart;

pub use sale_editor::{ReturnRoute, SaleEditorScreen};
pub use sale_list::SaleListScreen;
pub use sales_chart::SalesChartScreen;
