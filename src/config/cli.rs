use crate::config::toml_config::TomlConfig;
use crate::core::chart::ChartView;
use crate::core::export::ExportFormat;
use crate::core::form::SaleForm;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "optica-ledger")]
#[command(about = "Sales ledger client for an optical shop")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Base URL of the producto API
    #[arg(long, global = true)]
    pub api_endpoint: Option<String>,

    /// Directory where exports are written
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every sale
    List,
    /// Show a single sale
    Show { id: String },
    /// Register a new sale from a form file
    Create {
        /// TOML file with the sale form fields
        #[arg(long)]
        file: String,
        /// Screen to return to afterwards (main or listar-productos)
        #[arg(long)]
        from: Option<String>,
    },
    /// Edit an existing sale
    Edit {
        id: String,
        /// TOML file whose non-empty fields replace the stored ones
        #[arg(long)]
        file: Option<String>,
        #[command(flatten)]
        fields: FieldOverrides,
        #[arg(long)]
        from: Option<String>,
    },
    /// Delete a sale
    Delete { id: String },
    /// Search sales by customer name
    Search { name: String },
    /// Bump the counter of a sale
    Increment { id: String },
    /// Aggregate sales for charting
    Chart {
        /// seller, sales or income
        #[arg(long, default_value = "seller")]
        view: ChartView,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Raw chart data served by the backend
    ChartData,
    /// Export the sale table as a spreadsheet
    Export {
        /// xlsx or csv
        #[arg(long, default_value = "xlsx")]
        format: ExportFormat,
        #[arg(long)]
        filename: Option<String>,
    },
    /// Render a sale sheet as PDF
    Pdf {
        id: String,
        #[arg(long)]
        filename: Option<String>,
    },
}

/// Single-field edits applied on top of the stored sale.
#[derive(Debug, Clone, Default, Args)]
pub struct FieldOverrides {
    #[arg(long)]
    pub seller: Option<String>,
    #[arg(long)]
    pub customer: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub deposit: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
    #[arg(long)]
    pub payment_type: Option<String>,
}

impl FieldOverrides {
    pub fn apply(&self, form: &mut SaleForm) {
        if let Some(v) = &self.seller {
            form.set_seller_name(v.as_str());
        }
        if let Some(v) = &self.customer {
            form.set_customer_name(v.as_str());
        }
        if let Some(v) = &self.tax_id {
            form.set_customer_tax_id(v.as_str());
        }
        if let Some(v) = &self.phone {
            form.set_customer_phone(v.as_str());
        }
        if let Some(v) = &self.price {
            form.set_price(v.as_str());
        }
        if let Some(v) = &self.deposit {
            form.set_deposit(v.as_str());
        }
        if let Some(v) = &self.date {
            form.set_date(v.as_str());
        }
        if let Some(v) = &self.note {
            form.set_note(v.as_str());
        }
        if let Some(v) = &self.payment_type {
            form.set_payment_type(v.as_str());
        }
    }
}

impl CliConfig {
    /// File settings (or defaults) with command line flags layered on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(endpoint) = &self.api_endpoint {
            config.api.endpoint = endpoint.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.export.output_path = output_path.clone();
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.api_endpoint {
            validation::validate_url("--api-endpoint", endpoint)?;
        }
        if let Some(path) = &self.config {
            validation::validate_path("--config", path)?;
        }
        if let Command::Chart {
            month: Some(month), ..
        } = &self.command
        {
            validation::validate_range("--month", *month, 1, 12)?;
        }
        Ok(())
    }
}
