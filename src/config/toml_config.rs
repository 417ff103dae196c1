use crate::core::client::{DEFAULT_API_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::core::export::{DEFAULT_CSV_FILENAME, DEFAULT_SHEET_NAME, DEFAULT_XLSX_FILENAME};
use crate::core::pdf::{DEFAULT_FONTS_DIR, DEFAULT_FONT_FAMILY, DEFAULT_PDF_FILENAME};
use crate::core::ConfigProvider;
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";
/// Worksheet names are capped at 31 characters by spreadsheet applications.
const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub export: ExportConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub sheet_name: String,
    pub xlsx_filename: String,
    pub csv_filename: String,
    pub pdf_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            xlsx_filename: DEFAULT_XLSX_FILENAME.to_string(),
            csv_filename: DEFAULT_CSV_FILENAME.to_string(),
            pdf_filename: DEFAULT_PDF_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub fonts_dir: String,
    pub font_family: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            fonts_dir: DEFAULT_FONTS_DIR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl TomlConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LedgerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LedgerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.endpoint", &self.api.endpoint)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;

        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_non_empty_string("export.sheet_name", &self.export.sheet_name)?;
        validation::validate_range(
            "export.sheet_name length",
            self.export.sheet_name.chars().count(),
            1,
            MAX_SHEET_NAME_LEN,
        )?;
        validation::validate_file_name("export.xlsx_filename", &self.export.xlsx_filename, "xlsx")?;
        validation::validate_file_name("export.csv_filename", &self.export.csv_filename, "csv")?;
        validation::validate_file_name("export.pdf_filename", &self.export.pdf_filename, "pdf")?;

        validation::validate_path("pdf.fonts_dir", &self.pdf.fonts_dir)?;
        validation::validate_non_empty_string("pdf.font_family", &self.pdf.font_family)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.api.endpoint
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn request_timeout_secs(&self) -> u64 {
        self.api.timeout_seconds
    }

    fn fonts_dir(&self) -> &str {
        &self.pdf.fonts_dir
    }

    fn font_family(&self) -> &str {
        &self.pdf.font_family
    }

    fn sheet_name(&self) -> &str {
        &self.export.sheet_name
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
