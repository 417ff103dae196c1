use crate::domain::model::{SaleId, SaleRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout_secs(&self) -> u64;
    fn fonts_dir(&self) -> &str;
    fn font_family(&self) -> &str;
    fn sheet_name(&self) -> &str;
}

/// Data-access facade over the `producto` REST resource.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<SaleRecord>>;
    async fn get(&self, id: &SaleId) -> Result<SaleRecord>;
    async fn create(&self, record: &SaleRecord) -> Result<SaleRecord>;
    async fn update(&self, id: &SaleId, record: &SaleRecord) -> Result<SaleRecord>;
    async fn delete(&self, id: &SaleId) -> Result<()>;
    async fn search_by_name(&self, name: &str) -> Result<Vec<SaleRecord>>;
    async fn increment_counter(&self, id: &SaleId) -> Result<()>;
    async fn chart_data(&self) -> Result<Vec<serde_json::Value>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Non-blocking user notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
