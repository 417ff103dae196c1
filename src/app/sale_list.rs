use crate::core::export::{ExportFormat, SpreadsheetExporter};
use crate::core::notify::{DELETED_MESSAGE, DELETED_TITLE, DELETE_FAILED, ERROR_TITLE, LOAD_FAILED};
use crate::core::{Notice, Notifier, SaleId, SaleRecord, SaleRepository, Storage};
use crate::utils::error::Result;

/// Table of all sales with delete, search and spreadsheet export.
pub struct SaleListScreen<R: SaleRepository, N: Notifier> {
    repository: R,
    notifier: N,
    records: Vec<SaleRecord>,
}

impl<R: SaleRepository, N: Notifier> SaleListScreen<R, N> {
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository,
            notifier,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub async fn refresh(&mut self) -> Result<&[SaleRecord]> {
        match self.repository.list().await {
            Ok(records) => {
                self.records = records;
                Ok(&self.records)
            }
            Err(e) => {
                tracing::error!("Failed to load sales: {}", e);
                self.notifier.notify(Notice::error(LOAD_FAILED, ERROR_TITLE));
                Err(e)
            }
        }
    }

    /// Delete a record, then reload the table. A failed reload is logged and
    /// notified by `refresh` but does not fail the delete.
    pub async fn delete(&mut self, id: &SaleId) -> Result<()> {
        if let Err(e) = self.repository.delete(id).await {
            tracing::error!("Failed to delete sale {}: {}", id, e);
            self.notifier.notify(Notice::error(DELETE_FAILED, ERROR_TITLE));
            return Err(e);
        }

        self.notifier.notify(Notice::info(DELETED_MESSAGE, DELETED_TITLE));
        if let Err(e) = self.refresh().await {
            tracing::warn!("Sale {} deleted but the table could not be reloaded: {}", id, e);
        }
        Ok(())
    }

    pub async fn search(&mut self, name: &str) -> Result<&[SaleRecord]> {
        match self.repository.search_by_name(name).await {
            Ok(records) => {
                tracing::info!("Search '{}' matched {} sales", name, records.len());
                self.records = records;
                Ok(&self.records)
            }
            Err(e) => {
                tracing::error!("Search '{}' failed: {}", name, e);
                self.notifier.notify(Notice::error(LOAD_FAILED, ERROR_TITLE));
                Err(e)
            }
        }
    }

    /// Write the current table through `storage`; returns the stored path.
    pub async fn export_spreadsheet<S: Storage>(
        &self,
        storage: &S,
        exporter: &SpreadsheetExporter,
        format: ExportFormat,
        filename: Option<&str>,
    ) -> Result<String> {
        let filename = filename.unwrap_or(format.default_filename());
        let bytes = exporter.export(&self.records, format)?;

        tracing::debug!(
            "Writing {} export ({} bytes) as {}",
            format.extension(),
            bytes.len(),
            filename
        );
        storage.write_file(filename, &bytes).await
    }
}
