use crate::core::form::SaleForm;
use crate::core::notify::{
    CREATED_MESSAGE, CREATED_TITLE, CREATE_FAILED, ERROR_TITLE, LOAD_FOR_EDIT_FAILED,
    UPDATED_MESSAGE, UPDATED_TITLE, UPDATE_FAILED,
};
use crate::core::pdf::{SalePdfRenderer, DEFAULT_PDF_FILENAME};
use crate::core::{Notice, Notifier, SaleId, SaleRecord, SaleRepository, Storage};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

pub const SALE_LIST_ORIGIN: &str = "listar-productos";
pub const MAIN_ORIGIN: &str = "main";

/// Where to go once a sale has been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnRoute {
    #[default]
    Main,
    SaleList,
}

impl ReturnRoute {
    pub fn from_origin(origin: Option<&str>) -> Self {
        match origin {
            Some(SALE_LIST_ORIGIN) => ReturnRoute::SaleList,
            _ => ReturnRoute::Main,
        }
    }
}

/// Create/edit screen for a single sale.
pub struct SaleEditorScreen<R: SaleRepository, N: Notifier> {
    repository: R,
    notifier: N,
    form: SaleForm,
    return_route: ReturnRoute,
}

impl<R: SaleRepository, N: Notifier> SaleEditorScreen<R, N> {
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository,
            notifier,
            form: SaleForm::new(),
            return_route: ReturnRoute::Main,
        }
    }

    pub fn open_new(&mut self, origin: Option<&str>) {
        self.form = SaleForm::new();
        self.return_route = ReturnRoute::from_origin(origin);
    }

    pub fn open_with(&mut self, form: SaleForm, origin: Option<&str>) {
        self.form = form;
        self.return_route = ReturnRoute::from_origin(origin);
    }

    /// Load a persisted sale into the form.
    pub async fn open_existing(&mut self, id: &SaleId, origin: Option<&str>) -> Result<()> {
        self.return_route = ReturnRoute::from_origin(origin);

        match self.repository.get(id).await {
            Ok(mut record) => {
                if record.id.is_none() {
                    record.id = Some(id.clone());
                }
                self.form = SaleForm::from_record(&record);
                tracing::debug!("Loaded sale {} for editing", id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error loading sale {} for editing: {}", id, e);
                self.notifier
                    .notify(Notice::error(LOAD_FOR_EDIT_FAILED, ERROR_TITLE));
                Err(e)
            }
        }
    }

    pub fn title(&self) -> &'static str {
        self.form.title()
    }

    pub fn form(&self) -> &SaleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SaleForm {
        &mut self.form
    }

    pub fn return_route(&self) -> ReturnRoute {
        self.return_route
    }

    /// Submit the form: update when it carries an id, create otherwise.
    /// Validation failures block the submission without touching the backend.
    pub async fn save(&mut self) -> Result<(SaleRecord, ReturnRoute)> {
        let record = self.form.to_record()?;

        let saved = match self.form.id().cloned() {
            Some(id) => match self.repository.update(&id, &record).await {
                Ok(saved) => {
                    self.notifier
                        .notify(Notice::info(UPDATED_MESSAGE, UPDATED_TITLE));
                    saved
                }
                Err(e) => {
                    tracing::error!("Error updating sale {}: {}", id, e);
                    self.notifier.notify(Notice::error(UPDATE_FAILED, ERROR_TITLE));
                    return Err(e);
                }
            },
            None => match self.repository.create(&record).await {
                Ok(saved) => {
                    self.notifier
                        .notify(Notice::success(CREATED_MESSAGE, CREATED_TITLE));
                    saved
                }
                Err(e) => {
                    tracing::error!("Error creating sale: {}", e);
                    self.notifier.notify(Notice::error(CREATE_FAILED, ERROR_TITLE));
                    return Err(e);
                }
            },
        };

        Ok((saved, self.return_route))
    }

    /// Render the form as it currently stands, complete or not.
    pub async fn export_pdf<S: Storage>(
        &self,
        renderer: &SalePdfRenderer,
        storage: &S,
        filename: Option<&str>,
    ) -> Result<String> {
        let record = self.form.snapshot();
        let bytes = renderer.render(&record, self.form.title())?;
        storage
            .write_file(filename.unwrap_or(DEFAULT_PDF_FILENAME), &bytes)
            .await
    }
}
