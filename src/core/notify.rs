use crate::core::{Notice, NoticeLevel, Notifier};
use std::sync::{Arc, Mutex};

pub const CREATED_MESSAGE: &str = "El producto fue registrado con éxito";
pub const CREATED_TITLE: &str = "Producto Registrado";
pub const UPDATED_MESSAGE: &str = "El producto fue actualizado con éxito";
pub const UPDATED_TITLE: &str = "Producto Actualizado";
pub const DELETED_MESSAGE: &str = "El producto fue eliminado con éxito";
pub const DELETED_TITLE: &str = "Producto eliminado";
pub const ERROR_TITLE: &str = "Error";
pub const LOAD_FOR_EDIT_FAILED: &str = "Hubo un error al obtener el producto para edición";
pub const CREATE_FAILED: &str = "Hubo un error al guardar el producto";
pub const UPDATE_FAILED: &str = "Hubo un error al actualizar el producto";
pub const DELETE_FAILED: &str = "Hubo un error al eliminar el producto";
pub const LOAD_FAILED: &str = "Hubo un error al obtener los productos";

/// Prints notices to the terminal and mirrors them into the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!("{}: {}", notice.title, notice.message);
                println!("✅ {}: {}", notice.title, notice.message);
            }
            NoticeLevel::Info => {
                tracing::info!("{}: {}", notice.title, notice.message);
                println!("ℹ️  {}: {}", notice.title, notice.message);
            }
            NoticeLevel::Error => {
                tracing::warn!("{}: {}", notice.title, notice.message);
                eprintln!("❌ {}: {}", notice.title, notice.message);
            }
        }
    }
}

/// Keeps every notice in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .ok()
            .and_then(|notices| notices.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!("Notice recorded: {:?}", notice);
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
