use crate::core::{ConfigProvider, LineItem, SaleRecord};
use crate::domain::model::calendar_day;
use crate::utils::error::{LedgerError, Result};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, Margins, SimplePageDecorator};
use std::path::{Path, PathBuf};

pub const DEFAULT_PDF_FILENAME: &str = "formulario.pdf";
pub const DEFAULT_FONTS_DIR: &str = "./fonts";
pub const DEFAULT_FONT_FAMILY: &str = "LiberationSans";

fn pdf_error(context: &str, e: impl std::fmt::Display) -> LedgerError {
    LedgerError::PdfError {
        message: format!("{}: {}", context, e),
    }
}

/// Whole pesos with a thousands separator: 125000 -> "$125.000".
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Printable A4 sale sheet.
#[derive(Debug, Clone)]
pub struct SalePdfRenderer {
    fonts_dir: PathBuf,
    font_family: String,
}

impl SalePdfRenderer {
    pub fn new(fonts_dir: impl AsRef<Path>, font_family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.as_ref().to_path_buf(),
            font_family: font_family.into(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(config.fonts_dir(), config.font_family())
    }

    pub fn render(&self, record: &SaleRecord, title: &str) -> Result<Vec<u8>> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                pdf_error(
                    &format!("loading fonts from {}", self.fonts_dir.display()),
                    e,
                )
            })?;

        let mut doc = Document::new(font_family);
        doc.set_title(title);
        doc.set_paper_size(genpdf::Size::new(210, 297));

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::trbl(20, 20, 20, 20));
        doc.set_page_decorator(decorator);

        let s_title = Style::new().with_font_size(16).bold();
        let s_subtitle = Style::new().with_font_size(12).bold();
        let s_normal = Style::new().with_font_size(10);
        let s_bold = Style::new().with_font_size(10).bold();

        doc.push(
            Paragraph::new(title)
                .aligned(Alignment::Center)
                .styled(s_title),
        );
        doc.push(Break::new(1));

        let date = record
            .date
            .map(|d| d.format(calendar_day::FORMAT).to_string())
            .unwrap_or_default();
        let header_rows = [
            ("Vendedor:", record.seller_name.clone()),
            ("Nombre:", record.customer_name.clone()),
            ("RUT:", record.customer_tax_id.clone()),
            ("Teléfono:", record.customer_phone.clone()),
            ("Fecha:", date),
            ("Tipo de pago:", record.payment_type.clone()),
            ("Observación:", record.note.clone()),
        ];

        let mut info_table = TableLayout::new(vec![1, 2]);
        for (label, value) in header_rows {
            info_table
                .row()
                .element(Paragraph::new(label).styled(s_bold))
                .element(Paragraph::new(value).styled(s_normal))
                .push()
                .map_err(|e| pdf_error("building header table", e))?;
        }
        doc.push(info_table);
        doc.push(Break::new(1));

        doc.push(Paragraph::new("MONTOS").styled(s_subtitle));
        doc.push(Break::new(0.3));

        let mut amounts_table = TableLayout::new(vec![3, 2]);
        amounts_table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        for (label, value) in [
            ("Precio", record.price),
            ("Abono", record.deposit),
            ("Saldo", record.balance),
        ] {
            amounts_table
                .row()
                .element(Paragraph::new(label).styled(s_normal))
                .element(
                    Paragraph::new(format_currency(value))
                        .aligned(Alignment::Right)
                        .styled(s_normal),
                )
                .push()
                .map_err(|e| pdf_error("building amounts table", e))?;
        }
        doc.push(amounts_table);

        for (index, item) in record.line_items.iter().enumerate() {
            doc.push(Break::new(1));
            doc.push(Paragraph::new(format!("RECETA {}", index + 1)).styled(s_subtitle));
            doc.push(Break::new(0.3));
            doc.push(self.prescription_table(item, s_bold, s_normal)?);
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| pdf_error("rendering document", e))?;

        tracing::debug!("Rendered sale sheet ({} bytes)", buffer.len());
        Ok(buffer)
    }

    fn prescription_table(&self, item: &LineItem, header: Style, cell: Style) -> Result<TableLayout> {
        let mut table = TableLayout::new(vec![1, 1, 1, 1, 1, 1]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

        let mut head = table.row().element(Paragraph::new("").styled(header));
        for label in ["Esférico", "Cilindro", "Eje", "Adición", "DP"] {
            head = head.element(Paragraph::new(label).styled(header));
        }
        head.push().map_err(|e| pdf_error("building prescription table", e))?;

        let eyes = [
            (
                "OD",
                [
                    &item.od_sphere,
                    &item.od_cylinder,
                    &item.od_axis,
                    &item.od_addition,
                    &item.od_pupillary_distance,
                ],
            ),
            (
                "OS",
                [
                    &item.os_sphere,
                    &item.os_cylinder,
                    &item.os_axis,
                    &item.os_addition,
                    &item.os_pupillary_distance,
                ],
            ),
        ];

        for (eye, values) in eyes {
            let mut row = table.row().element(Paragraph::new(eye).styled(header));
            for value in values {
                row = row.element(
                    Paragraph::new(value.as_str())
                        .aligned(Alignment::Center)
                        .styled(cell),
                );
            }
            row.push().map_err(|e| pdf_error("building prescription table", e))?;
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(125000.0), "$125.000");
        assert_eq!(format_currency(1234567.0), "$1.234.567");
        assert_eq!(format_currency(-15000.0), "-$15.000");
    }

    #[test]
    fn test_missing_fonts_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let renderer = SalePdfRenderer::new(dir.path(), DEFAULT_FONT_FAMILY);
        let err = renderer
            .render(&SaleRecord::default(), "Editar Venta")
            .unwrap_err();
        assert!(matches!(err, LedgerError::PdfError { .. }));
    }
}
