use crate::core::SaleRecord;
use crate::domain::model::calendar_day;
use crate::utils::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

pub const DEFAULT_SHEET_NAME: &str = "Tabla";
pub const DEFAULT_XLSX_FILENAME: &str = "tabla.xlsx";
pub const DEFAULT_CSV_FILENAME: &str = "tabla.csv";

/// UTF-8 BOM so spreadsheet apps pick up accented characters.
const BOM: &[u8] = b"\xEF\xBB\xBF";
/// Semicolon separator, as expected by Spanish-locale spreadsheets.
const CSV_SEPARATOR: u8 = b';';

pub const COLUMNS: [&str; 11] = [
    "ID",
    "Vendedor",
    "Nombre",
    "RUT",
    "Teléfono",
    "Precio",
    "Abono",
    "Saldo",
    "Fecha",
    "Observación",
    "Tipo de pago",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => DEFAULT_XLSX_FILENAME,
            ExportFormat::Csv => DEFAULT_CSV_FILENAME,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format '{}', expected xlsx or csv", other)),
        }
    }
}

enum Cell {
    Text(String),
    Number(f64),
}

fn row_cells(record: &SaleRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.id.as_ref().map(|id| id.to_string()).unwrap_or_default()),
        Cell::Text(record.seller_name.clone()),
        Cell::Text(record.customer_name.clone()),
        Cell::Text(record.customer_tax_id.clone()),
        Cell::Text(record.customer_phone.clone()),
        Cell::Number(record.price),
        Cell::Number(record.deposit),
        Cell::Number(record.balance),
        Cell::Text(
            record
                .date
                .map(|d| d.format(calendar_day::FORMAT).to_string())
                .unwrap_or_default(),
        ),
        Cell::Text(record.note.clone()),
        Cell::Text(record.payment_type.clone()),
    ]
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn format_number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "0".to_string()
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Writes the sale table as a workbook or as CSV.
#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    sheet_name: String,
}

impl Default for SpreadsheetExporter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl SpreadsheetExporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn export(&self, records: &[SaleRecord], format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Xlsx => self.to_xlsx(records),
            ExportFormat::Csv => self.to_csv(records),
        }
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape_xml(&self.sheet_name)
        )
    }

    fn sheet_xml(&self, records: &[SaleRecord]) -> String {
        let mut rows = String::new();

        let header: Vec<Cell> = COLUMNS.iter().map(|c| Cell::Text(c.to_string())).collect();
        let body = records.iter().map(row_cells);

        for (row_index, cells) in std::iter::once(header).chain(body).enumerate() {
            let row_number = row_index + 1;
            rows.push_str(&format!(r#"<row r="{}">"#, row_number));
            for (col_index, cell) in cells.into_iter().enumerate() {
                let reference = format!("{}{}", column_letter(col_index), row_number);
                match cell {
                    Cell::Text(text) => rows.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        reference,
                        escape_xml(&text)
                    )),
                    Cell::Number(n) => rows.push_str(&format!(
                        r#"<c r="{}"><v>{}</v></c>"#,
                        reference,
                        format_number(n)
                    )),
                }
            }
            rows.push_str("</row>");
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    /// Office Open XML workbook with a single sheet.
    pub fn to_xlsx(&self, records: &[SaleRecord]) -> Result<Vec<u8>> {
        tracing::debug!("Building workbook with {} rows", records.len());

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>("[Content_Types].xml", FileOptions::default())?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file::<_, ()>("_rels/.rels", FileOptions::default())?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file::<_, ()>("xl/workbook.xml", FileOptions::default())?;
        zip.write_all(self.workbook_xml().as_bytes())?;

        zip.start_file::<_, ()>("xl/_rels/workbook.xml.rels", FileOptions::default())?;
        zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

        zip.start_file::<_, ()>("xl/worksheets/sheet1.xml", FileOptions::default())?;
        zip.write_all(self.sheet_xml(records).as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn to_csv(&self, records: &[SaleRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(CSV_SEPARATOR)
            .from_writer(BOM.to_vec());

        writer.write_record(COLUMNS)?;
        for record in records {
            let fields: Vec<String> = row_cells(record)
                .into_iter()
                .map(|cell| match cell {
                    Cell::Text(text) => text,
                    Cell::Number(n) => format_number(n),
                })
                .collect();
            writer.write_record(&fields)?;
        }

        writer
            .into_inner()
            .map_err(|e| LedgerError::IoError(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SaleId;
    use chrono::NaiveDate;
    use std::io::Read;

    fn records() -> Vec<SaleRecord> {
        vec![
            SaleRecord {
                id: Some(SaleId::new("a1")),
                seller_name: "Ana".to_string(),
                customer_name: "Pedro & Hijos <Ltda>".to_string(),
                price: 100.0,
                deposit: 40.0,
                balance: 60.0,
                date: NaiveDate::from_ymd_opt(2024, 3, 15),
                payment_type: "Débito".to_string(),
                ..Default::default()
            },
            SaleRecord {
                seller_name: "Luis".to_string(),
                note: "pago; parcial".to_string(),
                price: 50.0,
                deposit: 50.0,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(10), "K");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_xlsx_contains_workbook_parts_and_escaped_cells() {
        let bytes = SpreadsheetExporter::default().to_xlsx(&records()).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"[Content_Types].xml".to_string()));
        assert!(names.contains(&"xl/workbook.xml".to_string()));

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(r#"name="Tabla""#));

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains("Teléfono"));
        assert!(sheet.contains("Pedro &amp; Hijos &lt;Ltda&gt;"));
        assert!(sheet.contains(r#"<c r="F2"><v>100</v></c>"#));
        assert!(sheet.contains(r#"<c r="H3"><v>0</v></c>"#));
        assert_eq!(sheet.matches("<row ").count(), 3);
    }

    #[test]
    fn test_csv_uses_semicolons_and_bom() {
        let bytes = SpreadsheetExporter::default().to_csv(&records()).unwrap();
        assert!(bytes.starts_with(BOM));

        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID;Vendedor;Nombre"));
        assert!(lines[1].contains("a1;Ana;Pedro & Hijos <Ltda>"));
        assert!(lines[1].contains("100;40;60;2024-03-15"));
        assert!(lines[2].contains("\"pago; parcial\""));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.default_filename(), "tabla.csv");
    }
}
