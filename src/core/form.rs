//! Editable mirror of a sale record.
//!
//! The form keeps every field as the raw text the user typed. Amounts are only
//! turned into numbers when the balance is recomputed or the record is built,
//! and the balance itself is never set directly.

use crate::core::{compute_balance, LineItem, SaleId, SaleRecord, MAX_LINE_ITEMS};
use crate::domain::model::calendar_day;
use crate::utils::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

pub const NEW_SALE_TITLE: &str = "Nueva Venta";
pub const EDIT_SALE_TITLE: &str = "Editar Venta";

/// Strip everything but ASCII digits. `"$ 1.500"` becomes `"1500"`.
pub fn clean_amount(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    let digits = clean_amount(raw);
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Header fields as typed by the user; also the shape of a sale form file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleFormInput {
    pub seller_name: String,
    pub customer_name: String,
    pub customer_tax_id: String,
    pub customer_phone: String,
    pub price: String,
    pub deposit: String,
    pub date: String,
    pub note: String,
    pub payment_type: String,
    pub line_items: Vec<LineItem>,
}

impl SaleFormInput {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LedgerError::ConfigError {
            message: format!("invalid sale form file: {}", e),
        })
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleForm {
    id: Option<SaleId>,
    input: SaleFormInput,
    /// Amounts loaded from a persisted record, used until the text is replaced.
    stored_price: Option<f64>,
    stored_deposit: Option<f64>,
    balance: Option<f64>,
}

impl Default for SaleForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleForm {
    /// Blank "new sale" form with a single empty prescription row.
    pub fn new() -> Self {
        Self {
            id: None,
            input: SaleFormInput {
                line_items: vec![LineItem::default()],
                ..Default::default()
            },
            stored_price: None,
            stored_deposit: None,
            balance: None,
        }
    }

    pub fn from_input(input: SaleFormInput) -> Self {
        let mut form = Self {
            id: None,
            input,
            stored_price: None,
            stored_deposit: None,
            balance: None,
        };
        if form.input.line_items.is_empty() {
            form.input.line_items.push(LineItem::default());
        }
        form.recompute_balance();
        form
    }

    /// Edit mode: mirror every field of a persisted record.
    pub fn from_record(record: &SaleRecord) -> Self {
        let line_items = if record.line_items.is_empty() {
            vec![LineItem::default()]
        } else {
            record.line_items.clone()
        };

        let mut form = Self {
            id: record.id.clone(),
            input: SaleFormInput {
                seller_name: record.seller_name.clone(),
                customer_name: record.customer_name.clone(),
                customer_tax_id: record.customer_tax_id.clone(),
                customer_phone: record.customer_phone.clone(),
                price: format_amount(record.price),
                deposit: format_amount(record.deposit),
                date: record
                    .date
                    .map(|d| d.format(calendar_day::FORMAT).to_string())
                    .unwrap_or_default(),
                note: record.note.clone(),
                payment_type: record.payment_type.clone(),
                line_items,
            },
            stored_price: Some(record.price),
            stored_deposit: Some(record.deposit),
            balance: None,
        };
        form.recompute_balance();
        form
    }

    /// Overlay the non-empty fields of `input`; a non-empty line-item list replaces the current one.
    pub fn merge_input(&mut self, input: &SaleFormInput) {
        let pairs = [
            (&mut self.input.seller_name, &input.seller_name),
            (&mut self.input.customer_name, &input.customer_name),
            (&mut self.input.customer_tax_id, &input.customer_tax_id),
            (&mut self.input.customer_phone, &input.customer_phone),
            (&mut self.input.price, &input.price),
            (&mut self.input.deposit, &input.deposit),
            (&mut self.input.date, &input.date),
            (&mut self.input.note, &input.note),
            (&mut self.input.payment_type, &input.payment_type),
        ];
        for (target, value) in pairs {
            if !value.trim().is_empty() {
                *target = value.clone();
            }
        }
        if !input.price.trim().is_empty() {
            self.stored_price = None;
        }
        if !input.deposit.trim().is_empty() {
            self.stored_deposit = None;
        }
        if !input.line_items.is_empty() {
            self.input.line_items = input.line_items.clone();
        }
        self.recompute_balance();
    }

    pub fn id(&self) -> Option<&SaleId> {
        self.id.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            EDIT_SALE_TITLE
        } else {
            NEW_SALE_TITLE
        }
    }

    pub fn input(&self) -> &SaleFormInput {
        &self.input
    }

    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn set_seller_name(&mut self, value: impl Into<String>) {
        self.input.seller_name = value.into();
    }

    pub fn set_customer_name(&mut self, value: impl Into<String>) {
        self.input.customer_name = value.into();
    }

    pub fn set_customer_tax_id(&mut self, value: impl Into<String>) {
        self.input.customer_tax_id = value.into();
    }

    pub fn set_customer_phone(&mut self, value: impl Into<String>) {
        self.input.customer_phone = value.into();
    }

    pub fn set_price(&mut self, value: impl Into<String>) {
        self.input.price = value.into();
        self.stored_price = None;
        self.recompute_balance();
    }

    pub fn set_deposit(&mut self, value: impl Into<String>) {
        self.input.deposit = value.into();
        self.stored_deposit = None;
        self.recompute_balance();
    }

    pub fn set_date(&mut self, value: impl Into<String>) {
        self.input.date = value.into();
    }

    pub fn set_note(&mut self, value: impl Into<String>) {
        self.input.note = value.into();
    }

    pub fn set_payment_type(&mut self, value: impl Into<String>) {
        self.input.payment_type = value.into();
    }

    fn price(&self) -> Option<f64> {
        self.stored_price.or_else(|| parse_amount(&self.input.price))
    }

    fn deposit(&self) -> Option<f64> {
        self.stored_deposit.or_else(|| parse_amount(&self.input.deposit))
    }

    fn recompute_balance(&mut self) {
        self.balance = match (self.price(), self.deposit()) {
            (Some(price), Some(deposit)) => Some(compute_balance(price, deposit)),
            _ => None,
        };
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.input.line_items
    }

    pub fn line_item_mut(&mut self, index: usize) -> Option<&mut LineItem> {
        self.input.line_items.get_mut(index)
    }

    /// Append a blank prescription row and return its index.
    pub fn add_line_item(&mut self) -> Result<usize> {
        self.push_line_item(LineItem::default())
    }

    pub fn push_line_item(&mut self, item: LineItem) -> Result<usize> {
        if self.input.line_items.len() >= MAX_LINE_ITEMS {
            return Err(LedgerError::LineItemLimitError {
                max: MAX_LINE_ITEMS,
            });
        }
        self.input.line_items.push(item);
        Ok(self.input.line_items.len() - 1)
    }

    pub fn remove_line_item(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.input.line_items.len() {
            return Err(LedgerError::LineItemError {
                message: format!(
                    "index {} out of range ({} line items)",
                    index,
                    self.input.line_items.len()
                ),
            });
        }
        if self.input.line_items.len() == 1 {
            return Err(LedgerError::LineItemError {
                message: "cannot remove the only line item".to_string(),
            });
        }
        Ok(self.input.line_items.remove(index))
    }

    /// Required-field check. Every offending field is reported at once using its wire name;
    /// line-item fields are prefixed with `tablas[i].`.
    pub fn validate(&self) -> Result<()> {
        let mut invalid = Vec::new();
        let input = &self.input;

        let text_fields = [
            ("vendedor", &input.seller_name),
            ("nombre", &input.customer_name),
            ("rut", &input.customer_tax_id),
            ("telefono", &input.customer_phone),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                invalid.push(name.to_string());
            }
        }

        if self.price().is_none() {
            invalid.push("precio".to_string());
        }
        if self.deposit().is_none() {
            invalid.push("abono".to_string());
        }
        if calendar_day::parse(&input.date).is_none() {
            invalid.push("fecha".to_string());
        }

        for (name, value) in [("observacion", &input.note), ("tipoPago", &input.payment_type)] {
            if value.trim().is_empty() {
                invalid.push(name.to_string());
            }
        }

        if input.line_items.is_empty() || input.line_items.len() > MAX_LINE_ITEMS {
            invalid.push("tablas".to_string());
        }
        for (index, item) in input.line_items.iter().enumerate() {
            for field in item.missing_fields() {
                invalid.push(format!("tablas[{}].{}", index, field));
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::ValidationError { fields: invalid })
        }
    }

    /// Best-effort record of whatever the form currently holds, without validation.
    /// Unparseable amounts count as zero.
    pub fn snapshot(&self) -> SaleRecord {
        let price = self.price().unwrap_or_default();
        let deposit = self.deposit().unwrap_or_default();

        SaleRecord {
            id: self.id.clone(),
            seller_name: self.input.seller_name.trim().to_string(),
            customer_name: self.input.customer_name.trim().to_string(),
            customer_tax_id: self.input.customer_tax_id.trim().to_string(),
            customer_phone: self.input.customer_phone.trim().to_string(),
            price,
            deposit,
            balance: compute_balance(price, deposit),
            date: calendar_day::parse(&self.input.date),
            note: self.input.note.trim().to_string(),
            payment_type: self.input.payment_type.trim().to_string(),
            line_items: self.input.line_items.clone(),
        }
    }

    /// Build the record that gets sent on save. The id is carried only in edit mode.
    pub fn to_record(&self) -> Result<SaleRecord> {
        self.validate()?;
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn complete_item() -> LineItem {
        LineItem {
            od_sphere: "+1.25".to_string(),
            od_cylinder: "-0.50".to_string(),
            od_axis: "90".to_string(),
            od_addition: "+2.00".to_string(),
            od_pupillary_distance: "31".to_string(),
            os_sphere: "+1.00".to_string(),
            os_cylinder: "-0.25".to_string(),
            os_axis: "85".to_string(),
            os_addition: "+2.00".to_string(),
            os_pupillary_distance: "31".to_string(),
        }
    }

    fn filled_form() -> SaleForm {
        let mut form = SaleForm::new();
        form.set_seller_name("Ana");
        form.set_customer_name("Pedro Soto");
        form.set_customer_tax_id("12.345.678-9");
        form.set_customer_phone("+56911112222");
        form.set_price("$ 100");
        form.set_deposit("40");
        form.set_date("2024-03-15");
        form.set_note("Bifocal");
        form.set_payment_type("Efectivo");
        *form.line_item_mut(0).unwrap() = complete_item();
        form
    }

    #[test]
    fn test_clean_amount_strips_non_digits() {
        assert_eq!(clean_amount("$ 1.500"), "1500");
        assert_eq!(clean_amount("abc"), "");
        assert_eq!(parse_amount("CLP 25.990"), Some(25990.0));
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_new_form_has_one_blank_line_item() {
        let form = SaleForm::new();
        assert_eq!(form.line_items().len(), 1);
        assert!(!form.is_editing());
        assert_eq!(form.title(), NEW_SALE_TITLE);
        assert_eq!(form.balance(), None);
    }

    #[test]
    fn test_balance_follows_price_and_deposit() {
        let mut form = SaleForm::new();
        form.set_price("100");
        assert_eq!(form.balance(), None);
        form.set_deposit("40");
        assert_eq!(form.balance(), Some(60.0));
        form.set_deposit("150");
        assert_eq!(form.balance(), Some(-50.0));
        form.set_price("");
        assert_eq!(form.balance(), None);
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let form = SaleForm::new();
        let err = form.validate().unwrap_err();
        match err {
            LedgerError::ValidationError { fields } => {
                assert!(fields.contains(&"vendedor".to_string()));
                assert!(fields.contains(&"precio".to_string()));
                assert!(fields.contains(&"fecha".to_string()));
                assert!(fields.contains(&"tablas[0].odEsferico".to_string()));
                assert!(fields.contains(&"tablas[0].osDp".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_to_record_for_new_sale_has_no_id() {
        let record = filled_form().to_record().unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.price, 100.0);
        assert_eq!(record.deposit, 40.0);
        assert_eq!(record.balance, 60.0);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(record.line_items, vec![complete_item()]);
    }

    #[test]
    fn test_from_record_preserves_id_and_reformats_date() {
        let mut record = filled_form().to_record().unwrap();
        record.id = Some(SaleId::new("a1"));
        record.balance = 999.0;

        let form = SaleForm::from_record(&record);
        assert!(form.is_editing());
        assert_eq!(form.title(), EDIT_SALE_TITLE);
        assert_eq!(form.input().date, "2024-03-15");
        assert_eq!(form.input().price, "100");
        assert_eq!(form.balance(), Some(60.0));

        let saved = form.to_record().unwrap();
        assert_eq!(saved.id, Some(SaleId::new("a1")));
        assert_eq!(saved.balance, 60.0);
    }

    #[test]
    fn test_editing_other_fields_keeps_fractional_amounts() {
        let mut record = filled_form().to_record().unwrap();
        record.id = Some(SaleId::new("a1"));
        record.price = 19990.5;
        record.deposit = 2.5;

        let mut form = SaleForm::from_record(&record);
        assert_eq!(form.input().price, "19990.5");
        form.set_note("Retira el lunes");

        let saved = form.to_record().unwrap();
        assert_eq!(saved.price, 19990.5);
        assert_eq!(saved.deposit, 2.5);
        assert_eq!(saved.balance, 19988.0);

        form.set_price("$ 20.000");
        let repriced = form.to_record().unwrap();
        assert_eq!(repriced.price, 20000.0);
        assert_eq!(repriced.deposit, 2.5);
    }

    #[test]
    fn test_snapshot_trims_note() {
        let mut form = filled_form();
        form.set_note("  Bifocal  ");
        assert_eq!(form.snapshot().note, "Bifocal");
    }

    #[test]
    fn test_from_record_without_line_items_gets_blank_row() {
        let record = SaleRecord {
            id: Some(SaleId::from(4)),
            ..Default::default()
        };
        let form = SaleForm::from_record(&record);
        assert_eq!(form.line_items().len(), 1);
        assert_eq!(form.input().date, "");
    }

    #[test]
    fn test_snapshot_of_incomplete_form() {
        let mut form = SaleForm::new();
        form.set_seller_name("Ana");
        form.set_price("abc");
        form.set_deposit("20");
        let record = form.snapshot();
        assert_eq!(record.seller_name, "Ana");
        assert_eq!(record.price, 0.0);
        assert_eq!(record.balance, -20.0);
        assert!(form.to_record().is_err());
    }

    #[test]
    fn test_merge_input_keeps_untouched_fields() {
        let mut record = filled_form().to_record().unwrap();
        record.id = Some(SaleId::new("a1"));
        let mut form = SaleForm::from_record(&record);

        form.merge_input(&SaleFormInput {
            deposit: "100".to_string(),
            note: "Retira el viernes".to_string(),
            ..Default::default()
        });

        assert_eq!(form.input().seller_name, "Ana");
        assert_eq!(form.input().note, "Retira el viernes");
        assert_eq!(form.balance(), Some(0.0));
        assert_eq!(form.line_items(), &[complete_item()]);
        assert!(form.is_editing());
    }

    #[test]
    fn test_form_file_parsing() {
        let content = r#"
seller_name = "Ana"
customer_name = "Pedro Soto"
price = "$ 89.990"
deposit = "30.000"
date = "2024-05-02"

[[line_items]]
odEsferico = "-1.75"
osEsferico = "-2.00"
"#;
        let input = SaleFormInput::from_toml_str(content).unwrap();
        assert_eq!(input.line_items.len(), 1);
        assert_eq!(input.line_items[0].os_sphere, "-2.00");

        let form = SaleForm::from_input(input);
        assert!(!form.is_editing());
        assert_eq!(form.balance(), Some(59990.0));
        assert!(SaleFormInput::from_toml_str("price = [").is_err());
    }

    #[test]
    fn test_line_item_bounds() {
        let mut form = SaleForm::new();
        assert!(form.remove_line_item(0).is_err());

        for expected in 1..MAX_LINE_ITEMS {
            assert_eq!(form.add_line_item().unwrap(), expected);
        }
        assert!(matches!(
            form.add_line_item(),
            Err(LedgerError::LineItemLimitError { max: MAX_LINE_ITEMS })
        ));

        assert!(form.remove_line_item(MAX_LINE_ITEMS).is_err());
        form.remove_line_item(3).unwrap();
        assert_eq!(form.line_items().len(), MAX_LINE_ITEMS - 1);
    }
}
