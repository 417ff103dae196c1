use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Upper bound of prescription rows a single sale can carry.
pub const MAX_LINE_ITEMS: usize = 10;

/// Backend-assigned identifier. Accepts JSON numbers as well as strings and
/// is written back in the form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaleId {
    text: String,
    number: Option<u64>,
}

impl SaleId {
    /// Textual id, serialized as a JSON string even when it is all digits.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            text: id.into(),
            number: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_numeric(&self) -> bool {
        self.number.is_some()
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for SaleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl From<&str> for SaleId {
    fn from(id: &str) -> Self {
        Self::new(id.trim())
    }
}

impl From<u64> for SaleId {
    fn from(id: u64) -> Self {
        Self {
            text: id.to_string(),
            number: Some(id),
        }
    }
}

impl Serialize for SaleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for SaleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => SaleId::from(n),
            RawId::Text(s) => SaleId::new(s),
        })
    }
}

/// One prescription row ("tabla"): five free-text measurements per eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(rename = "odEsferico")]
    pub od_sphere: String,
    #[serde(rename = "odCilindro")]
    pub od_cylinder: String,
    #[serde(rename = "odEje")]
    pub od_axis: String,
    #[serde(rename = "odAdicion")]
    pub od_addition: String,
    #[serde(rename = "odDp")]
    pub od_pupillary_distance: String,
    #[serde(rename = "osEsferico")]
    pub os_sphere: String,
    #[serde(rename = "osCilindro")]
    pub os_cylinder: String,
    #[serde(rename = "osEje")]
    pub os_axis: String,
    #[serde(rename = "osAdicion")]
    pub os_addition: String,
    #[serde(rename = "osDp")]
    pub os_pupillary_distance: String,
}

impl LineItem {
    /// Wire names paired with values, in display order.
    pub fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("odEsferico", self.od_sphere.as_str()),
            ("odCilindro", self.od_cylinder.as_str()),
            ("odEje", self.od_axis.as_str()),
            ("odAdicion", self.od_addition.as_str()),
            ("odDp", self.od_pupillary_distance.as_str()),
            ("osEsferico", self.os_sphere.as_str()),
            ("osCilindro", self.os_cylinder.as_str()),
            ("osEje", self.os_axis.as_str()),
            ("osAdicion", self.os_addition.as_str()),
            ("osDp", self.os_pupillary_distance.as_str()),
        ]
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A sale ("producto") as exchanged with the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SaleId>,
    #[serde(rename = "vendedor", default)]
    pub seller_name: String,
    #[serde(rename = "nombre", default)]
    pub customer_name: String,
    #[serde(rename = "rut", default)]
    pub customer_tax_id: String,
    #[serde(rename = "telefono", default)]
    pub customer_phone: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "abono", default)]
    pub deposit: f64,
    #[serde(rename = "saldo", default)]
    pub balance: f64,
    #[serde(rename = "fecha", default, with = "calendar_day")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "observacion", default)]
    pub note: String,
    #[serde(rename = "tipoPago", default)]
    pub payment_type: String,
    #[serde(rename = "tablas", default)]
    pub line_items: Vec<LineItem>,
}

impl SaleRecord {
    /// Income contributed to the month-income chart.
    pub fn income(&self) -> f64 {
        self.deposit - self.balance
    }
}

/// Balance is never edited on its own; it always follows price and deposit.
pub fn compute_balance(price: f64, deposit: f64) -> f64 {
    price - deposit
}

/// One bar/slice of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub total: f64,
}

impl ChartSeries {
    pub fn from_points(points: Vec<ChartPoint>) -> Self {
        let total = points.iter().map(|p| p.value).sum();
        Self { points, total }
    }

    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.points.iter().find(|p| p.name == name).map(|p| p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// `fecha` comes back either as `YYYY-MM-DD` or as a full RFC 3339 timestamp.
pub mod calendar_day {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, FORMAT).ok())
    }

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid fecha: {}", s))),
        }
    }
}
