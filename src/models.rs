use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw observation for one chart group at one date, as handed over by the data collaborator.
///
/// Every key other than `date` is a named metric (`token_usd_amount`, `raw_change_in_usd`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub date: String,
    #[serde(flatten, deserialize_with = "de_fields")]
    pub fields: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

/// Input boundary: group label (pool / protocol) -> that group's records.
pub type ChartInput = BTreeMap<String, Vec<Record>>;

/// Record after normalization: parsed timestamp, ratio fields in percentage points.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedRecord {
    /// Original date text, kept for labels.
    pub date: String,
    pub timestamp: NaiveDateTime,
    pub fields: BTreeMap<String, f64>,
}

impl NormalizedRecord {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.fields.get(key).copied()
    }
}

/// Serde helper: metric fields may come as JSON numbers, numeric strings, or `null`
/// (pandas writes NaN as `null`). `null` and blank strings map to NaN.
/// Any other non-numeric string is a label such as `token` or `pool_type` and is dropped.
fn de_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{MapAccess, Visitor};

    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = BTreeMap<String, f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a map of metric names to numbers")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = BTreeMap::new();
            while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                let v = match value {
                    serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                    serde_json::Value::Null => f64::NAN,
                    serde_json::Value::String(s) if s.trim().is_empty() => f64::NAN,
                    serde_json::Value::String(s) => match s.trim().parse::<f64>() {
                        Ok(v) => v,
                        Err(_) => continue,
                    },
                    _ => continue,
                };
                out.insert(key, v);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}
