use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field the service assigns on insertion: `store length + 1`.
pub const ID_FIELD: &str = "id";
/// Field the service assigns on insertion: ISO-8601 capture time.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// One captured patient intake.
///
/// The shape is whatever the voice platform sends as function-call
/// arguments (typically `name`, `date_of_birth`, `phone`, `reason`), so the
/// record is an open, insertion-ordered map rather than a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord(Map<String, Value>);

impl PatientRecord {
    pub fn new() -> Self {
        PatientRecord(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn id(&self) -> Option<u64> {
        self.0.get(ID_FIELD).and_then(Value::as_u64)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.0.get(TIMESTAMP_FIELD).and_then(Value::as_str)
    }

    /// Stamps the system fields. Caller-supplied `id`/`timestamp` values are
    /// overwritten in place, keeping their original position in the map.
    pub fn assign(&mut self, id: u64, timestamp: String) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
        self.0.insert(TIMESTAMP_FIELD.to_string(), Value::String(timestamp));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PatientRecord {
    fn from(fields: Map<String, Value>) -> Self {
        PatientRecord(fields)
    }
}

impl From<PatientRecord> for Value {
    fn from(record: PatientRecord) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_assign_overwrites_caller_fields_in_place() {
        let fields = json!({"id": "caller-id", "name": "Jane Roe", "timestamp": "yesterday"});
        let mut record = PatientRecord::from(fields.as_object().unwrap().clone());

        record.assign(7, "2024-01-01T09:00:00.000000-05:00".to_string());

        assert_eq!(record.id(), Some(7));
        assert_eq!(record.timestamp(), Some("2024-01-01T09:00:00.000000-05:00"));
        let keys: Vec<&String> = record.0.keys().collect();
        assert_eq!(keys, vec!["id", "name", "timestamp"]);
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let raw = r#"{"name":"Jane Roe","allergies":["penicillin"],"id":1}"#;
        let record: PatientRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.get("allergies"), Some(&json!(["penicillin"])));
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }
}
