//! Synthetic voice-platform webhooks for smoke-testing a running service.
//!
//! Builds the payloads the platform sends during a call and posts them,
//! printing request and response. Nothing is asserted.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::Result;
use crate::time;
use crate::webhook::{EVENT_CALL_ENDED, EVENT_CALL_STARTED, FUNCTION_SAVE_DATA};

pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5001/webhook";
pub const TEST_CALL_ID: &str = "test-call-123";

const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SamplePatient {
    pub name: String,
    pub date_of_birth: String,
    pub phone: String,
    pub reason: String,
}

impl Default for SamplePatient {
    fn default() -> Self {
        SamplePatient {
            name: "John Doe".to_string(),
            date_of_birth: "01/15/1980".to_string(),
            phone: "555-123-4567".to_string(),
            reason: "Prescription refill".to_string(),
        }
    }
}

impl SamplePatient {
    /// Replace whichever fields were given, keep the sample value otherwise.
    pub fn with_overrides(
        mut self,
        name: Option<String>,
        date_of_birth: Option<String>,
        phone: Option<String>,
        reason: Option<String>,
    ) -> Self {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(date_of_birth) = date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(reason) = reason {
            self.reason = reason;
        }
        self
    }

    pub fn to_arguments(&self) -> Value {
        json!({
            "name": self.name,
            "date_of_birth": self.date_of_birth,
            "phone": self.phone,
            "reason": self.reason,
        })
    }
}

pub fn call_started_payload(call_id: &str) -> Value {
    json!({
        "event": EVENT_CALL_STARTED,
        "call_id": call_id,
        "timestamp": time::now_iso8601(),
    })
}

pub fn call_ended_payload(call_id: &str) -> Value {
    json!({
        "event": EVENT_CALL_ENDED,
        "call_id": call_id,
        "duration": 120,
        "timestamp": time::now_iso8601(),
    })
}

pub fn save_data_payload(call_id: &str, patient: &SamplePatient) -> Value {
    json!({
        "function_call": {
            "name": FUNCTION_SAVE_DATA,
            "arguments": patient.to_arguments(),
        },
        "call_id": call_id,
        "timestamp": time::now_iso8601(),
    })
}

pub fn load_payload(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedResponse {
    pub status: u16,
    pub body: String,
}

pub struct Simulator {
    client: reqwest::Client,
    url: String,
    data_file: PathBuf,
}

impl Simulator {
    /// `data_file` is the service's store, read back after a save when the
    /// service runs from the same directory.
    pub fn new(url: impl Into<String>, data_file: impl Into<PathBuf>) -> Self {
        Simulator {
            client: reqwest::Client::new(),
            url: url.into(),
            data_file: data_file.into(),
        }
    }

    pub async fn send(&self, payload: &Value) -> Result<SimulatedResponse> {
        println!("Payload: {}", serde_json::to_string_pretty(payload)?);

        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        println!("Response status: {}", status);
        println!("Response body: {}", body);

        Ok(SimulatedResponse { status, body })
    }

    pub async fn call_started(&self) -> Result<SimulatedResponse> {
        println!("Simulating call_started event...");
        self.send(&call_started_payload(TEST_CALL_ID)).await
    }

    pub async fn call_ended(&self) -> Result<SimulatedResponse> {
        println!("Simulating call_ended event...");
        self.send(&call_ended_payload(TEST_CALL_ID)).await
    }

    pub async fn save_data(&self, patient: &SamplePatient) -> Result<SimulatedResponse> {
        println!("Simulating save_data function call...");
        let response = self.send(&save_data_payload(TEST_CALL_ID, patient)).await?;
        self.print_store();
        Ok(response)
    }

    pub async fn custom(&self, payload_file: &Path) -> Result<SimulatedResponse> {
        let payload = load_payload(payload_file)?;
        println!("Simulating custom webhook payload from {}...", payload_file.display());
        self.send(&payload).await
    }

    /// started -> save_data -> ended
    pub async fn full_flow(&self) -> Result<()> {
        println!("Simulating full call flow...\n");
        let separator = "-".repeat(SEPARATOR_WIDTH);

        self.call_started().await?;
        println!("\n{}\n", separator);
        self.save_data(&SamplePatient::default()).await?;
        println!("\n{}\n", separator);
        self.call_ended().await?;

        println!("\nFull call flow simulation completed!");
        Ok(())
    }

    fn print_store(&self) {
        if !self.data_file.exists() {
            println!("\nWarning: {} file not found", self.data_file.display());
            return;
        }

        match load_payload(&self.data_file) {
            Ok(document) => {
                println!("\nData saved to {}:", self.data_file.display());
                match serde_json::to_string_pretty(&document) {
                    Ok(pretty) => println!("{}", pretty),
                    Err(e) => println!("{}", e),
                }
            }
            Err(e) => println!("\nError reading {}: {}", self.data_file.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::WebhookPayload;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overrides_only_replace_given_fields() {
        let patient = SamplePatient::default().with_overrides(
            Some("Jane Roe".to_string()),
            None,
            Some("555-0100".to_string()),
            None,
        );

        assert_eq!(patient.name, "Jane Roe");
        assert_eq!(patient.date_of_birth, "01/15/1980");
        assert_eq!(patient.phone, "555-0100");
        assert_eq!(patient.reason, "Prescription refill");
    }

    #[test]
    fn test_payloads_classify_as_the_service_expects() {
        assert_eq!(
            WebhookPayload::from_value(call_started_payload(TEST_CALL_ID)).unwrap(),
            WebhookPayload::CallStarted
        );
        assert_eq!(
            WebhookPayload::from_value(call_ended_payload(TEST_CALL_ID)).unwrap(),
            WebhookPayload::CallEnded
        );

        let payload = save_data_payload(TEST_CALL_ID, &SamplePatient::default());
        match WebhookPayload::from_value(payload).unwrap() {
            WebhookPayload::SaveData(record) => {
                assert_eq!(record.get("name"), Some(&json!("John Doe")));
                assert_eq!(record.get("reason"), Some(&json!("Prescription refill")));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_load_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"event": "call_analyzed"}"#).unwrap();

        assert_eq!(load_payload(&path).unwrap(), json!({"event": "call_analyzed"}));
        assert!(load_payload(&dir.path().join("missing.json")).is_err());
    }
}
