//! Voice-platform webhook handling.
//!
//! Inbound payloads are heterogeneous JSON objects. They are classified with a
//! first-match-wins order:
//!
//! 1. `event` of `call_started` / `call_ended`
//! 2. `function_call` named `save_data`
//! 3. anything else is acknowledged and ignored
//!
//! Only the presence of `event` is checked in step 1, so a payload carrying
//! both `event: call_started` and a `save_data` function call is treated as a
//! call-start and nothing is saved. Any other `event` value falls through to
//! step 2.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::notify::Notifier;
use crate::storage::{PatientRecord, PatientStore};

pub const EVENT_CALL_STARTED: &str = "call_started";
pub const EVENT_CALL_ENDED: &str = "call_ended";
pub const FUNCTION_SAVE_DATA: &str = "save_data";

pub const SAVE_SUCCESS_MESSAGE: &str = "Pharmacy patient data saved successfully";

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    CallStarted,
    CallEnded,
    /// `save_data` function call; arguments become the new record.
    SaveData(PatientRecord),
    /// Valid JSON object the service does not act on.
    Unhandled,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            Value::Null => return Err(AgentError::invalid_payload("request body is null")),
            other => {
                return Err(AgentError::invalid_payload(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        match object.get("event").and_then(Value::as_str) {
            Some(EVENT_CALL_STARTED) => return Ok(WebhookPayload::CallStarted),
            Some(EVENT_CALL_ENDED) => return Ok(WebhookPayload::CallEnded),
            _ => {}
        }

        let Some(function_call) = object.remove("function_call") else {
            return Ok(WebhookPayload::Unhandled);
        };
        let mut function_call = match function_call {
            Value::Object(call) => call,
            other => {
                return Err(AgentError::invalid_payload(format!(
                    "function_call must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        if function_call.get("name").and_then(Value::as_str) != Some(FUNCTION_SAVE_DATA) {
            return Ok(WebhookPayload::Unhandled);
        }

        let arguments = match function_call.remove("arguments") {
            None => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(other) => {
                return Err(AgentError::invalid_payload(format!(
                    "save_data arguments must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(WebhookPayload::SaveData(PatientRecord::from(arguments)))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Success bodies for `POST /webhook`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookReply {
    Status { status: &'static str },
    Saved { success: bool, message: &'static str },
}

impl WebhookReply {
    pub fn status(status: &'static str) -> Self {
        WebhookReply::Status { status }
    }

    pub fn saved() -> Self {
        WebhookReply::Saved {
            success: true,
            message: SAVE_SUCCESS_MESSAGE,
        }
    }
}

/// Applies the side effects of a classified payload.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<PatientStore>,
    notifier: Arc<Notifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<PatientStore>, notifier: Arc<Notifier>) -> Self {
        Dispatcher { store, notifier }
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn handle(&self, payload: WebhookPayload) -> Result<WebhookReply> {
        match payload {
            WebhookPayload::CallStarted => {
                info!("Pharmacy call started");
                Ok(WebhookReply::status(EVENT_CALL_STARTED))
            }
            WebhookPayload::CallEnded => {
                info!("Pharmacy call ended");
                Ok(WebhookReply::status(EVENT_CALL_ENDED))
            }
            WebhookPayload::SaveData(record) => {
                let saved = self.store.append(record)?;
                self.notifier.notify(&saved)?;
                Ok(WebhookReply::saved())
            }
            WebhookPayload::Unhandled => {
                debug!("Webhook acknowledged without action");
                Ok(WebhookReply::status("received"))
            }
        }
    }

    /// Parse and handle a raw request body.
    pub fn handle_body(&self, body: &[u8]) -> Result<WebhookReply> {
        let payload = WebhookPayload::parse(body)?;
        debug!(payload = ?payload, "Classified webhook");
        self.handle(payload)
    }
}
