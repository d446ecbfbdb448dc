//! Back-office notifications for newly captured patients.
//!
//! Two sinks per saved record: a banner on stdout for whoever is watching the
//! service, and a block appended to a plain-text log that `GET /notifications`
//! returns verbatim. Neither sink swallows I/O failures.

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::storage::PatientRecord;
use crate::time;

pub const MISSING_FIELD: &str = "N/A";

const BANNER_WIDTH: usize = 50;

/// Record fields shown to the pharmacy team, in display order.
const DISPLAY_FIELDS: [(&str, &str); 4] = [
    ("Name", "name"),
    ("DOB", "date_of_birth"),
    ("Phone", "phone"),
    ("Reason", "reason"),
];

#[derive(Debug)]
pub struct Notifier {
    log_path: PathBuf,
    append_lock: Mutex<()>,
}

impl Notifier {
    pub fn new(log_path: impl AsRef<Path>) -> Self {
        Notifier {
            log_path: log_path.as_ref().to_path_buf(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Print the console banner and append the log block for `record`.
    pub fn notify(&self, record: &PatientRecord) -> Result<()> {
        let now = Local::now();
        println!("{}", console_block(record, &now));
        self.append(record, &now)
    }

    fn append(&self, record: &PatientRecord, now: &DateTime<Local>) -> Result<()> {
        let block = log_block(record, now);
        let _guard = self.append_lock.lock().map_err(|_| AgentError::LockPoisoned)?;

        if let Some(parent) = self.log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(block.as_bytes())?;

        debug!(path = %self.log_path.display(), "Appended notification");
        Ok(())
    }

    /// Full log contents, or `None` if nothing has been logged yet.
    pub fn read_log(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.log_path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Renders a record field for humans. Strings print bare, other JSON values
/// print as JSON, absent or null fields print as `N/A`.
pub fn display_field(record: &PatientRecord, field: &str) -> String {
    match record.get(field) {
        // explicit null reads the same as an absent field
        None | Some(Value::Null) => MISSING_FIELD.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn console_block<Tz: TimeZone>(record: &PatientRecord, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let rule = "=".repeat(BANNER_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "NEW PHARMACY PATIENT CALL RECEIVED!".to_string(),
        rule.clone(),
    ];
    for (label, field) in DISPLAY_FIELDS {
        lines.push(format!("{}: {}", label, display_field(record, field)));
    }
    lines.push(format!("Time: {}", time::clock_time(now)));
    lines.push(rule);
    lines.join("\n")
}

pub fn log_block<Tz: TimeZone>(record: &PatientRecord, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let mut block = format!("\n[{}] NEW PHARMACY PATIENT CALL\n", time::iso8601(now));
    for (label, field) in DISPLAY_FIELDS {
        block.push_str(&format!("{}: {}\n", label, display_field(record, field)));
    }
    block.push_str(&format!("Timestamp: {}\n", time::clock_time(now)));
    block.push_str(&"-".repeat(BANNER_WIDTH));
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn jane() -> PatientRecord {
        serde_json::from_value(json!({"name": "Jane Roe", "phone": "555-0100", "age": 41})).unwrap()
    }

    #[test]
    fn test_missing_and_non_string_fields() {
        let mut record = jane();
        record.insert("reason", Value::Null);

        assert_eq!(display_field(&record, "name"), "Jane Roe");
        assert_eq!(display_field(&record, "age"), "41");
        assert_eq!(display_field(&record, "date_of_birth"), "N/A");
        assert_eq!(display_field(&record, "reason"), "N/A");
    }

    #[test]
    fn test_log_block_layout() {
        let tz = FixedOffset::west_opt(4 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 5, 2, 14, 5, 0).unwrap();
        let block = log_block(&jane(), &at);

        let expected = format!(
            "\n[2024-05-02T14:05:00.000000-04:00] NEW PHARMACY PATIENT CALL\nName: Jane Roe\nDOB: N/A\nPhone: 555-0100\nReason: N/A\nTimestamp: 02:05 PM\n{}\n",
            "-".repeat(50)
        );
        assert_eq!(block, expected);
    }

    #[test]
    fn test_console_block_has_banner_and_clock() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 3, 31, 9, 41, 0).unwrap();
        let block = console_block(&jane(), &at);

        assert!(block.contains(&"=".repeat(50)));
        assert!(block.contains("NEW PHARMACY PATIENT CALL RECEIVED!"));
        assert!(block.contains("DOB: N/A"));
        assert!(block.contains("Time: 09:41 AM"));
    }

    #[test]
    fn test_log_appends_and_never_truncates() {
        let dir = tempdir().unwrap();
        let notifier = Notifier::new(dir.path().join("notifications.txt"));
        assert_eq!(notifier.read_log().unwrap(), None);

        notifier.notify(&jane()).unwrap();
        let mut john = PatientRecord::new();
        john.insert("name", "John Doe");
        notifier.notify(&john).unwrap();

        let log = notifier.read_log().unwrap().unwrap();
        assert_eq!(log.matches("NEW PHARMACY PATIENT CALL").count(), 2);
        let jane_at = log.find("Name: Jane Roe").unwrap();
        let john_at = log.find("Name: John Doe").unwrap();
        assert!(jane_at < john_at);
    }
}
