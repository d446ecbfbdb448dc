//! Pharmacy voice agent
//!
//! Receives webhook callbacks from a voice-AI telephony platform, stores the
//! patient intake collected during the call, and notifies the pharmacy team.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod simulator;
pub mod storage;
pub mod time;
pub mod webhook;

pub use error::{AgentError, Result};
