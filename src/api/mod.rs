//! HTTP surface: the webhook receiver plus read-only diagnostic routes.

pub mod rest;

pub use rest::RestApi;
