// --- File: crates/bacs_checkout_common/src/http.rs ---
//! Outbound HTTP. Error responses are rendered in `error.rs`.

pub mod client;
