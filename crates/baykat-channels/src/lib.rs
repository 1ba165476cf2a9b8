//! Channel adapters for baykat
//!
//! This crate adapts transports with their own grammar and length rules onto
//! the orchestrator. Today that is SMS: a small Wolof/French command grammar
//! on the way in, a two-segment length budget on the way out.

pub mod sms;

// Re-export main types
pub use sms::{InboundSms, OutboundSms, ParsedSms, SmsChannel, SmsCommand, truncate_sms};
