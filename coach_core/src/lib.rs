#![forbid(unsafe_code)]

//! Core domain model and business logic for Pocket Marathon Coach.
//!
//! This crate provides:
//! - Domain types (training parameters, plan, weeks, days, workout logs)
//! - Plan generation (weekly progression and day distribution)
//! - Persistence (key-value backends, plan store)
//! - Display projection, session controller
//! - Calendar and CSV exports

pub mod types;
pub mod error;
pub mod time;
pub mod generator;
pub mod config;
pub mod logging;
pub mod kv;
pub mod store;
pub mod render;
pub mod controller;
pub mod ics;
pub mod log_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use generator::generate_plan;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use store::PlanStore;
pub use render::{PlanView, Surface};
pub use controller::{ActionOutcome, Controller, EditForm, FormSource, LogForm, UserEvent};
pub use ics::{ExportSink, FileSink};
