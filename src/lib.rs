#![allow(clippy::doc_markdown)] // Allow technical terms like WooCommerce, sendmail in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Shop Health Monitor
//!
//! Watchdog that keeps an e-commerce storefront from silently showing an
//! empty catalog.
//!
//! ## Overview
//!
//! On a fixed cadence the monitor probes the catalog, classifies the shop as
//! healthy or empty, and compares that with the last persisted state. A
//! stale cache (products exist, listing shows none) and a genuine outage take
//! different paths. Both trigger a best-effort purge of every active cache
//! layer and an alert by email and webhook. Recovery is detected either by an
//! immediate re-probe after the purge or on a later cycle.
//!
//! ## Key Features
//!
//! - **Desync detection**: cache staleness is never reported as an outage
//! - **Layered remediation**: every active cache backend is purged, with an
//!   always-available fallback
//! - **Best-effort alerting**: email and webhook are independent and
//!   time-bounded
//! - **Bounded incident history**: newest-first, capped at 20 entries
//! - **Heartbeat**: webhook-only alert when checks stop happening
//!
//! ## Module Organization
//!
//! - [`engine`] - Reconciliation cycle, stall detection, dashboard view
//! - [`state_machine`] - Health states, transitions, and classification
//! - [`probe`] - Catalog emptiness probe
//! - [`remediation`] - Cache backends and the flush dispatcher
//! - [`alerts`] - Alert catalogue and notification transports
//! - [`store`] - Persisted key/value state
//! - [`incident_log`] - Bounded incident history
//! - [`scheduler`] - Timer-driven cycles, recovery checks, heartbeats
//! - [`web`] - Admin HTTP surface
//! - [`config`] - YAML configuration with environment overrides
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shop_health_monitor::config::ConfigManager;
//! use shop_health_monitor::engine::EngineBuilder;
//! use shop_health_monitor::store::JsonFileStateStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! let store = Arc::new(JsonFileStateStore::new(&config.storage.state_file));
//!
//! let engine = EngineBuilder::from_config(config, store, reqwest::Client::new())?.build();
//! let report = engine.reconcile().await?;
//! println!("cycle finished in state {}", report.state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod alerts;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod incident_log;
pub mod logging;
pub mod models;
pub mod probe;
pub mod remediation;
pub mod scheduler;
pub mod state_machine;
pub mod store;
pub mod web;

pub use config::{ConfigManager, MonitorConfig, Settings};
pub use engine::{CycleReport, DashboardSnapshot, EngineBuilder, ReconciliationEngine};
pub use error::{MonitorError, Result};
pub use models::{CheckResult, IncidentKind, IncidentRecord, RemediationOutcome};
pub use scheduler::{MonitorScheduler, SchedulerConfig};
pub use state_machine::{HealthState, Transition};
