//! # PrimDB
//!
//! A small record store: named tables with a fixed column schema, each
//! persisted as a JSON document, queried with equality filters.
//!
//! The catalog (table name to `column:type` list) lives in one document,
//! every table's rows in another, and all values are stored as text. Reads
//! are memoized per (table, filter) and invalidated by writes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use primdb_core::api::{Clause, QueryEngine};
//! use primdb_core::config::DbConfig;
//! use primdb_core::types::Value;
//!
//! let engine = QueryEngine::open(DbConfig::new("my_database"));
//! let catalog = engine.load_catalog().unwrap();
//!
//! // Create a table; `ID:int` is added automatically.
//! let catalog = engine
//!     .create_table(catalog, "users", &["name:str", "age:int"])
//!     .unwrap();
//! engine.save_catalog(&catalog).unwrap();
//!
//! // Insert a row.
//! let id = engine
//!     .insert(&catalog, "users", &[Value::from("Alice"), Value::from(30)])
//!     .unwrap();
//! assert_eq!(id, 0);
//!
//! // Query it back.
//! let rows = engine
//!     .select(&catalog, "users", &Clause::eq("age", 30))
//!     .unwrap();
//! assert_eq!(rows[0].get("name"), Some("Alice"));
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;
