//! # Finance Agent
//!
//! A thin orchestration layer that lets a conversational language model
//! answer finance questions by querying a spreadsheet-backed P&L model.
//!
//! ## Core Concepts
//!
//! - **Cell Grid**: raw, possibly ragged rows of string cells fetched from
//!   the spreadsheet service
//! - **Normalized Table**: rectangular table with deduplicated column names
//!   and all-or-nothing numeric coercion per column
//! - **Hierarchy Rollup**: macro → micro → sub-area totals recomputed from
//!   the leaf rows, cross-checked against the sheet's own NET INCOME row
//! - **Dispatcher**: a bounded completion/tool-call loop exposing the
//!   spreadsheet as tools to the model
//!
//! The normalizer and aggregator are pure, synchronous functions with no
//! I/O; the surrounding clients (sheets, chat, HTTP facade) are the only
//! async pieces.
//!
//! ## Example
//!
//! ```rust
//! use finance_agent::{hierarchy, table};
//!
//! let grid = vec![
//!     vec!["Label".to_string(), "Dec/24".to_string()],
//!     vec!["Revenue".to_string(), String::new()],
//!     vec!["SALES".to_string(), String::new()],
//!     vec!["Product A".to_string(), "100".to_string()],
//! ];
//!
//! let normalized = table::normalize(&grid);
//! let report = hierarchy::aggregate(&normalized);
//! assert_eq!(report.checks[0].computed, 100.0);
//! ```

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod llm;
pub mod sheets;
pub mod table;

pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use hierarchy::{
    aggregate, aggregate_with_tolerance, HierarchyReport, MacroKind, MacroLine, MicroLine,
    PeriodCheck, SubArea, DEFAULT_TOLERANCE,
};
pub use llm::FinanceAgent;
pub use sheets::{
    ServiceCredentials, SheetsAppendParams, SheetsAppendReturn, SheetsClient, SheetsQueryParams,
    SheetsQueryReturn,
};
pub use table::{normalize, CellGrid, CellValue, NormalizedTable};
