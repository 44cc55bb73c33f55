//! # contract-lens
//!
//! Rule-based contract analysis for small and medium enterprises.
//!
//! ## Features
//!
//! - Clause segmentation and rule-based clause risk scoring
//! - Contract-level risk aggregation and ambiguity detection
//! - Contract type classification and compliance checking
//! - Templates, knowledge base, reports, audit log and batch processing
//!
//! ## Quick Start
//!
//! ```rust
//! use contract_lens::analysis::{aggregate_risk, RiskTier};
//!
//! assert_eq!(aggregate_risk(&[RiskTier::Medium, RiskTier::Low]), RiskTier::Medium);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod audit;
pub mod batch;
pub mod cli;
pub mod config;
pub mod data;
pub mod drafting;
pub mod knowledge;
pub mod llm;
pub mod utils;

pub use crate::analysis::{ContractAnalysis, ContractAnalyzer};
pub use crate::cli::Cli;
pub use crate::config::AnalysisConfig;

/// The current version of contract-lens.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
