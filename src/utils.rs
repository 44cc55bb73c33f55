//! Utility functions and helpers.

pub mod general;
pub mod preflight;
pub mod settings;

pub use general::*;
pub use preflight::{detect_llm_provider, LlmCredentials};
pub use settings::{get_env_var, get_env_vars, Settings};
