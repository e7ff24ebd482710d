pub mod agent;
pub mod client;
pub mod prompts;
pub mod types;

pub use agent::*;
pub use client::*;
pub use types::*;
