mod client;
mod types;

pub use client::DevOpsClient;
pub use types::*;
