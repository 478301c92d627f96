pub mod client;
pub mod ports;

pub use client::HttpBackendClient;
pub use ports::*;
