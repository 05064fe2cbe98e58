mod client;

pub use client::{BackendClient, BackendClientBuilder};
