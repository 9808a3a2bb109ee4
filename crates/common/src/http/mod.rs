//! HTTP transport shared by credential handles and resource clients

mod client;

pub use client::{redact_url, HttpClient, HttpClientBuilder, HttpError};
