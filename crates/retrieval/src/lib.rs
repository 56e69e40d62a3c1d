//! `chat-retrieval` — the Retrieval Cache & Client (spec §4.3).
//!
//! [`RetrievalClient`] wraps a content-addressed [`RetrievalCache`] around
//! a [`RetrievalProvider`] (production: [`RestRetrievalClient`]).

pub mod cache;
pub mod client;
pub mod provider;
pub mod rest;
pub mod types;

pub use cache::{fingerprint, InMemoryRetrievalCache, RetrievalCache};
pub use client::RetrievalClient;
pub use provider::RetrievalProvider;
pub use rest::RestRetrievalClient;
pub use types::{RetrievalParams, RetrievalRequest, RetrievalResult, RetrievalServiceResponse};
