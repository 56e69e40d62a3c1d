//! The `RetrievalProvider` trait abstracts over the knowledge retrieval
//! service's transport (REST in production, a fixture in tests).

use async_trait::async_trait;
use chat_domain::Result;

use crate::types::{RetrievalRequest, RetrievalServiceResponse};

#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    async fn query(&self, req: &RetrievalRequest) -> Result<RetrievalServiceResponse>;
}
