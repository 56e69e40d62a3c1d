//! Retrieval Client: cache-then-service lookup plus context-block
//! formatting (spec §4.3).

use std::sync::Arc;
use std::time::Duration;

use chat_domain::config::{CacheConfig, RetrievalConfig};
use chat_domain::{Error, Result};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::cache::{fingerprint, RetrievalCache};
use crate::provider::RetrievalProvider;
use crate::types::{RetrievalParams, RetrievalRequest, RetrievalResult, RetrievedEntity, RetrievedRelationship, RetrievedChunk};

/// How long a call waits for a concurrency slot before failing with a
/// retriable timeout (spec §4.3 "Back-pressure").
const CONCURRENCY_WAIT: Duration = Duration::from_secs(5);

pub struct RetrievalClient {
    provider: Arc<dyn RetrievalProvider>,
    cache: Arc<dyn RetrievalCache>,
    cache_ttl_seconds: u64,
    semaphore: Arc<Semaphore>,
}

impl RetrievalClient {
    pub fn new(
        provider: Arc<dyn RetrievalProvider>,
        cache: Arc<dyn RetrievalCache>,
        retrieval_cfg: &RetrievalConfig,
        cache_cfg: &CacheConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            cache_ttl_seconds: cache_cfg.ttl_seconds,
            semaphore: Arc::new(Semaphore::new(retrieval_cfg.max_concurrency)),
        }
    }

    /// `retrieve(utterance, kb) -> RetrievalResult` (spec §4.3).
    pub async fn retrieve(&self, utterance: &str, knowledge_base: &str) -> Result<RetrievalResult> {
        let fp = fingerprint(utterance, knowledge_base);

        if let Some(payload) = self.cache.get(&fp) {
            let (context, references) = split_cached(&payload);
            return Ok(RetrievalResult {
                context,
                references,
                cache_hit: true,
            });
        }

        let _permit = timeout(CONCURRENCY_WAIT, self.semaphore.acquire())
            .await
            .map_err(|_| Error::Timeout("retrieval: concurrency limit wait".into()))?
            .map_err(|_| Error::Retrieval("retrieval semaphore closed".into()))?;

        let req = RetrievalRequest {
            knowledge_base: knowledge_base.to_owned(),
            query: utterance.to_owned(),
            params: RetrievalParams::default(),
        };

        let resp = self.provider.query(&req).await?;

        let context = if resp.has_canonical_response() {
            resp.response.clone().unwrap_or_default()
        } else {
            stitch(&resp.entities, &resp.relationships, &resp.chunks)
        };

        let payload = join_cached(&context, &resp.references);
        self.cache.put(&fp, payload, self.cache_ttl_seconds);

        Ok(RetrievalResult {
            context,
            references: resp.references,
            cache_hit: false,
        })
    }

    /// Forwards to the underlying cache's periodic expiry sweep, for a
    /// background maintenance task to call on an interval.
    pub fn sweep_cache_expired(&self) -> usize {
        self.cache.sweep_expired()
    }
}

/// Stitches entities, then relationships, then chunks into one context
/// block, in that order (spec §4.3: "entities are scanned before chunks
/// when later instructions reference them").
fn stitch(
    entities: &[RetrievedEntity],
    relationships: &[RetrievedRelationship],
    chunks: &[RetrievedChunk],
) -> String {
    let mut out = String::new();

    if !entities.is_empty() {
        out.push_str("## Entities\n");
        for e in entities {
            match &e.description {
                Some(d) => out.push_str(&format!("- {}: {d}\n", e.name)),
                None => out.push_str(&format!("- {}\n", e.name)),
            }
        }
        out.push('\n');
    }

    if !relationships.is_empty() {
        out.push_str("## Relationships\n");
        for r in relationships {
            match &r.description {
                Some(d) => out.push_str(&format!("- {} -> {}: {d}\n", r.source, r.target)),
                None => out.push_str(&format!("- {} -> {}\n", r.source, r.target)),
            }
        }
        out.push('\n');
    }

    if !chunks.is_empty() {
        out.push_str("## Chunks\n");
        for c in chunks {
            match &c.source {
                Some(s) => out.push_str(&format!("- [{s}] {}\n", c.content)),
                None => out.push_str(&format!("- {}\n", c.content)),
            }
        }
    }

    out.trim_end().to_owned()
}

const REF_SEP: &str = "\u{0}__REFS__\u{0}";

fn join_cached(context: &str, references: &[String]) -> String {
    format!("{context}{REF_SEP}{}", references.join("\u{1}"))
}

fn split_cached(payload: &str) -> (String, Vec<String>) {
    match payload.split_once(REF_SEP) {
        Some((context, refs)) => {
            let references = if refs.is_empty() {
                Vec::new()
            } else {
                refs.split('\u{1}').map(str::to_owned).collect()
            };
            (context.to_owned(), references)
        }
        None => (payload.to_owned(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryRetrievalCache;
    use crate::types::RetrievalServiceResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixtureProvider {
        response: RetrievalServiceResponse,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RetrievalProvider for FixtureProvider {
        async fn query(&self, _req: &RetrievalRequest) -> Result<RetrievalServiceResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn client(provider: FixtureProvider) -> (Arc<FixtureProvider>, RetrievalClient) {
        let provider = Arc::new(provider);
        let cache = Arc::new(InMemoryRetrievalCache::new(100));
        let retrieval_cfg = RetrievalConfig::default();
        let cache_cfg = CacheConfig::default();
        let client = RetrievalClient::new(provider.clone(), cache, &retrieval_cfg, &cache_cfg);
        (provider, client)
    }

    #[tokio::test]
    async fn canonical_response_is_used_verbatim() {
        let (_p, c) = client(FixtureProvider {
            response: RetrievalServiceResponse {
                response: Some("The loan policy requires two guarantors.".into()),
                ..Default::default()
            },
            calls: AtomicUsize::new(0),
        });
        let result = c.retrieve("what is the loan policy", "policy").await.unwrap();
        assert_eq!(result.context, "The loan policy requires two guarantors.");
        assert!(!result.cache_hit);
    }

    #[tokio::test]
    async fn template_response_falls_back_to_stitching() {
        let (_p, c) = client(FixtureProvider {
            response: RetrievalServiceResponse {
                response: Some("no relevant information found".into()),
                entities: vec![RetrievedEntity {
                    name: "EBL".into(),
                    description: Some("the bank".into()),
                }],
                ..Default::default()
            },
            calls: AtomicUsize::new(0),
        });
        let result = c.retrieve("who is ebl", "general").await.unwrap();
        assert!(result.context.contains("## Entities"));
        assert!(result.context.contains("EBL: the bank"));
    }

    #[tokio::test]
    async fn second_call_is_a_cache_hit_and_skips_the_service() {
        let (provider, c) = client(FixtureProvider {
            response: RetrievalServiceResponse {
                response: Some("cached answer".into()),
                ..Default::default()
            },
            calls: AtomicUsize::new(0),
        });
        let first = c.retrieve("Loan Policy?", "policy").await.unwrap();
        let second = c.retrieve("  loan   policy?", "policy").await.unwrap();
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.context, second.context);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
