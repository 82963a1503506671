//! Visitor pass issuance
//!
//! A pass identifier is `VST-` followed by six characters drawn uniformly
//! from `[0-9A-Z]`. Live passes are reserved in the key-value store with a
//! TTL equal to their validity, so an identifier is never handed out twice
//! while an earlier pass carrying it is still valid.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use common::cache::KeyValueStore;
use common::error::StoreError;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::PassRequest;

pub const VISITOR_ID_PREFIX: &str = "VST-";
pub const VISITOR_ID_LENGTH: usize = 6;
pub const PASS_VALIDITY_HOURS: i64 = 24;
pub const MAX_ISSUE_ATTEMPTS: usize = 5;

const VISITOR_ID_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PASS_KEY_PREFIX: &str = "visitor_pass:";

/// Generate a random visitor identifier such as `VST-7QK2ZD`
pub fn generate_visitor_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut id = String::with_capacity(VISITOR_ID_PREFIX.len() + VISITOR_ID_LENGTH);
    id.push_str(VISITOR_ID_PREFIX);
    for _ in 0..VISITOR_ID_LENGTH {
        let index = rng.gen_range(0..VISITOR_ID_ALPHABET.len());
        id.push(VISITOR_ID_ALPHABET[index] as char);
    }
    id
}

/// One-day pass issued to a campus visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorPass {
    pub visitor_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub visitor: PassRequest,
}

impl VisitorPass {
    pub fn new(visitor_id: String, visitor: PassRequest, issued_at: DateTime<Utc>) -> Self {
        Self {
            visitor_id,
            issued_at,
            expires_at: issued_at + ChronoDuration::hours(PASS_VALIDITY_HOURS),
            visitor,
        }
    }

    pub fn validity_seconds() -> u64 {
        (PASS_VALIDITY_HOURS * 3600) as u64
    }
}

#[derive(Debug, Error)]
pub enum PassError {
    #[error("No free visitor ID after {0} attempts")]
    Exhausted(usize),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode visitor pass: {0}")]
    Encode(#[from] serde_json::Error),
}

fn pass_key(visitor_id: &str) -> String {
    format!("{}{}", PASS_KEY_PREFIX, visitor_id)
}

/// Issues and looks up visitor passes
#[derive(Clone)]
pub struct PassIssuer {
    store: Arc<dyn KeyValueStore>,
    delay: Duration,
}

impl PassIssuer {
    pub fn new(store: Arc<dyn KeyValueStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    /// Issue a pass for `visitor` after the configured delay
    pub async fn issue(&self, visitor: PassRequest) -> Result<VisitorPass, PassError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut rng = StdRng::from_entropy();
        self.issue_with(visitor, &mut rng, Utc::now()).await
    }

    /// Issue a pass using the given randomness and clock reading
    pub async fn issue_with<R: Rng + Send>(
        &self,
        visitor: PassRequest,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<VisitorPass, PassError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let pass = VisitorPass::new(generate_visitor_id(rng), visitor.clone(), now);
            let encoded = serde_json::to_string(&pass)?;

            if self
                .store
                .set_if_absent(
                    &pass_key(&pass.visitor_id),
                    &encoded,
                    VisitorPass::validity_seconds(),
                )
                .await?
            {
                info!(
                    "Issued visitor pass {} expiring at {}",
                    pass.visitor_id, pass.expires_at
                );
                return Ok(pass);
            }

            warn!(
                "Visitor ID {} already in use (attempt {}/{})",
                pass.visitor_id, attempt, MAX_ISSUE_ATTEMPTS
            );
        }

        Err(PassError::Exhausted(MAX_ISSUE_ATTEMPTS))
    }

    /// Find a live pass by its identifier
    pub async fn lookup(&self, visitor_id: &str) -> Result<Option<VisitorPass>, PassError> {
        let Some(encoded) = self.store.get(&pass_key(visitor_id)).await? else {
            return Ok(None);
        };

        let pass = serde_json::from_str(&encoded)
            .map_err(|e| StoreError::Corrupt(format!("visitor pass {}: {}", visitor_id, e)))?;
        Ok(Some(pass))
    }

    /// Number of passes that have not expired yet
    pub async fn active_count(&self) -> Result<u64, PassError> {
        Ok(self.store.count_prefix(PASS_KEY_PREFIX).await?)
    }
}
