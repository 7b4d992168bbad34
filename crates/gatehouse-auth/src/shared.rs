//! Process-wide handle to the current [`TokenCodec`].
//!
//! The codec itself is immutable. Reloading the secret builds a new codec and
//! swaps the `Arc` under a short write lock; readers clone the `Arc` and never
//! hold the lock while signing or verifying.

use std::sync::Arc;

use gatehouse_config::JwtConfig;
use parking_lot::RwLock;
use tracing::info;

use crate::jwt::TokenCodec;

#[derive(Debug, Clone)]
pub struct SharedTokenCodec {
    inner: Arc<RwLock<Arc<TokenCodec>>>,
}

impl SharedTokenCodec {
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(codec))),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(TokenCodec::new(config))
    }

    /// Snapshot of the codec in effect right now.
    pub fn current(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.inner.read())
    }

    /// Replaces the codec. Tokens signed under the previous secret no longer
    /// verify once this returns.
    pub fn rotate(&self, config: &JwtConfig) {
        let codec = Arc::new(TokenCodec::new(config));
        *self.inner.write() = codec;
        info!("Token signing secret rotated");
    }
}
