//! Bearer-token identity resolution.

use std::collections::HashMap;

use fieldwarden_core::{Caller, IdentityResolver, PolicyResult};

/// Token-table implementation of [`IdentityResolver`].
///
/// Maps opaque bearer tokens to callers; absent and unknown tokens
/// resolve to nobody. Stands in for a real token verifier at the
/// boundary and in tests.
#[derive(Clone, Default)]
pub struct StaticIdentityResolver {
    tokens: HashMap<String, Caller>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, caller: Caller) -> Self {
        self.tokens.insert(token.into(), caller);
        self
    }
}

impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, token: Option<&str>) -> PolicyResult<Option<Caller>> {
        Ok(token.and_then(|t| self.tokens.get(t).cloned()))
    }
}
