//! Identity scope guard.
//!
//! # Responsibility
//! - Resolve the owning user for a call from an explicit identity source.
//! - Make the owner filter a mandatory argument of every store access.
//!
//! # Invariants
//! - `OwnerId` is never empty after trimming.
//! - `OwnerScope` cannot be constructed without a valid `OwnerId`.
//! - No ambient/global "current user" exists; callers thread the scope.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of the user owning a data partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses a raw identity value, rejecting blank input as unauthenticated.
    pub fn parse(raw: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::Unauthenticated);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// External authentication boundary.
///
/// Implementations report the currently signed-in user, if any. Login and
/// session persistence live outside this crate.
pub trait IdentityProvider: Send + Sync {
    fn current_owner(&self) -> Option<OwnerId>;
}

/// Fixed identity, used by embedding callers that already resolved the user.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    owner: Option<OwnerId>,
}

impl StaticIdentity {
    pub fn signed_in(owner: OwnerId) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn signed_out() -> Self {
        Self { owner: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        self.owner.clone()
    }
}

/// Proof that a call runs on behalf of one owner.
///
/// Repositories and the resolver take `&OwnerScope` on every method, so an
/// unscoped read or write does not type-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerScope {
    owner: OwnerId,
}

impl OwnerScope {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// Resolves the scope from an identity provider.
    ///
    /// # Errors
    /// - `CoreError::Unauthenticated` when no owner is active.
    pub fn resolve(identity: &dyn IdentityProvider) -> CoreResult<Self> {
        identity
            .current_owner()
            .map(Self::new)
            .ok_or(CoreError::Unauthenticated)
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns whether a persisted owner value belongs to this scope.
    pub fn owns(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }
}
