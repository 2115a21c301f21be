//! Session identity for cart operations.

use std::sync::{Arc, RwLock};

use common::PrincipalId;

/// Supplies the principal whose cart is being operated on.
///
/// Returning `None` means nobody is signed in: reads degrade to an empty
/// read-only cart and writes fail with an auth error.
pub trait SessionProvider: Send + Sync {
    fn current_principal(&self) -> Option<PrincipalId>;
}

/// A fixed session, signed in as one principal or anonymous forever.
#[derive(Debug, Clone)]
pub struct StaticSession {
    principal: Option<PrincipalId>,
}

impl StaticSession {
    pub fn signed_in(principal: impl Into<PrincipalId>) -> Self {
        Self {
            principal: Some(principal.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_principal(&self) -> Option<PrincipalId> {
        self.principal.clone()
    }
}

/// A mutable session shared between the caller and the services holding it,
/// so sign-in state can change underneath a live service.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    principal: Arc<RwLock<Option<PrincipalId>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, principal: impl Into<PrincipalId>) {
        *self.principal.write().unwrap() = Some(principal.into());
    }

    pub fn sign_out(&self) {
        *self.principal.write().unwrap() = None;
    }
}

impl SessionProvider for SharedSession {
    fn current_principal(&self) -> Option<PrincipalId> {
        self.principal.read().unwrap().clone()
    }
}

impl<P: SessionProvider + ?Sized> SessionProvider for Arc<P> {
    fn current_principal(&self) -> Option<PrincipalId> {
        (**self).current_principal()
    }
}
