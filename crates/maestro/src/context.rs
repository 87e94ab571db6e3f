//! Request-scoped access to the grant manager.
//!
//! The session layer is consulted once per request; the resolved user is
//! then carried explicitly instead of being looked up by each operation.

use maestro_core::{GrantKey, User, UserId};
use maestro_grants::ProfileResolver;
use maestro_store::{AttributeStore, UserDirectory};

use crate::error::Result;
use crate::manager::Maestro;

/// The current user of a request, resolved once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestContext {
    current: Option<User>,
}

impl RequestContext {
    /// Create a context for an already resolved user.
    pub fn new(current: Option<User>) -> Self {
        Self { current }
    }

    /// A context with no logged-in user.
    pub fn anonymous() -> Self {
        Self { current: None }
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// The id of the logged-in user, or [`UserId::ANONYMOUS`].
    pub fn current_id(&self) -> UserId {
        self.current.as_ref().map_or(UserId::ANONYMOUS, |u| u.id)
    }

    /// The user an operation targets: the explicit id if given, otherwise
    /// the current user.
    pub fn target(&self, explicit: Option<UserId>) -> UserId {
        explicit.unwrap_or_else(|| self.current_id())
    }
}

/// Grant manager operations bound to one request.
pub struct RequestScope<'a, S, R> {
    maestro: &'a Maestro<S, R>,
    context: RequestContext,
}

impl<'a, S, R> RequestScope<'a, S, R>
where
    S: AttributeStore + UserDirectory,
    R: ProfileResolver,
{
    pub(crate) fn new(maestro: &'a Maestro<S, R>, context: RequestContext) -> Self {
        Self { maestro, context }
    }

    /// The resolved request context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Get the key of `user`, defaulting to the current user.
    pub async fn get_key(&self, user: Option<UserId>) -> Result<Option<GrantKey>> {
        self.maestro.get_key(self.context.target(user)).await
    }

    /// Check whether `user` holds a grant, defaulting to the current user.
    pub async fn is_granted(&self, user: Option<UserId>) -> Result<bool> {
        self.maestro.is_granted(self.context.target(user)).await
    }
}
