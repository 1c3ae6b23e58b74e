//! Authorization decisions for book and relation operations.
//!
//! Every check goes through [`decide`], which combines the named predicates
//! [`is_owner`] and [`is_staff`]. Handlers call [`authorize`] to turn a
//! denial into the matching [`AppError`].

use crate::entity::{book, user_book_relation};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No authenticated requester.
    Unauthenticated,
    /// Authenticated, but not allowed to act on this resource.
    Forbidden,
}

/// A resource with a single owning user.
pub trait Owned {
    /// Whether staff may act on the resource without owning it.
    const STAFF_OVERRIDE: bool;

    fn owner_id(&self) -> Option<i32>;
}

impl Owned for book::Model {
    const STAFF_OVERRIDE: bool = true;

    fn owner_id(&self) -> Option<i32> {
        self.owner_id
    }
}

impl Owned for user_book_relation::Model {
    const STAFF_OVERRIDE: bool = false;

    fn owner_id(&self) -> Option<i32> {
        Some(self.user_id)
    }
}

pub fn is_owner<R: Owned>(requester: &AuthUser, resource: &R) -> bool {
    resource.owner_id() == Some(requester.user_id)
}

pub fn is_staff(requester: &AuthUser) -> bool {
    requester.is_staff
}

/// `resource` is `None` for actions on the collection (create).
pub fn decide<R: Owned>(
    requester: Option<&AuthUser>,
    resource: Option<&R>,
    action: Action,
) -> Decision {
    if action == Action::Read {
        return Decision::Allow;
    }
    let Some(requester) = requester else {
        return Decision::Unauthenticated;
    };
    match (action, resource) {
        (Action::Create, _) => Decision::Allow,
        (_, None) => Decision::Forbidden,
        (_, Some(resource)) => {
            if is_owner(requester, resource) || (R::STAFF_OVERRIDE && is_staff(requester)) {
                Decision::Allow
            } else {
                Decision::Forbidden
            }
        }
    }
}

pub fn authorize<R: Owned>(
    requester: Option<&AuthUser>,
    resource: Option<&R>,
    action: Action,
) -> Result<(), AppError> {
    match decide(requester, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Unauthenticated => Err(AppError::TokenMissing),
        Decision::Forbidden => {
            tracing::debug!(?action, "Permission denied");
            Err(AppError::PermissionDenied)
        }
    }
}
