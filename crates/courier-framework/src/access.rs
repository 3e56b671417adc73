//! Per-user access control.
//!
//! An [`AccessControl`] holds an optional whitelist and a set of admins. It is
//! built during setup, moved into the dispatcher and never changed again.

use std::collections::HashSet;

use courier_core::UserId;

use crate::error::AuthorizationError;

/// Authorization decisions over a user identifier.
///
/// Admin membership does not imply authorization: with a whitelist configured,
/// an admin that is not whitelisted is still rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControl {
    whitelist: Option<HashSet<UserId>>,
    admins: HashSet<UserId>,
}

impl AccessControl {
    /// Open access, no admins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias of [`AccessControl::new`].
    pub fn open() -> Self {
        Self::default()
    }

    /// Restricts access to the given users.
    pub fn with_whitelist<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        self.whitelist = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the admin users.
    pub fn with_admins<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        self.admins = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if a whitelist is configured.
    pub fn is_restricted(&self) -> bool {
        self.whitelist.is_some()
    }

    pub fn is_authorized(&self, user: UserId) -> bool {
        match &self.whitelist {
            Some(whitelist) => whitelist.contains(&user),
            None => true,
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    /// Fails with [`AuthorizationError`] if the user is not authorized.
    pub fn authorize(&self, user: UserId) -> Result<(), AuthorizationError> {
        if self.is_authorized(user) {
            Ok(())
        } else {
            Err(AuthorizationError { user })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_no_whitelist_is_open() {
        let auth = AccessControl::new();
        assert!(!auth.is_restricted());
        for id in [-5, 0, 1, 123, i64::MAX] {
            assert!(auth.is_authorized(UserId(id)));
        }
    }

    #[test]
    fn test_whitelist() {
        let auth = AccessControl::new().with_whitelist([1, 2, 3]);
        assert!(auth.is_authorized(UserId(2)));
        assert!(!auth.is_authorized(UserId(9)));
        assert_ok!(auth.authorize(UserId(1)));
        assert_eq!(
            auth.authorize(UserId(9)),
            Err(AuthorizationError { user: UserId(9) })
        );
    }

    #[test]
    fn test_empty_whitelist_denies_everyone() {
        let auth = AccessControl::new().with_whitelist(Vec::<i64>::new());
        assert!(auth.is_restricted());
        assert_err!(auth.authorize(UserId(1)));
    }

    #[test]
    fn test_admin_is_independent_of_whitelist() {
        let auth = AccessControl::new().with_whitelist([1]).with_admins([9]);
        assert!(auth.is_admin(UserId(9)));
        assert!(!auth.is_authorized(UserId(9)));
        assert!(!auth.is_admin(UserId(1)));
    }

    #[test]
    fn test_admins_default_empty() {
        let auth = AccessControl::new();
        assert!(!auth.is_admin(UserId(1)));
    }
}
