//! Authorization guard: a pure decision over the requirements a route
//! declares and the identity the authentication gates established.

use crate::{
    dao::models::{Role, UserStatus},
    error::ServiceError,
};

use super::identity::Identity;

/// Requirements declared alongside a route definition.
///
/// `roles`/`statuses` are allowed sets; membership is the only check, there
/// is no role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequirements {
    /// Roles allowed to call the route, if restricted.
    pub roles: Option<&'static [Role]>,
    /// Statuses allowed to call the route, if restricted.
    pub statuses: Option<&'static [UserStatus]>,
}

/// No restriction at all.
pub const OPEN: RouteRequirements = RouteRequirements {
    roles: None,
    statuses: None,
};

/// Any authenticated user with an active account.
pub const ACTIVE_USER: RouteRequirements = RouteRequirements {
    roles: Some(&[Role::User, Role::Admin]),
    statuses: Some(&[UserStatus::Active]),
};

/// Any authenticated user regardless of status (profile, verification flows).
pub const ANY_USER: RouteRequirements = RouteRequirements {
    roles: Some(&[Role::User, Role::Admin]),
    statuses: None,
};

/// Decide whether `identity` satisfies `requirements`.
///
/// Exactly four branches:
/// 1. nothing declared: allow;
/// 2. only roles declared: allow iff the actual role is in the set;
/// 3. both declared: allow iff role and status are both in their sets;
/// 4. any other combination (statuses without roles): deny.
pub fn authorize(
    requirements: &RouteRequirements,
    identity: &Identity,
) -> Result<(), ServiceError> {
    match (requirements.roles, requirements.statuses) {
        (None, None) => Ok(()),
        (Some(roles), None) => {
            if identity.role.is_some_and(|role| roles.contains(&role)) {
                Ok(())
            } else {
                Err(denied())
            }
        }
        (Some(roles), Some(statuses)) => {
            let role_ok = identity.role.is_some_and(|role| roles.contains(&role));
            let status_ok = identity
                .status
                .is_some_and(|status| statuses.contains(&status));
            if role_ok && status_ok {
                Ok(())
            } else {
                Err(denied())
            }
        }
        (None, Some(_)) => Err(denied()),
    }
}

fn denied() -> ServiceError {
    ServiceError::Forbidden("insufficient permissions".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Option<Role>, status: Option<UserStatus>) -> Identity {
        Identity {
            role,
            status,
            ..Identity::default()
        }
    }

    const ROLES: [Option<&'static [Role]>; 3] = [
        None,
        Some(&[Role::User]),
        Some(&[Role::User, Role::Admin]),
    ];
    const STATUSES: [Option<&'static [UserStatus]>; 3] = [
        None,
        Some(&[UserStatus::Active]),
        Some(&[UserStatus::Active, UserStatus::Inactive]),
    ];
    const ACTUAL_ROLES: [Option<Role>; 3] = [None, Some(Role::User), Some(Role::Admin)];
    const ACTUAL_STATUSES: [Option<UserStatus>; 3] =
        [None, Some(UserStatus::Active), Some(UserStatus::Inactive)];

    /// Reference implementation of the decision table.
    fn expected(
        roles: Option<&[Role]>,
        statuses: Option<&[UserStatus]>,
        actual_role: Option<Role>,
        actual_status: Option<UserStatus>,
    ) -> bool {
        match (roles, statuses) {
            (None, None) => true,
            (Some(roles), None) => actual_role.is_some_and(|r| roles.contains(&r)),
            (Some(roles), Some(statuses)) => {
                actual_role.is_some_and(|r| roles.contains(&r))
                    && actual_status.is_some_and(|s| statuses.contains(&s))
            }
            (None, Some(_)) => false,
        }
    }

    #[test]
    fn decision_matches_table_over_full_combination_space() {
        for roles in ROLES {
            for statuses in STATUSES {
                for actual_role in ACTUAL_ROLES {
                    for actual_status in ACTUAL_STATUSES {
                        let requirements = RouteRequirements { roles, statuses };
                        let outcome = authorize(
                            &requirements,
                            &identity(actual_role, actual_status),
                        )
                        .is_ok();
                        assert_eq!(
                            outcome,
                            expected(roles, statuses, actual_role, actual_status),
                            "roles={roles:?} statuses={statuses:?} \
                             actual=({actual_role:?},{actual_status:?})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn no_requirements_allows_anonymous() {
        assert!(authorize(&OPEN, &identity(None, None)).is_ok());
    }

    #[test]
    fn status_without_role_always_denies() {
        let requirements = RouteRequirements {
            roles: None,
            statuses: Some(&[UserStatus::Active]),
        };
        assert!(
            authorize(
                &requirements,
                &identity(Some(Role::Admin), Some(UserStatus::Active))
            )
            .is_err()
        );
    }

    #[test]
    fn membership_not_equality() {
        assert!(
            authorize(
                &ACTIVE_USER,
                &identity(Some(Role::Admin), Some(UserStatus::Active))
            )
            .is_ok()
        );
        assert!(
            authorize(
                &ACTIVE_USER,
                &identity(Some(Role::Admin), Some(UserStatus::Inactive))
            )
            .is_err()
        );
    }
}
