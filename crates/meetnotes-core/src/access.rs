//! Access control decisions.
//!
//! [`AccessGate::check`] is a pure function of the caller, the operation and
//! (for note operations) the owner of the targeted note. It never performs
//! I/O; callers resolve the owner and the caller's role first.

use thiserror::Error;

use crate::role::{OwnerIdentity, Role};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor<'a> {
    pub email: &'a str,
    pub role: Role,
}

impl<'a> Actor<'a> {
    pub fn new(email: &'a str, role: Role) -> Self {
        Self { email, role }
    }
}

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Read a note through the standard endpoints. `owner` is `None` when the
    /// note does not exist.
    ReadNote { owner: Option<&'a str> },
    /// Create or update a note through the standard endpoints.
    WriteNote { owner: Option<&'a str> },
    /// List notes across all owners.
    ListAllNotes,
    /// Update any note through the elevated path.
    AdminEditNote,
    /// List all role assignments.
    ListUsers,
    /// Assign `new_role` to `target`.
    ChangeRole { target: &'a str, new_role: Role },
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// The note belongs to someone else.
    #[error("You do not have access to this note")]
    NotOwner,
    /// The operation needs ADMIN or OWNER.
    #[error("You do not have permission to access this resource")]
    AdminRequired,
    /// The operation needs OWNER.
    #[error("You do not have permission to access this resource")]
    OwnerRequired,
    /// The owner identity's role cannot be changed.
    #[error("Cannot modify owner role")]
    OwnerProtected,
}

/// Authorization policy.
#[derive(Debug, Clone)]
pub struct AccessGate {
    owner: OwnerIdentity,
}

impl AccessGate {
    pub fn new(owner: OwnerIdentity) -> Self {
        Self { owner }
    }

    /// Returns the distinguished owner identity.
    pub fn owner(&self) -> &OwnerIdentity {
        &self.owner
    }

    /// Decides whether `actor` may perform `operation`.
    pub fn check(&self, actor: Actor<'_>, operation: Operation<'_>) -> Result<(), AccessDenied> {
        match operation {
            Operation::ReadNote { owner } | Operation::WriteNote { owner } => match owner {
                Some(owner) if owner != actor.email => Err(AccessDenied::NotOwner),
                _ => Ok(()),
            },
            Operation::ListAllNotes | Operation::AdminEditNote | Operation::ListUsers => {
                if actor.role.is_admin() {
                    Ok(())
                } else {
                    Err(AccessDenied::AdminRequired)
                }
            }
            Operation::ChangeRole { target, new_role } => {
                if self.owner.matches(target) && new_role != Role::Owner {
                    return Err(AccessDenied::OwnerProtected);
                }
                if actor.role.is_owner() {
                    Ok(())
                } else {
                    Err(AccessDenied::OwnerRequired)
                }
            }
        }
    }
}
