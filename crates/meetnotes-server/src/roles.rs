//! Role store.
//!
//! Role assignments live in the `user_roles` collection keyed by normalized
//! email. Identities are provisioned on first sight: the distinguished owner
//! as OWNER, everyone else as REGULAR. The owner's record can be repaired but
//! never downgraded.

use std::sync::Arc;

use chrono::Utc;
use meetnotes_core::{AccessDenied, OwnerIdentity, Role, UserRole, normalize_email};
use meetnotes_protocol::ROLES_COLLECTION;
use tracing::{debug, info, warn};

use crate::error::{RepositoryError, RepositoryResult};
use crate::store::{DocumentStore, MAX_WRITE_ATTEMPTS, Precondition, encode};

/// Identity to role mapping.
#[derive(Clone)]
pub struct RoleStore {
    store: Arc<dyn DocumentStore>,
    owner: OwnerIdentity,
}

impl RoleStore {
    pub fn new(store: Arc<dyn DocumentStore>, owner: OwnerIdentity) -> Self {
        Self { store, owner }
    }

    pub fn owner(&self) -> &OwnerIdentity {
        &self.owner
    }

    fn default_role(&self, email: &str) -> Role {
        if self.owner.matches(email) {
            Role::Owner
        } else {
            Role::Regular
        }
    }

    async fn read(&self, key: &str) -> RepositoryResult<Option<(UserRole, u64)>> {
        match self.store.get(ROLES_COLLECTION, key).await? {
            Some(doc) => Ok(Some((doc.decode()?, doc.revision))),
            None => Ok(None),
        }
    }

    /// Returns the role of `email`, provisioning a record if there is none.
    ///
    /// The flag is true only for the call that inserted the record.
    pub async fn get_or_create(&self, email: &str) -> RepositoryResult<(Role, bool)> {
        let key = normalize_email(email);
        if key.is_empty() {
            return Err(RepositoryError::validation("email is required"));
        }

        if let Some((record, _)) = self.read(&key).await? {
            return Ok((record.role, false));
        }

        let role = self.default_role(&key);
        let record = UserRole::new(key.clone(), role, Utc::now());
        match self
            .store
            .put(
                ROLES_COLLECTION,
                &key,
                encode(&record)?,
                Precondition::MustNotExist,
            )
            .await
        {
            Ok(_) => {
                info!(email = %key, role = %role, "provisioned user role");
                Ok((role, true))
            }
            Err(e) if e.is_conflict() => {
                // Lost the insert race; the winner's record stands.
                let (record, _) = self
                    .read(&key)
                    .await?
                    .ok_or_else(|| RepositoryError::Conflict(format!("role of {}", key)))?;
                Ok((record.role, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the role of `email`.
    ///
    /// Provisions a REGULAR record for unseen identities, so this is a read
    /// with a possible write.
    pub async fn get_role(&self, email: &str) -> RepositoryResult<Role> {
        Ok(self.get_or_create(email).await?.0)
    }

    /// Assigns a role by name.
    ///
    /// Fails with `InvalidRole` for unknown names and `OwnerProtected` when it
    /// would move the owner off OWNER. Keeps `createdAt` of existing records.
    pub async fn set_role(&self, email: &str, role: &str) -> RepositoryResult<UserRole> {
        let role: Role = role.parse()?;
        let key = normalize_email(email);
        if key.is_empty() {
            return Err(RepositoryError::validation("email is required"));
        }
        if self.owner.matches(&key) && role != Role::Owner {
            return Err(AccessDenied::OwnerProtected.into());
        }
        self.write_role(&key, role).await
    }

    /// Makes sure the owner's record exists and says OWNER.
    ///
    /// Returns true when a record was created or repaired.
    pub async fn ensure_owner_initialized(&self) -> RepositoryResult<bool> {
        let key = self.owner.email().to_string();
        if let Some((record, _)) = self.read(&key).await? {
            if record.role == Role::Owner {
                return Ok(false);
            }
            warn!(email = %key, role = %record.role, "repairing owner role");
        }
        self.write_role(&key, Role::Owner).await?;
        info!(email = %key, "owner role initialized");
        Ok(true)
    }

    /// Every role assignment, in no particular order.
    pub async fn list_all(&self) -> RepositoryResult<Vec<UserRole>> {
        let docs = self.store.list(ROLES_COLLECTION).await?;
        docs.iter()
            .map(|doc| doc.decode().map_err(RepositoryError::from))
            .collect()
    }

    async fn write_role(&self, key: &str, role: Role) -> RepositoryResult<UserRole> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.read(key).await?;
            let now = Utc::now();
            let (record, precondition) = match current {
                Some((mut record, revision)) => {
                    record.role = role;
                    record.updated_at = now;
                    (record, Precondition::Revision(revision))
                }
                None => (
                    UserRole::new(key, role, now),
                    Precondition::MustNotExist,
                ),
            };

            match self
                .store
                .put(ROLES_COLLECTION, key, encode(&record)?, precondition)
                .await
            {
                Ok(_) => {
                    debug!(email = %key, role = %role, "stored user role");
                    return Ok(record);
                }
                Err(e) if e.is_conflict() => {
                    debug!(email = %key, attempt, "role write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepositoryError::Conflict(format!(
            "Role of {} was modified concurrently, please retry",
            key
        )))
    }
}
