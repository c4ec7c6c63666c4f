//! Credential store: user documents plus the email uniqueness index.

use chrono::Utc;
use sled::transaction::Transactional;
use tracing::debug;

use super::{abort, decode, tx_decode, tx_encode, Storage, StoreError, StoreResult};
use crate::models::User;

/// Fields a profile edit may change. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl Storage {
    /// Insert a new user, claiming its email in the index atomically.
    pub fn create_user(&self, user: &User) -> StoreResult<()> {
        (&self.users, &self.emails)
            .transaction(|(users, emails)| {
                if emails.get(user.email.as_bytes())?.is_some() {
                    return abort(StoreError::EmailTaken);
                }
                emails.insert(user.email.as_bytes(), user.id.as_bytes())?;
                users.insert(user.id.as_bytes(), tx_encode(user)?)?;
                Ok(())
            })
            .map_err(StoreError::from)?;
        debug!(user_id = %user.id, "user created");
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        match self.users.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let Some(id_bytes) = self.emails.get(email.as_bytes())? else {
            return Ok(None);
        };
        let id = std::str::from_utf8(&id_bytes)
            .map_err(|e| StoreError::Corrupt(format!("email index entry: {}", e)))?;
        self.get_user(id)
    }

    /// Apply `changes` to the stored user. The edit is made against the
    /// current document inside the transaction, so status entries written
    /// concurrently by an admin are not overwritten.
    pub fn update_profile(&self, id: &str, changes: &ProfileChanges) -> StoreResult<User> {
        let user = (&self.users, &self.emails)
            .transaction(|(users, emails)| {
                let Some(bytes) = users.get(id.as_bytes())? else {
                    return abort(StoreError::UserNotFound);
                };
                let mut user: User = tx_decode(&bytes)?;

                if let Some(email) = changes.email.as_deref() {
                    if email != user.email {
                        if let Some(owner) = emails.get(email.as_bytes())? {
                            if &*owner != id.as_bytes() {
                                return abort(StoreError::EmailTaken);
                            }
                        }
                        emails.remove(user.email.as_bytes())?;
                        emails.insert(email.as_bytes(), id.as_bytes())?;
                        user.email = email.to_string();
                    }
                }
                if let Some(name) = &changes.name {
                    user.name = name.clone();
                }
                if let Some(hash) = &changes.password_hash {
                    user.password_hash = hash.clone();
                }
                user.updated_at = Utc::now();

                users.insert(id.as_bytes(), tx_encode(&user)?)?;
                Ok(user)
            })
            .map_err(StoreError::from)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::fixtures::user;

    #[test]
    fn test_duplicate_email_is_rejected() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("a", "same@example.com", Role::User)).unwrap();

        let err = storage
            .create_user(&user("b", "same@example.com", Role::Admin))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert!(storage.get_user("b").unwrap().is_none());
    }

    #[test]
    fn test_lookup_by_email() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("a", "a@example.com", Role::User)).unwrap();

        let found = storage.find_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(found.id, "a");
        assert!(storage.find_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_email_change_moves_index_entry() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("a", "old@example.com", Role::User)).unwrap();

        let changes = ProfileChanges {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        let updated = storage.update_profile("a", &changes).unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert!(storage.find_user_by_email("old@example.com").unwrap().is_none());
        assert_eq!(storage.find_user_by_email("new@example.com").unwrap().unwrap().id, "a");

        // Old address is free again
        storage.create_user(&user("b", "old@example.com", Role::User)).unwrap();
    }

    #[test]
    fn test_email_change_to_taken_address_fails_without_mutation() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("a", "a@example.com", Role::User)).unwrap();
        storage.create_user(&user("b", "b@example.com", Role::User)).unwrap();

        let changes = ProfileChanges {
            name: Some("renamed".to_string()),
            email: Some("b@example.com".to_string()),
            ..Default::default()
        };
        let err = storage.update_profile("a", &changes).unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));

        let a = storage.get_user("a").unwrap().unwrap();
        assert_eq!(a.email, "a@example.com");
        assert_eq!(a.name, "user a");
    }

    #[test]
    fn test_keeping_own_email_is_not_a_conflict() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("a", "a@example.com", Role::User)).unwrap();

        let changes = ProfileChanges {
            email: Some("a@example.com".to_string()),
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let updated = storage.update_profile("a", &changes).unwrap();
        assert_eq!(updated.name, "Ada");
    }
}
