//! User accounts and their patient profile.

use crate::database::Database;
use crate::error::{is_unique_violation, DbError, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use medcheck_common::{Gender, PatientContext, Route};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

/// Repository for the `users` table.
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create an account. The password is stored as an Argon2 PHC string.
    pub fn register(&self, username: &str, password: &str, profile: &PatientContext) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DbError::Validation("username and password are required".to_string()));
        }
        profile.validate()?;

        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        let conn = self.db.conn()?;
        let inserted = conn.execute(
            "INSERT INTO users (username, password_hash, height, weight, comorbidities, route, gender, substance_use)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                username,
                password_hash,
                profile.height_cm,
                profile.weight_kg,
                profile.comorbidities,
                profile.route.as_str(),
                profile.gender.as_str(),
                profile.substance_use,
            ],
        );

        match inserted {
            Ok(_) => {
                tracing::info!(username, "User registered");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(username, "Registration rejected: username taken");
                Err(DbError::Duplicate(format!("username '{username}' already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a login attempt. Unknown users and wrong passwords both yield `false`.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let stored: Option<String> = self
            .db
            .conn()?
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username.trim()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(stored) = stored else {
            tracing::debug!(username, "Login for unknown user");
            return Ok(false);
        };

        let parsed = PasswordHash::new(&stored)?;
        let ok = Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok();
        if !ok {
            tracing::debug!(username, "Password mismatch");
        }
        Ok(ok)
    }

    pub fn exists(&self, username: &str) -> Result<bool> {
        let found: Option<i64> = self
            .db
            .conn()?
            .query_row("SELECT 1 FROM users WHERE username = ?1", params![username.trim()], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Load the stored patient profile, or `None` for an unknown user.
    pub fn profile(&self, username: &str) -> Result<Option<PatientContext>> {
        let row: Option<(f64, f64, String, String, String, String)> = self
            .db
            .conn()?
            .query_row(
                "SELECT height, weight, comorbidities, route, gender, substance_use
                 FROM users WHERE username = ?1",
                params![username.trim()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?)),
            )
            .optional()?;

        let Some((height_cm, weight_kg, comorbidities, route, gender, substance_use)) = row else {
            return Ok(None);
        };

        let route: Route = route
            .parse()
            .map_err(|_| DbError::Corrupt(format!("unknown route '{route}' for user '{username}'")))?;
        let gender: Gender = gender
            .parse()
            .map_err(|_| DbError::Corrupt(format!("unknown gender '{gender}' for user '{username}'")))?;

        Ok(Some(PatientContext { height_cm, weight_kg, comorbidities, route, gender, substance_use }))
    }

    /// Replace the profile fields of an existing user.
    pub fn update_profile(&self, username: &str, profile: &PatientContext) -> Result<()> {
        profile.validate()?;
        let updated = self.db.conn()?.execute(
            "UPDATE users
             SET height = ?2, weight = ?3, comorbidities = ?4, route = ?5, gender = ?6, substance_use = ?7
             WHERE username = ?1",
            params![
                username.trim(),
                profile.height_cm,
                profile.weight_kg,
                profile.comorbidities,
                profile.route.as_str(),
                profile.gender.as_str(),
                profile.substance_use,
            ],
        )?;

        if updated == 0 {
            return Err(DbError::NotFound(format!("user '{username}'")));
        }
        tracing::info!(username, "Profile updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcheck_test_utils::sample_patient;
    use pretty_assertions::assert_eq;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_register_then_verify() {
        let users = repo();
        users.register("alice", "s3cret", &sample_patient()).unwrap();

        assert!(users.verify("alice", "s3cret").unwrap());
        assert!(!users.verify("alice", "wrong").unwrap());
        assert!(!users.verify("bob", "s3cret").unwrap());
    }

    #[test]
    fn test_password_is_not_stored_in_clear() {
        let db = Arc::new(Database::in_memory().unwrap());
        let users = UserRepository::new(db.clone());
        users.register("alice", "s3cret", &sample_patient()).unwrap();

        let stored: String = db
            .conn()
            .unwrap()
            .query_row("SELECT password_hash FROM users WHERE username = 'alice'", [], |r| r.get(0))
            .unwrap();
        assert_ne!(stored, "s3cret");
        assert!(stored.starts_with("$argon2"));
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let users = repo();
        users.register("alice", "one", &sample_patient()).unwrap();
        let err = users.register("alice", "two", &sample_patient()).unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
        // First password still wins.
        assert!(users.verify("alice", "one").unwrap());
    }

    #[test]
    fn test_register_requires_credentials() {
        let users = repo();
        assert!(matches!(
            users.register("  ", "pw", &sample_patient()),
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            users.register("alice", "", &sample_patient()),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn test_register_rejects_negative_measurements() {
        let users = repo();
        let mut profile = sample_patient();
        profile.weight_kg = -1.0;
        assert!(matches!(users.register("alice", "pw", &profile), Err(DbError::Validation(_))));
        assert!(!users.exists("alice").unwrap());
    }

    #[test]
    fn test_profile_round_trips_through_storage() {
        let users = repo();
        let profile = sample_patient();
        users.register("alice", "pw", &profile).unwrap();
        assert_eq!(users.profile("alice").unwrap(), Some(profile));
        assert_eq!(users.profile("nobody").unwrap(), None);
    }

    #[test]
    fn test_update_profile() {
        let users = repo();
        users.register("alice", "pw", &sample_patient()).unwrap();

        let mut changed = sample_patient();
        changed.route = Route::Iv;
        changed.gender = Gender::Female;
        changed.comorbidities = "asthma".to_string();
        users.update_profile("alice", &changed).unwrap();

        assert_eq!(users.profile("alice").unwrap(), Some(changed));
    }

    #[test]
    fn test_update_profile_of_unknown_user() {
        let users = repo();
        let err = users.update_profile("ghost", &sample_patient()).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
