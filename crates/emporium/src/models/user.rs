//! User records.
//!
//! [`UserIn`] is what clients send, [`UserInDB`] what gets stored and
//! [`UserOut`] what is returned. Only the stored form carries a password,
//! and only hashed.

use emporium_core::{FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

fn user_base(name: &str) -> Schema {
    Schema::new(name)
        .field(FieldSpec::new("username", FieldType::String))
        .field(FieldSpec::new("email", FieldType::Email))
        .field(FieldSpec::new("full_name", FieldType::String).optional())
}

/// Schema of [`User`].
pub static USER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("User")
        .field(FieldSpec::new("username", FieldType::String))
        .field(FieldSpec::new("full_name", FieldType::String))
});

/// Schema of [`UserIn`].
pub static USER_IN_SCHEMA: Lazy<Schema> =
    Lazy::new(|| user_base("UserIn").field(FieldSpec::new("password", FieldType::String)));

/// Schema of [`UserOut`].
pub static USER_OUT_SCHEMA: Lazy<Schema> = Lazy::new(|| user_base("UserOut"));

/// Schema of [`UserInDB`].
pub static USER_IN_DB_SCHEMA: Lazy<Schema> =
    Lazy::new(|| user_base("UserInDB").field(FieldSpec::new("hashed_password", FieldType::String)));

/// The user sent alongside an item update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
}

impl Model for User {
    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIn {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Plaintext password.
    pub password: String,
}

impl Model for UserIn {
    fn schema() -> &'static Schema {
        &USER_IN_SCHEMA
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
}

impl Model for UserOut {
    fn schema() -> &'static Schema {
        &USER_OUT_SCHEMA
    }
}

/// Stored form of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInDB {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Output of [`fake_password_hasher`].
    pub hashed_password: String,
}

impl Model for UserInDB {
    fn schema() -> &'static Schema {
        &USER_IN_DB_SCHEMA
    }
}

/// Stand-in hasher: prefixes `supersecret` to the plaintext.
pub fn fake_password_hasher(raw_password: &str) -> String {
    format!("supersecret{raw_password}")
}

/// Pretends to persist a user.
pub fn fake_save_user(user_in: UserIn) -> UserInDB {
    let hashed_password = fake_password_hasher(&user_in.password);
    let saved = UserInDB {
        username: user_in.username,
        email: user_in.email,
        full_name: user_in.full_name,
        hashed_password,
    };
    tracing::info!(username = %saved.username, "User saved...not really");
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::ResponseModel;
    use serde_json::json;

    fn user_in() -> UserIn {
        UserIn::validate(&json!({
            "username": "john",
            "email": "john@example.com",
            "password": "s3cret"
        }))
        .unwrap()
    }

    #[test]
    fn test_fake_save_user_hashes() {
        let saved = fake_save_user(user_in());
        assert_eq!(saved.hashed_password, "supersecrets3cret");
        assert_eq!(saved.full_name, None);
    }

    #[test]
    fn test_user_out_projection_hides_passwords() {
        let saved = serde_json::to_value(fake_save_user(user_in())).unwrap();
        let out = ResponseModel::Schema(&USER_OUT_SCHEMA).shape(&saved).unwrap();
        assert_eq!(
            out,
            json!({"username": "john", "email": "john@example.com", "full_name": null})
        );
        assert!(out.get("hashed_password").is_none());
        assert!(out.get("password").is_none());
    }

    #[test]
    fn test_invalid_email() {
        let errors = UserIn::validate(&json!({
            "username": "john",
            "email": "not-an-email",
            "password": "x"
        }))
        .unwrap_err();
        assert_eq!(errors.for_field("email").unwrap().kind(), "value_error.email");
    }

    #[test]
    fn test_user_requires_full_name() {
        let errors = User::validate(&json!({"username": "dave"})).unwrap_err();
        assert_eq!(errors.for_field("full_name").unwrap().kind(), "missing");
    }
}
