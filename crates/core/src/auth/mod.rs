//! Password hashing and password policy.

mod password;

pub use password::{
    MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, PasswordError, hash_password, validate_password_policy,
    verify_password,
};
