//! User domain
//!
//! This module provides domain types and traits for user persistence,
//! including the user entity, create/update inputs, validation, and the
//! repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{now, CreateUserInput, UpdateUserInput, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    is_valid_email, validate_create_input, validate_optional_field, validate_required,
    validate_update_input, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
