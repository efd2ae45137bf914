//! Execution environment model

use sqlx::FromRow;

/// Language environment database model
///
/// A missing `compile_image_name` means the language has no compile phase
/// (interpreted languages run straight from source).
#[derive(Debug, Clone, FromRow)]
pub struct Environment {
    pub id: i32,
    pub name: String,
    pub active: bool,
    pub published: bool,
    pub compile_image_name: Option<String>,
    pub test_image_name: String,
}
