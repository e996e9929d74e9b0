//! Request validation helpers built on the `validator` crate.
//!
//! DTOs derive [`validator::Validate`]; handlers call [`validate_request`] to
//! turn the nested error tree into a single human-readable
//! [`CoreError::Validation`] message.

use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Lowercase URL slug: words of `[a-z0-9]` joined by single hyphens.
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex is valid"));

/// Run the derived validation rules and flatten failures into one message.
pub fn validate_request<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(join_errors(&errors)))
}

/// Flatten a (possibly nested) `ValidationErrors` tree into `", "`-joined
/// messages, sorted so the output is stable.
pub fn join_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();
    messages.join(", ")
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        // Struct-level (schema) errors are reported under `__all__`.
        let path = match (prefix.is_empty(), *field == "__all__") {
            (_, true) => prefix.to_string(),
            (true, false) => field.to_string(),
            (false, false) => format!("{prefix}.{field}"),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = match (&err.message, path.is_empty()) {
                        (Some(msg), true) => msg.to_string(),
                        (Some(msg), false) => format!("{path} {msg}"),
                        (None, _) => format!("{path} is invalid ({})", err.code),
                    };
                    out.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
