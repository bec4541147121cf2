//! Turning broken rules into client-facing messages

use validator::{ValidationError, ValidationErrors};

/// Flatten `validator` output into one message per broken rule, ordered by
/// field name so responses are stable
pub fn rule_messages(result: Result<(), ValidationErrors>) -> Vec<String> {
    let Err(errors) = result else {
        return Vec::new();
    };

    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, errs) in fields {
        for error in errs {
            messages.push(describe(&field, error));
        }
    }
    messages
}

fn describe(field: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("{} failed the {} rule", field, error.code),
    }
}
