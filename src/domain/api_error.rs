//! Turning server error bodies into user-facing text

use serde_json::Value;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The `detail` field, if present and a string
pub fn detail_message(body: &Value) -> Option<String> {
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// All field messages flattened and joined with a space
pub fn field_messages(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    let mut messages = Vec::new();
    for value in object.values() {
        collect_strings(value, &mut messages);
    }
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(" "))
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Number(n) => out.push(n.to_string()),
        _ => {}
    }
}

/// Login error text: `detail`, else "Unknown error"
pub fn login_message(body: &Value) -> String {
    detail_message(body).unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Signup error text: `detail`, else the field errors, else "Unknown error"
pub fn registration_message(body: &Value) -> String {
    detail_message(body)
        .or_else(|| field_messages(body))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
