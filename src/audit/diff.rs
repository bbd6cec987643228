//! Diff summaries for audit entries
//!
//! Only top-level fields are compared. Nested values are summarized by size
//! so that a changed share list reads as `shares: [3 items] -> [2 items]`.

use serde_json::Value;

/// Describe what changed between two snapshots, or `None` if nothing did
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after)
            .then(|| format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();

    for (key, old) in before_obj {
        // Timestamps change on every update and only add noise
        if key == "updated_at" {
            continue;
        }
        match after_obj.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, format_value(old), format_value(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(old))),
        }
    }

    for (key, new) in after_obj {
        if !before_obj.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, format_value(new)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_change() {
        let before = json!({"status": "draft", "amount": 1001});
        let after = json!({"status": "pending", "amount": 1001});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "status: \"draft\" -> \"pending\"");
    }

    #[test]
    fn test_updated_at_ignored() {
        let before = json!({"name": "Ana", "updated_at": "2025-01-01T00:00:00Z"});
        let after = json!({"name": "Ana", "updated_at": "2025-02-01T00:00:00Z"});

        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"name": "Rent", "closed_at": "2025-01-31T00:00:00Z"});
        let after = json!({"name": "Rent", "settled_at": "2025-02-01T00:00:00Z"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("closed_at: \"2025-01-31T00:00:00Z\" -> (removed)"));
        assert!(diff.contains("settled_at: (added) -> \"2025-02-01T00:00:00Z\""));
    }

    #[test]
    fn test_shares_summarized() {
        let before = json!({"shares": [{"member_id": 1}, {"member_id": 2}, {"member_id": 3}]});
        let after = json!({"shares": [{"member_id": 1}, {"member_id": 2}]});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("shares: [3 items] -> [2 items]"));
    }

    #[test]
    fn test_long_description_truncated() {
        let before = json!({"description": "x".repeat(80)});
        let after = json!({"description": "groceries"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("...\" -> \"groceries\""));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(
            generate_diff(&json!(true), &json!(false)),
            Some("true -> false".to_string())
        );
        assert!(generate_diff(&json!(null), &json!(null)).is_none());
    }
}
