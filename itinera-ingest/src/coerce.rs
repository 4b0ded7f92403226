//! Per-field coercion for loosely typed generator values.
//!
//! Numbers arrive as integers, floats, or occasionally strings. Only JSON
//! numbers count; anything else is treated as absent.

use serde_json::Value;
use tracing::warn;

use itinera_core::round_amount;

/// Rounded amount, `None` for null, missing, or non-numeric values.
pub fn amount(value: &Value) -> Option<i64> {
    value.as_f64().and_then(round_amount)
}

/// Rounded amount floored at 0. Non-numeric and out-of-range values are
/// logged and dropped.
pub fn cost(field: &str, value: &Value) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    if !value.is_number() {
        warn!(field, value = %value, "ignoring non-numeric cost");
        return None;
    }
    let Some(v) = amount(value) else {
        warn!(field, value = %value, "ignoring out-of-range cost");
        return None;
    };
    Some(v.max(0))
}

/// Priority clamped to 0..=100, `default` when absent or unreadable.
pub fn priority(value: &Value, default: u8) -> u8 {
    match amount(value) {
        Some(p) => p.clamp(0, 100) as u8,
        None => default,
    }
}

/// Trimmed string content; numbers are rendered, everything else is `None`.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn costs_round_and_floor() {
        assert_eq!(cost("cost", &json!(1499.5)), Some(1500));
        assert_eq!(cost("cost", &json!(-300)), Some(0));
        assert_eq!(cost("cost", &json!("15000")), None);
        assert_eq!(cost("cost", &Value::Null), None);
    }

    #[test]
    fn absurd_amounts_are_dropped() {
        assert_eq!(cost("cost", &json!(1e19)), None);
        assert_eq!(amount(&json!(9e18)), None);
        assert_eq!(cost("cost", &json!(250_000_000)), Some(250_000_000));
    }

    #[test]
    fn priority_defaults_and_clamps() {
        assert_eq!(priority(&Value::Null, 10), 10);
        assert_eq!(priority(&json!(140), 10), 100);
        assert_eq!(priority(&json!(-3), 10), 0);
        assert_eq!(priority(&json!(79.6), 10), 80);
        assert_eq!(priority(&json!("high"), 20), 20);
    }

    #[test]
    fn text_accepts_numbers() {
        assert_eq!(text(&json!(" Seoul ")), Some("Seoul".to_string()));
        assert_eq!(text(&json!(9)), Some("9".to_string()));
        assert_eq!(text(&json!([1])), None);
    }
}
