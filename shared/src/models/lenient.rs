//! Serde readers that apply per-field fallbacks to rows written by other clients

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::player::PlayerStatsBlock;

/// Numeric counter as written by any client: null, negative or
/// non-numeric values read as 0, fractions round half away from zero
pub(crate) fn counter_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| match n.as_f64() {
            Some(f) if f.is_finite() && f > 0.0 => f.round() as u64,
            _ => 0,
        }),
        Value::String(s) => s.trim().parse::<f64>().map(|f| counter_from_value(&Value::from(f))).unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(counter_from_value(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub(crate) fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        _ => None,
    })
}

/// A `null` stats block reads as all zeros
pub(crate) fn lenient_stats<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<PlayerStatsBlock, D::Error> {
    Ok(Option::<PlayerStatsBlock>::deserialize(deserializer)?.unwrap_or_default())
}
