//! Proposed capability calls

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A capability invocation suggested by the model.
///
/// Arguments are kept untyped exactly as the backend decoded them; handlers
/// pull typed values out with the accessor helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedCall {
    pub call_id: String,
    pub capability_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ProposedCall {
    pub fn new(call_id: impl Into<String>, capability_name: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            capability_name: capability_name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn has_arg(&self, key: &str) -> bool {
        self.arguments.contains_key(key)
    }

    /// Get a string argument
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_str(&self, key: &str) -> Result<&str, String> {
        self.get_str(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.arguments.get(key)? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a boolean argument; `"true"` / `"false"` strings are accepted too.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.arguments.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Decimal text of a numeric argument.
    ///
    /// Models send amounts both as JSON numbers and as strings, so both are
    /// accepted and normalised to plain positional notation (`1e-7` becomes
    /// `0.0000001`).
    pub fn get_decimal_text(&self, key: &str) -> Option<String> {
        match self.arguments.get(key)? {
            Value::Number(n) => Some(expand_exponent(&n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(expand_exponent(s.trim())),
            _ => None,
        }
    }
}

/// Rewrite `<mantissa>e<exponent>` as a plain decimal. Anything that is not
/// well-formed scientific notation is returned unchanged.
fn expand_exponent(text: &str) -> String {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return text.to_string();
    };
    let Ok(exponent) = exponent.parse::<i64>() else {
        return text.to_string();
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (whole.is_empty() && frac.is_empty())
        || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
    {
        return text.to_string();
    }

    let digits = format!("{}{}", whole, frac);
    let point = whole.len() as i64 + exponent;
    let plain = if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point as usize >= digits.len() {
        format!("{}{}", digits, "0".repeat(point as usize - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    };

    let plain = match plain.split_once('.') {
        Some((int_part, frac_part)) => {
            let frac_part = frac_part.trim_end_matches('0');
            let int_part = int_part.trim_start_matches('0');
            let int_part = if int_part.is_empty() { "0" } else { int_part };
            if frac_part.is_empty() {
                int_part.to_string()
            } else {
                format!("{}.{}", int_part, frac_part)
            }
        }
        None => {
            let trimmed = plain.trim_start_matches('0');
            let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
            trimmed.to_string()
        }
    };
    format!("{}{}", sign, plain)
}
