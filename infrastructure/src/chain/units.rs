//! Hex quantities, decimal token amounts and identifier checks.

use super::error::ChainError;

/// Decimals of the native token and of every ERC-20 the agent builds
/// transactions for.
pub const DEFAULT_DECIMALS: u32 = 18;

const BLOCK_TAGS: [&str; 5] = ["latest", "earliest", "pending", "safe", "finalized"];

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn strip_0x(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Decode a JSON-RPC quantity (`"0x1b4"`).
pub fn parse_hex_quantity(value: &str) -> Result<u128, ChainError> {
    let digits = strip_0x(value.trim())
        .filter(|d| is_hex(d))
        .ok_or_else(|| ChainError::decode("hex quantity", value))?;
    u128::from_str_radix(digits, 16).map_err(|e| ChainError::decode("hex quantity", e))
}

pub fn to_hex_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

/// Convert a decimal amount (`"1.5"`) into base units.
///
/// Negative numbers, exponents and more fractional digits than `decimals`
/// are rejected.
pub fn parse_units(amount: &str, decimals: u32) -> Result<u128, ChainError> {
    let amount = amount.trim();
    let invalid = || ChainError::invalid(format!("Invalid amount: {}", amount));

    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(ChainError::invalid(format!(
            "Amount {} has more than {} decimal places",
            amount, decimals
        )));
    }

    let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_units: u128 = if decimals == 0 {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse()
            .map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| ChainError::invalid(format!("Amount {} is too large", amount)))
}

/// Render base units as a decimal string without trailing zeros.
pub fn format_units(value: u128, decimals: u32) -> String {
    let Some(scale) = 10u128.checked_pow(decimals) else {
        return value.to_string();
    };
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Check a 20-byte hex address; returns it trimmed.
pub fn validate_address(address: &str) -> Result<&str, ChainError> {
    let address = address.trim();
    match strip_0x(address) {
        Some(digits) if digits.len() == 40 && is_hex(digits) => Ok(address),
        _ => Err(ChainError::invalid(format!("Invalid address: {}", address))),
    }
}

/// Check a 32-byte transaction hash; returns it trimmed.
pub fn validate_tx_hash(hash: &str) -> Result<&str, ChainError> {
    let hash = hash.trim();
    match strip_0x(hash) {
        Some(digits) if digits.len() == 64 && is_hex(digits) => Ok(hash),
        _ => Err(ChainError::invalid(format!("Invalid transaction hash: {}", hash))),
    }
}

/// Normalize a block tag: named tags pass through, decimal and hex numbers
/// become hex quantities.
pub fn normalize_block_tag(tag: &str) -> Result<String, ChainError> {
    let trimmed = tag.trim();
    let lower = trimmed.to_lowercase();
    if BLOCK_TAGS.contains(&lower.as_str()) {
        return Ok(lower);
    }
    if strip_0x(trimmed).is_some() {
        return parse_hex_quantity(trimmed)
            .map(to_hex_quantity)
            .map_err(|_| ChainError::invalid(format!("Invalid block tag: {}", tag)));
    }
    trimmed
        .parse::<u128>()
        .map(to_hex_quantity)
        .map_err(|_| ChainError::invalid(format!("Invalid block tag: {}", tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x1b4").unwrap(), 436);
        assert!(parse_hex_quantity("0x").is_err());
        assert!(parse_hex_quantity("1b4").is_err());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 18).unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_units("1.5", 18).unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_units(".25", 2).unwrap(), 25);
        assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), 1);
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        for bad in ["", ".", "-1", "1e18", "abc", "1.2.3"] {
            assert!(parse_units(bad, 18).is_err(), "{bad} should be rejected");
        }
        let err = parse_units("0.1234", 2).unwrap_err();
        assert!(err.to_string().contains("decimal places"));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_units(2_000_000_000_000_000_000, 18), "2");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(0, 18), "0");
    }

    #[test]
    fn test_validate_identifiers() {
        let address = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
        assert_eq!(validate_address(address).unwrap(), address);
        assert!(validate_address("0xABC").is_err());
        assert!(validate_tx_hash(&format!("0x{}", "ab".repeat(32))).is_ok());
        assert!(validate_tx_hash("0x1234").is_err());
    }

    #[test]
    fn test_normalize_block_tag() {
        assert_eq!(normalize_block_tag("Latest").unwrap(), "latest");
        assert_eq!(normalize_block_tag("100").unwrap(), "0x64");
        assert_eq!(normalize_block_tag("0x0064").unwrap(), "0x64");
        assert!(normalize_block_tag("yesterday").is_err());
    }
}
