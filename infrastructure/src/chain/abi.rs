//! Minimal ABI encoding for the calls the agent builds.
//!
//! Only static `uint256`/`address` arguments and a single trailing
//! `address[]` are needed, so words are written out directly.

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: &str = "a9059cbb";
/// `approve(address,uint256)`
pub const APPROVE_SELECTOR: &str = "095ea7b3";
/// `deposit()`
pub const DEPOSIT_SELECTOR: &str = "d0e30db0";
/// `swapExactTokensForTokens(uint256,uint256,address[],address,uint256)`
pub const SWAP_EXACT_TOKENS_SELECTOR: &str = "38ed1739";

fn uint_word(value: u128) -> String {
    format!("{:064x}", value)
}

/// Left-pad an already validated `0x` address to a 32-byte word.
fn address_word(address: &str) -> String {
    let digits = address.get(2..).unwrap_or_default().to_lowercase();
    format!("{:0>64}", digits)
}

fn encode(selector: &str, words: &[String]) -> String {
    let mut data = String::with_capacity(2 + selector.len() + words.len() * 64);
    data.push_str("0x");
    data.push_str(selector);
    for word in words {
        data.push_str(word);
    }
    data
}

pub fn transfer_calldata(to: &str, amount: u128) -> String {
    encode(TRANSFER_SELECTOR, &[address_word(to), uint_word(amount)])
}

pub fn approve_calldata(spender: &str, amount: u128) -> String {
    encode(APPROVE_SELECTOR, &[address_word(spender), uint_word(amount)])
}

pub fn deposit_calldata() -> String {
    encode(DEPOSIT_SELECTOR, &[])
}

pub fn swap_exact_tokens_calldata(
    amount_in: u128,
    amount_out_min: u128,
    path: &[&str],
    to: &str,
    deadline: u64,
) -> String {
    // head is five words; the dynamic path starts right after it
    let path_offset = 5 * 32;
    let mut words = vec![
        uint_word(amount_in),
        uint_word(amount_out_min),
        uint_word(path_offset),
        address_word(to),
        uint_word(u128::from(deadline)),
        uint_word(path.len() as u128),
    ];
    words.extend(path.iter().map(|a| address_word(a)));
    encode(SWAP_EXACT_TOKENS_SELECTOR, &words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

    #[test]
    fn test_transfer_calldata() {
        let data = transfer_calldata(ALICE, 1_000);
        assert_eq!(data.len(), 2 + 8 + 2 * 64);
        assert!(
            data.starts_with(
                "0xa9059cbb00000000000000000000000071c7656ec7ab88b098defb751b7401b5f6d8976f"
            )
        );
        assert!(data.ends_with("3e8"));
    }

    #[test]
    fn test_deposit_calldata() {
        assert_eq!(deposit_calldata(), "0xd0e30db0");
    }

    #[test]
    fn test_swap_calldata_layout() {
        let token_a = "0x1111111111111111111111111111111111111111";
        let token_b = "0x2222222222222222222222222222222222222222";
        let data = swap_exact_tokens_calldata(5, 0, &[token_a, token_b], ALICE, 1_700_000_000);
        let body = &data[10..];
        let words: Vec<&str> = (0..body.len() / 64).map(|i| &body[i * 64..(i + 1) * 64]).collect();

        assert_eq!(words.len(), 8);
        assert_eq!(u128::from_str_radix(words[2], 16).unwrap(), 160);
        assert_eq!(u128::from_str_radix(words[5], 16).unwrap(), 2);
        assert!(words[6].ends_with("1111111111111111111111111111111111111111"));
        assert!(words[7].ends_with("2222222222222222222222222222222222222222"));
    }
}
