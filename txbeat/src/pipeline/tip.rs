// Builds the batched-call request for a USDC tip. Sending it is the
// wallet's job; all we do here is validate and encode.

use serde::Serialize;
use thiserror::Error;

pub const USDC_DECIMALS: usize = 6;
pub const BASE_CHAIN_ID: &str = "0x2105";
const TRANSFER_SELECTOR: &str = "a9059cbb"; // transfer(address,uint256)
const CALLS_VERSION: &str = "2.0.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TipError {
    #[error("Enter a valid tip amount (more than zero, up to 6 decimals): {0:?}")]
    InvalidAmount(String),
    #[error("Recipient address is invalid: {0}")]
    InvalidRecipient(String),
    #[error("Token contract address is invalid: {0}")]
    InvalidToken(String),
}

/// "12.5" -> 12_500_000 token units.
pub fn parse_amount(input: &str) -> Result<u128, TipError> {
    let s = input.trim();
    let invalid = || TipError::InvalidAmount(s.to_string());
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(frac) || frac.len() > USDC_DECIMALS {
        return Err(invalid());
    }
    let frac_padded = format!("{frac:0<width$}", width = USDC_DECIMALS);
    let units = whole
        .parse::<u128>()
        .ok()
        .and_then(|w| w.checked_mul(10u128.pow(USDC_DECIMALS as u32)))
        .and_then(|w| w.checked_add(frac_padded.parse::<u128>().ok()?))
        .ok_or_else(invalid)?;
    if units == 0 {
        return Err(invalid());
    }
    Ok(units)
}

pub fn is_evm_address(addr: &str) -> bool {
    addr.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// ERC-20 `transfer` calldata: selector, then both arguments left-padded to
/// 32 bytes.
pub fn encode_transfer(to: &str, units: u128) -> String {
    let to = to.trim_start_matches("0x").to_lowercase();
    format!("0x{TRANSFER_SELECTOR}{to:0>64}{units:064x}")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Call {
    pub to: String,
    pub value: String,
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCallsParams {
    pub version: String,
    pub from: String,
    pub chain_id: String,
    pub atomic_required: bool,
    pub calls: Vec<Call>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendCallsRequest {
    pub method: String,
    pub params: Vec<SendCallsParams>,
}

pub fn tip_request(
    from: &str,
    recipient: &str,
    token: &str,
    amount: &str,
) -> Result<SendCallsRequest, TipError> {
    if !is_evm_address(recipient) {
        return Err(TipError::InvalidRecipient(recipient.to_string()));
    }
    if !is_evm_address(token) {
        return Err(TipError::InvalidToken(token.to_string()));
    }
    let units = parse_amount(amount)?;
    Ok(SendCallsRequest {
        method: "wallet_sendCalls".to_string(),
        params: vec![SendCallsParams {
            version: CALLS_VERSION.to_string(),
            from: from.to_string(),
            chain_id: BASE_CHAIN_ID.to_string(),
            atomic_required: true,
            calls: vec![Call {
                to: token.to_string(),
                value: "0x0".to_string(),
                data: encode_transfer(recipient, units),
            }],
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::settings::{DEFAULT_RECIPIENT, USDC_ON_BASE};

    #[test]
    fn amounts_scale_to_six_decimals() {
        assert_eq!(parse_amount("1"), Ok(1_000_000));
        assert_eq!(parse_amount("12.5"), Ok(12_500_000));
        assert_eq!(parse_amount(" 0.000001 "), Ok(1));
        assert_eq!(parse_amount("3."), Ok(3_000_000));
    }

    #[test]
    fn bad_amounts() {
        for bad in ["", ".5", "1.2345678", "-1", "1e3", "abc", "1.2.3"] {
            assert!(matches!(parse_amount(bad), Err(TipError::InvalidAmount(_))), "{bad}");
        }
        assert_eq!(parse_amount("0.000"), Err(TipError::InvalidAmount("0.000".to_string())));
        assert_eq!(parse_amount(" 0 "), Err(TipError::InvalidAmount("0".to_string())));
        assert!(parse_amount(&"9".repeat(60)).is_err());
    }

    #[test]
    fn transfer_calldata_layout() {
        let data = encode_transfer(DEFAULT_RECIPIENT, 5_000_000);
        assert_eq!(data.len(), 2 + 8 + 64 + 64);
        assert!(data.starts_with("0xa9059cbb000000000000000000000000"));
        assert!(data[10..74].ends_with(&"1".repeat(40)));
        assert!(data.ends_with("4c4b40"));
    }

    #[test]
    fn request_serialises_like_the_wallet_expects() {
        let req = tip_request("0xabc", DEFAULT_RECIPIENT, USDC_ON_BASE, "2").unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "wallet_sendCalls");
        let p = &json["params"][0];
        assert_eq!(p["chainId"], BASE_CHAIN_ID);
        assert_eq!(p["atomicRequired"], true);
        assert_eq!(p["version"], "2.0.0");
        assert_eq!(p["calls"][0]["to"], USDC_ON_BASE);
        assert_eq!(p["calls"][0]["value"], "0x0");
    }

    #[test]
    fn rejects_bad_addresses() {
        assert_eq!(
            tip_request("0xabc", "0x123", USDC_ON_BASE, "1"),
            Err(TipError::InvalidRecipient("0x123".to_string()))
        );
        assert!(matches!(
            tip_request("0xabc", DEFAULT_RECIPIENT, "usdc", "1"),
            Err(TipError::InvalidToken(_))
        ));
    }
}
