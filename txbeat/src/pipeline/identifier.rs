// Transaction hashes: validation, random generation, and the `?tx=` link form.

use std::fmt;

use rand::Rng;
use thiserror::Error;

pub const HASH_HEX_LEN: usize = 64;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// Loaded when nothing else is supplied
pub const PLACEHOLDER: &str = "0x8f3a0c91d2b7e45f6a1c09e3b8d47f2a5c6e1b90d3f7a2e8c4b5061f9d2e7a3c";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid TxHash: must start with 0x")]
    MissingPrefix,
    #[error("Invalid TxHash: expected 64 hex chars after 0x, got {0}")]
    WrongLength(usize),
    #[error("Invalid TxHash: '{ch}' at position {pos} is not hex")]
    NotHex { ch: char, pos: usize },
}

/// A `0x` + 64 hex digit string. Holding one means it passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHash(String);

impl TxHash {
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let s = input.trim();
        let body = s.strip_prefix("0x").ok_or(IdentifierError::MissingPrefix)?;
        if let Some((pos, ch)) = body.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(IdentifierError::NotHex { ch, pos: pos + 2 });
        }
        if body.len() != HASH_HEX_LEN {
            return Err(IdentifierError::WrongLength(body.len()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniformly random digit per position. Well formed by construction, but
/// callers still feed it through `TxHash::parse` like typed input.
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut s = String::with_capacity(2 + HASH_HEX_LEN);
    s.push_str("0x");
    for _ in 0..HASH_HEX_LEN {
        s.push(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char);
    }
    s
}

/// Pull the raw `tx` value out of whatever the user passed at startup: a bare
/// hash, `tx=...`, `?tx=...`, or a full share link.
pub fn identifier_from_query(input: &str) -> &str {
    let s = input.trim();
    let query = match s.split_once('?') {
        Some((_, q)) => q,
        None if s.contains('=') => s,
        None => return s,
    };
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "tx")
        .map(|(_, value)| value.split('#').next().unwrap_or(value))
        .unwrap_or("")
}

/// `home_url` with `tx` set in its query. Any path, other query pairs and
/// fragment are kept; an old `tx` is replaced.
pub fn share_url(home_url: &str, hash: &TxHash) -> String {
    let (rest, fragment) = match home_url.trim().split_once('#') {
        Some((rest, frag)) => (rest, Some(frag)),
        None => (home_url.trim(), None),
    };
    let (base, query) = rest.split_once('?').unwrap_or((rest, ""));
    // a bare origin gets the root path
    let mut url = match base.split_once("://") {
        Some((_, host)) if !host.contains('/') => format!("{base}/"),
        _ => base.to_string(),
    };

    let tx = format!("tx={hash}");
    let pairs: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some("tx"))
        .chain(std::iter::once(tx.as_str()))
        .collect();
    url.push('?');
    url.push_str(&pairs.join("&"));
    if let Some(frag) = fragment {
        url.push('#');
        url.push_str(frag);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn accepts_mixed_case_and_trims() {
        let raw = format!("  0x{}{}  ", "AbCdEf01".repeat(4), "23456789".repeat(4));
        let hash = TxHash::parse(&raw).unwrap();
        assert_eq!(hash.as_str(), raw.trim());
    }

    #[test]
    fn placeholder_is_valid() {
        assert!(TxHash::parse(PLACEHOLDER).is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            TxHash::parse(&"a".repeat(66)),
            Err(IdentifierError::MissingPrefix)
        );
        assert_eq!(
            TxHash::parse(&format!("0X{}", "a".repeat(64))),
            Err(IdentifierError::MissingPrefix)
        );
        assert_eq!(
            TxHash::parse(&format!("0x{}", "a".repeat(63))),
            Err(IdentifierError::WrongLength(63))
        );
        assert_eq!(
            TxHash::parse(&format!("0x{}", "a".repeat(65))),
            Err(IdentifierError::WrongLength(65))
        );
        assert_eq!(
            TxHash::parse(&format!("0x{}g", "a".repeat(63))),
            Err(IdentifierError::NotHex { ch: 'g', pos: 65 })
        );
        assert_eq!(TxHash::parse(""), Err(IdentifierError::MissingPrefix));
    }

    #[test]
    fn random_hashes_are_valid_and_vary() {
        let mut rng = Pcg32::seed_from_u64(7);
        let a = random_identifier(&mut rng);
        let b = random_identifier(&mut rng);
        assert!(TxHash::parse(&a).is_ok());
        assert!(TxHash::parse(&b).is_ok());
        assert_eq!(a.len(), 66);
        assert_ne!(a, b);
    }

    #[test]
    fn query_forms() {
        let h = PLACEHOLDER;
        assert_eq!(identifier_from_query(h), h);
        assert_eq!(identifier_from_query(&format!("tx={h}")), h);
        assert_eq!(identifier_from_query(&format!("?tx={h}")), h);
        assert_eq!(
            identifier_from_query(&format!("https://example.com/?foo=1&tx={h}#top")),
            h
        );
        assert_eq!(identifier_from_query("https://example.com/?foo=1"), "");
    }

    #[test]
    fn share_link_keeps_the_home_url_shape() {
        let hash = TxHash::parse(PLACEHOLDER).unwrap();
        let h = PLACEHOLDER;
        assert_eq!(share_url("https://example.com", &hash), format!("https://example.com/?tx={h}"));
        assert_eq!(share_url("https://x.test/app", &hash), format!("https://x.test/app?tx={h}"));
        assert_eq!(
            share_url("https://x.test/app?ref=1", &hash),
            format!("https://x.test/app?ref=1&tx={h}")
        );
        assert_eq!(
            share_url("https://x.test/app?tx=0xold&ref=1#top", &hash),
            format!("https://x.test/app?ref=1&tx={h}#top")
        );
    }

    #[test]
    fn share_link_round_trips_through_query() {
        let hash = TxHash::parse(PLACEHOLDER).unwrap();
        let url = share_url("https://example.com/", &hash);
        assert_eq!(url, format!("https://example.com/?tx={PLACEHOLDER}"));
        assert_eq!(TxHash::parse(identifier_from_query(&url)), Ok(hash));
    }
}
