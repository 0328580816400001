//! Account and contract addresses.

use crate::{ScoreError, ScoreResult};
use score_config::{ADDRESS_SIZE, CONTRACT_ADDRESS_PREFIX, EOA_ADDRESS_PREFIX};
use std::fmt;
use std::str::FromStr;

/// Whether an address names an externally owned account or a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressKind {
    /// `hx` prefixed account address.
    Eoa,
    /// `cx` prefixed contract address.
    Contract,
}

impl AddressKind {
    fn prefix(&self) -> &'static str {
        match self {
            AddressKind::Eoa => EOA_ADDRESS_PREFIX,
            AddressKind::Contract => CONTRACT_ADDRESS_PREFIX,
        }
    }
}

/// An address: a kind prefix plus a hex encoded body of at most
/// [`ADDRESS_SIZE`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    kind: AddressKind,
    body: Vec<u8>,
}

impl Address {
    /// Creates an address from its parts.
    pub fn new(kind: AddressKind, body: &[u8]) -> ScoreResult<Self> {
        if body.is_empty() || body.len() > ADDRESS_SIZE {
            return Err(ScoreError::invalid_params(format!(
                "Invalid address body length: {}",
                body.len()
            )));
        }
        Ok(Self {
            kind,
            body: body.to_vec(),
        })
    }

    /// Creates a contract address from a full 20 byte body.
    pub fn contract(body: [u8; ADDRESS_SIZE]) -> Self {
        Self {
            kind: AddressKind::Contract,
            body: body.to_vec(),
        }
    }

    /// The address used when resolving contracts only to read their API.
    pub fn getapi_dummy() -> Self {
        Self::contract([0u8; ADDRESS_SIZE])
    }

    /// Gets the address kind.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Whether this is a contract address.
    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Contract
    }

    /// Gets the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl FromStr for Address {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = if s.starts_with(EOA_ADDRESS_PREFIX) {
            AddressKind::Eoa
        } else if s.starts_with(CONTRACT_ADDRESS_PREFIX) {
            AddressKind::Contract
        } else {
            return Err(ScoreError::invalid_params(format!("Invalid address: {}", s)));
        };

        let body = hex::decode(&s[kind.prefix().len()..])
            .map_err(|e| ScoreError::invalid_params(format!("Invalid address {}: {}", s, e)))?;
        Self::new(kind, &body)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), hex::encode(&self.body))
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <String as serde::Deserialize>::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_config::GETAPI_DUMMY_ADDRESS;

    #[test]
    fn test_parse_and_display() {
        let address: Address = "hx1234".parse().unwrap();
        assert_eq!(address.kind(), AddressKind::Eoa);
        assert_eq!(address.body(), &[0x12, 0x34]);
        assert_eq!(address.to_string(), "hx1234");

        let upper: Address = "cxABCD".parse().unwrap();
        assert!(upper.is_contract());
        assert_eq!(upper.to_string(), "cxabcd");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("1234".parse::<Address>().is_err());
        assert!("hx".parse::<Address>().is_err());
        assert!("hx123".parse::<Address>().is_err());
        assert!("hxzz".parse::<Address>().is_err());
        let too_long = format!("hx{}", "00".repeat(ADDRESS_SIZE + 1));
        assert!(too_long.parse::<Address>().is_err());
    }

    #[test]
    fn test_getapi_dummy() {
        assert_eq!(Address::getapi_dummy().to_string(), GETAPI_DUMMY_ADDRESS);
    }

    #[test]
    fn test_serde_as_string() {
        let address: Address = "cx00ff".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"cx00ff\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
