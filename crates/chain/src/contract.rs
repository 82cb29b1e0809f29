use crate::clarity::{CodecError, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A deployed contract, `address.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId {
    /// Deployer address (c32check).
    pub address: String,
    /// Contract name.
    pub name: String,
}

impl ContractId {
    /// Creates a contract id without validating it.
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Converts to a contract principal, validating the address checksum.
    pub fn to_principal(&self) -> Result<Principal, CodecError> {
        self.to_string().parse()
    }
}

impl FromStr for ContractId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let principal: Principal = s.parse()?;
        match principal.contract_name() {
            Some(name) => Ok(Self {
                address: principal.address()?,
                name: name.to_string(),
            }),
            None => Err(CodecError::InvalidAddress(format!(
                "{s} is not a contract principal"
            ))),
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}
