use super::{CodecError, c32};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum contract name length accepted by the wire format.
pub const MAX_CONTRACT_NAME_LEN: usize = 128;

/// A standard or contract principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Account principal, `SP...`.
    Standard { version: u8, hash160: [u8; 20] },
    /// Contract principal, `SP....name`.
    Contract {
        version: u8,
        hash160: [u8; 20],
        name: String,
    },
}

impl Principal {
    /// Address part, without the contract name.
    pub fn address(&self) -> Result<String, CodecError> {
        match self {
            Self::Standard { version, hash160 } | Self::Contract { version, hash160, .. } => {
                c32::encode_address(*version, hash160)
            }
        }
    }

    pub fn contract_name(&self) -> Option<&str> {
        match self {
            Self::Standard { .. } => None,
            Self::Contract { name, .. } => Some(name),
        }
    }
}

fn valid_contract_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    first_ok
        && name.len() <= MAX_CONTRACT_NAME_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromStr for Principal {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            None => {
                let (version, hash160) = c32::decode_address(s)?;
                Ok(Self::Standard { version, hash160 })
            }
            Some((address, name)) => {
                if !valid_contract_name(name) {
                    return Err(CodecError::InvalidAddress(s.to_string()));
                }
                let (version, hash160) = c32::decode_address(address)?;
                Ok(Self::Contract {
                    version,
                    hash160,
                    name: name.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = match self {
            Self::Standard { version, hash160 } | Self::Contract { version, hash160, .. } => self
                .address()
                .unwrap_or_else(|_| format!("<v{version}:{}>", hex::encode(hash160))),
        };
        match self.contract_name() {
            None => f.write_str(&address),
            Some(name) => write!(f, "{address}.{name}"),
        }
    }
}

/// A decoded Clarity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    Principal(Principal),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    /// Tuple fields, kept sorted by name as the wire format requires.
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    /// Parses a principal string into a principal value.
    pub fn principal(s: &str) -> Result<Self, CodecError> {
        s.parse().map(Self::Principal)
    }

    /// Builds a tuple from `(name, value)` pairs.
    pub fn tuple<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ClarityValue)>,
        K: Into<String>,
    {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn some(value: ClarityValue) -> Self {
        Self::OptionalSome(Box::new(value))
    }

    pub fn ok(value: ClarityValue) -> Self {
        Self::ResponseOk(Box::new(value))
    }

    pub fn err(value: ClarityValue) -> Self {
        Self::ResponseErr(Box::new(value))
    }

    /// Clarity type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Buffer(_) => "buff",
            Self::Bool(_) => "bool",
            Self::Principal(_) => "principal",
            Self::ResponseOk(_) | Self::ResponseErr(_) => "response",
            Self::OptionalNone | Self::OptionalSome(_) => "optional",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::StringAscii(_) => "string-ascii",
            Self::StringUtf8(_) => "string-utf8",
        }
    }

    fn mismatch(&self, expected: &'static str) -> CodecError {
        CodecError::UnexpectedType {
            expected,
            found: self.type_name(),
        }
    }

    pub fn expect_uint(&self) -> Result<u128, CodecError> {
        match self {
            Self::UInt(v) => Ok(*v),
            other => Err(other.mismatch("uint")),
        }
    }

    pub fn expect_principal(&self) -> Result<&Principal, CodecError> {
        match self {
            Self::Principal(p) => Ok(p),
            other => Err(other.mismatch("principal")),
        }
    }

    pub fn expect_tuple(&self) -> Result<&BTreeMap<String, ClarityValue>, CodecError> {
        match self {
            Self::Tuple(fields) => Ok(fields),
            other => Err(other.mismatch("tuple")),
        }
    }

    /// Looks up a tuple field.
    pub fn field(&self, name: &str) -> Result<&ClarityValue, CodecError> {
        self.expect_tuple()?
            .get(name)
            .ok_or_else(|| CodecError::MissingField(name.to_string()))
    }

    /// Unwraps an optional into `Option`.
    pub fn into_optional(self) -> Result<Option<ClarityValue>, CodecError> {
        match self {
            Self::OptionalNone => Ok(None),
            Self::OptionalSome(inner) => Ok(Some(*inner)),
            other => Err(other.mismatch("optional")),
        }
    }

    /// Unwraps a response into `Result`.
    pub fn into_response(self) -> Result<Result<ClarityValue, ClarityValue>, CodecError> {
        match self {
            Self::ResponseOk(inner) => Ok(Ok(*inner)),
            Self::ResponseErr(inner) => Ok(Err(*inner)),
            other => Err(other.mismatch("response")),
        }
    }
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "u{v}"),
            Self::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Principal(p) => write!(f, "'{p}"),
            Self::ResponseOk(v) => write!(f, "(ok {v})"),
            Self::ResponseErr(v) => write!(f, "(err {v})"),
            Self::OptionalNone => f.write_str("none"),
            Self::OptionalSome(v) => write!(f, "(some {v})"),
            Self::List(items) => {
                f.write_str("(list")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(")")
            }
            Self::Tuple(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Self::StringAscii(s) => write!(f, "{s:?}"),
            Self::StringUtf8(s) => write!(f, "u{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOT: &str = "SP000000000000000000002Q6VF78";

    #[test]
    fn test_parse_contract_principal() {
        let p: Principal = format!("{BOOT}.pox-4").parse().unwrap();
        assert_eq!(p.contract_name(), Some("pox-4"));
        assert_eq!(p.to_string(), format!("{BOOT}.pox-4"));
    }

    #[test]
    fn test_rejects_bad_contract_name() {
        assert!(format!("{BOOT}.4pox").parse::<Principal>().is_err());
        assert!(format!("{BOOT}.").parse::<Principal>().is_err());
        assert!(format!("{BOOT}.a b").parse::<Principal>().is_err());
    }

    #[test]
    fn test_tuple_accessors() {
        let value = ClarityValue::tuple([
            ("num", ClarityValue::UInt(30)),
            ("den", ClarityValue::UInt(10_000)),
        ]);
        assert_eq!(value.field("num").unwrap().expect_uint().unwrap(), 30);
        assert!(matches!(
            value.field("missing"),
            Err(CodecError::MissingField(_))
        ));
        assert!(matches!(
            value.expect_uint(),
            Err(CodecError::UnexpectedType { expected: "uint", found: "tuple" })
        ));
    }

    #[test]
    fn test_display() {
        let value = ClarityValue::ok(ClarityValue::some(ClarityValue::tuple([
            ("den", ClarityValue::UInt(1000)),
            ("num", ClarityValue::UInt(997)),
        ])));
        assert_eq!(value.to_string(), "(ok (some {den: u1000, num: u997}))");
        assert_eq!(ClarityValue::err(ClarityValue::UInt(101)).to_string(), "(err u101)");
    }

    #[test]
    fn test_optional_and_response_unwrap() {
        assert_eq!(ClarityValue::OptionalNone.into_optional().unwrap(), None);
        let resp = ClarityValue::err(ClarityValue::UInt(3)).into_response().unwrap();
        assert_eq!(resp, Err(ClarityValue::UInt(3)));
        assert!(ClarityValue::UInt(1).into_optional().is_err());
    }
}
