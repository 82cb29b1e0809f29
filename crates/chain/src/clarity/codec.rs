//! Clarity consensus serialization.

use super::value::{ClarityValue, MAX_CONTRACT_NAME_LEN, Principal};
use super::CodecError;
use std::collections::BTreeMap;

const TYPE_INT: u8 = 0x00;
const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_TRUE: u8 = 0x03;
const TYPE_FALSE: u8 = 0x04;
const TYPE_PRINCIPAL_STANDARD: u8 = 0x05;
const TYPE_PRINCIPAL_CONTRACT: u8 = 0x06;
const TYPE_RESPONSE_OK: u8 = 0x07;
const TYPE_RESPONSE_ERR: u8 = 0x08;
const TYPE_OPTIONAL_NONE: u8 = 0x09;
const TYPE_OPTIONAL_SOME: u8 = 0x0a;
const TYPE_LIST: u8 = 0x0b;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

/// Nesting limit enforced by the Clarity VM.
const MAX_DEPTH: usize = 32;

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::TooLong(len))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn write_principal_body(out: &mut Vec<u8>, version: u8, hash160: &[u8; 20]) {
    out.push(version);
    out.extend_from_slice(hash160);
}

impl ClarityValue {
    /// Appends the consensus serialization of this value to `out`.
    pub fn serialize_into(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            Self::Int(v) => {
                out.push(TYPE_INT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::UInt(v) => {
                out.push(TYPE_UINT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Buffer(bytes) => {
                out.push(TYPE_BUFFER);
                write_len(out, bytes.len())?;
                out.extend_from_slice(bytes);
            }
            Self::Bool(true) => out.push(TYPE_TRUE),
            Self::Bool(false) => out.push(TYPE_FALSE),
            Self::Principal(Principal::Standard { version, hash160 }) => {
                out.push(TYPE_PRINCIPAL_STANDARD);
                write_principal_body(out, *version, hash160);
            }
            Self::Principal(Principal::Contract {
                version,
                hash160,
                name,
            }) => {
                if name.is_empty() || name.len() > MAX_CONTRACT_NAME_LEN {
                    return Err(CodecError::TooLong(name.len()));
                }
                out.push(TYPE_PRINCIPAL_CONTRACT);
                write_principal_body(out, *version, hash160);
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
            }
            Self::ResponseOk(inner) => {
                out.push(TYPE_RESPONSE_OK);
                inner.serialize_into(out)?;
            }
            Self::ResponseErr(inner) => {
                out.push(TYPE_RESPONSE_ERR);
                inner.serialize_into(out)?;
            }
            Self::OptionalNone => out.push(TYPE_OPTIONAL_NONE),
            Self::OptionalSome(inner) => {
                out.push(TYPE_OPTIONAL_SOME);
                inner.serialize_into(out)?;
            }
            Self::List(items) => {
                out.push(TYPE_LIST);
                write_len(out, items.len())?;
                for item in items {
                    item.serialize_into(out)?;
                }
            }
            Self::Tuple(fields) => {
                out.push(TYPE_TUPLE);
                write_len(out, fields.len())?;
                for (name, value) in fields {
                    if name.is_empty() || name.len() > MAX_CONTRACT_NAME_LEN {
                        return Err(CodecError::TooLong(name.len()));
                    }
                    out.push(name.len() as u8);
                    out.extend_from_slice(name.as_bytes());
                    value.serialize_into(out)?;
                }
            }
            Self::StringAscii(s) => {
                if !s.is_ascii() {
                    return Err(CodecError::InvalidString);
                }
                out.push(TYPE_STRING_ASCII);
                write_len(out, s.len())?;
                out.extend_from_slice(s.as_bytes());
            }
            Self::StringUtf8(s) => {
                out.push(TYPE_STRING_UTF8);
                write_len(out, s.len())?;
                out.extend_from_slice(s.as_bytes());
            }
        }
        Ok(())
    }

    pub fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.serialize_into(&mut out)?;
        Ok(out)
    }

    /// `0x`-prefixed hex of the serialization, as node APIs expect.
    pub fn to_hex(&self) -> Result<String, CodecError> {
        Ok(format!("0x{}", hex::encode(self.serialize()?)))
    }

    /// Decodes a complete serialized value; trailing bytes are an error.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader { bytes, pos: 0 };
        let value = reader.value(0)?;
        if reader.pos != bytes.len() {
            return Err(CodecError::TrailingBytes(bytes.len() - reader.pos));
        }
        Ok(value)
    }

    /// Decodes hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        Self::deserialize(&bytes)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEof)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn len(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_be_bytes(self.array::<4>()?) as usize)
    }

    fn name(&mut self) -> Result<String, CodecError> {
        let len = self.byte()? as usize;
        let raw = self.take(len)?;
        if !raw.is_ascii() {
            return Err(CodecError::InvalidString);
        }
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidString)
    }

    fn value(&mut self, depth: usize) -> Result<ClarityValue, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::TooDeep);
        }
        let prefix = self.byte()?;
        let value = match prefix {
            TYPE_INT => ClarityValue::Int(i128::from_be_bytes(self.array::<16>()?)),
            TYPE_UINT => ClarityValue::UInt(u128::from_be_bytes(self.array::<16>()?)),
            TYPE_BUFFER => {
                let len = self.len()?;
                ClarityValue::Buffer(self.take(len)?.to_vec())
            }
            TYPE_TRUE => ClarityValue::Bool(true),
            TYPE_FALSE => ClarityValue::Bool(false),
            TYPE_PRINCIPAL_STANDARD => {
                let version = self.byte()?;
                let hash160 = self.array::<20>()?;
                ClarityValue::Principal(Principal::Standard { version, hash160 })
            }
            TYPE_PRINCIPAL_CONTRACT => {
                let version = self.byte()?;
                let hash160 = self.array::<20>()?;
                let name = self.name()?;
                ClarityValue::Principal(Principal::Contract {
                    version,
                    hash160,
                    name,
                })
            }
            TYPE_RESPONSE_OK => ClarityValue::ok(self.value(depth + 1)?),
            TYPE_RESPONSE_ERR => ClarityValue::err(self.value(depth + 1)?),
            TYPE_OPTIONAL_NONE => ClarityValue::OptionalNone,
            TYPE_OPTIONAL_SOME => ClarityValue::some(self.value(depth + 1)?),
            TYPE_LIST => {
                let len = self.len()?;
                // each element takes at least one byte
                if len > self.bytes.len() - self.pos {
                    return Err(CodecError::UnexpectedEof);
                }
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            TYPE_TUPLE => {
                let len = self.len()?;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.name()?;
                    let value = self.value(depth + 1)?;
                    fields.insert(name, value);
                }
                ClarityValue::Tuple(fields)
            }
            TYPE_STRING_ASCII => {
                let len = self.len()?;
                let raw = self.take(len)?;
                if !raw.is_ascii() {
                    return Err(CodecError::InvalidString);
                }
                ClarityValue::StringAscii(
                    String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidString)?,
                )
            }
            TYPE_STRING_UTF8 => {
                let len = self.len()?;
                let raw = self.take(len)?;
                ClarityValue::StringUtf8(
                    String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidString)?,
                )
            }
            other => return Err(CodecError::UnknownType(other)),
        };
        Ok(value)
    }
}
