//! Crockford base-32 ("c32") encoding and c32check Stacks addresses.

use super::CodecError;
use sha2::{Digest, Sha256};

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Address version for mainnet single-signature principals (`SP`).
pub const MAINNET_SINGLESIG: u8 = 22;
/// Address version for mainnet multi-signature principals (`SM`).
pub const MAINNET_MULTISIG: u8 = 20;
/// Address version for testnet single-signature principals (`ST`).
pub const TESTNET_SINGLESIG: u8 = 26;
/// Address version for testnet multi-signature principals (`SN`).
pub const TESTNET_MULTISIG: u8 = 21;

fn digit_value(c: u8) -> Option<u8> {
    let normalized = match c.to_ascii_uppercase() {
        b'O' => b'0',
        b'L' | b'I' => b'1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&a| a == normalized)
        .map(|p| p as u8)
}

/// Encodes bytes as c32, keeping one `0` digit per leading zero byte.
pub fn encode(input: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &byte in input.iter().rev() {
        carry |= u16::from(byte) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            digits.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 {
        digits.push(C32_ALPHABET[(carry & 0x1f) as usize]);
    }

    while digits.last() == Some(&C32_ALPHABET[0]) {
        digits.pop();
    }
    for &byte in input {
        if byte != 0 {
            break;
        }
        digits.push(C32_ALPHABET[0]);
    }

    digits.reverse();
    // every pushed byte comes from the ASCII alphabet
    digits.into_iter().map(char::from).collect()
}

/// Decodes a c32 string, restoring one zero byte per leading `0` digit.
pub fn decode(input: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &c in bytes.iter().rev() {
        let value =
            digit_value(c).ok_or_else(|| CodecError::InvalidAddress(input.to_string()))?;
        carry |= u16::from(value) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 {
        out.push(carry as u8);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    for &c in bytes {
        if digit_value(c) != Some(0) {
            break;
        }
        out.push(0);
    }

    out.reverse();
    Ok(out)
}

fn checksum(version: u8, hash160: &[u8]) -> [u8; 4] {
    let mut preimage = Vec::with_capacity(1 + hash160.len());
    preimage.push(version);
    preimage.extend_from_slice(hash160);
    let first = Sha256::digest(&preimage);
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

/// Formats a Stacks address from its version byte and hash160.
pub fn encode_address(version: u8, hash160: &[u8; 20]) -> Result<String, CodecError> {
    if version >= 32 {
        return Err(CodecError::InvalidAddress(format!(
            "version {version} out of range"
        )));
    }
    let mut payload = hash160.to_vec();
    payload.extend_from_slice(&checksum(version, hash160));
    Ok(format!(
        "S{}{}",
        char::from(C32_ALPHABET[version as usize]),
        encode(&payload)
    ))
}

/// Parses a Stacks address into its version byte and hash160, verifying
/// the checksum.
pub fn decode_address(address: &str) -> Result<(u8, [u8; 20]), CodecError> {
    let invalid = || CodecError::InvalidAddress(address.to_string());

    if address.len() <= 5 || !address.is_ascii() || !address.starts_with('S') {
        return Err(invalid());
    }
    let version = digit_value(address.as_bytes()[1]).ok_or_else(invalid)?;
    let payload = decode(&address[2..])?;
    if payload.len() < 4 {
        return Err(invalid());
    }
    let (body, check) = payload.split_at(payload.len() - 4);
    // leading zero bytes of the hash are implied by the fixed width
    if body.len() > 20 {
        return Err(invalid());
    }
    let mut hash160 = [0u8; 20];
    hash160[20 - body.len()..].copy_from_slice(body);

    if checksum(version, &hash160) != check {
        return Err(CodecError::Checksum(address.to_string()));
    }
    Ok((version, hash160))
}
