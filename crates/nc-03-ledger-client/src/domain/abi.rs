//! # ABI Codec
//!
//! The slice of the Solidity ABI the fingerprint registry needs: function
//! selectors, `bytes32`/`string`/`uint256` arguments, and
//! `bool`/`uint256`/`bytes32`/`string` return values.

use crate::domain::errors::RpcError;
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// ABI word size.
pub const WORD: usize = 32;

/// One call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `bytes32`
    FixedBytes([u8; 32]),
    /// `string`
    String(String),
    /// `uint256`
    Uint(U256),
}

/// `keccak256(signature)[..4]`
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Encodes arguments (head/tail layout) without a selector.
#[must_use]
pub fn encode_args(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::FixedBytes(bytes) => head.extend_from_slice(bytes),
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::String(text) => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                let data = text.as_bytes();
                tail.extend_from_slice(&uint_word(U256::from(data.len())));
                tail.extend_from_slice(data);
                tail.resize(tail.len() + padded_len(data.len()) - data.len(), 0);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Selector followed by encoded arguments.
#[must_use]
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode_args(tokens));
    data
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], RpcError> {
    data.get(offset..offset + WORD)
        .ok_or_else(|| RpcError::Abi(format!("return data too short: {} bytes", data.len())))
}

fn word_as_usize(word: &[u8]) -> Result<usize, RpcError> {
    let value = U256::from_big_endian(word);
    if value > U256::from(u32::MAX) {
        return Err(RpcError::Abi(format!("offset or length out of range: {value}")));
    }
    Ok(value.as_usize())
}

/// Decodes a single `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool, RpcError> {
    let word = word_at(data, 0)?;
    if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
        return Err(RpcError::Abi("malformed bool".into()));
    }
    Ok(word[WORD - 1] == 1)
}

/// Decodes a single `uint256` return value.
pub fn decode_uint(data: &[u8]) -> Result<U256, RpcError> {
    Ok(U256::from_big_endian(word_at(data, 0)?))
}

/// Decodes a single `bytes32` return value.
pub fn decode_bytes32(data: &[u8]) -> Result<[u8; 32], RpcError> {
    let mut out = [0u8; 32];
    out.copy_from_slice(word_at(data, 0)?);
    Ok(out)
}

/// Decodes a single `string` return value.
pub fn decode_string(data: &[u8]) -> Result<String, RpcError> {
    let offset = word_as_usize(word_at(data, 0)?)?;
    let len = word_as_usize(word_at(data, offset)?)?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| RpcError::Abi("string runs past end of return data".into()))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| RpcError::Abi(e.to_string()))
}

/// Reads the argument block of calldata produced by [`encode_call`].
pub fn split_selector(calldata: &[u8]) -> Result<([u8; 4], &[u8]), RpcError> {
    if calldata.len() < 4 {
        return Err(RpcError::Abi("calldata shorter than a selector".into()));
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&calldata[..4]);
    Ok((sel, &calldata[4..]))
}
