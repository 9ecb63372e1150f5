//! # Contract Artifact
//!
//! Loads a truffle-style compiled contract (`{"abi": [...], "bytecode": "0x.."}`)
//! and works out how the fingerprint is passed to the registry functions.

use crate::domain::abi::{self, Token};
use crate::domain::errors::{LedgerError, RpcError};
use primitive_types::U256;
use serde::Deserialize;
use shared_types::Fingerprint;
use std::path::Path;

/// How the registry contract takes the fingerprint argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintEncoding {
    /// `storeHash(bytes32)`: raw digest.
    Bytes32,
    /// `storeHash(string)`: `0x`-prefixed hex text.
    String,
}

impl FingerprintEncoding {
    fn from_abi_type(kind: &str) -> Option<Self> {
        match kind {
            "bytes32" => Some(Self::Bytes32),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Solidity type name.
    #[must_use]
    pub const fn abi_type(self) -> &'static str {
        match self {
            Self::Bytes32 => "bytes32",
            Self::String => "string",
        }
    }

    /// The fingerprint as a call argument.
    #[must_use]
    pub fn token(self, fingerprint: &Fingerprint) -> Token {
        match self {
            Self::Bytes32 => Token::FixedBytes(*fingerprint.as_bytes()),
            Self::String => Token::String(fingerprint.to_hex()),
        }
    }

    /// Decodes a stored-hash return value into display form.
    pub fn decode(self, data: &[u8]) -> Result<String, RpcError> {
        match self {
            Self::Bytes32 => Ok(Fingerprint::new(abi::decode_bytes32(data)?).to_hex()),
            Self::String => abi::decode_string(data),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(default, rename = "contractName")]
    contract_name: Option<String>,
    #[serde(default)]
    abi: Vec<AbiEntry>,
    #[serde(default)]
    bytecode: String,
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
}

/// A validated, compiled fingerprint-registry contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    name: String,
    bytecode: Vec<u8>,
    encoding: FingerprintEncoding,
    stored_hash_encoding: Option<FingerprintEncoding>,
    has_hash_count: bool,
}

impl ContractArtifact {
    /// Loads and validates an artifact file.
    ///
    /// ## Errors
    ///
    /// - `ArtifactMissing`: the file does not exist
    /// - `ArtifactInvalid`: unreadable JSON, missing functions, or no bytecode
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LedgerError::ArtifactMissing(path.to_path_buf())
            } else {
                LedgerError::ArtifactInvalid(format!("{}: {e}", path.display()))
            }
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates artifact JSON.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let raw: RawArtifact =
            serde_json::from_str(json).map_err(|e| LedgerError::ArtifactInvalid(e.to_string()))?;

        let function = |name: &str| {
            raw.abi.iter().find(|entry| {
                entry.kind.as_deref().unwrap_or("function") == "function"
                    && entry.name.as_deref() == Some(name)
            })
        };
        let single_input = |name: &str| -> Result<FingerprintEncoding, LedgerError> {
            let entry = function(name)
                .ok_or_else(|| LedgerError::ArtifactInvalid(format!("ABI has no `{name}`")))?;
            match entry.inputs.as_slice() {
                [param] => FingerprintEncoding::from_abi_type(&param.kind).ok_or_else(|| {
                    LedgerError::ArtifactInvalid(format!(
                        "`{name}` takes unsupported type `{}`",
                        param.kind
                    ))
                }),
                _ => Err(LedgerError::ArtifactInvalid(format!(
                    "`{name}` must take exactly one argument"
                ))),
            }
        };

        let encoding = single_input("storeHash")?;
        let verify_encoding = single_input("verifyHash")?;
        if encoding != verify_encoding {
            return Err(LedgerError::ArtifactInvalid(
                "`storeHash` and `verifyHash` disagree on the fingerprint type".into(),
            ));
        }

        let digits = raw.bytecode.trim().trim_start_matches("0x");
        if digits.is_empty() {
            return Err(LedgerError::ArtifactInvalid("bytecode is empty".into()));
        }
        let bytecode = hex::decode(digits)
            .map_err(|e| LedgerError::ArtifactInvalid(format!("bytecode: {e}")))?;

        let stored_hash_encoding = function("getHash")
            .and_then(|entry| entry.outputs.first())
            .and_then(|out| FingerprintEncoding::from_abi_type(&out.kind));

        Ok(Self {
            name: raw
                .contract_name
                .unwrap_or_else(|| "FingerprintRegistry".to_string()),
            bytecode,
            encoding,
            stored_hash_encoding,
            has_hash_count: function("getHashCount").is_some(),
        })
    }

    /// The registry contract as understood by the simulated ledger.
    pub(crate) fn simulated(encoding: FingerprintEncoding) -> Self {
        Self {
            name: "FingerprintRegistry".to_string(),
            bytecode: vec![0x60, 0x80, 0x60, 0x40, 0x52],
            encoding,
            stored_hash_encoding: Some(encoding),
            has_hash_count: true,
        }
    }

    /// Contract name from the artifact.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation bytecode.
    #[must_use]
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Fingerprint argument type.
    #[must_use]
    pub fn encoding(&self) -> FingerprintEncoding {
        self.encoding
    }

    /// Calldata for `storeHash`.
    #[must_use]
    pub fn store_calldata(&self, fingerprint: &Fingerprint) -> Vec<u8> {
        let signature = format!("storeHash({})", self.encoding.abi_type());
        abi::encode_call(&signature, &[self.encoding.token(fingerprint)])
    }

    /// Calldata for `verifyHash`.
    #[must_use]
    pub fn verify_calldata(&self, fingerprint: &Fingerprint) -> Vec<u8> {
        let signature = format!("verifyHash({})", self.encoding.abi_type());
        abi::encode_call(&signature, &[self.encoding.token(fingerprint)])
    }

    /// Calldata for `getHashCount`, if the contract has it.
    #[must_use]
    pub fn hash_count_calldata(&self) -> Option<Vec<u8>> {
        self.has_hash_count
            .then(|| abi::encode_call("getHashCount()", &[]))
    }

    /// Calldata for `getHash(index)` and the return type, if the contract has it.
    #[must_use]
    pub fn hash_at_calldata(&self, index: U256) -> Option<(Vec<u8>, FingerprintEncoding)> {
        self.stored_hash_encoding.map(|encoding| {
            (
                abi::encode_call("getHash(uint256)", &[Token::Uint(index)]),
                encoding,
            )
        })
    }
}
