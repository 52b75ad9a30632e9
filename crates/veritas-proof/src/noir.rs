//! Proof blobs and verification keys in the Groth16-style layout emitted by
//! the Noir toolchain.
//!
//! `Raw*` types are the wire form (hex strings, arbitrary arity) and are
//! what callers submit. Parsing them into the typed forms performs the
//! shape check: correct arity, and every element a valid field element.

use serde::{Deserialize, Serialize};

use veritas_core::Bytes32;
use veritas_crypto::content_hash;

use crate::error::ProofError;
use crate::field::FieldElement;

/// Proof blob as submitted: `{a: [2], b: [[2],[2]], c: [2]}` of hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProof {
    pub a: Vec<String>,
    pub b: Vec<Vec<String>>,
    pub c: Vec<String>,
}

/// A structurally valid proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoirProof {
    pub a: [FieldElement; 2],
    pub b: [[FieldElement; 2]; 2],
    pub c: [FieldElement; 2],
}

fn parse_pair(
    label: &str,
    values: &[String],
    err: fn(String) -> ProofError,
) -> Result<[FieldElement; 2], ProofError> {
    if values.len() != 2 {
        return Err(err(format!(
            "{} must have 2 elements, got {}",
            label,
            values.len()
        )));
    }
    let first = FieldElement::from_hex(&values[0]).map_err(|e| err(format!("{}[0]: {}", label, e)))?;
    let second =
        FieldElement::from_hex(&values[1]).map_err(|e| err(format!("{}[1]: {}", label, e)))?;
    Ok([first, second])
}

fn parse_pair_of_pairs(
    label: &str,
    values: &[Vec<String>],
    err: fn(String) -> ProofError,
) -> Result<[[FieldElement; 2]; 2], ProofError> {
    if values.len() != 2 {
        return Err(err(format!(
            "{} must have 2 rows, got {}",
            label,
            values.len()
        )));
    }
    Ok([
        parse_pair(&format!("{}[0]", label), &values[0], err)?,
        parse_pair(&format!("{}[1]", label), &values[1], err)?,
    ])
}

fn pair_to_raw(pair: &[FieldElement; 2]) -> Vec<String> {
    pair.iter().map(FieldElement::to_hex).collect()
}

impl NoirProof {
    /// Shape-check a submitted proof.
    pub fn from_raw(raw: &RawProof) -> Result<Self, ProofError> {
        Ok(Self {
            a: parse_pair("a", &raw.a, ProofError::MalformedProof)?,
            b: parse_pair_of_pairs("b", &raw.b, ProofError::MalformedProof)?,
            c: parse_pair("c", &raw.c, ProofError::MalformedProof)?,
        })
    }

    pub fn to_raw(&self) -> RawProof {
        RawProof {
            a: pair_to_raw(&self.a),
            b: self.b.iter().map(pair_to_raw).collect(),
            c: pair_to_raw(&self.c),
        }
    }

    /// Canonical encoding: the eight elements `a0 a1 b00 b01 b10 b11 c0 c1`,
    /// 32 bytes each, big-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 * 32);
        for fe in self
            .a
            .iter()
            .chain(self.b.iter().flatten())
            .chain(self.c.iter())
        {
            out.extend_from_slice(&fe.to_be_bytes());
        }
        out
    }

    /// Content hash of the canonical encoding. This is the proof hash a
    /// submission must declare.
    pub fn content_hash(&self) -> Bytes32 {
        content_hash(&self.to_bytes())
    }
}

impl TryFrom<&RawProof> for NoirProof {
    type Error = ProofError;

    fn try_from(raw: &RawProof) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

/// Verification key as supplied by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVerificationKey {
    pub alpha: Vec<String>,
    pub beta: Vec<Vec<String>>,
    pub gamma: Vec<Vec<String>>,
    pub delta: Vec<Vec<String>>,
    pub ic: Vec<Vec<String>>,
}

/// A structurally valid verification key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    pub alpha: [FieldElement; 2],
    pub beta: [[FieldElement; 2]; 2],
    pub gamma: [[FieldElement; 2]; 2],
    pub delta: [[FieldElement; 2]; 2],
    pub ic: Vec<[FieldElement; 2]>,
}

impl VerificationKey {
    pub fn from_raw(raw: &RawVerificationKey) -> Result<Self, ProofError> {
        let err = ProofError::InvalidVerificationKey;
        if raw.ic.is_empty() {
            return Err(err("ic must not be empty".into()));
        }
        let ic = raw
            .ic
            .iter()
            .enumerate()
            .map(|(i, point)| parse_pair(&format!("ic[{}]", i), point, err))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            alpha: parse_pair("alpha", &raw.alpha, err)?,
            beta: parse_pair_of_pairs("beta", &raw.beta, err)?,
            gamma: parse_pair_of_pairs("gamma", &raw.gamma, err)?,
            delta: parse_pair_of_pairs("delta", &raw.delta, err)?,
            ic,
        })
    }

    pub fn to_raw(&self) -> RawVerificationKey {
        RawVerificationKey {
            alpha: pair_to_raw(&self.alpha),
            beta: self.beta.iter().map(pair_to_raw).collect(),
            gamma: self.gamma.iter().map(pair_to_raw).collect(),
            delta: self.delta.iter().map(pair_to_raw).collect(),
            ic: self.ic.iter().map(pair_to_raw).collect(),
        }
    }

    /// Content hash over every element in declaration order.
    pub fn content_hash(&self) -> Bytes32 {
        let mut bytes = Vec::with_capacity((14 + 2 * self.ic.len()) * 32);
        let elements = self
            .alpha
            .iter()
            .chain(self.beta.iter().flatten())
            .chain(self.gamma.iter().flatten())
            .chain(self.delta.iter().flatten())
            .chain(self.ic.iter().flatten());
        for fe in elements {
            bytes.extend_from_slice(&fe.to_be_bytes());
        }
        content_hash(&bytes)
    }
}
