//! A sorted-pair keccak256 Merkle tree over claim-code sources.
//!
//! Leaves are the hashes of the source strings (see [`leaf_hash`]), sorted ascending. Each
//! parent hashes its two children in ascending order, and an odd trailing node
//! is promoted to the next layer unchanged. Proofs are therefore order-free:
//! a verifier only needs the sibling hashes, bottom-up.

use std::collections::BTreeMap;

use alloy::primitives::{hex, keccak256, B256};
use itertools::Itertools;
use serde::Serialize;

use crate::errors::ScriptError;

/// Hash two nodes in ascending order
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

/// The leaf hash of a source string. A `0x`-prefixed, even-length hex string
/// is hashed as the bytes it encodes; anything else is hashed as UTF-8 text.
pub fn leaf_hash(source: &str) -> B256 {
    match decode_hex_source(source) {
        Some(bytes) => keccak256(bytes),
        None => keccak256(source.as_bytes()),
    }
}

/// The bytes of a `0x`-prefixed hex source
fn decode_hex_source(source: &str) -> Option<Vec<u8>> {
    let digits = source.strip_prefix("0x")?;
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    hex::decode(digits).ok()
}

/// A Merkle tree, stored layer by layer from the sorted leaves up to the root
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `layers[0]` holds the leaves, the last layer holds the root
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build a tree from source strings
    pub fn from_sources<S: AsRef<str>>(sources: &[S]) -> Result<Self, ScriptError> {
        Self::from_leaves(sources.iter().map(|s| leaf_hash(s.as_ref())).collect())
    }

    /// Build a tree from leaf hashes
    pub fn from_leaves(mut leaves: Vec<B256>) -> Result<Self, ScriptError> {
        if leaves.is_empty() {
            return Err(ScriptError::Merkle("cannot build a tree without leaves".to_string()));
        }
        leaves.sort();

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    [odd] => *odd,
                    _ => unreachable!("chunks of two"),
                })
                .collect_vec();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    /// The root of the tree
    pub fn root(&self) -> B256 {
        // Construction guarantees a non-empty top layer
        self.layers.last().and_then(|layer| layer.first()).copied().unwrap_or_default()
    }

    /// The sorted leaves
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    /// The proof of a leaf: its sibling hashes, bottom-up
    pub fn proof(&self, leaf: &B256) -> Result<Vec<B256>, ScriptError> {
        let mut index = self
            .leaves()
            .binary_search(leaf)
            .map_err(|_| ScriptError::Merkle(format!("{leaf:#x} is not a leaf of the tree")))?;

        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            // A promoted odd node has no sibling on this layer
            if let Some(hash) = layer.get(sibling) {
                proof.push(*hash);
            }
            index /= 2;
        }

        Ok(proof)
    }

    /// The proof of every source, keyed by source string
    pub fn proofs_by_source<S: AsRef<str>>(
        &self,
        sources: &[S],
    ) -> Result<BTreeMap<String, LeafProof>, ScriptError> {
        sources
            .iter()
            .map(|source| {
                let leaf = leaf_hash(source.as_ref());
                let proof = self.proof(&leaf)?;
                Ok((source.as_ref().to_string(), LeafProof { leaf, proof }))
            })
            .collect()
    }
}

/// A leaf and its proof, as written to the proofs file
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeafProof {
    /// The leaf hash
    pub leaf: B256,
    /// The sibling hashes, bottom-up
    pub proof: Vec<B256>,
}

/// Check a proof by folding it into the leaf with sorted pairs
pub fn verify_proof(root: B256, leaf: B256, proof: &[B256]) -> bool {
    proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling)) == root
}

/// Parse a leaves file: one source per line, blank lines ignored
pub fn parse_sources(contents: &str) -> Vec<String> {
    contents.lines().map(str::trim).filter(|line| !line.is_empty()).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: [&str; 5] = ["CODE-1", "CODE-2", "CODE-3", "CODE-4", "CODE-5"];

    #[test]
    fn test_empty_tree_is_an_error() {
        let empty: [&str; 0] = [];
        assert!(matches!(MerkleTree::from_sources(&empty), Err(ScriptError::Merkle(_))));
    }

    #[test]
    fn test_single_leaf_root_is_the_leaf() {
        let tree = MerkleTree::from_sources(&["only"]).unwrap();
        assert_eq!(tree.root(), leaf_hash("only"));
        assert!(tree.proof(&leaf_hash("only")).unwrap().is_empty());
    }

    #[test]
    fn test_two_leaf_root() {
        let tree = MerkleTree::from_sources(&["a", "b"]).unwrap();
        assert_eq!(tree.root(), hash_pair(&leaf_hash("a"), &leaf_hash("b")));
        assert_eq!(tree.root(), hash_pair(&leaf_hash("b"), &leaf_hash("a")));
    }

    #[test]
    fn test_odd_node_is_promoted() {
        let tree = MerkleTree::from_sources(&["a", "b", "c"]).unwrap();
        let leaves = tree.leaves().to_vec();

        let expected = hash_pair(&hash_pair(&leaves[0], &leaves[1]), &leaves[2]);
        assert_eq!(tree.root(), expected);

        // The promoted leaf skips a layer, so its proof is one hash long
        assert_eq!(tree.proof(&leaves[2]).unwrap(), vec![hash_pair(&leaves[0], &leaves[1])]);
    }

    #[test]
    fn test_root_is_independent_of_input_order() {
        let mut reversed = SOURCES;
        reversed.reverse();
        let a = MerkleTree::from_sources(&SOURCES).unwrap();
        let b = MerkleTree::from_sources(&reversed).unwrap();
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn test_every_proof_verifies() {
        let tree = MerkleTree::from_sources(&SOURCES).unwrap();
        for (_, entry) in tree.proofs_by_source(&SOURCES).unwrap() {
            assert!(verify_proof(tree.root(), entry.leaf, &entry.proof));
        }
    }

    #[test]
    fn test_proof_fails_against_tampered_tree() {
        let tree = MerkleTree::from_sources(&SOURCES).unwrap();
        let tampered = MerkleTree::from_sources(&["CODE-1", "CODE-2", "CODE-3", "CODE-4", "X"])
            .unwrap();

        let leaf = leaf_hash("CODE-2");
        let proof = tree.proof(&leaf).unwrap();
        assert!(verify_proof(tree.root(), leaf, &proof));
        assert!(!verify_proof(tampered.root(), leaf, &proof));
        assert!(!verify_proof(tree.root(), leaf_hash("CODE-9"), &proof));
    }

    #[test]
    fn test_unknown_leaf_has_no_proof() {
        let tree = MerkleTree::from_sources(&SOURCES).unwrap();
        assert!(tree.proof(&leaf_hash("missing")).is_err());
    }

    #[test]
    fn test_hex_sources_hash_their_bytes() {
        let address = "0x27607dF15Aa481D31dCEEdc2572ae083809f6995";
        let bytes = hex::decode(&address[2..]).unwrap();
        assert_eq!(leaf_hash(address), keccak256(&bytes));
        assert_ne!(leaf_hash(address), keccak256(address.as_bytes()));

        // Not valid hex bytes, so hashed as text
        for text in ["0x", "0xabc", "0xzz", "CODE-0x12", "abcd"] {
            assert_eq!(leaf_hash(text), keccak256(text.as_bytes()));
        }
    }

    #[test]
    fn test_parse_sources() {
        let sources = parse_sources("CODE-1\n\n  CODE-2  \r\nCODE-3\n");
        assert_eq!(sources, vec!["CODE-1", "CODE-2", "CODE-3"]);
    }
}
