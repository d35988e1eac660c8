//! Chain configuration: the ordered list of backend identifiers.
//!
//! The chain is defined by a single configuration value (a comma-separated
//! list of identifiers), parsed once at initialisation and immutable for the
//! lifetime of the dispatcher. Identifier validity is not checked here;
//! an unknown identifier simply misses at resolution time and is skipped.

use serde::{Deserialize, Serialize};

/// Well-known configuration key holding the chain definition.
pub const CHAIN_KEY: &str = "chain";

/// Ordered list of backend identifiers, tried in definition order.
///
/// Built from the raw configuration value by splitting on `,`. Segments are
/// kept verbatim, without trimming or de-duplication, so a malformed segment
/// surfaces as a resolution miss rather than a parse error. An empty or missing value yields an empty chain,
/// which is legal: dispatch then always falls back to the empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(Vec<String>);

impl Chain {
    /// Parse a chain from the raw `chain` configuration value.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self(Vec::new());
        }
        Self(value.split(',').map(str::to_owned).collect())
    }

    /// Parse a chain from an optional configuration value.
    ///
    /// A missing value is treated the same as an empty one.
    pub fn from_config(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the identifiers in try order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Chain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Host-facing carrier of the [`CHAIN_KEY`] configuration value.
///
/// Hosts that load their configuration through serde can embed this struct
/// directly; the raw string stays available for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Comma-separated backend identifiers, in try order.
    #[serde(default)]
    pub chain: String,
}

impl ChainConfig {
    /// The parsed chain this configuration defines.
    pub fn parsed(&self) -> Chain {
        Chain::parse(&self.chain)
    }
}
