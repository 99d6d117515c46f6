//! Node kinds and namespaced node identifiers.
//!
//! Every node emitted by a projector is addressed by a [`NodeId`] of the form
//! `"<Kind>_<natural-key>"`. The kind prefix keeps, for example, a component and
//! an external reference that share a natural key from colliding, and lets the
//! downstream loader resolve edge targets by plain string equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four node kinds a projector can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Component,
    Vulnerability,
    Reference,
}

impl NodeKind {
    /// Label used for the `__type` tag and as the id prefix.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Component => "Component",
            Self::Vulnerability => "Vulnerability",
            Self::Reference => "Reference",
        }
    }

    /// Name of the kind-specific identifier field in an output record.
    #[must_use]
    pub const fn id_field(&self) -> &'static str {
        match self {
            Self::Document => "__document_id",
            Self::Component => "__component_id",
            Self::Vulnerability => "__vulnerability_id",
            Self::Reference => "__reference_id",
        }
    }

    /// All node kinds, in output order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Document,
            Self::Component,
            Self::Vulnerability,
            Self::Reference,
        ]
    }

    /// Look up a kind by its label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.label() == label)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Namespaced node identifier: `"<Kind>_<natural-key>"`.
///
/// The natural key is carried verbatim, including any characters that are
/// significant in the source format (`pkg:npm/foo@1.0.0`, `urn:uuid:...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build the identifier for a node of `kind` with the given natural key.
    pub fn new(kind: NodeKind, key: impl AsRef<str>) -> Self {
        Self(format!("{}_{}", kind.label(), key.as_ref()))
    }

    /// Split an identifier back into its kind and natural key.
    ///
    /// Returns `None` when the string does not start with a known kind label
    /// followed by `_`.
    #[must_use]
    pub fn parse(value: &str) -> Option<(NodeKind, &str)> {
        let (label, key) = value.split_once('_')?;
        NodeKind::from_label(label).map(|kind| (kind, key))
    }

    /// Check that this identifier is syntactically well formed.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        Self::parse(&self.0).is_some()
    }

    /// The kind encoded in the prefix.
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        Self::parse(&self.0).map(|(kind, _)| kind)
    }

    /// The natural key portion, without the kind prefix.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        Self::parse(&self.0).map(|(_, key)| key)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Names of the edge lists a node can carry.
///
/// The set is closed: projectors can only attach edges under one of these
/// names, so the downstream loader sees a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeName {
    /// Document → described components (CycloneDX, SPDX seed and `DESCRIBES`)
    Describes,
    /// Component → its external references
    References,
    /// CycloneDX dependency graph: component → components it depends on
    DependsOn,
    /// Vulnerability → affected components
    Affects,
    /// Component → nested components, or SPDX `CONTAINS`
    Contains,
    /// SPDX `DEPENDS_ON`
    SpdxDependsOn,
    /// SPDX `DEPENDENCY_OF`
    DependencyOf,
    /// SPDX `DESCRIBED_BY`
    DescribedBy,
}

impl EdgeName {
    /// Key under which the edge list appears in an output record.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Describes => "describes",
            Self::References => "references",
            Self::DependsOn => "dependsOn",
            Self::Affects => "affects",
            Self::Contains => "contains",
            Self::SpdxDependsOn => "depends_on",
            Self::DependencyOf => "dependency_of",
            Self::DescribedBy => "described_by",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Describes,
            Self::References,
            Self::DependsOn,
            Self::Affects,
            Self::Contains,
            Self::SpdxDependsOn,
            Self::DependencyOf,
            Self::DescribedBy,
        ]
    }

    /// Check whether a record key is one of the edge-list names.
    #[must_use]
    pub fn is_edge_key(key: &str) -> bool {
        Self::all().iter().any(|e| e.as_str() == key)
    }
}

impl fmt::Display for EdgeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an embedded edge list: `{ "__toId": "<Kind>_<key>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    #[serde(rename = "__toId")]
    pub to_id: NodeId,
}

impl EdgeRef {
    pub fn new(kind: NodeKind, key: impl AsRef<str>) -> Self {
        Self {
            to_id: NodeId::new(kind, key),
        }
    }
}
