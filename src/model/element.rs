//! Graph elements: typed nodes with embedded edge lists.

use super::attributes::Attributes;
use super::identifiers::{EdgeName, EdgeRef, NodeId, NodeKind};
use clap::ValueEnum;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key of the kind tag in an output record.
pub const TYPE_KEY: &str = "__type";

/// Key of the nested attribute mapping in [`RecordLayout::Nested`] records.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// How attributes are placed in an output record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordLayout {
    /// Attributes live under an `attributes` sub-mapping
    #[default]
    Nested,
    /// Attributes are merged into the top level of the record
    #[value(alias = "flat")]
    Inline,
}

impl std::str::FromStr for RecordLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nested" => Ok(Self::Nested),
            "inline" | "flat" => Ok(Self::Inline),
            other => Err(format!("unknown record layout '{other}' (expected nested or inline)")),
        }
    }
}

/// One node of the projected graph.
///
/// Relationships are carried as named lists of [`EdgeRef`]s on the source
/// node rather than as standalone edge objects. Targets are not required to
/// exist among the elements of the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphElement {
    kind: NodeKind,
    id: NodeId,
    attributes: Attributes,
    edges: IndexMap<EdgeName, Vec<EdgeRef>>,
}

impl GraphElement {
    /// Create a node of `kind` identified by `key`, with no attributes or edges.
    pub fn new(kind: NodeKind, key: impl AsRef<str>) -> Self {
        Self {
            kind,
            id: NodeId::new(kind, key),
            attributes: Attributes::new(),
            edges: IndexMap::new(),
        }
    }

    /// Set the attribute mapping.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Mutable access for projectors while the node is still being built.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    #[must_use]
    pub const fn edges(&self) -> &IndexMap<EdgeName, Vec<EdgeRef>> {
        &self.edges
    }

    /// Edge list stored under `name`, if the node carries one.
    #[must_use]
    pub fn edge_list(&self, name: EdgeName) -> Option<&[EdgeRef]> {
        self.edges.get(&name).map(Vec::as_slice)
    }

    /// Make sure an edge list named `name` exists, even if it stays empty.
    pub fn ensure_edge_list(&mut self, name: EdgeName) {
        self.edges.entry(name).or_default();
    }

    /// Append an edge to `target_kind`/`target_key` under `name`.
    pub fn add_edge(
        &mut self,
        name: EdgeName,
        target_kind: NodeKind,
        target_key: impl AsRef<str>,
    ) {
        self.edges
            .entry(name)
            .or_default()
            .push(EdgeRef::new(target_kind, target_key));
    }

    /// Total number of edges across all lists.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Render the node as a loader record.
    ///
    /// Records always carry `__type`, the kind-specific id field and every
    /// edge list. With [`RecordLayout::Inline`], attribute keys that clash with
    /// those reserved keys are dropped.
    #[must_use]
    pub fn to_record(&self, layout: RecordLayout) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(TYPE_KEY.to_string(), Value::from(self.kind.label()));
        record.insert(
            self.kind.id_field().to_string(),
            Value::from(self.id.as_str()),
        );

        for (name, refs) in &self.edges {
            let list = refs
                .iter()
                .map(|r| {
                    let mut entry = Map::new();
                    entry.insert("__toId".to_string(), Value::from(r.to_id.as_str()));
                    Value::Object(entry)
                })
                .collect();
            record.insert(name.as_str().to_string(), Value::Array(list));
        }

        match layout {
            RecordLayout::Nested => {
                let attributes: Map<String, Value> = self
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                record.insert(ATTRIBUTES_KEY.to_string(), Value::Object(attributes));
            }
            RecordLayout::Inline => {
                for (key, value) in &self.attributes {
                    if record.contains_key(key) {
                        tracing::debug!(
                            "Dropping attribute '{}' of {}: clashes with a reserved record key",
                            key,
                            self.id
                        );
                        continue;
                    }
                    record.insert(key.clone(), value.clone());
                }
            }
        }

        record
    }
}

impl Serialize for GraphElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.to_record(RecordLayout::Nested);
        let mut map = serializer.serialize_map(Some(record.len()))?;
        for (key, value) in &record {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
