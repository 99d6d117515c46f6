//! SPDX JSON projector.
//!
//! SPDX documents have no stable document identifier, so the Document node
//! always gets a generated UUID. Packages are addressed by their `SPDXID`;
//! relationships are attached to the Document node.

use crate::model::{
    attributes_excluding, flatten_with, Attributes, EdgeName, ElementSink, FlattenOptions,
    GraphElement, NodeKind,
};
use crate::projectors::{field_str, identity_attributes};
use crate::projectors::traits::{
    FormatConfidence, FormatDetection, ProjectError, Projector, SbomFormat,
};
use packageurl::PackageUrl;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Top-level keys that never become Document attributes.
const DOCUMENT_EXCLUDED: &[&str] = &["packages", "relationships", "creationInfo"];

/// SPDX relationship types that are projected onto the Document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipType {
    Describes,
    DependsOn,
    DependencyOf,
    DescribedBy,
    Contains,
}

impl RelationshipType {
    /// Edge list the relationship lands in, and the kind of its target.
    #[must_use]
    pub const fn edge(&self) -> (EdgeName, NodeKind) {
        match self {
            Self::Describes => (EdgeName::Describes, NodeKind::Reference),
            Self::DependsOn => (EdgeName::SpdxDependsOn, NodeKind::Component),
            Self::DependencyOf => (EdgeName::DependencyOf, NodeKind::Component),
            Self::DescribedBy => (EdgeName::DescribedBy, NodeKind::Component),
            Self::Contains => (EdgeName::Contains, NodeKind::Component),
        }
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DESCRIBES" => Ok(Self::Describes),
            "DEPENDS_ON" => Ok(Self::DependsOn),
            "DEPENDENCY_OF" => Ok(Self::DependencyOf),
            "DESCRIBED_BY" => Ok(Self::DescribedBy),
            "CONTAINS" => Ok(Self::Contains),
            other => Err(format!("unsupported relationship type '{other}'")),
        }
    }
}

/// Projector for SPDX JSON documents
#[derive(Debug, Clone, Default)]
pub struct SpdxProjector {
    flatten: FlattenOptions,
}

impl SpdxProjector {
    /// Create a projector with default flattening options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a projector with custom flattening options
    #[must_use]
    pub const fn with_options(flatten: FlattenOptions) -> Self {
        Self { flatten }
    }

    /// Build the Document node from top-level fields merged with `creationInfo`.
    fn write_bom(&self, root: &Map<String, Value>, doc: &SpdxDocument) -> GraphElement {
        let mut document =
            GraphElement::new(NodeKind::Document, uuid::Uuid::new_v4().to_string());

        let mut attributes = attributes_excluding(root, DOCUMENT_EXCLUDED);
        if let Some(creation_info) = &doc.creation_info {
            for (key, value) in creation_info {
                if attributes.contains_key(key) {
                    tracing::warn!(
                        "creationInfo field '{}' overrides the top-level value",
                        key
                    );
                }
                attributes.insert(key.clone(), value.clone());
            }
        }
        rename(&mut attributes, "spdxVersion", "specVersion");
        rename(&mut attributes, "created", "createdTimestamp");
        attributes.insert("bomFormat".to_string(), Value::from("SPDX"));

        if let Some(packages) = &doc.packages {
            document.ensure_edge_list(EdgeName::Describes);
            for (position, package) in packages.iter().enumerate() {
                match field_str(package.name.as_ref()) {
                    Some(name) => {
                        document.add_edge(EdgeName::Describes, NodeKind::Component, name);
                    }
                    None => tracing::warn!(
                        "Package #{} has no name, not adding it to describes",
                        position
                    ),
                }
            }
        }

        *document.attributes_mut() = flatten_with(&attributes, &self.flatten);
        document
    }

    /// Emit one Component node per package, each followed by its Reference nodes.
    fn write_packages(
        &self,
        packages: &[SpdxPackage],
        sink: &mut ElementSink,
    ) -> Result<(), ProjectError> {
        for (position, package) in packages.iter().enumerate() {
            let Some(spdx_id) = field_str(package.spdx_id.as_ref()) else {
                let context = match field_str(package.name.as_ref()) {
                    Some(name) => format!("'{name}'"),
                    None => format!("#{position}"),
                };
                tracing::error!("Package {} does not contain an SPDXID", context);
                return Err(ProjectError::MissingNaturalKey {
                    kind: NodeKind::Component,
                    field: "SPDXID",
                    context,
                });
            };

            let mut attributes = package.attributes();
            let mut component = GraphElement::new(NodeKind::Component, spdx_id);
            let mut references = Vec::new();

            if let Some(ext_refs) = &package.external_refs {
                component.ensure_edge_list(EdgeName::References);
                for ext_ref in ext_refs {
                    let Some(locator) = field_str(ext_ref.reference_locator.as_ref()) else {
                        tracing::warn!(
                            "Skipping external ref without referenceLocator on package {}",
                            spdx_id
                        );
                        continue;
                    };

                    if field_str(ext_ref.reference_type.as_ref()) == Some("purl")
                        && !attributes.contains_key("purl")
                    {
                        if let Err(e) = PackageUrl::from_str(locator) {
                            tracing::warn!(
                                "Package {} has a purl locator that does not parse ({}): {}",
                                spdx_id,
                                e,
                                locator
                            );
                        }
                        attributes.insert("purl".to_string(), Value::from(locator));
                    }

                    component.add_edge(EdgeName::References, NodeKind::Reference, locator);
                    references.push(
                        GraphElement::new(NodeKind::Reference, locator)
                            .with_attributes(flatten_with(&ext_ref.attributes(), &self.flatten)),
                    );
                }
            }

            *component.attributes_mut() = flatten_with(&attributes, &self.flatten);
            sink.push(component);
            sink.extend(references);
        }
        Ok(())
    }

    /// Attach relationships to the Document node.
    fn write_relationships(&self, relationships: &[SpdxRelationship], document: &mut GraphElement) {
        for relationship in relationships {
            let raw_type = match &relationship.relationship_type {
                None => {
                    tracing::warn!("Skipping relationship without relationshipType");
                    continue;
                }
                Some(Value::String(raw_type)) => raw_type.as_str(),
                Some(other) => {
                    tracing::warn!(
                        "Dropping relationship: relationshipType {} is not a string",
                        other
                    );
                    continue;
                }
            };
            let relationship_type = match raw_type.parse::<RelationshipType>() {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("Dropping relationship: {}", e);
                    continue;
                }
            };
            let Some(target) = field_str(relationship.related_spdx_element.as_ref()) else {
                tracing::warn!(
                    "Skipping {} relationship without relatedSpdxElement",
                    raw_type
                );
                continue;
            };

            let (edge, target_kind) = relationship_type.edge();
            document.add_edge(edge, target_kind, target);
        }
    }
}

impl Projector for SpdxProjector {
    fn format(&self) -> SbomFormat {
        SbomFormat::Spdx
    }

    fn detect(&self, document: &Value) -> FormatDetection {
        let Some(root) = document.as_object() else {
            return FormatDetection::no_match();
        };
        let version = root.get("spdxVersion").and_then(Value::as_str);

        if root.contains_key("SPDXID") {
            FormatDetection::with_confidence(FormatConfidence::CERTAIN).version(version)
        } else if root.contains_key("spdxVersion") || root.contains_key("creationInfo") {
            FormatDetection::with_confidence(FormatConfidence::MEDIUM)
                .version(version)
                .warning("Missing SPDXID field - might be SPDX")
        } else {
            FormatDetection::no_match()
        }
    }

    fn project(&self, document: &Value) -> Result<Vec<GraphElement>, ProjectError> {
        let root = document.as_object().ok_or_else(|| {
            ProjectError::InvalidStructure("SPDX: document root is not an object".to_string())
        })?;
        let doc = SpdxDocument::deserialize(document)
            .map_err(|e| ProjectError::InvalidStructure(format!("SPDX: {e}")))?;

        tracing::debug!("Writing bom metadata");
        let mut document = self.write_bom(root, &doc);

        let mut body = ElementSink::new();
        if let Some(packages) = &doc.packages {
            self.write_packages(packages, &mut body)?;
        }
        if let Some(relationships) = &doc.relationships {
            self.write_relationships(relationships, &mut document);
        }

        let mut sink = ElementSink::new();
        sink.push(document);
        sink.extend(body.drain());

        tracing::debug!(
            "Projected SPDX document: {} packages, {} references",
            sink.count_of(NodeKind::Component),
            sink.count_of(NodeKind::Reference)
        );
        Ok(sink.into_elements())
    }
}

/// Move the value under `from` to `to`, if present.
fn rename(attributes: &mut Attributes, from: &str, to: &str) {
    if let Some(value) = attributes.shift_remove(from) {
        attributes.insert(to.to_string(), value);
    }
}

// SPDX JSON structures for deserialization

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    creation_info: Option<Map<String, Value>>,
    packages: Option<Vec<SpdxPackage>>,
    relationships: Option<Vec<SpdxRelationship>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: Option<Value>,
    name: Option<Value>,
    external_refs: Option<Vec<SpdxExternalRef>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl SpdxPackage {
    fn attributes(&self) -> Attributes {
        identity_attributes(
            &[("SPDXID", self.spdx_id.as_ref()), ("name", self.name.as_ref())],
            &self.fields,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_type: Option<Value>,
    reference_locator: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl SpdxExternalRef {
    fn attributes(&self) -> Attributes {
        identity_attributes(
            &[
                ("referenceType", self.reference_type.as_ref()),
                ("referenceLocator", self.reference_locator.as_ref()),
            ],
            &self.fields,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    relationship_type: Option<Value>,
    related_spdx_element: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeRef;
    use serde_json::json;

    fn project(doc: Value) -> Result<Vec<GraphElement>, ProjectError> {
        SpdxProjector::new().project(&doc)
    }

    fn targets(refs: &[EdgeRef]) -> Vec<&str> {
        refs.iter().map(|r| r.to_id.as_str()).collect()
    }

    #[test]
    fn test_scenario_package_and_depends_on() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "spdxVersion": "SPDX-2.3",
            "packages": [{"SPDXID": "SPDXRef-p1", "name": "p1"}],
            "relationships": [{
                "spdxElementId": "SPDXRef-p1",
                "relationshipType": "DEPENDS_ON",
                "relatedSpdxElement": "SPDXRef-p2"
            }]
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        assert_eq!(document.kind(), NodeKind::Document);
        let depends = document.edge_list(EdgeName::SpdxDependsOn).expect("depends_on");
        assert_eq!(targets(depends), ["Component_SPDXRef-p2"]);
        assert!(elements
            .iter()
            .any(|e| e.id().as_str() == "Component_SPDXRef-p1"));
    }

    #[test]
    fn test_document_attributes_merge_creation_info() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "spdxVersion": "SPDX-2.3",
            "name": "top-level",
            "creationInfo": {
                "created": "2024-01-01T00:00:00Z",
                "creators": ["Tool: syft"],
                "name": "from-creation-info"
            },
            "packages": [{"SPDXID": "SPDXRef-a", "name": "a"}, {"SPDXID": "SPDXRef-b"}]
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        let attrs = document.attributes();
        assert_eq!(attrs.get("specVersion"), Some(&json!("SPDX-2.3")));
        assert_eq!(attrs.get("createdTimestamp"), Some(&json!("2024-01-01T00:00:00Z")));
        assert_eq!(attrs.get("bomFormat"), Some(&json!("SPDX")));
        assert_eq!(attrs.get("name"), Some(&json!("from-creation-info")));
        assert_eq!(attrs.get("creators.0"), Some(&json!("Tool: syft")));
        assert!(!attrs.contains_key("spdxVersion"));
        assert!(!attrs.contains_key("created"));
        assert!(!attrs.contains_key("packages"));
        assert!(!attrs.contains_key("creationInfo"));

        let describes = document.edge_list(EdgeName::Describes).expect("describes");
        assert_eq!(targets(describes), ["Component_a"]);

        let key = document.id().key().expect("well formed");
        assert!(uuid::Uuid::parse_str(key).is_ok());
    }

    #[test]
    fn test_package_without_spdxid_is_fatal() {
        let result = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{"name": "orphan"}]
        }));
        match result {
            Err(ProjectError::MissingNaturalKey { field, context, .. }) => {
                assert_eq!(field, "SPDXID");
                assert_eq!(context, "'orphan'");
            }
            other => panic!("expected MissingNaturalKey, got {other:?}"),
        }
    }

    #[test]
    fn test_external_refs_and_first_purl() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{
                "SPDXID": "SPDXRef-lodash",
                "name": "lodash",
                "externalRefs": [
                    {"referenceCategory": "SECURITY", "referenceType": "cpe23Type",
                     "referenceLocator": "cpe:2.3:a:lodash:lodash:4.17.21:*:*:*:*:*:*:*"},
                    {"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl",
                     "referenceLocator": "pkg:npm/lodash@4.17.21"},
                    {"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl",
                     "referenceLocator": "pkg:npm/lodash@4.17.20"},
                    {"referenceType": "purl"}
                ]
            }]
        }))
        .expect("projection should succeed");

        let component = &elements[1];
        assert_eq!(component.id().as_str(), "Component_SPDXRef-lodash");
        assert_eq!(component.attributes().get("purl"), Some(&json!("pkg:npm/lodash@4.17.21")));
        assert!(!component.attributes().contains_key("externalRefs"));
        let refs = component.edge_list(EdgeName::References).expect("references");
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[1].to_id.as_str(), "Reference_pkg:npm/lodash@4.17.21");

        assert_eq!(elements.len(), 5);
        assert!(elements[2..].iter().all(|e| e.kind() == NodeKind::Reference));
        assert_eq!(
            elements[2].attributes().get("referenceCategory"),
            Some(&json!("SECURITY"))
        );
    }

    #[test]
    fn test_unparseable_purl_is_still_carried() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{
                "SPDXID": "SPDXRef-x",
                "externalRefs": [{"referenceType": "purl", "referenceLocator": "not a purl"}]
            }]
        }))
        .expect("projection should succeed");
        assert_eq!(elements[1].attributes().get("purl"), Some(&json!("not a purl")));
    }

    #[test]
    fn test_relationship_dispatch() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "relationships": [
                {"relationshipType": "DESCRIBES", "relatedSpdxElement": "SPDXRef-root"},
                {"relationshipType": "DEPENDENCY_OF", "relatedSpdxElement": "SPDXRef-a"},
                {"relationshipType": "DESCRIBED_BY", "relatedSpdxElement": "SPDXRef-b"},
                {"relationshipType": "CONTAINS", "relatedSpdxElement": "SPDXRef-c"},
                {"relationshipType": "GENERATED_FROM", "relatedSpdxElement": "SPDXRef-d"},
                {"relationshipType": "DEPENDS_ON"}
            ]
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        let list = |name| targets(document.edge_list(name).expect("edge list"));
        assert_eq!(list(EdgeName::Describes), ["Reference_SPDXRef-root"]);
        assert_eq!(list(EdgeName::DependencyOf), ["Component_SPDXRef-a"]);
        assert_eq!(list(EdgeName::DescribedBy), ["Component_SPDXRef-b"]);
        assert_eq!(list(EdgeName::Contains), ["Component_SPDXRef-c"]);
        assert!(document.edge_list(EdgeName::SpdxDependsOn).is_none());
        assert_eq!(document.edge_count(), 4);
    }

    #[test]
    fn test_non_string_scalars_are_not_fatal() {
        let elements = project(json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{
                "SPDXID": "SPDXRef-p1",
                "name": 42,
                "externalRefs": [{"referenceType": ["purl"], "referenceLocator": "pkg:npm/p1@1"}]
            }],
            "relationships": [
                {"relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-p2"},
                {"relationshipType": 7, "relatedSpdxElement": "SPDXRef-x"},
                {"relationshipType": "CONTAINS", "relatedSpdxElement": {"id": "SPDXRef-y"}}
            ]
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        assert_eq!(
            targets(document.edge_list(EdgeName::SpdxDependsOn).expect("depends_on")),
            ["Component_SPDXRef-p2"]
        );
        assert!(document.edge_list(EdgeName::Contains).is_none());
        assert_eq!(
            document.edge_list(EdgeName::Describes).map(<[EdgeRef]>::len),
            Some(0)
        );

        let component = &elements[1];
        assert_eq!(component.id().as_str(), "Component_SPDXRef-p1");
        assert_eq!(component.attributes().get("name"), Some(&json!(42)));
        assert!(!component.attributes().contains_key("purl"));
        assert_eq!(
            elements[2].attributes().get("referenceType.0"),
            Some(&json!("purl"))
        );
    }

    #[test]
    fn test_detect() {
        let projector = SpdxProjector::new();
        let certain =
            projector.detect(&json!({"SPDXID": "SPDXRef-DOCUMENT", "spdxVersion": "SPDX-2.3"}));
        assert_eq!(certain.confidence, FormatConfidence::CERTAIN);
        assert_eq!(certain.version.as_deref(), Some("SPDX-2.3"));

        let hint = projector.detect(&json!({"spdxVersion": "SPDX-2.3"}));
        assert_eq!(hint.confidence, FormatConfidence::MEDIUM);
        assert_eq!(hint.warnings.len(), 1);

        let none = projector.detect(&json!({"bomFormat": "CycloneDX"}));
        assert_eq!(none.confidence, FormatConfidence::NONE);
    }

    #[test]
    fn test_relationship_type_parse() {
        assert_eq!(
            "DEPENDS_ON".parse::<RelationshipType>(),
            Ok(RelationshipType::DependsOn)
        );
        assert!("depends_on".parse::<RelationshipType>().is_err());
    }
}
