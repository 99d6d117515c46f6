//! CycloneDX projector.
//!
//! Maps a decoded CycloneDX JSON document onto Document, Component, Reference
//! and Vulnerability nodes. Components are addressed by their `bom-ref`.

use crate::model::{
    flatten_with, Attributes, EdgeName, ElementSink, FlattenOptions, GraphElement, NodeKind,
};
use crate::projectors::{field_str, identity_attributes};
use crate::projectors::traits::{
    FormatConfidence, FormatDetection, ProjectError, Projector, SbomFormat,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Value of `bomFormat` that identifies a CycloneDX document.
pub const CYCLONEDX_BOM_FORMAT: &str = "CycloneDX";

/// Attribute carrying the normalized `metadata.timestamp`.
const CREATED_TIMESTAMP: &str = "created_timestamp";

/// Projector for CycloneDX SBOM documents
#[derive(Debug, Clone, Default)]
pub struct CycloneDxProjector {
    flatten: FlattenOptions,
}

impl CycloneDxProjector {
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

    /// Build the Document node from the BOM-level fields.
    fn write_bom(&self, bom: &CycloneDxBom) -> GraphElement {
        let mut document = match field_str(bom.serial_number.as_ref()) {
            Some(serial) => GraphElement::new(NodeKind::Document, serial),
            None => {
                let generated = uuid::Uuid::new_v4();
                tracing::debug!("No serialNumber, generated document id {}", generated);
                GraphElement::new(NodeKind::Document, generated.to_string())
            }
        };

        let mut attributes = Attributes::new();
        if let Some(serial) = &bom.serial_number {
            attributes.insert("serialNumber".to_string(), serial.clone());
        }
        attributes.extend(bom.fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(timestamp) = metadata_timestamp(&bom.fields) {
            attributes.insert(
                CREATED_TIMESTAMP.to_string(),
                Value::from(normalize_timestamp(timestamp)),
            );
        }

        *document.attributes_mut() = flatten_with(&attributes, &self.flatten);
        document
    }

    /// Emit Component and Reference nodes and fill the Document's `describes` list.
    fn write_components(
        &self,
        components: &[CdxComponent],
        document: &mut GraphElement,
        sink: &mut ElementSink,
    ) -> Result<(), ProjectError> {
        document.ensure_edge_list(EdgeName::Describes);
        for (position, component) in components.iter().enumerate() {
            let bom_ref = self.write_component(component, position, sink)?;
            document.add_edge(EdgeName::Describes, NodeKind::Component, bom_ref);
        }
        Ok(())
    }

    /// Emit one component, its references and any nested components.
    ///
    /// Returns the component's `bom-ref`.
    fn write_component<'a>(
        &self,
        cdx: &'a CdxComponent,
        position: usize,
        sink: &mut ElementSink,
    ) -> Result<&'a str, ProjectError> {
        let Some(bom_ref) = field_str(cdx.bom_ref.as_ref()) else {
            let context = describe_component(cdx, position);
            tracing::error!("Component {} does not contain a bom-ref", context);
            return Err(ProjectError::MissingNaturalKey {
                kind: NodeKind::Component,
                field: "bom-ref",
                context,
            });
        };

        let mut component = GraphElement::new(NodeKind::Component, bom_ref)
            .with_attributes(flatten_with(&cdx.attributes(), &self.flatten));

        let mut references = Vec::new();
        if let Some(ext_refs) = &cdx.external_references {
            component.ensure_edge_list(EdgeName::References);
            for ext_ref in ext_refs {
                let Some(url) = field_str(ext_ref.url.as_ref()) else {
                    tracing::warn!(
                        "Skipping external reference without url on component {}",
                        bom_ref
                    );
                    continue;
                };
                component.add_edge(EdgeName::References, NodeKind::Reference, url);
                references.push(
                    GraphElement::new(NodeKind::Reference, url)
                        .with_attributes(flatten_with(&ext_ref.attributes(), &self.flatten)),
                );
            }
        }

        let mut nested = ElementSink::new();
        if let Some(children) = &cdx.components {
            component.ensure_edge_list(EdgeName::Contains);
            for (child_position, child) in children.iter().enumerate() {
                let child_ref = self.write_component(child, child_position, &mut nested)?;
                component.add_edge(EdgeName::Contains, NodeKind::Component, child_ref);
            }
        }

        sink.push(component);
        sink.extend(references);
        sink.extend(nested.drain());
        Ok(bom_ref)
    }

    /// Emit one Component node per dependency entry that lists `dependsOn`.
    fn write_dependencies(
        &self,
        dependencies: &[CdxDependency],
        sink: &mut ElementSink,
    ) -> Result<(), ProjectError> {
        for (position, dep) in dependencies.iter().enumerate() {
            let Some(depends_on) = &dep.depends_on else {
                continue;
            };
            let Some(dep_ref) = field_str(dep.ref_field.as_ref()) else {
                tracing::error!("Dependency #{} does not contain a ref", position);
                return Err(ProjectError::MissingNaturalKey {
                    kind: NodeKind::Component,
                    field: "ref",
                    context: format!("in dependency #{position}"),
                });
            };

            let mut dependency = GraphElement::new(NodeKind::Component, dep_ref)
                .with_attributes(flatten_with(&dep.attributes(), &self.flatten));
            dependency.ensure_edge_list(EdgeName::DependsOn);
            for target in depends_on {
                dependency.add_edge(EdgeName::DependsOn, NodeKind::Component, target);
            }
            sink.push(dependency);
        }
        Ok(())
    }

    /// Emit Vulnerability nodes with their `affects` lists.
    fn write_vulnerabilities(&self, vulnerabilities: &[CdxVulnerability], sink: &mut ElementSink) {
        for (position, vuln) in vulnerabilities.iter().enumerate() {
            let key = field_str(vuln.id.as_ref()).or_else(|| field_str(vuln.bom_ref.as_ref()));
            let Some(key) = key else {
                tracing::warn!(
                    "Skipping vulnerability #{} without id or bom-ref",
                    position
                );
                continue;
            };

            let mut attributes = vuln.attributes();
            // Only the first rating is attached; the vulnerability's own fields win.
            if let Some(rating) = first_rating(&vuln.fields) {
                for (field, value) in rating {
                    attributes
                        .entry(field.clone())
                        .or_insert_with(|| value.clone());
                }
            }

            let mut node = GraphElement::new(NodeKind::Vulnerability, key)
                .with_attributes(flatten_with(&attributes, &self.flatten));

            if let Some(affects) = &vuln.affects {
                node.ensure_edge_list(EdgeName::Affects);
                for affect in affects {
                    match field_str(affect.ref_field.as_ref()) {
                        Some(target) => {
                            node.add_edge(EdgeName::Affects, NodeKind::Component, target);
                        }
                        None => tracing::warn!(
                            "Skipping affects entry without ref on vulnerability {}",
                            key
                        ),
                    }
                }
            }

            sink.push(node);
        }
    }
}

impl Projector for CycloneDxProjector {
    fn format(&self) -> SbomFormat {
        SbomFormat::CycloneDx
    }

    fn detect(&self, document: &Value) -> FormatDetection {
        let Some(root) = document.as_object() else {
            return FormatDetection::no_match();
        };
        let version = root.get("specVersion").and_then(Value::as_str);

        match root.get("bomFormat") {
            Some(Value::String(format)) if format == CYCLONEDX_BOM_FORMAT => {
                FormatDetection::with_confidence(FormatConfidence::CERTAIN).version(version)
            }
            Some(other) => FormatDetection::with_confidence(FormatConfidence::LOW)
                .version(version)
                .warning(format!(
                    "bomFormat is {other}, expected \"{CYCLONEDX_BOM_FORMAT}\""
                )),
            None if version.is_some() && root.contains_key("components") => {
                FormatDetection::with_confidence(FormatConfidence::MEDIUM)
                    .version(version)
                    .warning("Missing bomFormat field - might be CycloneDX")
            }
            None => FormatDetection::no_match(),
        }
    }

    fn project(&self, document: &Value) -> Result<Vec<GraphElement>, ProjectError> {
        let bom = CycloneDxBom::deserialize(document)
            .map_err(|e| ProjectError::InvalidStructure(format!("CycloneDX: {e}")))?;

        tracing::debug!("Writing bom metadata");
        let mut document = self.write_bom(&bom);

        let mut body = ElementSink::new();
        if let Some(components) = &bom.components {
            self.write_components(components, &mut document, &mut body)?;
        }
        if let Some(dependencies) = &bom.dependencies {
            self.write_dependencies(dependencies, &mut body)?;
        }
        if let Some(vulnerabilities) = &bom.vulnerabilities {
            self.write_vulnerabilities(vulnerabilities, &mut body);
        }

        let mut sink = ElementSink::new();
        sink.push(document);
        sink.extend(body.drain());

        tracing::debug!(
            "Projected CycloneDX document: {} components, {} references, {} vulnerabilities",
            sink.count_of(NodeKind::Component),
            sink.count_of(NodeKind::Reference),
            sink.count_of(NodeKind::Vulnerability)
        );
        Ok(sink.into_elements())
    }
}

/// Read `metadata.timestamp` from the BOM-level fields.
fn metadata_timestamp(fields: &Map<String, Value>) -> Option<&str> {
    fields
        .get("metadata")
        .and_then(|m| m.get("timestamp"))
        .and_then(Value::as_str)
}

/// Normalize an RFC 3339 timestamp to UTC; anything else is carried verbatim.
fn normalize_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| {
            tracing::debug!("Timestamp '{}' is not RFC 3339, copying verbatim", raw);
            raw.to_string()
        },
        |dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        },
    )
}

/// First entry of a non-empty `ratings` list.
fn first_rating(fields: &Map<String, Value>) -> Option<&Map<String, Value>> {
    fields
        .get("ratings")
        .and_then(Value::as_array)
        .and_then(|ratings| ratings.first())
        .and_then(Value::as_object)
}

fn describe_component(cdx: &CdxComponent, position: usize) -> String {
    match cdx.fields.get("name").and_then(Value::as_str) {
        Some(name) => format!("'{name}'"),
        None => format!("#{position}"),
    }
}

// CycloneDX JSON structures for deserialization.
//
// Edge-bearing collections are typed fields; everything else lands in the
// `fields` catch-all and becomes node attributes. Identity fields are typed
// too and are put back into the attributes explicitly.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    serial_number: Option<Value>,
    components: Option<Vec<CdxComponent>>,
    dependencies: Option<Vec<CdxDependency>>,
    vulnerabilities: Option<Vec<CdxVulnerability>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<Value>,
    external_references: Option<Vec<CdxExternalReference>>,
    components: Option<Vec<CdxComponent>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl CdxComponent {
    fn attributes(&self) -> Attributes {
        identity_attributes(&[("bom-ref", self.bom_ref.as_ref())], &self.fields)
    }
}

#[derive(Debug, Deserialize)]
struct CdxExternalReference {
    url: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl CdxExternalReference {
    fn attributes(&self) -> Attributes {
        identity_attributes(&[("url", self.url.as_ref())], &self.fields)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxDependency {
    #[serde(rename = "ref")]
    ref_field: Option<Value>,
    depends_on: Option<Vec<String>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl CdxDependency {
    fn attributes(&self) -> Attributes {
        identity_attributes(&[("ref", self.ref_field.as_ref())], &self.fields)
    }
}

#[derive(Debug, Deserialize)]
struct CdxVulnerability {
    id: Option<Value>,
    #[serde(rename = "bom-ref")]
    bom_ref: Option<Value>,
    affects: Option<Vec<CdxAffects>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl CdxVulnerability {
    fn attributes(&self) -> Attributes {
        identity_attributes(
            &[("id", self.id.as_ref()), ("bom-ref", self.bom_ref.as_ref())],
            &self.fields,
        )
    }
}

#[derive(Debug, Deserialize)]
struct CdxAffects {
    #[serde(rename = "ref")]
    ref_field: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeRef, NodeId};
    use serde_json::json;

    fn project(doc: Value) -> Result<Vec<GraphElement>, ProjectError> {
        CycloneDxProjector::new().project(&doc)
    }

    fn targets(refs: &[EdgeRef]) -> Vec<&str> {
        refs.iter().map(|r| r.to_id.as_str()).collect()
    }

    #[test]
    fn test_scenario_serial_component_dependency() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "serialNumber": "urn:uuid:abc",
            "components": [{"bom-ref": "c1", "name": "foo", "type": "library"}],
            "dependencies": [{"ref": "c1", "dependsOn": ["c2"]}]
        }))
        .expect("projection should succeed");

        assert_eq!(elements.len(), 3);

        let document = &elements[0];
        assert_eq!(document.id().as_str(), "Document_urn:uuid:abc");
        let describes = document.edge_list(EdgeName::Describes).expect("describes");
        assert_eq!(targets(describes), ["Component_c1"]);

        assert_eq!(elements[1].id().as_str(), "Component_c1");
        assert_eq!(elements[1].attributes().get("name"), Some(&json!("foo")));
        assert!(elements[1].edge_list(EdgeName::DependsOn).is_none());

        assert_eq!(elements[2].id().as_str(), "Component_c1");
        let depends = elements[2].edge_list(EdgeName::DependsOn).expect("dependsOn");
        assert_eq!(targets(depends), ["Component_c2"]);
    }

    #[test]
    fn test_document_attributes_exclude_collections() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.6",
            "version": 1,
            "metadata": {"timestamp": "2024-03-01T12:00:00+02:00", "tools": []},
            "components": [],
            "dependencies": [],
            "vulnerabilities": []
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        let attrs = document.attributes();
        assert!(!attrs.contains_key("components"));
        assert!(!attrs.contains_key("dependencies"));
        assert!(!attrs.contains_key("vulnerabilities"));
        assert_eq!(attrs.get("bomFormat"), Some(&json!("CycloneDX")));
        assert_eq!(attrs.get("metadata.timestamp"), Some(&json!("2024-03-01T12:00:00+02:00")));
        assert_eq!(attrs.get(CREATED_TIMESTAMP), Some(&json!("2024-03-01T10:00:00Z")));
        assert_eq!(document.edge_list(EdgeName::Describes), Some(&[][..]));
    }

    #[test]
    fn test_generated_document_id_without_serial() {
        let elements = project(json!({"bomFormat": "CycloneDX", "specVersion": "1.4"}))
            .expect("projection should succeed");
        assert_eq!(elements.len(), 1);
        let (kind, key) = NodeId::parse(elements[0].id().as_str()).expect("well formed");
        assert_eq!(kind, NodeKind::Document);
        assert!(uuid::Uuid::parse_str(key).is_ok());
    }

    #[test]
    fn test_missing_bom_ref_is_fatal() {
        let result = project(json!({
            "bomFormat": "CycloneDX",
            "components": [
                {"bom-ref": "ok", "name": "fine"},
                {"name": "left-pad"}
            ]
        }));
        match result {
            Err(ProjectError::MissingNaturalKey { kind, field, context }) => {
                assert_eq!(kind, NodeKind::Component);
                assert_eq!(field, "bom-ref");
                assert!(context.contains("left-pad"));
            }
            other => panic!("expected MissingNaturalKey, got {other:?}"),
        }
    }

    #[test]
    fn test_external_references_become_reference_nodes() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "components": [{
                "bom-ref": "pkg:npm/foo@1.0.0",
                "name": "foo",
                "externalReferences": [
                    {"type": "vcs", "url": "https://github.com/foo/foo"},
                    {"type": "website"}
                ]
            }]
        }))
        .expect("projection should succeed");

        let component = &elements[1];
        assert_eq!(component.id().as_str(), "Component_pkg:npm/foo@1.0.0");
        assert!(!component.attributes().contains_key("externalReferences"));
        let refs = component.edge_list(EdgeName::References).expect("references");
        assert_eq!(targets(refs), ["Reference_https://github.com/foo/foo"]);

        let reference = &elements[2];
        assert_eq!(reference.kind(), NodeKind::Reference);
        assert_eq!(reference.attributes().get("type"), Some(&json!("vcs")));
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn test_nested_components_are_contained_not_described() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "components": [{
                "bom-ref": "parent",
                "components": [{"bom-ref": "child"}]
            }]
        }))
        .expect("projection should succeed");

        let describes = elements[0].edge_list(EdgeName::Describes).expect("describes");
        assert_eq!(targets(describes), ["Component_parent"]);
        let contains = elements[1].edge_list(EdgeName::Contains).expect("contains");
        assert_eq!(targets(contains), ["Component_child"]);
        assert_eq!(elements[2].id().as_str(), "Component_child");
        assert!(!elements[1].attributes().contains_key("components"));
    }

    #[test]
    fn test_dependencies_without_depends_on_are_skipped() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "dependencies": [{"ref": "a"}, {"ref": "b", "dependsOn": []}]
        }))
        .expect("projection should succeed");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].id().as_str(), "Component_b");
        assert_eq!(elements[1].edge_list(EdgeName::DependsOn), Some(&[][..]));
    }

    #[test]
    fn test_dependency_without_ref_is_fatal() {
        let result = project(json!({
            "bomFormat": "CycloneDX",
            "dependencies": [{"dependsOn": ["x"]}]
        }));
        assert!(matches!(
            result,
            Err(ProjectError::MissingNaturalKey { field: "ref", .. })
        ));
    }

    #[test]
    fn test_vulnerability_first_rating_and_affects() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "vulnerabilities": [{
                "id": "CVE-2021-44228",
                "source": {"name": "NVD"},
                "ratings": [
                    {"score": 10.0, "severity": "critical", "method": "CVSSv31", "source": {"name": "other"}},
                    {"score": 9.0, "severity": "high"}
                ],
                "affects": [{"ref": "log4j-core"}, {"versions": []}]
            }]
        }))
        .expect("projection should succeed");

        let vuln = &elements[1];
        assert_eq!(vuln.id().as_str(), "Vulnerability_CVE-2021-44228");
        let attrs = vuln.attributes();
        assert_eq!(attrs.get("severity"), Some(&json!("critical")));
        assert_eq!(attrs.get("score"), Some(&json!(10.0)));
        assert_eq!(attrs.get("source.name"), Some(&json!("NVD")));
        assert_eq!(attrs.get("ratings.1.severity"), Some(&json!("high")));
        assert!(!attrs.contains_key("affects"));

        let affects = vuln.edge_list(EdgeName::Affects).expect("affects");
        assert_eq!(targets(affects), ["Component_log4j-core"]);
    }

    #[test]
    fn test_non_string_scalars_are_not_fatal() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "serialNumber": 17,
            "components": [{
                "bom-ref": "c1",
                "externalReferences": [{"type": "vcs", "url": false}]
            }],
            "vulnerabilities": [{"id": 5, "bom-ref": "vuln-1", "affects": [{"ref": 3}]}]
        }))
        .expect("projection should succeed");

        let document = &elements[0];
        let key = document.id().key().expect("well formed");
        assert!(uuid::Uuid::parse_str(key).is_ok());
        assert_eq!(document.attributes().get("serialNumber"), Some(&json!(17)));

        assert_eq!(
            elements[1].edge_list(EdgeName::References).map(<[EdgeRef]>::len),
            Some(0)
        );
        let vuln = &elements[2];
        assert_eq!(vuln.id().as_str(), "Vulnerability_vuln-1");
        assert_eq!(vuln.attributes().get("id"), Some(&json!(5)));
        assert_eq!(vuln.edge_list(EdgeName::Affects).map(<[EdgeRef]>::len), Some(0));
    }

    #[test]
    fn test_vulnerability_key_falls_back_to_bom_ref() {
        let elements = project(json!({
            "bomFormat": "CycloneDX",
            "vulnerabilities": [{"bom-ref": "vuln-1"}, {"description": "no key"}]
        }))
        .expect("projection should succeed");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].id().as_str(), "Vulnerability_vuln-1");
    }

    #[test]
    fn test_wrong_collection_shape_is_invalid_structure() {
        let result = project(json!({"bomFormat": "CycloneDX", "components": {"bom-ref": "x"}}));
        assert!(matches!(result, Err(ProjectError::InvalidStructure(_))));
    }

    #[test]
    fn test_detect() {
        let projector = CycloneDxProjector::new();
        let certain = projector.detect(&json!({"bomFormat": "CycloneDX", "specVersion": "1.5"}));
        assert_eq!(certain.confidence, FormatConfidence::CERTAIN);
        assert_eq!(certain.version.as_deref(), Some("1.5"));

        let other = projector.detect(&json!({"bomFormat": "Other"}));
        assert_eq!(other.confidence, FormatConfidence::LOW);
        assert!(!other.warnings.is_empty());

        let none = projector.detect(&json!(["not", "an", "object"]));
        assert_eq!(none.confidence, FormatConfidence::NONE);
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp("2024-01-01T00:00:00Z"), "2024-01-01T00:00:00Z");
        assert_eq!(normalize_timestamp("yesterday"), "yesterday");
    }
}
