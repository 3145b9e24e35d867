use super::analyze_each;
use crate::ports::outbound::{AnalyzedFile, Analyzer, ManifestFile};
use crate::sca_engine::domain::{DependencyIdentity, Language, RawDependencies};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::collections::HashMap;

const DEPENDS_ON: &str = "DEPENDS_ON";

/// One package as read from either SPDX serialization
#[derive(Debug, Default)]
struct SpdxPackage {
    spdx_id: String,
    supplier: String,
    name: String,
    version: String,
    purl: Option<String>,
}

impl SpdxPackage {
    fn identity(&self) -> DependencyIdentity {
        let language = self
            .purl
            .as_deref()
            .map(Language::from_purl)
            .unwrap_or(Language::Sbom);
        let vendor = self.supplier.trim_start_matches("Organization:").trim();
        DependencyIdentity::new(vendor, &self.name, &self.version, language)
    }
}

/// Turns packages plus `DEPENDS_ON` pairs into raw dependencies.
///
/// Relationships naming an unknown element are skipped.
fn to_raw(
    path: &str,
    packages: &[SpdxPackage],
    relationships: &[(String, String)],
) -> RawDependencies {
    let mut raw = RawDependencies::new(path);
    let mut by_id: HashMap<&str, DependencyIdentity> = HashMap::new();
    for pkg in packages {
        let identity = pkg.identity();
        raw.add_package(identity.clone());
        by_id.insert(&pkg.spdx_id, identity);
    }

    for (element, related) in relationships {
        match (by_id.get(element.as_str()), by_id.get(related.as_str())) {
            (Some(parent), Some(child)) => raw.add_edge(parent.clone(), child.clone()),
            _ => tracing::debug!(
                path,
                element = %element,
                related = %related,
                "relationship references unknown element"
            ),
        }
    }
    raw
}

/// SpdxTagValueAnalyzer for `*.spdx` tag-value documents
pub struct SpdxTagValueAnalyzer;

impl SpdxTagValueAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let mut packages: Vec<SpdxPackage> = Vec::new();
        let mut relationships = Vec::new();

        for line in file.content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((tag, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match tag.trim() {
                "PackageName" => packages.push(SpdxPackage {
                    name: value.to_string(),
                    ..SpdxPackage::default()
                }),
                "Relationship" => {
                    if let Some((element, related)) = value.split_once(DEPENDS_ON) {
                        let pair = (element.trim().to_string(), related.trim().to_string());
                        relationships.push(pair);
                    }
                }
                tag => {
                    // Package tags before the first PackageName belong to the document
                    let Some(pkg) = packages.last_mut() else {
                        continue;
                    };
                    match tag {
                        "SPDXID" => pkg.spdx_id = value.to_string(),
                        "PackageVersion" => pkg.version = value.to_string(),
                        "PackageSupplier" => pkg.supplier = value.to_string(),
                        "ExternalRef" => {
                            let words: Vec<&str> = value.split_whitespace().collect();
                            if let [.., kind, locator] = words.as_slice() {
                                if *kind == "purl" {
                                    pkg.purl = Some(locator.to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if packages.is_empty() {
            return Err(ScaError::parse(&file.relpath, "no PackageName entries"));
        }
        Ok(to_raw(&file.relpath, &packages, &relationships))
    }
}

#[async_trait]
impl Analyzer for SpdxTagValueAnalyzer {
    fn name(&self) -> &'static str {
        "spdx"
    }

    fn language(&self) -> Language {
        Language::Sbom
    }

    fn can_handle(&self, path: &str) -> bool {
        path.ends_with(".spdx")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxJsonDocument {
    spdx_version: String,
    #[serde(default)]
    packages: Vec<SpdxJsonPackage>,
    #[serde(default)]
    relationships: Vec<SpdxJsonRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxJsonPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: String,
    #[serde(default)]
    version_info: String,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    external_refs: Vec<SpdxExternalRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_type: String,
    reference_locator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxJsonRelationship {
    spdx_element_id: String,
    related_spdx_element: String,
    relationship_type: String,
}

/// SpdxJsonAnalyzer for `*.spdx.json` documents
pub struct SpdxJsonAnalyzer;

impl SpdxJsonAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let doc: SpdxJsonDocument =
            serde_json::from_str(&file.content).map_err(|e| ScaError::parse(&file.relpath, e))?;
        if doc.spdx_version.is_empty() {
            return Err(ScaError::parse(&file.relpath, "missing spdxVersion"));
        }

        let packages: Vec<SpdxPackage> = doc
            .packages
            .into_iter()
            .map(|pkg| SpdxPackage {
                purl: pkg
                    .external_refs
                    .into_iter()
                    .find(|r| r.reference_type == "purl")
                    .map(|r| r.reference_locator),
                spdx_id: pkg.spdx_id,
                supplier: pkg.supplier,
                name: pkg.name,
                version: pkg.version_info,
            })
            .collect();
        let relationships: Vec<(String, String)> = doc
            .relationships
            .into_iter()
            .filter(|r| r.relationship_type == DEPENDS_ON)
            .map(|r| (r.spdx_element_id, r.related_spdx_element))
            .collect();

        Ok(to_raw(&file.relpath, &packages, &relationships))
    }
}

#[async_trait]
impl Analyzer for SpdxJsonAnalyzer {
    fn name(&self) -> &'static str {
        "spdx-json"
    }

    fn language(&self) -> Language {
        Language::Sbom
    }

    fn can_handle(&self, path: &str) -> bool {
        path.ends_with(".spdx.json")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}

/// SpdxXmlAnalyzer for `*.spdx.xml` documents.
///
/// Element names are matched case-insensitively so both the camelCase
/// schema names (`versionInfo`) and field-style names (`VersionInfo`) work.
pub struct SpdxXmlAnalyzer;

impl SpdxXmlAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let mut reader = Reader::from_str(&file.content);
        let mut buf = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        let mut text = String::new();

        let mut spdx_version = String::new();
        let mut packages: Vec<SpdxPackage> = Vec::new();
        let mut package: Option<SpdxPackage> = None;
        let mut reference = (String::new(), String::new());
        let mut relationship = (String::new(), String::new(), String::new());
        let mut relationships = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                    match name.as_str() {
                        "packages" => package = Some(SpdxPackage::default()),
                        "externalrefs" => reference = (String::new(), String::new()),
                        "relationships" => {
                            relationship = (String::new(), String::new(), String::new())
                        }
                        _ => {}
                    }
                    stack.push(name);
                    text.clear();
                }
                Ok(Event::Text(t)) => {
                    let value = t.unescape().map_err(|e| ScaError::parse(&file.relpath, e))?;
                    text.push_str(&value);
                }
                Ok(Event::CData(t)) => text.push_str(&String::from_utf8_lossy(&t)),
                Ok(Event::End(_)) => {
                    let Some(name) = stack.pop() else {
                        continue;
                    };
                    let value = text.trim().to_string();
                    text.clear();
                    let parent = stack.last().map(String::as_str).unwrap_or_default();
                    match (parent, name.as_str()) {
                        (_, "spdxversion") => spdx_version = value,
                        (_, "packages") => packages.extend(package.take()),
                        ("externalrefs", "referencetype") => reference.0 = value,
                        ("externalrefs", "referencelocator") => reference.1 = value,
                        ("packages", "externalrefs") => {
                            if let Some(pkg) = package.as_mut() {
                                if reference.0 == "purl" && pkg.purl.is_none() {
                                    pkg.purl = Some(std::mem::take(&mut reference.1));
                                }
                            }
                        }
                        ("packages", field) => {
                            if let Some(pkg) = package.as_mut() {
                                match field {
                                    "spdxid" => pkg.spdx_id = value,
                                    "name" => pkg.name = value,
                                    "versioninfo" => pkg.version = value,
                                    "supplier" => pkg.supplier = value,
                                    _ => {}
                                }
                            }
                        }
                        ("relationships", "spdxelementid") => relationship.0 = value,
                        ("relationships", "relatedspdxelement") => relationship.1 = value,
                        ("relationships", "relationshiptype") => relationship.2 = value,
                        (_, "relationships") => {
                            let (element, related, kind) = std::mem::take(&mut relationship);
                            if kind == DEPENDS_ON {
                                relationships.push((element, related));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ScaError::parse(&file.relpath, e)),
                _ => {}
            }
            buf.clear();
        }

        if spdx_version.is_empty() {
            return Err(ScaError::parse(&file.relpath, "missing spdxVersion"));
        }
        Ok(to_raw(&file.relpath, &packages, &relationships))
    }
}

#[async_trait]
impl Analyzer for SpdxXmlAnalyzer {
    fn name(&self) -> &'static str {
        "spdx-xml"
    }

    fn language(&self) -> Language {
        Language::Sbom
    }

    fn can_handle(&self, path: &str) -> bool {
        path.ends_with(".spdx.xml")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npm(name: &str, version: &str) -> DependencyIdentity {
        DependencyIdentity::new("", name, version, Language::JavaScript)
    }

    const TAG_VALUE: &str = "\
SPDXVersion: SPDX-2.3
DocumentName: web-app
# packages
PackageName: web-app
SPDXID: SPDXRef-1
PackageVersion: 1.0.0
ExternalRef: PACKAGE-MANAGER purl pkg:npm/web-app@1.0.0

PackageName: express
SPDXID: SPDXRef-2
PackageVersion: 4.18.2
ExternalRef: PACKAGE-MANAGER purl pkg:npm/express@4.18.2

PackageName: qs
SPDXID: SPDXRef-3
PackageVersion: 6.11.0
PackageSupplier: Organization: ljharb
ExternalRef: PACKAGE-MANAGER purl pkg:npm/qs@6.11.0

Relationship: SPDXRef-1 DEPENDS_ON SPDXRef-2
Relationship: SPDXRef-2 DEPENDS_ON SPDXRef-3
Relationship: SPDXRef-2 DEPENDS_ON SPDXRef-99
Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-1
";

    #[test]
    fn test_tag_value_packages_and_relationships() {
        let raw = SpdxTagValueAnalyzer::parse(&ManifestFile::new("bom.spdx", TAG_VALUE)).unwrap();

        assert_eq!(raw.packages.len(), 3);
        assert_eq!(raw.packages[2].vendor, "ljharb");
        assert_eq!(raw.packages[2].language, Language::JavaScript);
        assert_eq!(
            raw.edges,
            vec![
                (npm("web-app", "1.0.0"), npm("express", "4.18.2")),
                (
                    npm("express", "4.18.2"),
                    DependencyIdentity::new("ljharb", "qs", "6.11.0", Language::JavaScript)
                ),
            ]
        );
    }

    #[test]
    fn test_tag_value_without_packages_is_parse_error() {
        let doc = ManifestFile::new("empty.spdx", "SPDXVersion: SPDX-2.3\n");
        let err = SpdxTagValueAnalyzer::parse(&doc).unwrap_err();
        assert!(matches!(err, ScaError::Parse { .. }));
    }

    #[test]
    fn test_package_without_purl_is_sbom_language() {
        let doc = "PackageName: vendored\nSPDXID: SPDXRef-1\nPackageVersion: 0.3\n";
        let raw = SpdxTagValueAnalyzer::parse(&ManifestFile::new("x.spdx", doc)).unwrap();
        assert_eq!(raw.packages[0].language, Language::Sbom);
    }

    #[test]
    fn test_json_document() {
        let doc = r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [
                {
                    "SPDXID": "SPDXRef-a",
                    "name": "app",
                    "versionInfo": "2.0.0",
                    "externalRefs": [{
                        "referenceCategory": "PACKAGE-MANAGER",
                        "referenceType": "purl",
                        "referenceLocator": "pkg:pypi/app@2.0.0"
                    }]
                },
                {
                    "SPDXID": "SPDXRef-b",
                    "name": "requests",
                    "versionInfo": "2.31.0",
                    "externalRefs": [{
                        "referenceType": "purl",
                        "referenceLocator": "pkg:pypi/requests@2.31.0"
                    }]
                }
            ],
            "relationships": [
                {
                    "spdxElementId": "SPDXRef-DOCUMENT",
                    "relatedSpdxElement": "SPDXRef-a",
                    "relationshipType": "DESCRIBES"
                },
                {
                    "spdxElementId": "SPDXRef-a",
                    "relatedSpdxElement": "SPDXRef-b",
                    "relationshipType": "DEPENDS_ON"
                }
            ]
        }"#;

        let raw = SpdxJsonAnalyzer::parse(&ManifestFile::new("sbom/app.spdx.json", doc)).unwrap();
        assert_eq!(raw.packages.len(), 2);
        assert_eq!(raw.edges.len(), 1);
        assert_eq!(raw.edges[0].1.language, Language::Python);
    }

    #[test]
    fn test_json_without_version_is_parse_error() {
        let doc = ManifestFile::new("a.spdx.json", r#"{"spdxVersion": ""}"#);
        assert!(SpdxJsonAnalyzer::parse(&doc).is_err());
        assert!(SpdxJsonAnalyzer::parse(&ManifestFile::new("a.spdx.json", "{")).is_err());
    }

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SpdxDocument>
  <spdxVersion>SPDX-2.3</spdxVersion>
  <name>shop</name>
  <packages>
    <SPDXID>SPDXRef-shop</SPDXID>
    <name>shop</name>
    <versionInfo>1.4.0</versionInfo>
    <supplier>Organization: com.acme</supplier>
    <externalRefs>
      <referenceCategory>PACKAGE-MANAGER</referenceCategory>
      <referenceType>purl</referenceType>
      <referenceLocator>pkg:maven/com.acme/shop@1.4.0</referenceLocator>
    </externalRefs>
  </packages>
  <packages>
    <SPDXID>SPDXRef-text</SPDXID>
    <name>commons-text</name>
    <versionInfo>1.9</versionInfo>
    <supplier>Organization: org.apache.commons</supplier>
    <externalRefs>
      <referenceType>purl</referenceType>
      <referenceLocator>pkg:maven/org.apache.commons/commons-text@1.9</referenceLocator>
    </externalRefs>
  </packages>
  <relationships>
    <spdxElementId>SPDXRef-DOCUMENT</spdxElementId>
    <relatedSpdxElement>SPDXRef-shop</relatedSpdxElement>
    <relationshipType>DESCRIBES</relationshipType>
  </relationships>
  <relationships>
    <spdxElementId>SPDXRef-shop</spdxElementId>
    <relatedSpdxElement>SPDXRef-text</relatedSpdxElement>
    <relationshipType>DEPENDS_ON</relationshipType>
  </relationships>
</SpdxDocument>
"#;

    #[test]
    fn test_xml_document() {
        let raw = SpdxXmlAnalyzer::parse(&ManifestFile::new("bom/shop.spdx.xml", XML)).unwrap();

        let text =
            DependencyIdentity::new("org.apache.commons", "commons-text", "1.9", Language::Java);
        assert_eq!(raw.packages.len(), 2);
        assert_eq!(raw.packages[0].name, "shop");
        assert_eq!(raw.packages[0].vendor, "com.acme");
        assert_eq!(raw.packages[1], text);
        assert_eq!(raw.edges, vec![(raw.packages[0].clone(), text)]);
    }

    #[test]
    fn test_xml_field_style_element_names() {
        let doc = "<SpdxDocument><SPDXVersion>SPDX-2.2</SPDXVersion>\
            <Packages><SPDXID>SPDXRef-1</SPDXID><Name>left-pad</Name>\
            <VersionInfo>1.3.0</VersionInfo></Packages>\
            </SpdxDocument>";
        let raw = SpdxXmlAnalyzer::parse(&ManifestFile::new("a.spdx.xml", doc)).unwrap();
        assert_eq!(raw.packages.len(), 1);
        assert_eq!(raw.packages[0].version, "1.3.0");
        assert_eq!(raw.packages[0].language, Language::Sbom);
    }

    #[test]
    fn test_xml_without_version_is_parse_error() {
        let doc = "<SpdxDocument><packages><name>x</name></packages></SpdxDocument>";
        let err = SpdxXmlAnalyzer::parse(&ManifestFile::new("a.spdx.xml", doc)).unwrap_err();
        assert!(err.to_string().contains("missing spdxVersion"));
        assert!(SpdxXmlAnalyzer::parse(&ManifestFile::new("a.spdx.xml", "<a><b></a>")).is_err());
    }
}
