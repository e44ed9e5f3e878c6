/*
 * Copyright (c) 2024 Project CHIP Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Reading of the device type entries out of `matter-devices.xml`.
//!
//! All the shape coercion of the XML document (optional elements, hex or decimal
//! numbers, boolean attributes) happens here, so that the rest of the crate only
//! ever sees fully typed [`RawDeviceEntry`] values.

use log::debug;
use miette::{Diagnostic, NamedSource, SourceSpan};
use roxmltree::{Document, Node};
use thiserror::Error;

/// The root element of the schema document
const ROOT_TAG: &str = "configurator";

/// A cluster reference of a device type, i.e. a `<include>` element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawClusterRef {
    pub cluster_name: String,
    pub is_server: bool,
    pub is_server_locked: bool,
}

/// The cluster references of a device type, as found in the document.
///
/// A device type may have no `<clusters>` element at all, or one with
/// a single or several `<include>` elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawClusters {
    #[default]
    Absent,
    Single(RawClusterRef),
    Many(Vec<RawClusterRef>),
}

impl From<RawClusters> for Vec<RawClusterRef> {
    fn from(clusters: RawClusters) -> Self {
        match clusters {
            RawClusters::Absent => Vec::new(),
            RawClusters::Single(cluster) => vec![cluster],
            RawClusters::Many(clusters) => clusters,
        }
    }
}

/// A single `<deviceType>` entry of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceEntry {
    pub type_name: String,
    pub device_id: u32,
    pub clusters: Vec<RawClusterRef>,
}

/// What exactly is wrong with a schema element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaErrorReason {
    #[error("unexpected root element `{0}`, expected `configurator`")]
    UnexpectedRoot(String),
    #[error("missing `<{0}>` element")]
    MissingElement(&'static str),
    #[error("missing `{0}` attribute")]
    MissingAttribute(&'static str),
    #[error("invalid device id `{0}`")]
    InvalidDeviceId(String),
    #[error("attribute `{attribute}` is `{value}`, expected `true` or `false`")]
    InvalidBoolean {
        attribute: &'static str,
        value: String,
    },
}

#[derive(Error, Debug, Diagnostic)]
#[error("Malformed device type schema: {reason}")]
#[diagnostic(
    code("matter::device_types::schema"),
    help("Check the format of the `matter-devices.xml` file")
)]
pub struct SchemaError {
    pub reason: SchemaErrorReason,

    #[source_code]
    pub src: NamedSource,

    #[label("Schema error location")]
    pub error_location: SourceSpan,
}

/// Reads all the `<deviceType>` entries of a `matter-devices.xml` document,
/// in document order.
///
/// Fails on the first entry that does not have the expected shape.
pub fn parse_device_types(input: &str) -> Result<Vec<RawDeviceEntry>, crate::Error> {
    let doc = Document::parse(input)?;
    let reader = SchemaReader { input };

    let root = doc.root_element();
    if !root.has_tag_name(ROOT_TAG) {
        return Err(reader
            .error(
                root,
                SchemaErrorReason::UnexpectedRoot(root.tag_name().name().to_string()),
            )
            .into());
    }

    let entries = root
        .children()
        .filter(|node| node.has_tag_name("deviceType"))
        .map(|node| reader.device_entry(node))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Read {} device types", entries.len());

    Ok(entries)
}

struct SchemaReader<'a> {
    input: &'a str,
}

impl SchemaReader<'_> {
    fn device_entry(&self, node: Node) -> Result<RawDeviceEntry, SchemaError> {
        let type_name = self.child_text(node, "typeName")?.to_string();

        let device_id = self.child_text(node, "deviceId")?;
        let device_id = parse_device_id(device_id).ok_or_else(|| {
            self.error(node, SchemaErrorReason::InvalidDeviceId(device_id.to_string()))
        })?;

        let clusters = self.cluster_refs(node)?.into();

        Ok(RawDeviceEntry {
            type_name,
            device_id,
            clusters,
        })
    }

    fn cluster_refs(&self, node: Node) -> Result<RawClusters, SchemaError> {
        let Some(clusters) = child(node, "clusters") else {
            return Ok(RawClusters::Absent);
        };

        let mut includes = clusters
            .children()
            .filter(|node| node.has_tag_name("include"))
            .map(|node| self.cluster_ref(node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match includes.len() {
            0 => RawClusters::Absent,
            1 => includes.pop().map_or(RawClusters::Absent, RawClusters::Single),
            _ => RawClusters::Many(includes),
        })
    }

    fn cluster_ref(&self, node: Node) -> Result<RawClusterRef, SchemaError> {
        Ok(RawClusterRef {
            cluster_name: self.attribute(node, "cluster")?.to_string(),
            is_server: self.bool_attribute(node, "server")?,
            is_server_locked: self.bool_attribute(node, "serverLocked")?,
        })
    }

    fn child_text<'a>(
        &self,
        node: Node<'a, '_>,
        name: &'static str,
    ) -> Result<&'a str, SchemaError> {
        child(node, name)
            .and_then(|child| child.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| self.error(node, SchemaErrorReason::MissingElement(name)))
    }

    fn attribute<'a>(
        &self,
        node: Node<'a, '_>,
        name: &'static str,
    ) -> Result<&'a str, SchemaError> {
        node.attribute(name)
            .ok_or_else(|| self.error(node, SchemaErrorReason::MissingAttribute(name)))
    }

    fn bool_attribute(&self, node: Node, name: &'static str) -> Result<bool, SchemaError> {
        match self.attribute(node, name)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.error(
                node,
                SchemaErrorReason::InvalidBoolean {
                    attribute: name,
                    value: other.to_string(),
                },
            )),
        }
    }

    fn error(&self, node: Node, reason: SchemaErrorReason) -> SchemaError {
        let range = node.range();

        SchemaError {
            reason,
            src: NamedSource::new("matter-devices.xml", self.input.to_string()),
            error_location: (range.start, range.len()).into(),
        }
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

/// Parses a device type id, which is either hex (`0x` prefixed) or decimal
///
/// Examples:
///
/// ```
/// use rs_matter_device_types_gen::schema::parse_device_id;
///
/// assert_eq!(parse_device_id("0x0100"), Some(256));
/// assert_eq!(parse_device_id(" 0X00FF "), Some(255));
/// assert_eq!(parse_device_id("22"), Some(22));
/// assert_eq!(parse_device_id("0xZZ"), None);
/// ```
pub fn parse_device_id(text: &str) -> Option<u32> {
    let text = text.trim();

    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rstest::rstest;

    fn cluster(name: &str, is_server: bool, is_server_locked: bool) -> RawClusterRef {
        RawClusterRef {
            cluster_name: name.into(),
            is_server,
            is_server_locked,
        }
    }

    fn schema_reason(input: &str) -> SchemaErrorReason {
        match parse_device_types(input) {
            Err(Error::Schema(e)) => e.reason,
            other => panic!("Expected a schema error, got {:?}", other),
        }
    }

    #[test]
    fn parse_empty_configurator() {
        assert_eq!(parse_device_types("<configurator/>").expect("valid"), vec![]);
    }

    #[test]
    fn parse_keeps_document_order() {
        let entries = parse_device_types(
            r#"<?xml version="1.0"?>
            <configurator>
              <domain name="CHIP"/>
              <deviceType>
                <name>MA-onofflight</name>
                <typeName>On/Off Light</typeName>
                <deviceId editable="false">0x0100</deviceId>
                <clusters lockOthers="true">
                  <include cluster="On/Off" client="false" server="true" clientLocked="true" serverLocked="true"/>
                  <include cluster="Identify" client="false" server="false" clientLocked="true" serverLocked="false"/>
                </clusters>
              </deviceType>
              <deviceType>
                <typeName>Door Lock</typeName>
                <deviceId>10</deviceId>
              </deviceType>
            </configurator>"#,
        )
        .expect("valid");

        assert_eq!(
            entries,
            vec![
                RawDeviceEntry {
                    type_name: "On/Off Light".into(),
                    device_id: 0x0100,
                    clusters: vec![
                        cluster("On/Off", true, true),
                        cluster("Identify", false, false)
                    ],
                },
                RawDeviceEntry {
                    type_name: "Door Lock".into(),
                    device_id: 10,
                    clusters: vec![],
                },
            ]
        );
    }

    #[rstest]
    #[case("", vec![])]
    #[case("<clusters/>", vec![])]
    #[case(
        r#"<clusters><include cluster="Scenes" server="false" serverLocked="true"/></clusters>"#,
        vec![cluster("Scenes", false, true)]
    )]
    #[case(
        r#"<clusters>
             <include cluster="Basic" server="true" serverLocked="true"/>
             <include cluster="Groups" server="true" serverLocked="false"/>
           </clusters>"#,
        vec![cluster("Basic", true, true), cluster("Groups", true, false)]
    )]
    fn test_parse_clusters(#[case] clusters: &str, #[case] expected: Vec<RawClusterRef>) {
        let input = format!(
            "<configurator><deviceType><typeName>X</typeName><deviceId>1</deviceId>{clusters}</deviceType></configurator>"
        );

        let entries = parse_device_types(&input).expect("valid");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].clusters, expected);
    }

    #[test]
    fn raw_clusters_into_sequence() {
        assert_eq!(Vec::<RawClusterRef>::from(RawClusters::Absent), vec![]);
        assert_eq!(
            Vec::<RawClusterRef>::from(RawClusters::Single(cluster("A", true, true))),
            vec![cluster("A", true, true)]
        );
        assert_eq!(
            Vec::<RawClusterRef>::from(RawClusters::Many(vec![
                cluster("A", true, true),
                cluster("B", false, false)
            ])),
            vec![cluster("A", true, true), cluster("B", false, false)]
        );
    }

    #[rstest]
    #[case(
        "<configurator><deviceType><deviceId>1</deviceId></deviceType></configurator>",
        SchemaErrorReason::MissingElement("typeName")
    )]
    #[case(
        "<configurator><deviceType><typeName>X</typeName></deviceType></configurator>",
        SchemaErrorReason::MissingElement("deviceId")
    )]
    #[case(
        "<configurator><deviceType><typeName>X</typeName><deviceId>abc</deviceId></deviceType></configurator>",
        SchemaErrorReason::InvalidDeviceId("abc".into())
    )]
    #[case(
        r#"<configurator><deviceType><typeName>X</typeName><deviceId>1</deviceId>
             <clusters><include server="true" serverLocked="true"/></clusters>
           </deviceType></configurator>"#,
        SchemaErrorReason::MissingAttribute("cluster")
    )]
    #[case(
        r#"<configurator><deviceType><typeName>X</typeName><deviceId>1</deviceId>
             <clusters><include cluster="A" serverLocked="true"/></clusters>
           </deviceType></configurator>"#,
        SchemaErrorReason::MissingAttribute("server")
    )]
    #[case(
        r#"<configurator><deviceType><typeName>X</typeName><deviceId>1</deviceId>
             <clusters><include cluster="A" server="true"/></clusters>
           </deviceType></configurator>"#,
        SchemaErrorReason::MissingAttribute("serverLocked")
    )]
    #[case(
        r#"<configurator><deviceType><typeName>X</typeName><deviceId>1</deviceId>
             <clusters><include cluster="A" server="yes" serverLocked="true"/></clusters>
           </deviceType></configurator>"#,
        SchemaErrorReason::InvalidBoolean { attribute: "server", value: "yes".into() }
    )]
    #[case(
        "<devices/>",
        SchemaErrorReason::UnexpectedRoot("devices".into())
    )]
    fn test_parse_errors(#[case] input: &str, #[case] expected: SchemaErrorReason) {
        assert_eq!(schema_reason(input), expected);
    }

    #[test]
    fn malformed_entry_stops_the_whole_read() {
        let r = parse_device_types(
            "<configurator>
               <deviceType><typeName>Good</typeName><deviceId>1</deviceId></deviceType>
               <deviceType><typeName>Bad</typeName></deviceType>
             </configurator>",
        );
        assert!(r.is_err());
    }

    #[test]
    fn invalid_xml_is_an_error() {
        assert!(matches!(
            parse_device_types("<configurator><deviceType>"),
            Err(Error::Xml(_))
        ));
    }
}
