//! XML Structural Adapter
//!
//! Pre-scans raw bytes for external DTD entity declarations, extracts and
//! strips them (network entity resolution is out of scope), then normalizes
//! the quick-xml event stream into the crate's own element tree with
//! attribute and child order preserved.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::{ExternalEntity, XmlDocument, XmlElement, XmlNode};
use crate::error::{NitsError, Result};
use crate::patterns;

/// Parse raw XML bytes into a normalized [`XmlDocument`].
///
/// Fails with [`NitsError::XmlParsingFailed`] carrying the underlying parser
/// message.
pub fn parse(bytes: &[u8], filename: &str) -> Result<XmlDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| NitsError::XmlParsingFailed {
        details: format!("invalid UTF-8: {e}"),
    })?;

    let (external_entities, stripped) = extract_external_entities(text);
    let root = build_tree(&stripped)?;

    Ok(XmlDocument {
        filename: filename.to_string(),
        root,
        external_entities,
    })
}

/// Pull `<!ENTITY name SYSTEM|PUBLIC "url">` declarations out of the raw
/// text, returning them alongside the text with the declarations removed.
pub fn extract_external_entities(text: &str) -> (Vec<ExternalEntity>, String) {
    let regex = patterns::external_entity_regex();
    let entities = regex
        .captures_iter(text)
        .map(|caps| ExternalEntity {
            name: caps[1].to_string(),
            entity_type: caps[2].to_string(),
            url: caps[3].to_string(),
        })
        .collect();
    let stripped = regex.replace_all(text, "").into_owned();
    (entities, stripped)
}

fn build_tree(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(element_from(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| NitsError::XmlParsingFailed {
                    details: "unmatched closing tag".to_string(),
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                // Unknown entity references are left verbatim; their
                // declarations were stripped above.
                let content = match text.unescape() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => String::from_utf8_lossy(&text).into_owned(),
                };
                if !content.trim().is_empty()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.children.push(XmlNode::Text(content));
                }
            }
            Ok(Event::CData(data)) => {
                let content = String::from_utf8_lossy(&data).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(content));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, DOCTYPE.
            Ok(_) => {}
            Err(e) => {
                return Err(NitsError::XmlParsingFailed {
                    details: e.to_string(),
                });
            }
        }
    }

    if !stack.is_empty() {
        return Err(NitsError::XmlParsingFailed {
            details: "unexpected end of document inside an element".to_string(),
        });
    }

    root.ok_or_else(|| NitsError::XmlParsingFailed {
        details: "no root element".to_string(),
    })
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| NitsError::XmlParsingFailed {
            details: format!("bad attribute in <{name}>: {e}"),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(cow) => cow.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(NitsError::XmlParsingFailed {
                    details: "multiple root elements".to_string(),
                });
            }
            *root = Some(element);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_RFC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE rfc [
<!ENTITY rfc2119 SYSTEM "https://example.org/reference.RFC.2119.xml">
]>
<rfc docName="draft-doe-test-00" category="std" obsoletes="1234">
  <front>
    <title>A Test Protocol</title>
    <author fullname="J. Doe"><organization>Example Org</organization></author>
    <abstract><t>This document defines a test protocol.</t></abstract>
  </front>
</rfc>"#;

    #[test]
    fn test_external_entity_extraction_and_strip() {
        let (entities, stripped) = extract_external_entities(SMALL_RFC);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "rfc2119");
        assert_eq!(entities[0].entity_type, "SYSTEM");
        assert_eq!(entities[0].url, "https://example.org/reference.RFC.2119.xml");
        assert!(!stripped.contains("<!ENTITY"));
    }

    #[test]
    fn test_tree_normalization() {
        let doc = parse(SMALL_RFC.as_bytes(), "draft.xml").unwrap();
        assert_eq!(doc.root.name, "rfc");
        assert_eq!(doc.root.attr("docName"), Some("draft-doe-test-00"));
        assert_eq!(doc.root.attr("obsoletes"), Some("1234"));

        let front = doc.root.child("front").unwrap();
        assert_eq!(front.child("title").unwrap().text(), "A Test Protocol");
        assert_eq!(
            front.child("author").unwrap().attr("fullname"),
            Some("J. Doe")
        );
        assert_eq!(
            front.child("abstract").unwrap().text(),
            "This document defines a test protocol."
        );
    }

    #[test]
    fn test_attribute_order_preserved() {
        let doc = parse(
            br#"<rfc docName="x" category="info" obsoletes=""/>"#,
            "d.xml",
        )
        .unwrap();
        let keys: Vec<_> = doc.root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["docName", "category", "obsoletes"]);
    }

    #[test]
    fn test_malformed_xml_fails() {
        let result = parse(b"<rfc><front></rfc>", "bad.xml");
        match result {
            Err(NitsError::XmlParsingFailed { .. }) => {}
            other => panic!("expected XmlParsingFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_document_fails() {
        let result = parse(b"<rfc><front>", "bad.xml");
        assert!(matches!(result, Err(NitsError::XmlParsingFailed { .. })));
    }
}
