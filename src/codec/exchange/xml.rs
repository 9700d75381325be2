//! Minimal element tree built on quick-xml events

use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML element with its attributes, child elements and text content.
/// Namespace prefixes are stripped from element and attribute names. Text of
/// leaf elements is kept verbatim; whitespace-only text between child
/// elements is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Parse a whole document into its root element.
pub(crate) fn parse(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| Error::malformed("closing tag without matching opening tag"))?;
                if !element.children.is_empty() && element.text.trim().is_empty() {
                    element.text.clear();
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::malformed(format!(
            "document ended inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| Error::malformed("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(Error::malformed("more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <g:root xmlns:g="urn:x" a="1">
              <!-- comment -->
              <item id="x">one &amp; two</item>
              <item id="y"/>
              <other><![CDATA[<raw>]]></other>
            </g:root>"#,
        )
        .unwrap();

        assert_eq!(root.name, "root");
        assert_eq!(root.attr("a"), Some("1"));
        let items: Vec<_> = root.children_named("item").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "one & two");
        assert_eq!(items[1].attr("id"), Some("y"));
        assert_eq!(root.child("other").unwrap().text, "<raw>");
    }

    #[test]
    fn test_leaf_text_is_verbatim() {
        let root = parse(
            "<root>\n  <name> a</name>\n  <name>b </name>\n  <name>  spaced\t</name>\n  <name></name>\n</root>",
        )
        .unwrap();

        assert_eq!(root.text, "");
        let names: Vec<_> = root
            .children_named("name")
            .map(|n| n.text.as_str())
            .collect();
        assert_eq!(names, vec![" a", "b ", "  spaced\t", ""]);
    }

    #[test]
    fn test_rejects_broken_documents() {
        assert!(parse("").is_err());
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a>").is_err());
        assert!(parse("<a/><b/>").is_err());
    }
}
