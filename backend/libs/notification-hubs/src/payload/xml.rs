//! Minimal element tree over `quick-xml`, enough to walk a template body

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    /// Unescaped attribute values, namespace declarations excluded
    pub attributes: Vec<(String, String)>,
    /// Unescaped direct text content
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Visits this element and all descendants in document order
    pub fn walk<E>(&self, visit: &mut impl FnMut(&XmlElement) -> Result<(), E>) -> Result<(), E> {
        visit(self)?;
        for child in &self.children {
            child.walk(visit)?;
        }
        Ok(())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }
}

/// Parses a well-formed document with exactly one root element
pub fn parse(body: &str) -> Result<XmlElement, String> {
    let mut reader = NsReader::from_str(body);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| e.to_string())?;
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err("multiple root elements".to_string());
                }
                stack.push(element(namespace, &start)?);
            }
            Event::Empty(start) => {
                let el = element(namespace, &start)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(|e| e.to_string())?;
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unclosed element".to_string());
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn element(namespace: Option<String>, start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        namespace,
        local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => return Err("multiple root elements".to_string()),
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(top) => top.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err("text outside the root element".to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = parse(
            r#"<?xml version="1.0"?><toast launch="a&amp;b"><visual><text id="1">Hi &lt;there&gt;</text></visual></toast>"#,
        )
        .unwrap();
        assert_eq!(root.local_name, "toast");
        assert_eq!(root.attributes, vec![("launch".to_string(), "a&b".to_string())]);
        let text = &root.children[0].children[0];
        assert_eq!(text.text, "Hi <there>");
        assert!(text.is_leaf());
    }

    #[test]
    fn test_namespaces_are_resolved() {
        let root = parse(
            r#"<wp:Notification xmlns:wp="WPNotification"><wp:Toast><wp:Text1>x</wp:Text1></wp:Toast></wp:Notification>"#,
        )
        .unwrap();
        assert_eq!(root.namespace.as_deref(), Some("WPNotification"));
        assert_eq!(root.local_name, "Notification");
        assert!(root.attributes.is_empty());
        assert_eq!(root.first_child().unwrap().local_name, "Toast");
    }

    #[test]
    fn test_malformed_documents() {
        for body in ["<a>", "<a></b>", "<a/><b/>", "text", "", "<a>x</a>tail"] {
            assert!(parse(body).is_err(), "{body}");
        }
    }

    #[test]
    fn test_walk_is_document_order() {
        let root = parse("<a><b><c/></b><d/></a>").unwrap();
        let mut names = Vec::new();
        root.walk(&mut |el: &XmlElement| {
            names.push(el.local_name.clone());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
