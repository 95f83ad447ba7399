//! Minimal XML → `serde_json::Value` conversion for the tourism API.
//!
//! Shape rules:
//!   - an element with only text becomes a string
//!   - an empty element becomes `null`
//!   - repeated child tags collapse into an array
//!   - attributes become `@name` keys, mixed text becomes `#text`
//!
//! The document root is wrapped as `{ "<root>": ... }`.

use crate::error::{IngestError, IngestResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

struct Frame {
    name:     String,
    attrs:    Vec<(String, String)>,
    children: Vec<(String, Value)>,
    text:     String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> IngestResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| IngestError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| IngestError::Xml(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self { name, attrs, children: Vec::new(), text: String::new() })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        if self.children.is_empty() && self.attrs.is_empty() {
            let value = if text.is_empty() { Value::Null } else { Value::String(text) };
            return (self.name, value);
        }

        let mut map = Map::new();
        for (key, value) in self.attrs {
            map.insert(format!("@{key}"), Value::String(value));
        }
        for (key, value) in self.children {
            match map.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key, value);
                }
            }
        }
        if !text.is_empty() {
            map.insert("#text".to_string(), Value::String(text));
        }
        (self.name, Value::Object(map))
    }
}

/// Parse an XML document into a nested JSON value.
pub fn xml_to_value(text: &str) -> IngestResult<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| IngestError::Xml(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let finished = Frame::open(&start)?.close();
                attach(&mut stack, &mut root, finished);
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|e| IngestError::Xml(e.to_string()))?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| IngestError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, frame.close());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(IngestError::Xml(format!("{} unclosed element(s)", stack.len())));
    }
    let (name, value) = root.ok_or_else(|| IngestError::Xml("document has no root element".to_string()))?;
    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(Value::Object(doc))
}

fn attach(stack: &mut [Frame], root: &mut Option<(String, Value)>, finished: (String, Value)) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None => *root = Some(finished),
    }
}

/// Walk nested objects by key. `None` if any hop is missing or not an object.
pub fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.as_object()?.get(*key))
}

/// Case-insensitive key lookup on an object (`num`, `NUM`, `Num`...).
pub fn get_ci<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}
