//! Parsed page snapshot.
//!
//! Pages are parsed once with html5ever (through `scraper`) and flattened
//! into an owned element list plus the serialized `<html>` content, so a
//! [`Document`] can move freely between async tasks.

use scraper::Html;

/// One element of the page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Boolean attributes such as `defer` and `async` count as present
    /// regardless of their value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    html: String,
    elements: Vec<Element>,
}

impl Document {
    /// Parse a page. html5ever recovers from any input, so this never fails.
    pub fn parse(source: &str) -> Self {
        let parsed = Html::parse_document(source);

        let elements = parsed
            .tree
            .root()
            .descendants()
            .filter_map(|node| node.value().as_element())
            .map(|el| {
                Element::new(
                    el.name(),
                    el.attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            })
            .collect();

        Self {
            html: parsed.root_element().inner_html(),
            elements,
        }
    }

    /// Serialized content of the `<html>` element.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |el| el.name.eq_ignore_ascii_case(tag))
    }
}
