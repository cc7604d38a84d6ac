// 🏗️ Feed Parser - XML loading + typed field access
//
// The feed has a fixed schema depth. Every accessor here looks at DIRECT
// children only, so a same-named tag deeper in the tree (a Plan's
// MarketingHeadline inside a Subdivision) can never leak upward.

use crate::error::{FeedError, Result};
use roxmltree::{Document, Node, ParsingOptions};

/// Root element of every feed document
pub const ROOT_TAG: &str = "Builders";

/// Parse raw feed text into a DOM
///
/// DTDs are allowed since vendor exports sometimes declare one.
pub fn parse_document(text: &str) -> Result<Document<'_>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(text, options)?;

    if !doc.root_element().has_tag_name(ROOT_TAG) {
        return Err(FeedError::InvalidDocument(format!(
            "expected <{}> root, found <{}>",
            ROOT_TAG,
            doc.root_element().tag_name().name()
        )));
    }

    Ok(doc)
}

/// Clean a text value the way every display field is cleaned
pub fn clean_text(raw: &str) -> String {
    raw.trim().replace('\n', "<br>")
}

/// Parse a feed boolean flag: `1`, `true`, `yes`, `y` (any case)
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

// ============================================================================
// FEED ELEMENT
// ============================================================================

/// One element of the feed, tagged with the entity it belongs to
///
/// The entity label only feeds error messages.
#[derive(Debug, Clone, Copy)]
pub struct FeedElement<'a, 'input> {
    node: Node<'a, 'input>,
    entity: &'static str,
}

impl<'a, 'input> FeedElement<'a, 'input> {
    pub fn new(node: Node<'a, 'input>, entity: &'static str) -> Self {
        FeedElement { node, entity }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Direct children with the given tag, in document order
    pub fn children(&self, tag: &'static str) -> impl Iterator<Item = FeedElement<'a, 'input>> {
        let entity = self.entity;
        self.node
            .children()
            .filter(move |n| n.is_element() && n.has_tag_name(tag))
            .map(move |n| FeedElement::new(n, entity))
    }

    /// Same as `children`, relabelled for a nested entity
    pub fn children_as(
        &self,
        tag: &'static str,
        entity: &'static str,
    ) -> impl Iterator<Item = FeedElement<'a, 'input>> {
        self.children(tag).map(move |el| FeedElement::new(el.node, entity))
    }

    pub fn child(&self, tag: &'static str) -> Option<FeedElement<'a, 'input>> {
        self.children(tag).next()
    }

    pub fn last_child(&self, tag: &'static str) -> Option<FeedElement<'a, 'input>> {
        self.children(tag).last()
    }

    /// All text under this element, trimmed
    pub fn text(&self) -> String {
        self.node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Attribute value, trimmed; blank when absent
    pub fn attr(&self, name: &str) -> String {
        self.node
            .attribute(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn required_attr(&self, name: &'static str) -> Result<String> {
        self.node
            .attribute(name)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| FeedError::missing(self.entity, name))
    }

    /// Trimmed text of a direct child that MUST exist
    pub fn required_text(&self, tag: &'static str) -> Result<String> {
        self.child(tag)
            .map(|el| el.text())
            .ok_or_else(|| FeedError::missing(self.entity, tag))
    }

    /// Cleaned text of a direct child, `None` when the child is absent
    pub fn text_of(&self, tag: &'static str) -> Option<String> {
        self.child(tag).map(|el| clean_text(&el.text()))
    }

    /// Cleaned text of a direct child; blank when absent
    pub fn text_or_blank(&self, tag: &'static str) -> String {
        self.text_of(tag).unwrap_or_default()
    }

    /// Cleaned text of a direct child; `default` when absent or blank
    pub fn text_or(&self, tag: &'static str, default: impl Into<String>) -> String {
        match self.text_of(tag) {
            Some(value) if !value.is_empty() => value,
            _ => default.into(),
        }
    }

    pub fn flag(&self, tag: &'static str) -> bool {
        self.text_of(tag).map(|v| parse_flag(&v)).unwrap_or(false)
    }

    /// Non-negative count from a direct child; zero when absent or blank
    pub fn count(&self, tag: &'static str) -> Result<u32> {
        match self.text_of(tag) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<u32>()
                .map_err(|_| FeedError::invalid(self.entity, tag, raw)),
            _ => Ok(0),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<Builders>
  <Corporation CorporationID=" 7 ">
    <CorporateName>  Acme
Homes </CorporateName>
    <Count>3</Count>
    <Bad>three</Bad>
    <Flag>Yes</Flag>
    <Empty></Empty>
    <Nested><CorporateName>Deep</CorporateName></Nested>
  </Corporation>
</Builders>"#;

    fn corporation<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
        doc.root_element()
            .children()
            .find(|n| n.has_tag_name("Corporation"))
            .unwrap()
    }

    #[test]
    fn test_rejects_wrong_root() {
        let result = parse_document("<Feed/>");
        assert!(matches!(result, Err(FeedError::InvalidDocument(_))));

        let result = parse_document("<Builders>");
        assert!(matches!(result, Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_text_accessors() {
        let doc = parse_document(DOC).unwrap();
        let el = FeedElement::new(corporation(&doc), "Company");

        assert_eq!(el.required_attr("CorporationID").unwrap(), "7");
        assert_eq!(el.required_text("CorporateName").unwrap(), "Acme\nHomes");
        assert_eq!(el.text_or_blank("CorporateName"), "Acme<br>Homes");
        assert_eq!(el.text_or("Empty", "fallback"), "fallback");
        assert_eq!(el.text_or("Missing", "fallback"), "fallback");
        assert_eq!(el.text_of("Missing"), None);
        assert_eq!(el.attr("Nope"), "");
    }

    #[test]
    fn test_missing_required_reports_entity_and_field() {
        let doc = parse_document(DOC).unwrap();
        let el = FeedElement::new(corporation(&doc), "Company");

        match el.required_text("CorporateBuilderNumber") {
            Err(FeedError::MissingRequiredField { entity, field }) => {
                assert_eq!(entity, "Company");
                assert_eq!(field, "CorporateBuilderNumber");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(el.required_attr("Other").is_err());
    }

    #[test]
    fn test_direct_children_only() {
        let doc = parse_document(DOC).unwrap();
        let el = FeedElement::new(corporation(&doc), "Company");
        assert_eq!(el.children("CorporateName").count(), 1);
        let nested = el.child("Nested").unwrap();
        assert_eq!(nested.required_text("CorporateName").unwrap(), "Deep");
    }

    #[test]
    fn test_counts_and_flags() {
        let doc = parse_document(DOC).unwrap();
        let el = FeedElement::new(corporation(&doc), "Company");

        assert_eq!(el.count("Count").unwrap(), 3);
        assert_eq!(el.count("Missing").unwrap(), 0);
        assert_eq!(el.count("Empty").unwrap(), 0);
        assert!(matches!(el.count("Bad"), Err(FeedError::InvalidField { .. })));
        assert!(el.flag("Flag"));
        assert!(!el.flag("Missing"));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_parse_flag_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "Yes", "y", " Y "] {
            assert!(parse_flag(raw), "{:?}", raw);
        }
        for raw in ["0", "false", "no", "n", "", "yep"] {
            assert!(!parse_flag(raw), "{:?}", raw);
        }
    }
}
