//! Record path specifications: descriptions of nodes that should exist.

use std::fmt;

use crate::domain::error::DomainResult;
use crate::domain::node::Attributes;
use crate::domain::text::{ensure_xml_name, ensure_xml_text};

/// One level of a record path.
///
/// `text: None` means "don't care": it neither voids a match nor clears
/// existing text. `Some(String::new())` is a real, empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSpec {
    pub tag: Option<String>,
    pub attributes: Attributes,
    pub text: Option<String>,
    pub sub: Option<RecordPath>,
}

/// A single sub-record or a fan-out of sibling sub-records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPath {
    One(Box<RecordSpec>),
    Many(Vec<RecordSpec>),
}

impl RecordSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Spec that describes nothing; skipped wherever it appears as a sub-record.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn sub(mut self, sub: impl Into<RecordPath>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.attributes.is_empty() && self.text.is_none() && self.sub.is_none()
    }

    /// Check every tag, attribute and text in the whole path for XML.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(tag) = &self.tag {
            ensure_xml_name("tag", tag)?;
        }
        for (key, value) in &self.attributes {
            ensure_xml_name("attribute name", key)?;
            ensure_xml_text(key, value)?;
        }
        if let Some(text) = &self.text {
            ensure_xml_text("text", text)?;
        }
        match &self.sub {
            Some(sub) => sub.validate(),
            None => Ok(()),
        }
    }
}

impl RecordPath {
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            RecordPath::One(spec) => spec.validate(),
            RecordPath::Many(specs) => specs.iter().try_for_each(RecordSpec::validate),
        }
    }
}

impl From<RecordSpec> for RecordPath {
    fn from(spec: RecordSpec) -> Self {
        RecordPath::One(Box::new(spec))
    }
}

impl From<Vec<RecordSpec>> for RecordPath {
    fn from(specs: Vec<RecordSpec>) -> Self {
        RecordPath::Many(specs)
    }
}

impl fmt::Display for RecordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{tag: {:?}, attributes: {:?}", self.tag, self.attributes)?;
        if let Some(text) = &self.text {
            write!(f, ", text: {:?}", text)?;
        }
        if self.sub.is_some() {
            write!(f, ", sub: ..")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_empty_spec() {
        assert!(RecordSpec::empty().is_empty());
        assert!(!RecordSpec::empty().text("").is_empty());
        assert!(!RecordSpec::new("Punch").is_empty());
    }

    #[test]
    fn test_validate_reaches_nested_levels() {
        let spec = RecordSpec::new("SIstation")
            .attr("Nr", 97)
            .sub(vec![RecordSpec::new("note").text("bad\u{0}")]);
        assert!(matches!(
            spec.validate(),
            Err(DomainError::Encoding { ref field, .. }) if field == "text"
        ));
    }

    #[test]
    fn test_validate_checks_tag_and_key_names() {
        let bad_tag = RecordSpec::new("Punch").sub(RecordSpec::new("bad tag").text("x"));
        let bad_key = RecordSpec::new("Punch").attr("no key", "1");

        assert!(matches!(
            bad_tag.validate(),
            Err(DomainError::Encoding { ref field, .. }) if field == "tag"
        ));
        assert!(matches!(
            bad_key.validate(),
            Err(DomainError::Encoding { ref field, .. }) if field == "attribute name"
        ));
    }
}
