//! Source-level annotation facts and their per-element index.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Value of one annotation attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// One annotation as reported by the host: qualified name plus attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFact {
    qualified_name: String,
    #[serde(default)]
    attributes: BTreeMap<String, AnnotationValue>,
}

impl AnnotationFact {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AnnotationValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.attributes
    }
}

/// Read-only index over the annotations of one analyzed element.
///
/// Facts keep their encounter order; repeatable annotations produce several
/// facts with the same name and [`AnnotationIndex::all_of`] returns them in
/// that order. Lookups by qualified name are O(1).
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    facts: Vec<AnnotationFact>,
    by_name: HashMap<String, Vec<usize>>,
}

impl AnnotationIndex {
    pub fn new(facts: Vec<AnnotationFact>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::with_capacity(facts.len());
        for (position, fact) in facts.iter().enumerate() {
            by_name
                .entry(fact.qualified_name.clone())
                .or_default()
                .push(position);
        }
        Self { facts, by_name }
    }

    pub fn from_slice(facts: &[AnnotationFact]) -> Self {
        Self::new(facts.to_vec())
    }

    /// First fact with the given qualified name.
    pub fn first(&self, qualified_name: &str) -> Option<&AnnotationFact> {
        self.by_name
            .get(qualified_name)
            .and_then(|positions| positions.first())
            .map(|&position| &self.facts[position])
    }

    pub fn has(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    pub fn has_any(&self, qualified_names: &[&str]) -> bool {
        qualified_names.iter().any(|name| self.has(name))
    }

    /// First fact matching any of the names, trying names in the given order.
    pub fn first_of(&self, qualified_names: &[&str]) -> Option<&AnnotationFact> {
        qualified_names.iter().find_map(|name| self.first(name))
    }

    /// Every fact with the given name, in encounter order.
    pub fn all_of<'a>(&'a self, qualified_name: &str) -> impl Iterator<Item = &'a AnnotationFact> {
        self.by_name
            .get(qualified_name)
            .into_iter()
            .flatten()
            .map(move |&position| &self.facts[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationFact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> AnnotationIndex {
        AnnotationIndex::new(vec![
            AnnotationFact::new("com.acme.Tag")
                .with_attribute("value", AnnotationValue::String("a".into())),
            AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"),
            AnnotationFact::new("com.acme.Tag")
                .with_attribute("value", AnnotationValue::String("b".into())),
        ])
    }

    #[test]
    fn first_and_has() {
        let index = index();
        assert!(index.has("com.acme.Tag"));
        assert!(!index.has("com.acme.Missing"));
        assert_eq!(
            index
                .first("com.acme.Tag")
                .and_then(|fact| fact.attribute("value"))
                .and_then(AnnotationValue::as_str),
            Some("a")
        );
    }

    #[test]
    fn repeatable_annotations_keep_encounter_order() {
        let index = index();
        let values: Vec<_> = index
            .all_of("com.acme.Tag")
            .filter_map(|fact| fact.attribute("value").and_then(AnnotationValue::as_str))
            .collect();
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(index.all_of("com.acme.Missing").count(), 0);
    }

    #[test]
    fn has_any_and_first_of() {
        let index = index();
        assert!(index.has_any(&["x.Y", "org.jmolecules.ddd.annotation.AggregateRoot"]));
        assert!(!index.has_any(&["x.Y", "x.Z"]));
        assert_eq!(
            index
                .first_of(&["x.Y", "com.acme.Tag"])
                .map(AnnotationFact::simple_name),
            Some("Tag")
        );
    }

    #[test]
    fn attribute_values_deserialize_untagged() {
        let fact: AnnotationFact = serde_json::from_str(
            r#"{"qualified_name":"com.acme.Table","attributes":{"name":"orders","cached":true,"size":3}}"#,
        )
        .unwrap();
        assert_eq!(fact.attribute("cached"), Some(&AnnotationValue::Bool(true)));
        assert_eq!(fact.attribute("size"), Some(&AnnotationValue::Integer(3)));
    }
}
