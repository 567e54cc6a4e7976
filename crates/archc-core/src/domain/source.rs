//! Raw structural facts supplied by the host compiler.
//!
//! These types are the inbound contract: the host reports, per round, a set
//! of elements with their kind tag, annotations, members and best-effort
//! documentation. Nothing here is interpreted; classification happens in
//! `crate::domain::classify`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{
    annotations::{AnnotationFact, AnnotationIndex},
    types::TypeReference,
};

/// Kind tag of a source element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Class,
    Interface,
    Enum,
    Record,
}

impl ElementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
        }
    }
}

/// One declared field (or record component).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFact {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationFact>,
}

impl FieldFact {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_final: false,
            is_static: false,
            annotations: Vec::new(),
        }
    }

    pub fn final_field(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationFact) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// One declared method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterFact {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
}

impl ParameterFact {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

/// One declared method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodFact {
    pub name: String,
    pub return_type: TypeReference,
    #[serde(default)]
    pub parameters: Vec<ParameterFact>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationFact>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl MethodFact {
    pub fn new(name: impl Into<String>, return_type: TypeReference) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            is_default: false,
            is_static: false,
            annotations: Vec::new(),
            documentation: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_ref: TypeReference) -> Self {
        self.parameters.push(ParameterFact::new(name, type_ref));
        self
    }
}

/// An opaque source element as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceElement {
    pub kind: ElementKind,
    pub qualified_name: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationFact>,
    #[serde(default)]
    pub fields: Vec<FieldFact>,
    #[serde(default)]
    pub methods: Vec<MethodFact>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl SourceElement {
    pub fn new(kind: ElementKind, qualified_name: impl Into<String>) -> Self {
        Self {
            kind,
            qualified_name: qualified_name.into(),
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            supertypes: Vec::new(),
            enum_constants: Vec::new(),
            documentation: None,
        }
    }

    pub fn with_annotation(mut self, annotation: AnnotationFact) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_field(mut self, field: FieldFact) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodFact) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_supertype(mut self, qualified_name: impl Into<String>) -> Self {
        self.supertypes.push(qualified_name.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.qualified_name)
    }

    pub fn package_name(&self) -> &str {
        package_of(&self.qualified_name)
    }

    /// Build the annotation index for this element.
    pub fn annotation_index(&self) -> AnnotationIndex {
        AnnotationIndex::from_slice(&self.annotations)
    }
}

/// One batch of elements handed over by the host.
#[derive(Debug, Clone, Default)]
pub struct Round {
    pub number: u32,
    pub elements: Vec<SourceElement>,
    /// Set by the host on the final round.
    pub processing_over: bool,
}

impl Round {
    pub fn new(number: u32, elements: Vec<SourceElement>) -> Self {
        Self {
            number,
            elements,
            processing_over: false,
        }
    }

    pub fn last(number: u32, elements: Vec<SourceElement>) -> Self {
        Self {
            number,
            elements,
            processing_over: true,
        }
    }
}

/// Every element seen so far in a compilation, in first-seen order.
///
/// A later round that re-delivers a name replaces the earlier element in
/// place. Within a single round the first occurrence of a name wins.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    elements: Vec<SourceElement>,
    positions: HashMap<String, usize>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a round in. Returns how many of its elements were new names.
    pub fn absorb(&mut self, round: &Round) -> usize {
        let mut seen_this_round = HashSet::new();
        let mut added = 0;
        for element in &round.elements {
            if !seen_this_round.insert(element.qualified_name.as_str()) {
                continue;
            }
            match self.positions.get(&element.qualified_name) {
                Some(&position) => self.elements[position] = element.clone(),
                None => {
                    self.positions
                        .insert(element.qualified_name.clone(), self.elements.len());
                    self.elements.push(element.clone());
                    added += 1;
                }
            }
        }
        added
    }

    /// The whole set as one round carrying `round`'s number and end flag.
    pub fn as_round(&self, round: &Round) -> Round {
        Round {
            number: round.number,
            elements: self.elements.clone(),
            processing_over: round.processing_over,
        }
    }

    pub fn get(&self, qualified_name: &str) -> Option<&SourceElement> {
        self.positions
            .get(qualified_name)
            .and_then(|&position| self.elements.get(position))
    }

    pub fn elements(&self) -> &[SourceElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Last segment of a dotted (or `$`-nested) qualified name.
pub fn simple_name_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(qualified_name)
}

/// Package part of a qualified name: segments before the first segment that
/// starts with an uppercase letter.
pub fn package_of(qualified_name: &str) -> &str {
    let mut end = 0;
    for segment in qualified_name.split('.') {
        if segment.starts_with(|c: char| c.is_uppercase()) {
            break;
        }
        end += segment.len() + 1;
    }
    qualified_name.get(..end.saturating_sub(1)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_set_accumulates_and_replaces() {
        let mut set = SourceSet::new();
        let first = Round::new(
            1,
            vec![
                SourceElement::new(ElementKind::Class, "com.acme.Order"),
                SourceElement::new(ElementKind::Interface, "com.acme.Order"),
            ],
        );
        assert_eq!(set.absorb(&first), 1);
        assert_eq!(set.get("com.acme.Order").map(|e| e.kind), Some(ElementKind::Class));

        let second = Round::new(
            2,
            vec![
                SourceElement::new(ElementKind::Record, "com.acme.Order"),
                SourceElement::new(ElementKind::Class, "com.acme.Invoice"),
            ],
        );
        assert_eq!(set.absorb(&second), 1);
        assert_eq!(set.get("com.acme.Order").map(|e| e.kind), Some(ElementKind::Record));

        let names: Vec<_> = set.elements().iter().map(|e| e.qualified_name.as_str()).collect();
        assert_eq!(names, ["com.acme.Order", "com.acme.Invoice"]);

        let snapshot = set.as_round(&Round::last(3, Vec::new()));
        assert_eq!(snapshot.number, 3);
        assert!(snapshot.processing_over);
        assert_eq!(snapshot.elements.len(), 2);
    }

    #[test]
    fn names_split_on_package_boundary() {
        assert_eq!(simple_name_of("com.acme.order.Order"), "Order");
        assert_eq!(package_of("com.acme.order.Order"), "com.acme.order");
        assert_eq!(package_of("com.acme.Order.Line"), "com.acme");
        assert_eq!(package_of("Order"), "");
    }

    #[test]
    fn deserializes_with_defaults() {
        let element: SourceElement = serde_json::from_str(
            r#"{
                "kind": "interface",
                "qualified_name": "com.acme.CustomerRepository",
                "methods": [
                    {"name": "save", "return_type": "void",
                     "parameters": [{"name": "customer", "type": "com.acme.Customer"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(element.kind, ElementKind::Interface);
        assert_eq!(element.simple_name(), "CustomerRepository");
        assert!(element.annotations.is_empty());
        assert_eq!(element.methods[0].return_type, TypeReference::Void);
    }
}
