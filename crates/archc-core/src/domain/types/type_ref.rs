//! Structural type references.
//!
//! A [`TypeReference`] is the only way the rest of the compiler talks about
//! the type of a field, parameter or return value. It is a closed set of
//! variants mirroring what a host compiler can report:
//!
//! | Variant         | Canonical text                         |
//! |-----------------|----------------------------------------|
//! | `Primitive`     | `int`, `boolean`                       |
//! | `Array`         | `byte[]`, `com.acme.Line[]`            |
//! | `Class`         | `com.acme.Order`                       |
//! | `Parameterized` | `java.util.List<com.acme.Line>`        |
//! | `Wildcard`      | `?`, `? extends Foo`, `? super Foo`    |
//! | `TypeVariable`  | `T`                                    |
//! | `Void`          | `void`                                 |
//!
//! The canonical text form round-trips through [`FromStr`] and
//! [`fmt::Display`], which is also how references are (de)serialized, so a
//! host may supply types as plain strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double",
];

/// Discriminant of a [`TypeReference`], used by policies and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Array,
    Class,
    Parameterized,
    Wildcard,
    TypeVariable,
    Void,
}

impl TypeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Array => "array",
            Self::Class => "class",
            Self::Parameterized => "parameterized",
            Self::Wildcard => "wildcard",
            Self::TypeVariable => "type-variable",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound of a wildcard type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<TypeReference>),
    Super(Box<TypeReference>),
}

/// An immutable, structurally-compared type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeReference {
    Primitive {
        name: String,
    },
    Array {
        component: Box<TypeReference>,
    },
    Class {
        qualified_name: String,
    },
    Parameterized {
        qualified_name: String,
        arguments: Vec<TypeReference>,
    },
    Wildcard {
        bound: WildcardBound,
    },
    TypeVariable {
        name: String,
    },
    Void,
}

impl TypeReference {
    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn class(qualified_name: impl Into<String>) -> Self {
        Self::Class {
            qualified_name: qualified_name.into(),
        }
    }

    pub fn parameterized(qualified_name: impl Into<String>, arguments: Vec<TypeReference>) -> Self {
        Self::Parameterized {
            qualified_name: qualified_name.into(),
            arguments,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive { name: name.into() }
    }

    pub fn array_of(component: TypeReference) -> Self {
        Self::Array {
            component: Box::new(component),
        }
    }

    pub fn type_variable(name: impl Into<String>) -> Self {
        Self::TypeVariable { name: name.into() }
    }

    pub fn wildcard() -> Self {
        Self::Wildcard {
            bound: WildcardBound::Unbounded,
        }
    }

    /// Parse the canonical textual form.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut parser = Parser::new(input);
        let parsed = parser.parse_type()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive { .. } => TypeKind::Primitive,
            Self::Array { .. } => TypeKind::Array,
            Self::Class { .. } => TypeKind::Class,
            Self::Parameterized { .. } => TypeKind::Parameterized,
            Self::Wildcard { .. } => TypeKind::Wildcard,
            Self::TypeVariable { .. } => TypeKind::TypeVariable,
            Self::Void => TypeKind::Void,
        }
    }

    /// Qualified name of the reference, without type arguments.
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Primitive { name } | Self::TypeVariable { name } => name.clone(),
            Self::Array { component } => format!("{}[]", component.qualified_name()),
            Self::Class { qualified_name } | Self::Parameterized { qualified_name, .. } => {
                qualified_name.clone()
            }
            Self::Wildcard { .. } => "?".to_string(),
            Self::Void => "void".to_string(),
        }
    }

    /// Last segment of the qualified name (nested separators included).
    pub fn simple_name(&self) -> String {
        let qualified = self.qualified_name();
        qualified
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(qualified.as_str())
            .to_string()
    }

    /// Type arguments of a parameterized reference; empty otherwise.
    pub fn arguments(&self) -> &[TypeReference] {
        match self {
            Self::Parameterized { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Whether the qualified name denotes a type nested in another type.
    ///
    /// Either the binary separator `$` is present or more than one segment
    /// starts with an uppercase letter (`com.acme.Order.Line`).
    pub fn is_nested(&self) -> bool {
        match self {
            Self::Class { qualified_name } | Self::Parameterized { qualified_name, .. } => {
                qualified_name.contains('$')
                    || qualified_name
                        .split('.')
                        .filter(|segment| segment.starts_with(|c: char| c.is_uppercase()))
                        .count()
                        > 1
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { name } | Self::TypeVariable { name } => f.write_str(name),
            Self::Array { component } => write!(f, "{component}[]"),
            Self::Class { qualified_name } => f.write_str(qualified_name),
            Self::Parameterized {
                qualified_name,
                arguments,
            } => {
                write!(f, "{qualified_name}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            Self::Wildcard { bound } => match bound {
                WildcardBound::Unbounded => f.write_str("?"),
                WildcardBound::Extends(inner) => write!(f, "? extends {inner}"),
                WildcardBound::Super(inner) => write!(f, "? super {inner}"),
            },
            Self::Void => f.write_str("void"),
        }
    }
}

impl FromStr for TypeReference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeReference {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeReference> for String {
    fn from(value: TypeReference) -> Self {
        value.to_string()
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consume a keyword only when it is followed by a non-identifier char.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        if rest.starts_with(keyword)
            && !rest[keyword.len()..].starts_with(|c: char| is_identifier_char(c))
        {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> DomainError {
        DomainError::InvalidTypeReference {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn parse_type(&mut self) -> Result<TypeReference, DomainError> {
        self.skip_ws();

        if self.eat("?") {
            let bound = if self.eat_keyword("extends") {
                WildcardBound::Extends(Box::new(self.parse_type()?))
            } else if self.eat_keyword("super") {
                WildcardBound::Super(Box::new(self.parse_type()?))
            } else {
                WildcardBound::Unbounded
            };
            return Ok(TypeReference::Wildcard { bound });
        }

        let name = self.parse_name()?;

        let mut parsed = if self.eat("<") {
            let mut arguments = vec![self.parse_type()?];
            while self.eat(",") {
                arguments.push(self.parse_type()?);
            }
            if !self.eat(">") {
                return Err(self.error("expected '>'"));
            }
            TypeReference::Parameterized {
                qualified_name: name,
                arguments,
            }
        } else {
            classify_bare_name(name)
        };

        while self.eat("[") {
            if !self.eat("]") {
                return Err(self.error("expected ']'"));
            }
            if parsed == TypeReference::Void {
                return Err(self.error("void cannot be an array component"));
            }
            parsed = TypeReference::array_of(parsed);
        }

        Ok(parsed)
    }

    fn parse_name(&mut self) -> Result<String, DomainError> {
        self.skip_ws();
        let length = self
            .rest()
            .find(|c: char| !(is_identifier_char(c) || c == '.' || c == '$'))
            .unwrap_or(self.rest().len());
        if length == 0 {
            return Err(self.error("expected a type name"));
        }
        let name = &self.rest()[..length];
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(self.error("malformed qualified name"));
        }
        self.pos += length;
        Ok(name.to_string())
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A bare name is a primitive, `void`, a type variable, or a class.
///
/// Type variables are recognised by shape: an unqualified name of at most two
/// characters, starting with an uppercase letter, with no lowercase letters.
fn classify_bare_name(name: String) -> TypeReference {
    if name == "void" {
        return TypeReference::Void;
    }
    if PRIMITIVES.contains(&name.as_str()) {
        return TypeReference::Primitive { name };
    }
    let looks_like_variable = !name.contains(['.', '$'])
        && name.chars().count() <= 2
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && !name.chars().any(|c| c.is_lowercase());
    if looks_like_variable {
        TypeReference::TypeVariable { name }
    } else {
        TypeReference::Class {
            qualified_name: name,
        }
    }
}
