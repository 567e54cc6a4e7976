//! Naming conventions handed to plugins.

use crate::domain::source::{package_of, simple_name_of};

/// Case conversion and name derivation shared by all generators.
///
/// | Input            | snake        | pascal        | camel         |
/// |------------------|--------------|---------------|---------------|
/// | `CustomerId`     | `customer_id`| `CustomerId`  | `customerId`  |
/// | `HTTPGateway`    | `http_gateway`| `HttpGateway`| `httpGateway` |
/// | `order-lines`    | `order_lines`| `OrderLines`  | `orderLines`  |
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConventions;

impl NamingConventions {
    pub const fn new() -> Self {
        Self
    }

    /// Lowercased words of an identifier.
    ///
    /// Splits on `_`, `-`, `.` and whitespace, on lower-to-upper
    /// transitions (`myApp`) and before the last capital of an acronym
    /// (`HTTPServer` -> `http`, `server`).
    pub fn words(&self, input: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
                if !current.is_empty() {
                    words.push(current.to_lowercase());
                    current.clear();
                }
                continue;
            }

            current.push(c);
            let Some(&next) = chars.peek() else {
                continue;
            };
            let lower_to_upper = (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase();
            let acronym_end = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(char::is_lowercase);
            if lower_to_upper || acronym_end {
                words.push(current.to_lowercase());
                current.clear();
            }
        }

        if !current.is_empty() {
            words.push(current.to_lowercase());
        }
        words
    }

    pub fn snake_case(&self, input: &str) -> String {
        self.words(input).join("_")
    }

    pub fn kebab_case(&self, input: &str) -> String {
        self.words(input).join("-")
    }

    pub fn constant_case(&self, input: &str) -> String {
        self.snake_case(input).to_uppercase()
    }

    pub fn pascal_case(&self, input: &str) -> String {
        self.words(input).iter().map(|word| capitalize(word)).collect()
    }

    pub fn camel_case(&self, input: &str) -> String {
        let words = self.words(input);
        let mut iter = words.iter();
        let mut out = iter.next().cloned().unwrap_or_default();
        out.extend(iter.map(|word| capitalize(word)));
        out
    }

    pub fn simple_name<'a>(&self, qualified_name: &'a str) -> &'a str {
        simple_name_of(qualified_name)
    }

    pub fn package_name<'a>(&self, qualified_name: &'a str) -> &'a str {
        package_of(qualified_name)
    }

    /// `com.acme.port.out.CustomerRepository` + `InMemory` ->
    /// `com.acme.port.out.InMemoryCustomerRepository`.
    pub fn prefixed(&self, qualified_name: &str, prefix: &str) -> String {
        let simple = format!("{prefix}{}", simple_name_of(qualified_name));
        match package_of(qualified_name) {
            "" => simple,
            package => format!("{package}.{simple}"),
        }
    }

    /// Moves a qualified name into a sibling package:
    /// `com.acme.port.out.CustomerRepository` + `adapter` ->
    /// `com.acme.port.out.adapter.CustomerRepository`.
    pub fn in_subpackage(&self, qualified_name: &str, segment: &str) -> String {
        match package_of(qualified_name) {
            "" => format!("{segment}.{}", simple_name_of(qualified_name)),
            package => format!("{package}.{segment}.{}", simple_name_of(qualified_name)),
        }
    }

    /// Custom-block id for a qualified name: `com.acme.Order` -> `order`.
    pub fn block_id(&self, qualified_name: &str) -> String {
        self.kebab_case(simple_name_of(qualified_name))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
