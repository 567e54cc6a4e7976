//! Source hosts: suppliers of source elements, round by round.

mod json;
mod static_host;

pub use json::{JsonModelHost, ModelDocument};
pub use static_host::StaticHost;
