//! Custom-block merge.
//!
//! A custom block is the text between a line containing
//! `archc:custom-begin <id>` and a line containing `archc:custom-end <id>`.
//! The surrounding comment syntax is free. Blocks are matched by id, never
//! by position.
//!
//! Merging runs in two passes: the existing file is parsed into an
//! id -> body map, then the freshly generated text is parsed into segments
//! and every block body is replaced by the existing one with the same id.
//! Marker lines and scaffolding always come from the generated text, so
//! merging an unedited file reproduces it byte for byte.

use std::collections::{BTreeMap, HashSet};

use crate::domain::error::DomainError;

pub const BEGIN_MARKER: &str = "archc:custom-begin";
pub const END_MARKER: &str = "archc:custom-end";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Scaffold(String),
    Block {
        id: String,
        begin: String,
        body: String,
        end: String,
    },
}

/// A file split into scaffolding and identified custom blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomBlocks {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'a> {
    Begin(&'a str),
    End(&'a str),
}

fn marker(line: &str) -> Result<Option<Marker<'_>>, String> {
    let (is_begin, keyword) = match (line.find(BEGIN_MARKER), line.find(END_MARKER)) {
        (Some(_), Some(_)) => return Err("begin and end marker on one line".into()),
        (Some(at), None) => (true, &line[at + BEGIN_MARKER.len()..]),
        (None, Some(at)) => (false, &line[at + END_MARKER.len()..]),
        (None, None) => return Ok(None),
    };

    if !keyword.starts_with(char::is_whitespace) {
        return Err("marker must be followed by a block id".into());
    }
    let id = keyword.split_whitespace().next().unwrap_or_default();
    if id.is_empty() {
        return Err("marker must be followed by a block id".into());
    }
    if !is_valid_id(id) {
        return Err(format!("invalid block id '{id}'"));
    }
    Ok(Some(if is_begin { Marker::Begin(id) } else { Marker::End(id) }))
}

/// Ids are ASCII letters, digits, `_`, `-`, `.` or `:`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

impl CustomBlocks {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let malformed = |line: usize, reason: String| DomainError::MalformedCustomBlocks { line, reason };

        let mut segments = Vec::new();
        let mut scaffold = String::new();
        let mut open: Option<(usize, String, String, String)> = None;
        let mut seen = HashSet::new();

        for (index, line) in text.split_inclusive('\n').enumerate() {
            let number = index + 1;
            let found = marker(line).map_err(|reason| malformed(number, reason))?;

            match (found, open.take()) {
                (None, None) => scaffold.push_str(line),
                (None, Some((start, id, begin, mut body))) => {
                    body.push_str(line);
                    open = Some((start, id, begin, body));
                }
                (Some(Marker::Begin(id)), None) => {
                    if !seen.insert(id.to_string()) {
                        return Err(malformed(number, format!("duplicate block id '{id}'")));
                    }
                    if !scaffold.is_empty() {
                        segments.push(Segment::Scaffold(std::mem::take(&mut scaffold)));
                    }
                    open = Some((number, id.to_string(), line.to_string(), String::new()));
                }
                (Some(Marker::Begin(id)), Some((start, outer, ..))) => {
                    return Err(malformed(
                        number,
                        format!("block '{id}' opened inside block '{outer}' (line {start})"),
                    ));
                }
                (Some(Marker::End(id)), None) => {
                    return Err(malformed(number, format!("end of block '{id}' without a begin")));
                }
                (Some(Marker::End(id)), Some((start, open_id, begin, body))) => {
                    if id != open_id {
                        return Err(malformed(
                            number,
                            format!("end of block '{id}' closes block '{open_id}' (line {start})"),
                        ));
                    }
                    segments.push(Segment::Block {
                        id: open_id,
                        begin,
                        body,
                        end: line.to_string(),
                    });
                }
            }
        }

        if let Some((start, id, ..)) = open {
            return Err(malformed(start, format!("block '{id}' is never closed")));
        }
        if !scaffold.is_empty() {
            segments.push(Segment::Scaffold(scaffold));
        }

        Ok(Self { segments })
    }

    /// Block ids in document order.
    pub fn ids(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Block { id, .. } => Some(id.as_str()),
                Segment::Scaffold(_) => None,
            })
            .collect()
    }

    pub fn body(&self, id: &str) -> Option<&str> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Block { id: block, body, .. } if block == id => Some(body.as_str()),
            _ => None,
        })
    }

    fn bodies(&self) -> BTreeMap<&str, &str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Block { id, body, .. } => Some((id.as_str(), body.as_str())),
                Segment::Scaffold(_) => None,
            })
            .collect()
    }
}

/// Result of splicing an existing file into freshly generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub text: String,
    /// Ids whose body was taken from the existing file.
    pub preserved: Vec<String>,
    /// Ids present in the existing file but no longer generated. Their
    /// content is not part of `text`.
    pub orphaned: Vec<String>,
}

impl MergeOutcome {
    pub fn has_orphans(&self) -> bool {
        !self.orphaned.is_empty()
    }
}

/// Which input of a merge failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeInput {
    Generated,
    Existing,
}

/// Splice the block bodies of `existing` into `generated`.
pub fn merge_custom_blocks(generated: &str, existing: &str) -> Result<MergeOutcome, (MergeInput, DomainError)> {
    let existing = CustomBlocks::parse(existing).map_err(|error| (MergeInput::Existing, error))?;
    let generated = CustomBlocks::parse(generated).map_err(|error| (MergeInput::Generated, error))?;

    let previous = existing.bodies();
    let mut text = String::new();
    let mut preserved = Vec::new();

    for segment in &generated.segments {
        match segment {
            Segment::Scaffold(scaffold) => text.push_str(scaffold),
            Segment::Block { id, begin, body, end } => {
                text.push_str(begin);
                match previous.get(id.as_str()) {
                    Some(kept) => {
                        text.push_str(kept);
                        preserved.push(id.clone());
                    }
                    None => text.push_str(body),
                }
                text.push_str(end);
            }
        }
    }

    let generated_ids: HashSet<&str> = generated.ids().into_iter().collect();
    let orphaned = existing
        .ids()
        .into_iter()
        .filter(|id| !generated_ids.contains(id))
        .map(str::to_string)
        .collect();

    Ok(MergeOutcome {
        text,
        preserved,
        orphaned,
    })
}
