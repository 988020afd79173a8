use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read, Write};

use lazy_static::lazy_static;
use regex::Regex;

/// Name of the single class that collects every string term, regardless of
/// key prefix. String terms are deliberately not grouped the way FourCC
/// terms are.
pub const STRING_TERM_CLASS: &str = "StringTerm";

#[derive(Debug)]
pub enum ExtractError {
    MalformedKey(String),
    ReadError,
    WriteError,
}

impl core::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use ExtractError::*;
        match *self {
            MalformedKey(ref key) => write!(
                f,
                "key `{}` contains no digit or uppercase letter to split at",
                key
            ),
            ReadError => write!(f, "unable to read source header"),
            WriteError => write!(f, "unable to write destination file"),
        }
    }
}

impl std::error::Error for ExtractError {}

lazy_static! {
    static ref TERM_PATTERN: Regex =
        Regex::new(r"^#define\s+(?P<key>\w+)\s+'(?P<value>....)'(\s+//\s(?P<comment>.*))?$")
            .unwrap();
    static ref STRING_TERM_PATTERN: Regex =
        Regex::new(r#"^#define\s+(?P<key>\w+)\s+"(?P<value>[^"]+)"(\s+//\s(?P<comment>.*))?$"#)
            .unwrap();
}

/// The two macro shapes recognized in vendor headers: FourCC terms carry a
/// single-quoted 4-character value, text terms a double-quoted string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TermPattern {
    FourCc,
    Text,
}

impl TermPattern {
    fn regex(&self) -> &'static Regex {
        match self {
            TermPattern::FourCc => &TERM_PATTERN,
            TermPattern::Text => &STRING_TERM_PATTERN,
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct RawTerm {
    pub key: String,
    pub value: String,
    pub comment: Option<String>,
}

#[derive(Default, Debug, Clone)]
pub struct Member {
    pub name: String,
    pub value: String,
}

#[derive(Default, Debug)]
pub struct TermGroup {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Default, Debug)]
pub struct TerminologySet {
    pub groups: Vec<TermGroup>,
}

impl TerminologySet {
    /// Appends a member to the named group, creating the group on first
    /// encounter so group order follows the input file.
    fn push(&mut self, group: String, member: Member) {
        match self.groups.iter_mut().find(|g| g.name == group) {
            Some(g) => g.members.push(member),
            None => self.groups.push(TermGroup {
                name: group,
                members: vec![member],
            }),
        }
    }
}

/// Scans a header line by line, yielding one `RawTerm` per line that matches
/// the selected macro pattern. Lines that don't match (comments, blank
/// lines, multi-line macros) are skipped without error.
pub fn scan<T: Read>(
    src: T,
    pattern: TermPattern,
) -> impl Iterator<Item = Result<RawTerm, ExtractError>> {
    let re = pattern.regex();
    BufReader::new(src).lines().filter_map(move |line| match line {
        Ok(line) => re.captures(&line).map(|caps| {
            let term = RawTerm {
                key: caps["key"].to_string(),
                value: caps["value"].to_string(),
                comment: caps.name("comment").map(|c| c.as_str().to_string()),
            };
            log::trace!("matched {} = {:?}", term.key, term.value);
            Ok(term)
        }),
        Err(_) => Some(Err(ExtractError::ReadError)),
    })
}

/// Splits a raw key at the first digit or uppercase letter. Keys are shaped
/// like `kfooFirst`: a lowercase grouping prefix followed by the member name.
/// A key with no split point cannot be classified and is a fatal error, not
/// a skippable line.
fn split_key(key: &str) -> Result<(&str, &str), ExtractError> {
    match key.find(|c: char| c.is_ascii_digit() || c.is_ascii_uppercase()) {
        Some(at) => Ok(key.split_at(at)),
        None => Err(ExtractError::MalformedKey(key.to_string())),
    }
}

const RESERVED: &[&str] = &["None", "True", "False"];

/// Member names must be valid Python identifiers: a leading digit or a
/// keyword/literal collision gets an underscore prefix.
fn member_name(member: &str) -> String {
    if member.starts_with(|c: char| c.is_ascii_digit()) || RESERVED.contains(&member) {
        format!("_{}", member)
    } else {
        member.to_string()
    }
}

/// Capitalizes the prefix into a class name. `Class` would collide with
/// Python's keyword for defining types, so it becomes `Klass`.
fn class_name(prefix: &str) -> String {
    let mut name = String::with_capacity(prefix.len());
    let mut chars = prefix.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
    }
    name.extend(chars.flat_map(|c| c.to_lowercase()));
    name.replace("Class", "Klass")
}

fn classify_with<I, F>(terms: I, group_for: F) -> Result<TerminologySet, ExtractError>
where
    I: IntoIterator<Item = Result<RawTerm, ExtractError>>,
    F: Fn(&str) -> String,
{
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .try_fold(TerminologySet::default(), |mut set, term| {
            let term = term?;
            if !seen.insert(term.key.clone()) {
                log::debug!("duplicate key {}, keeping the first definition", term.key);
                return Ok(set);
            }
            let (prefix, member) = split_key(&term.key)?;
            set.push(
                group_for(prefix),
                Member {
                    name: member_name(member),
                    value: term.value,
                },
            );
            Ok(set)
        })
}

/// Folds a scanned term sequence into a `TerminologySet`, one group per
/// distinct key prefix. Duplicate raw keys are dropped, first wins.
pub fn classify<I>(terms: I) -> Result<TerminologySet, ExtractError>
where
    I: IntoIterator<Item = Result<RawTerm, ExtractError>>,
{
    classify_with(terms, class_name)
}

/// Like `classify`, but collapses every term into the single `StringTerm`
/// group, preserving encounter order across the whole file. The prefix is
/// still split off (and still fatal when missing); it just doesn't select a
/// group.
pub fn classify_flat<I>(terms: I) -> Result<TerminologySet, ExtractError>
where
    I: IntoIterator<Item = Result<RawTerm, ExtractError>>,
{
    classify_with(terms, |_| STRING_TERM_CLASS.to_string())
}

/// Renders a value as a Python bytes literal that decodes back to exactly
/// the original bytes.
pub fn py_bytes_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 3);
    literal.push_str("b'");
    for byte in value.bytes() {
        match byte {
            b'\\' => literal.push_str("\\\\"),
            b'\'' => literal.push_str("\\'"),
            b'\n' => literal.push_str("\\n"),
            b'\r' => literal.push_str("\\r"),
            b'\t' => literal.push_str("\\t"),
            0x20..=0x7e => literal.push(byte as char),
            _ => literal.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    literal.push('\'');
    literal
}

fn print_header<U: Write>(out: &mut U) -> std::io::Result<()> {
    let s = r#""""
Constants for descriptor.

This file is automatically generated by hdr2term.
"""
from enum import Enum as _Enum
"#;
    out.write_all(s.as_bytes())
}

fn print_term_group<U: Write>(group: &TermGroup, out: &mut U) -> std::io::Result<()> {
    write!(
        out,
        r#"

class {0}(_Enum):
    """
    {0} definitions extracted from PITerminology.h.

    See https://www.adobe.com/devnet/photoshop/sdk.html
    """
"#,
        group.name
    )?;
    for member in &group.members {
        writeln!(out, "    {} = {}", member.name, py_bytes_literal(&member.value))?;
    }
    Ok(())
}

fn print_string_term_group<U: Write>(group: &TermGroup, out: &mut U) -> std::io::Result<()> {
    write!(
        out,
        r#"

class {}(_Enum):
    """
    String terms extracted from PIStringTerminology.h in Photoshop SDK.

    This defines constants for the strings used to access descriptor events,
    keys, classes, enum types, and enum values.

    See https://www.adobe.com/devnet/photoshop/sdk.html
    """
"#,
        group.name
    )?;
    for member in &group.members {
        writeln!(out, "    {} = {}", member.name, py_bytes_literal(&member.value))?;
    }
    Ok(())
}

/// Writes the file header plus one class per group, in group order.
pub fn print_terminology<U: Write>(
    set: &TerminologySet,
    out: &mut U,
) -> Result<(), ExtractError> {
    print_header(out).or(Err(ExtractError::WriteError))?;
    for group in &set.groups {
        print_term_group(group, out).or(Err(ExtractError::WriteError))?;
    }
    Ok(())
}

/// Writes the file header plus the flat `StringTerm` class.
pub fn print_string_terminology<U: Write>(
    set: &TerminologySet,
    out: &mut U,
) -> Result<(), ExtractError> {
    print_header(out).or(Err(ExtractError::WriteError))?;
    for group in &set.groups {
        print_string_term_group(group, out).or(Err(ExtractError::WriteError))?;
    }
    Ok(())
}

/// Extracts FourCC terms (`#define key 'abcd'`), grouped by key prefix.
pub fn extract_terminology<T: Read>(src: T) -> Result<TerminologySet, ExtractError> {
    classify(scan(src, TermPattern::FourCc))
}

/// Extracts string terms (`#define key "text"`) into the single flat
/// `StringTerm` group.
pub fn extract_string_terminology<T: Read>(src: T) -> Result<TerminologySet, ExtractError> {
    classify_flat(scan(src, TermPattern::Text))
}

pub fn generate<T: Read, U: Write>(src: T, dest: &mut U) -> Result<(), ExtractError> {
    let terms = extract_terminology(src)?;
    print_terminology(&terms, dest)
}

pub fn generate_string_terms<T: Read, U: Write>(
    src: T,
    dest: &mut U,
) -> Result<(), ExtractError> {
    let terms = extract_string_terminology(src)?;
    print_string_terminology(&terms, dest)
}
