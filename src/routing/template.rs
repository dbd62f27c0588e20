//! URI template compiler.
//!
//! # Grammar
//! ```text
//! template  = segment *( delimiter segment )
//! segment   = literal | "*" | "{" variable "}"
//! variable  = name [ ":" constraint *( "|" constraint ) ] [ "=" default ] [ "?" ]
//! constraint = ident [ "(" args ")" ]
//! ```
//!
//! Paths are split on `/`, hosts on `.`. A `*` segment is only meaningful in
//! hosts, where it matches exactly one label. Variables with a default or a
//! trailing `?` are optional and must form a contiguous trailing run.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::routing::constraint::{coerce, validate_all, Constraint, ParamValue};
use crate::routing::error::TemplateError;

/// A single piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Literal(String),
    Variable(Variable),
    Wildcard,
}

/// A named template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub constraints: Vec<Constraint>,
    pub optional: bool,
    pub default: Option<String>,
}

impl Variable {
    /// A variable with a default value may be omitted just like a `?` one.
    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }
}

/// A compiled path or host template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UriTemplate {
    source: String,
    delimiter: char,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Compiles a path template such as `/users/{id:int}/posts/{slug?}`.
    pub fn parse_path(source: &str) -> Result<Self, TemplateError> {
        Self::parse(source, '/', false)
    }

    /// Compiles a host template such as `{tenant}.example.com` or `*.example.com`.
    pub fn parse_host(source: &str) -> Result<Self, TemplateError> {
        Self::parse(source, '.', true)
    }

    fn parse(source: &str, delimiter: char, is_host: bool) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        for piece in split_segments(source, delimiter)? {
            segments.push(parse_segment(piece, source, is_host)?);
        }

        let template = Self {
            source: source.to_string(),
            delimiter,
            segments,
        };
        template.check_variables()?;
        Ok(template)
    }

    fn check_variables(&self) -> Result<(), TemplateError> {
        let mut seen = HashSet::new();
        let mut first_optional: Option<&str> = None;

        for segment in &self.segments {
            if let Some(name) = first_optional {
                let still_optional = matches!(segment, Segment::Variable(v) if v.is_optional());
                if !still_optional {
                    return Err(TemplateError::OptionalBeforeRequired {
                        template: self.source.clone(),
                        name: name.to_string(),
                    });
                }
            }

            if let Segment::Variable(variable) = segment {
                if !seen.insert(variable.name.as_str()) {
                    return Err(TemplateError::DuplicateVariable {
                        template: self.source.clone(),
                        name: variable.name.clone(),
                    });
                }
                if variable.is_optional() && first_optional.is_none() {
                    first_optional = Some(variable.name.as_str());
                }
            }
        }
        Ok(())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variables in template order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(v) => Some(v),
            _ => None,
        })
    }

    /// Number of leading segments that must be present for a match.
    pub fn required_len(&self) -> usize {
        self.segments
            .iter()
            .position(|s| matches!(s, Segment::Variable(v) if v.is_optional()))
            .unwrap_or(self.segments.len())
    }

    /// Matches a host header against this host template.
    ///
    /// Comparison is case-insensitive and ignores a `:port` suffix. Returns the
    /// raw values captured for the template's variables, in order.
    pub fn match_host(&self, host: &str) -> Option<Vec<String>> {
        let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
        let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
        if labels.len() < self.required_len() || labels.len() > self.segments.len() {
            return None;
        }

        let mut captured = Vec::new();
        for (segment, label) in self.segments.iter().zip(&labels) {
            match segment {
                Segment::Literal(text) if text.as_str() != *label => return None,
                Segment::Literal(_) | Segment::Wildcard => {}
                Segment::Variable(v) => {
                    if !validate_all(&v.constraints, label) {
                        return None;
                    }
                    captured.push(label.to_string());
                }
            }
        }
        Some(captured)
    }

    /// Coerces captured raw values into typed parameters.
    ///
    /// Variables past the captured values fall back to their default, or are
    /// left out when they have none. Returns `None` if any value fails to
    /// coerce.
    pub fn bind<S: AsRef<str>>(&self, captured: &[S]) -> Option<BTreeMap<String, ParamValue>> {
        let mut values = BTreeMap::new();
        for (i, variable) in self.variables().enumerate() {
            let raw = match captured.get(i) {
                Some(value) => value.as_ref(),
                None => match &variable.default {
                    Some(default) => default.as_str(),
                    None => continue,
                },
            };
            values.insert(variable.name.clone(), coerce(&variable.constraints, raw)?);
        }
        Some(values)
    }
}

/// Splits on the delimiter outside of braces, dropping empty pieces.
fn split_segments(source: &str, delimiter: char) -> Result<Vec<&str>, TemplateError> {
    let unbalanced = || TemplateError::UnbalancedBraces {
        template: source.to_string(),
    };

    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            c if c == delimiter && depth == 0 => {
                pieces.push(&source[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    pieces.push(&source[start..]);

    Ok(pieces.into_iter().filter(|p| !p.is_empty()).collect())
}

fn parse_segment(piece: &str, template: &str, is_host: bool) -> Result<Segment, TemplateError> {
    if is_host && piece == "*" {
        return Ok(Segment::Wildcard);
    }
    if !piece.contains(|c: char| c == '{' || c == '}') {
        let text = if is_host {
            piece.to_ascii_lowercase()
        } else {
            piece.to_string()
        };
        return Ok(Segment::Literal(text));
    }

    // The opening brace must close on the final character.
    let wraps_whole = piece.starts_with('{') && {
        let mut depth = 0usize;
        let mut closed_at = None;
        for (i, c) in piece.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        closed_at = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        closed_at == Some(piece.len() - 1)
    };
    if !wraps_whole {
        return Err(TemplateError::PartialSegment {
            template: template.to_string(),
        });
    }

    parse_variable(&piece[1..piece.len() - 1], template).map(Segment::Variable)
}

fn parse_variable(body: &str, template: &str) -> Result<Variable, TemplateError> {
    let (body, optional) = match body.strip_suffix('?') {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    let (body, default) = match find_top_level(body, '=') {
        Some(i) => (&body[..i], Some(body[i + 1..].to_string())),
        None => (body, None),
    };
    let (name, constraint_text) = match find_top_level(body, ':') {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError::InvalidVariableName {
            template: template.to_string(),
            name: name.to_string(),
        });
    }

    let constraints = match constraint_text {
        Some(text) => split_top_level(text, '|')
            .into_iter()
            .map(parse_constraint)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    if let Some(value) = &default {
        if !validate_all(&constraints, value) {
            return Err(TemplateError::InvalidDefault {
                name: name.to_string(),
                value: value.clone(),
            });
        }
    }

    Ok(Variable {
        name: name.to_string(),
        constraints,
        optional,
        default,
    })
}

fn parse_constraint(text: &str) -> Result<Constraint, TemplateError> {
    let text = text.trim();
    match text.find('(') {
        Some(open) => {
            let name = &text[..open];
            let args = text[open + 1..].strip_suffix(')').ok_or_else(|| {
                TemplateError::InvalidConstraintArgs {
                    constraint: name.to_string(),
                    reason: "missing closing parenthesis".to_string(),
                }
            })?;
            Constraint::parse(name, Some(args))
        }
        None => Constraint::parse(text, None),
    }
}

/// Finds the first `target` outside parentheses, honouring backslash escapes.
fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(i) = find_top_level(rest, separator) {
        parts.push(&rest[..i]);
        rest = &rest[i + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(template: &UriTemplate, index: usize) -> &Variable {
        template.variables().nth(index).unwrap()
    }

    #[test]
    fn test_parse_literals_and_variables() {
        let t = UriTemplate::parse_path("/users/{id:int}/posts/{slug?}").unwrap();
        assert_eq!(t.segments().len(), 4);
        assert_eq!(t.segments()[0], Segment::Literal("users".into()));
        assert_eq!(variable(&t, 0).name, "id");
        assert_eq!(variable(&t, 0).constraints, vec![Constraint::Int]);
        assert!(variable(&t, 1).optional);
        assert_eq!(t.required_len(), 3);
    }

    #[test]
    fn test_root_and_empty_pieces() {
        assert!(UriTemplate::parse_path("/").unwrap().segments().is_empty());
        let t = UriTemplate::parse_path("//a///b/").unwrap();
        assert_eq!(t.segments().len(), 2);
    }

    #[test]
    fn test_multiple_constraints_and_default() {
        let t = UriTemplate::parse_path("/pages/{page:int|between(1,50)=1}").unwrap();
        let page = variable(&t, 0);
        assert_eq!(page.constraints.len(), 2);
        assert_eq!(page.default.as_deref(), Some("1"));
        assert!(page.is_optional());
        assert_eq!(t.required_len(), 1);
    }

    #[test]
    fn test_regex_may_contain_delimiters() {
        let t = UriTemplate::parse_path(r"/v/{ver:regex(\d+/\d{2}|x)}").unwrap();
        let ver = variable(&t, 0);
        assert_eq!(ver.constraints.len(), 1);
        assert!(ver.constraints[0].validate("1/23"));
        assert!(ver.constraints[0].validate("x"));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            UriTemplate::parse_path("/users/{id"),
            Err(TemplateError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/users/id}"),
            Err(TemplateError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{x}/b/{x}"),
            Err(TemplateError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{x?}/{y}"),
            Err(TemplateError::OptionalBeforeRequired { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{x?}/edit"),
            Err(TemplateError::OptionalBeforeRequired { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{x:date}"),
            Err(TemplateError::UnknownConstraint { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{}"),
            Err(TemplateError::InvalidVariableName { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/file-{x}"),
            Err(TemplateError::PartialSegment { .. })
        ));
        assert!(matches!(
            UriTemplate::parse_path("/a/{n:int=abc}"),
            Err(TemplateError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_host_matching() {
        let t = UriTemplate::parse_host("{tenant}.Example.com").unwrap();
        assert_eq!(t.match_host("acme.example.com:8080"), Some(vec!["acme".to_string()]));
        assert_eq!(t.match_host("ACME.EXAMPLE.COM"), Some(vec!["acme".to_string()]));
        assert_eq!(t.match_host("example.com"), None);

        let wildcard = UriTemplate::parse_host("*.example.com").unwrap();
        assert_eq!(wildcard.match_host("api.example.com"), Some(vec![]));
        assert_eq!(wildcard.match_host("a.b.example.com"), None);
    }

    #[test]
    fn test_bind_applies_defaults() {
        let t = UriTemplate::parse_path("/list/{page:int=1}").unwrap();
        let values = t.bind::<&str>(&[]).unwrap();
        assert_eq!(values["page"], ParamValue::Int(1));

        let t = UriTemplate::parse_path("/posts/{slug?}").unwrap();
        assert!(t.bind::<&str>(&[]).unwrap().is_empty());
    }
}
