//! Reverse URI generation.
//!
//! Rebuilds a concrete URI from a route name and parameter values. Literal
//! segments are reproduced verbatim; variables are substituted after being
//! checked against their constraints and percent-encoded. Omitted optional
//! trailing variables are dropped from the output entirely. Host values are
//! lower-cased, matching how incoming hosts are compared.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::constraint::validate_all;
use crate::routing::error::UriError;
use crate::routing::template::{Segment, UriTemplate};
use crate::routing::trie::{CompiledRoute, CompiledTrie};

/// Generates URIs for named routes.
#[derive(Debug, Clone)]
pub struct RouteUriFactory {
    trie: Arc<CompiledTrie>,
}

impl RouteUriFactory {
    pub fn new(trie: Arc<CompiledTrie>) -> Self {
        Self { trie }
    }

    /// Generates the URI for `route_name`.
    ///
    /// Routes without a host produce an absolute path (`/users/42`). Routes
    /// with a host produce a scheme-relative URI (`//acme.example.com/users/42`).
    pub fn generate(&self, route_name: &str, params: &HashMap<String, String>) -> Result<String, UriError> {
        let route = self
            .trie
            .route_by_name(route_name)
            .ok_or_else(|| UriError::RouteNotFound(route_name.to_string()))?;

        let path = render(route, &route.path, params, Part::Path)?;
        match &route.host {
            Some(host) => Ok(format!("//{}/{}", render(route, host, params, Part::Host)?, path)),
            None => Ok(format!("/{}", path)),
        }
    }
}

/// Characters escaped inside a generated path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Host,
    Path,
}

fn render(
    route: &CompiledRoute,
    template: &UriTemplate,
    params: &HashMap<String, String>,
    part: Part,
) -> Result<String, UriError> {
    let route_name = || route.name().unwrap_or_default().to_string();

    // Optional variables after the last supplied one are omitted.
    let last_supplied = template
        .segments()
        .iter()
        .rposition(|s| matches!(s, Segment::Variable(v) if params.contains_key(&v.name)));

    let mut parts: Vec<Cow<'_, str>> = Vec::with_capacity(template.segments().len());
    for (index, segment) in template.segments().iter().enumerate() {
        match segment {
            Segment::Literal(text) => parts.push(Cow::Borrowed(text.as_str())),
            Segment::Wildcard => return Err(UriError::WildcardHost(route_name())),
            Segment::Variable(variable) => match params.get(&variable.name) {
                Some(value) => {
                    // Hosts are matched case-insensitively, so they are generated lower-case.
                    let value = match part {
                        Part::Host => Cow::Owned(value.to_ascii_lowercase()),
                        Part::Path => Cow::Borrowed(value.as_str()),
                    };
                    let fits_segment = !value.is_empty() && !value.contains(template.delimiter());
                    if !fits_segment || !validate_all(&variable.constraints, &value) {
                        return Err(UriError::ParameterConstraintViolation {
                            route: route_name(),
                            name: variable.name.clone(),
                            value: value.into_owned(),
                        });
                    }
                    parts.push(match part {
                        Part::Host => value,
                        Part::Path => utf8_percent_encode(&value, PATH_SEGMENT).to_string().into(),
                    });
                }
                None if variable.is_optional() && last_supplied.map_or(true, |last| index > last) => {
                    break
                }
                None => match &variable.default {
                    Some(default) => parts.push(match part {
                        Part::Host => Cow::Borrowed(default.as_str()),
                        Part::Path => utf8_percent_encode(default, PATH_SEGMENT).to_string().into(),
                    }),
                    None => {
                        return Err(UriError::MissingParameter {
                            route: route_name(),
                            name: variable.name.clone(),
                        })
                    }
                },
            },
        }
    }

    let delimiter = template.delimiter().to_string();
    Ok(parts.join(delimiter.as_str()))
}
