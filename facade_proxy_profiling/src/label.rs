// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use facade_proxy::Qualifier;
use std::string::String;

/// Label policy for dispatch spans.
pub trait DispatchLabeler: 'static {
    /// Label for a dispatch of the convention tagged `tag` on `concrete`.
    fn label(tag: &str, concrete: &'static str, qualifier: Qualifier) -> String;
}

/// Labels with the full concrete type path: `to_string(&alloc::string::String)`.
#[derive(Default, Debug)]
pub struct DefaultLabeler;

impl DispatchLabeler for DefaultLabeler {
    fn label(tag: &str, concrete: &'static str, qualifier: Qualifier) -> String {
        format!("{tag}({}{concrete})", receiver(qualifier))
    }
}

/// Labels with module paths stripped: `to_string(&String)`.
#[derive(Default, Debug)]
pub struct ShortTypeLabeler;

impl DispatchLabeler for ShortTypeLabeler {
    fn label(tag: &str, concrete: &'static str, qualifier: Qualifier) -> String {
        format!("{tag}({}{})", receiver(qualifier), short_type_name(concrete))
    }
}

fn receiver(qualifier: Qualifier) -> &'static str {
    match qualifier {
        Qualifier::Mut => "&mut ",
        Qualifier::Ref => "&",
    }
}

/// Strips module paths from every path segment of a type name, keeping generics.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
    out
}
