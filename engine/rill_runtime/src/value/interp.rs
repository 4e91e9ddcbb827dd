//! Lazy interpolated strings.
//!
//! Evaluating a string-interpolation node renders each expression fragment
//! to a value eagerly, but the concatenation into one string is deferred
//! until the first textual use and then cached. A result that is only
//! measured or passed onward never pays for the join.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::Value;

/// One fragment of an interpolated string.
#[derive(Clone, Debug)]
pub enum InterpPart {
    /// Literal text, inserted verbatim.
    Text(Arc<str>),
    /// An evaluated expression fragment, rendered on demand.
    Value(Value),
}

/// An interpolated string: ordered fragments plus a render cache.
#[derive(Debug)]
pub struct InterpString {
    parts: Vec<InterpPart>,
    rendered: OnceLock<String>,
}

impl InterpString {
    pub fn new(parts: Vec<InterpPart>) -> Self {
        InterpString {
            parts,
            rendered: OnceLock::new(),
        }
    }

    /// The fragments, in order.
    pub fn parts(&self) -> &[InterpPart] {
        &self.parts
    }

    /// Whether the concatenation has been materialized yet.
    pub fn is_rendered(&self) -> bool {
        self.rendered.get().is_some()
    }

    /// The concatenated text, rendered once and cached.
    pub fn text(&self) -> &str {
        self.rendered.get_or_init(|| {
            let mut out = String::new();
            for part in &self.parts {
                match part {
                    InterpPart::Text(text) => out.push_str(text),
                    InterpPart::Value(value) => {
                        use fmt::Write;
                        let _ = write!(out, "{value}");
                    }
                }
            }
            out
        })
    }
}

impl fmt::Display for InterpString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl PartialEq for InterpString {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}
