//! X12 syntax definitions and delimiter handling
//!
//! X12 has no service string advice segment: the delimiters are implied by
//! the fixed-width ISA header. The element separator is the byte right after
//! `ISA`, and the component separator and segment terminator sit at offsets
//! 104 and 105 of a standard ISA.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default X12 separators
pub const DEFAULT_ELEMENT_SEPARATOR: char = '*';
pub const DEFAULT_SEGMENT_TERMINATOR: char = '~';
pub const DEFAULT_COMPONENT_SEPARATOR: char = ':';
pub const DEFAULT_REPETITION_SEPARATOR: char = '^';

/// Byte offsets inside a fixed-width ISA segment
pub const ISA_ELEMENT_OFFSET: usize = 3;
pub const ISA_REPETITION_OFFSET: usize = 82;
pub const ISA_COMPONENT_OFFSET: usize = 104;
pub const ISA_SEGMENT_OFFSET: usize = 105;
/// Element separators preceding ISA16
const ISA_ELEMENT_COUNT: usize = 16;

/// Structural characters for one interchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Element separator (default '*')
    pub element: char,
    /// Segment terminator (default '~')
    pub segment: char,
    /// Component (sub-element) separator (default ':')
    pub component: char,
    /// Repetition separator (default '^')
    pub repetition: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            element: DEFAULT_ELEMENT_SEPARATOR,
            segment: DEFAULT_SEGMENT_TERMINATOR,
            component: DEFAULT_COMPONENT_SEPARATOR,
            repetition: DEFAULT_REPETITION_SEPARATOR,
        }
    }
}

/// Caller-supplied partial delimiter set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterOverrides {
    #[serde(default)]
    pub element: Option<char>,
    #[serde(default)]
    pub segment: Option<char>,
    #[serde(default)]
    pub component: Option<char>,
    #[serde(default)]
    pub repetition: Option<char>,
}

impl DelimiterOverrides {
    /// True when no override is set
    pub fn is_empty(&self) -> bool {
        self.element.is_none()
            && self.segment.is_none()
            && self.component.is_none()
            && self.repetition.is_none()
    }
}

impl Delimiters {
    /// Merge overrides on top of these delimiters
    pub fn with_overrides(self, overrides: &DelimiterOverrides) -> Self {
        Self {
            element: overrides.element.unwrap_or(self.element),
            segment: overrides.segment.unwrap_or(self.segment),
            component: overrides.component.unwrap_or(self.component),
            repetition: overrides.repetition.unwrap_or(self.repetition),
        }
    }

    /// Resolve the delimiters for a raw interchange.
    ///
    /// Text starting with `ISA` is sniffed: the element separator always comes
    /// from offset 3, the component separator and segment terminator from
    /// offsets 104/105 when the header is fixed width (its 16th element
    /// separator sits at offset 103) and those bytes are punctuation, and the repetition separator from ISA11 when it holds a
    /// punctuation character (version 00401 puts a `U` there instead).
    /// Anything that cannot be sniffed falls back to defaults merged with
    /// `overrides`.
    pub fn resolve(raw: &str, overrides: &DelimiterOverrides) -> Self {
        let fallback = Self::default().with_overrides(overrides);
        let bytes = raw.as_bytes();

        if !bytes.starts_with(b"ISA") {
            trace!("no ISA prefix, using default delimiters");
            return fallback;
        }

        let element = match raw.get(ISA_ELEMENT_OFFSET..).and_then(|rest| rest.chars().next()) {
            Some(c) => c,
            None => return fallback,
        };

        let mut resolved = Self { element, ..fallback };

        if is_fixed_width_isa(bytes) {
            if let Some(c) = sniff_byte(bytes, ISA_COMPONENT_OFFSET) {
                resolved.component = c;
            }
            if let Some(c) = sniff_byte(bytes, ISA_SEGMENT_OFFSET) {
                resolved.segment = c;
            }
            if let Some(c) = sniff_byte(bytes, ISA_REPETITION_OFFSET) {
                if c.is_ascii_punctuation() {
                    resolved.repetition = c;
                }
            }
        } else {
            debug!(
                length = bytes.len(),
                "ISA is not a fixed-width header, keeping default separators"
            );
        }

        resolved
    }

    /// Check that all four characters are distinct and non-whitespace
    pub fn validate(&self) -> Result<()> {
        let chars = [self.element, self.segment, self.component, self.repetition];

        if let Some(c) = chars.iter().find(|c| c.is_whitespace()) {
            return Err(Error::Delimiters(format!(
                "whitespace character {:?} cannot be a delimiter",
                c
            )));
        }

        for (i, a) in chars.iter().enumerate() {
            if chars[i + 1..].contains(a) {
                return Err(Error::Delimiters(format!(
                    "character {:?} is used for more than one delimiter",
                    a
                )));
            }
        }

        Ok(())
    }
}

/// The 16th element separator must sit right before the component separator
fn is_fixed_width_isa(bytes: &[u8]) -> bool {
    if bytes.len() <= ISA_SEGMENT_OFFSET {
        return false;
    }
    let element = bytes[ISA_ELEMENT_OFFSET];
    if !element.is_ascii() {
        return false;
    }
    let header = &bytes[..ISA_COMPONENT_OFFSET];
    header[ISA_COMPONENT_OFFSET - 1] == element
        && header.iter().filter(|b| **b == element).count() == ISA_ELEMENT_COUNT
}

fn sniff_byte(bytes: &[u8], offset: usize) -> Option<char> {
    bytes
        .get(offset)
        .copied()
        .filter(|b| b.is_ascii_graphic() && !b.is_ascii_alphanumeric())
        .map(char::from)
}
