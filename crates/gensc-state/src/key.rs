//! Composite key codec.
//!
//! A composite key addresses a record by an asset type plus an ordered list
//! of string parts. The encoding is the one used by ledger world-state
//! databases:
//!
//! ```text
//! U+0000 asset_type U+0000 part_1 U+0000 ... part_n U+0000
//! ```
//!
//! Every component is terminated by the delimiter, so the encoding of a
//! partial key (asset type plus leading parts) is a byte prefix of every full
//! key that extends it. This is what makes range scans by partial key work.

use std::fmt;

use crate::error::{StateError, StateResult};

/// Delimiter that separates composite key components.
pub const COMPONENT_DELIMITER: char = '\u{0}';

/// Largest Unicode scalar value. Reserved as the open end of partial-key
/// ranges, so it may not appear inside a component.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// An asset type plus ordered key parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    asset_type: String,
    parts: Vec<String>,
}

impl CompositeKey {
    /// Build a composite key, validating every component.
    pub fn new(asset_type: impl Into<String>, parts: Vec<String>) -> StateResult<Self> {
        let asset_type = asset_type.into();
        validate_component(&asset_type)?;
        for part in &parts {
            validate_component(part)?;
        }
        Ok(Self { asset_type, parts })
    }

    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Encode into the sortable single-string form.
    pub fn encode(&self) -> String {
        let capacity = 2
            + self.asset_type.len()
            + self.parts.iter().map(|p| p.len() + 1).sum::<usize>();
        let mut key = String::with_capacity(capacity);
        key.push(COMPONENT_DELIMITER);
        key.push_str(&self.asset_type);
        key.push(COMPONENT_DELIMITER);
        for part in &self.parts {
            key.push_str(part);
            key.push(COMPONENT_DELIMITER);
        }
        key
    }

    /// Split an encoded key back into asset type and parts.
    pub fn decode(encoded: &str) -> StateResult<Self> {
        let inner = encoded
            .strip_prefix(COMPONENT_DELIMITER)
            .and_then(|rest| rest.strip_suffix(COMPONENT_DELIMITER))
            .ok_or_else(|| StateError::InvalidCompositeKey {
                component: encoded.to_string(),
                reason: "not delimited as a composite key".into(),
            })?;

        let mut components = inner.split(COMPONENT_DELIMITER).map(str::to_string);
        // `split` always yields at least one item, even for "".
        let asset_type = components.next().unwrap_or_default();
        Ok(Self {
            asset_type,
            parts: components.collect(),
        })
    }

    /// Returns `true` if `encoded` lies in the range scanned by this key used
    /// as a partial key.
    pub fn is_prefix_of(&self, encoded: &str) -> bool {
        encoded.starts_with(&self.encode())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.asset_type)?;
        for part in &self.parts {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

fn validate_component(component: &str) -> StateResult<()> {
    for reserved in [COMPONENT_DELIMITER, MAX_UNICODE_RUNE] {
        if component.contains(reserved) {
            return Err(StateError::InvalidCompositeKey {
                component: component.to_string(),
                reason: format!("contains reserved rune U+{:04X}", reserved as u32),
            });
        }
    }
    Ok(())
}
