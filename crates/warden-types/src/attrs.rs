//! Resource attributes for ABAC condition evaluation.
//!
//! [`ResourceAttributes`] is the request-side bag of facts about the
//! resource being accessed (file size, owner, content type, ...). The
//! engine never interprets it; the map is handed verbatim to the
//! [`ConditionEvaluator`] port when a grant carries a condition.
//!
//! [`ConditionEvaluator`]: https://docs.rs/warden-auth

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar attribute value.
///
/// Conditions only ever compare scalars, so the value space is
/// deliberately flat: numbers, text, booleans. Integers are widened to
/// `f64` on construction; equality between numbers is numeric.
///
/// # Example
///
/// ```
/// use warden_types::AttrValue;
///
/// assert_eq!(AttrValue::from(15), AttrValue::from(15.0));
/// assert_ne!(AttrValue::from("15"), AttrValue::from(15.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A numeric value. Integers widen losslessly up to 2^53.
    Number(f64),
    /// A text value.
    Text(String),
    /// A boolean value.
    Bool(bool),
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Immutable attribute map passed to condition evaluation.
///
/// Built once per evaluation request and never mutated afterwards.
/// Use [`empty`](Self::empty) for requests with no resource facts and
/// [`builder`](Self::builder) otherwise.
///
/// # Example
///
/// ```
/// use warden_types::{AttrValue, ResourceAttributes};
///
/// let attrs = ResourceAttributes::builder()
///     .attr("size_mb", 15.5)
///     .attr("owner", "alice")
///     .attr("encrypted", true)
///     .build();
///
/// assert_eq!(attrs.get("size_mb"), Some(&AttrValue::Number(15.5)));
/// assert!(attrs.get("missing").is_none());
/// assert!(ResourceAttributes::empty().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAttributes {
    attributes: BTreeMap<String, AttrValue>,
}

impl ResourceAttributes {
    /// Returns the shared no-attributes value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts building an attribute map.
    #[must_use]
    pub fn builder() -> ResourceAttributesBuilder {
        ResourceAttributesBuilder::default()
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Returns `true` if no attributes were provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Iterates attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Builder for [`ResourceAttributes`].
///
/// Later values win on duplicate names.
#[derive(Debug, Default)]
pub struct ResourceAttributesBuilder {
    attributes: BTreeMap<String, AttrValue>,
}

impl ResourceAttributesBuilder {
    /// Adds one attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Finishes the map.
    #[must_use]
    pub fn build(self) -> ResourceAttributes {
        ResourceAttributes {
            attributes: self.attributes,
        }
    }
}
