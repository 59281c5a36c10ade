//! Partial-update field helpers.
//!
//! A nullable column in an update payload has three states: absent (leave
//! unchanged), `null` (clear), or a value (set). Model it as
//! `Option<Option<T>>` and annotate the field with
//! `#[serde(default, deserialize_with = "ipms_core::patch::double_option")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) into `Some(..)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a three-state patch to a nullable field.
pub fn apply<T>(target: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *target = value;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
