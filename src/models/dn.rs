// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Distinguished-name handling for the LDAP settings handed to the web app.

use std::fmt;

/// A distinguished name, stored without leading/trailing separators.
///
/// Components such as `CN=Users` and `DC=example,DC=com` are kept separately
/// and joined with [`DistinguishedName::under`] so the result never carries a
/// doubled or missing comma.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName(String);

impl DistinguishedName {
    pub fn new(raw: &str) -> Self {
        Self(
            raw.trim()
                .trim_matches(|c: char| c == ',' || c.is_whitespace())
                .to_string(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Place `self` below `parent`: `CN=Users` under `DC=example,DC=com`
    /// yields `CN=Users,DC=example,DC=com`. Empty sides are skipped.
    pub fn under(&self, parent: &DistinguishedName) -> DistinguishedName {
        DistinguishedName(join_dn(&[self, parent]))
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join DN components most-specific first, skipping empty ones.
pub fn join_dn(parts: &[&DistinguishedName]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
