// Identity normalisation and resolution
//
// Owner and issued-to values are free text (an address, a team name, a
// distribution list). Resolution turns the pair into the recipients string a
// notification goes to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lower-case and strip every whitespace character. Comparison only, never displayed.
pub fn normalize_identity(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Merge two normalised identities into one recipients string
///
/// - equal: the owner alone
/// - owner contained in issued-to: issued-to (the fuller identity, e.g. a list embedding a name)
/// - issued-to contained in owner: the owner (covers an empty issued-to)
/// - unrelated: `owner,issued_to`, owner first
///
/// Substring containment is a loose approximation of identity, not a resolution.
pub fn merge_identities(owner: &str, issued_to: &str) -> String {
    if owner == issued_to {
        owner.to_string()
    } else if issued_to.contains(owner) {
        issued_to.to_string()
    } else if owner.contains(issued_to) {
        owner.to_string()
    } else {
        format!("{},{}", owner, issued_to)
    }
}

/// Resolved recipients of one notification, comma separated
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipients(String);

impl Recipients {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Individual recipient identities in order
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').filter(|part| !part.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.addresses().next().is_none()
    }
}

impl std::fmt::Display for Recipients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strategy that decides who is responsible for a certificate
pub trait IdentityResolver: Send + Sync {
    /// Canonical form of a single free-text identity
    fn canonicalize(&self, raw: &str) -> String {
        normalize_identity(raw)
    }

    /// Recipients for an owner / issued-to pair. `owner` is never empty once normalised.
    fn resolve(&self, owner: &str, issued_to: &str) -> Recipients {
        Recipients::new(merge_identities(
            &self.canonicalize(owner),
            &self.canonicalize(issued_to),
        ))
    }

    /// Resolver name for logging
    fn resolver_name(&self) -> &str;
}

/// Plain normalisation plus substring containment
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringResolver;

impl IdentityResolver for SubstringResolver {
    fn resolver_name(&self) -> &str {
        "substring"
    }
}

/// Looks identities up in an alias directory before merging
///
/// Keys are matched on their normalised form, so `"Jane Doe"` and `"janedoe"`
/// hit the same entry. Unknown identities fall through unchanged.
#[derive(Debug, Clone, Default)]
pub struct AliasDirectoryResolver {
    aliases: HashMap<String, String>,
}

impl AliasDirectoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an alias -> canonical identity table
    pub fn from_map(aliases: &HashMap<String, String>) -> Self {
        let mut resolver = Self::new();
        for (alias, canonical) in aliases {
            resolver.add_alias(alias, canonical);
        }
        resolver
    }

    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(normalize_identity(alias), normalize_identity(canonical));
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl IdentityResolver for AliasDirectoryResolver {
    fn canonicalize(&self, raw: &str) -> String {
        let normalized = normalize_identity(raw);
        match self.aliases.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }

    fn resolver_name(&self) -> &str {
        "alias-directory"
    }
}
