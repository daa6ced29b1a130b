use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role carried in a token.
///
/// Roles stay opaque strings on the wire; the marketplace only gives meaning
/// to the three well-known ones below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const SELLER: Role = Role(Cow::Borrowed("seller"));
    pub const BUYER: Role = Role(Cow::Borrowed("buyer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == "admin"
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
