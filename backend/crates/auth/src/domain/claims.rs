//! Identity Claims
//!
//! Payload of a verified bearer token.

use serde::{Deserialize, Deserializer, Serialize};

/// Claims carried by tokens from the identity system
///
/// `groups` tolerates an explicit `null`, which some issuers emit for
/// users without any group membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the caller's user id)
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<String>,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

impl Claims {
    /// Whether the claims list `group` among their memberships
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
