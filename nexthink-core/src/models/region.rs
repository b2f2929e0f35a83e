//! Hosting regions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Region a Nexthink instance is hosted in.
///
/// The region is part of both the OAuth2 token endpoint host and the API
/// host, so it is fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States.
    Us,
    /// European Union.
    Eu,
    /// Asia-Pacific.
    Pac,
    /// Middle East, Turkey and Africa.
    Meta,
}

impl Region {
    /// Returns the lowercase identifier used in hostnames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::Pac => "pac",
            Self::Meta => "meta",
        }
    }

    /// Returns all supported regions.
    pub fn all() -> &'static [Region] {
        &[Self::Us, Self::Eu, Self::Pac, Self::Meta]
    }

    /// Default OAuth2 token endpoint for an instance in this region.
    pub fn token_url(&self, instance: &str) -> String {
        format!(
            "https://{}-login.{}.nexthink.cloud/oauth2/default/v1/token",
            instance,
            self.as_str()
        )
    }

    /// Default API base URL for an instance in this region.
    pub fn api_base_url(&self, instance: &str) -> String {
        format!("https://{}.api.{}.nexthink.cloud", instance, self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "us" => Ok(Self::Us),
            "eu" => Ok(Self::Eu),
            "pac" => Ok(Self::Pac),
            "meta" => Ok(Self::Meta),
            other => Err(CoreError::InvalidRegion(other.to_string())),
        }
    }
}
