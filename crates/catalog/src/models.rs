//! Port API request/response structs.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Port organization user as returned by `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortUser {
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<TeamMembership>,
}

/// A team reference embedded in a user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    pub name: String,
}

/// A Port organization team as returned by `GET /teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A catalog entity in the shape accepted by the blueprint entities endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<String>>,
}

/// Body of `POST /auth/access_token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Response of `POST /auth/access_token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
}
