//! Mapping from Port organization records to catalog entities.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::identifier::sanitize_identifier;
use crate::models::{Entity, PortTeam, PortUser};

/// Relation on the user blueprint that points at team entities.
pub const TEAM_RELATION: &str = "team";

/// How an entity identifier is derived from its source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Use the source value verbatim.
    #[default]
    Raw,
    /// Pass the source value through [`sanitize_identifier`].
    Sanitized,
}

impl IdentifierPolicy {
    pub fn from_sanitize_flag(sanitize: bool) -> Self {
        if sanitize {
            Self::Sanitized
        } else {
            Self::Raw
        }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Raw => value.to_string(),
            Self::Sanitized => sanitize_identifier(value).into_owned(),
        }
    }
}

/// Identifier of the team entity for a given team name.
pub fn team_identifier(name: &str) -> String {
    sanitize_identifier(name).into_owned()
}

/// True if the user's email starts with one of the service-account prefixes.
pub fn is_skipped_user(user: &PortUser, skip_prefixes: &[String]) -> bool {
    skip_prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| user.email.starts_with(p.as_str()))
}

/// Build the `user` entity for a Port user.
pub fn user_entity(user: &PortUser, policy: IdentifierPolicy) -> Entity {
    let mut properties = Map::new();
    properties.insert("status".into(), option_value(user.status.as_deref()));
    properties.insert("createdAt".into(), option_value(user.created_at.as_deref()));
    properties.insert("userInPort".into(), Value::from(user.email.as_str()));
    properties.insert(
        "providers".into(),
        Value::Array(user.providers.iter().map(|p| Value::from(p.as_str())).collect()),
    );

    let teams: Vec<String> = user.teams.iter().map(|t| team_identifier(&t.name)).collect();
    let mut relations = BTreeMap::new();
    relations.insert(TEAM_RELATION.to_string(), teams);

    Entity {
        identifier: policy.apply(&user.email),
        title: user_title(user),
        properties,
        relations,
    }
}

/// "First Last" from whichever name parts are present, or the email if neither is.
fn user_title(user: &PortUser) -> String {
    let parts: Vec<&str> = [user.first_name.trim(), user.last_name.trim()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        user.email.clone()
    } else {
        parts.join(" ")
    }
}

/// Build the `team` entity for a Port team.
pub fn team_entity(team: &PortTeam) -> Entity {
    let mut properties = Map::new();
    properties.insert(
        "description".into(),
        option_value(team.description.as_deref()),
    );

    Entity {
        identifier: team_identifier(&team.name),
        title: team.name.clone(),
        properties,
        relations: BTreeMap::new(),
    }
}

fn option_value(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
