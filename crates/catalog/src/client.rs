//! Typed reqwest wrapper for the Port REST API.

use std::fmt;
use std::time::Duration;

use portsync_core::error::{PortSyncError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::PortAuth;
use crate::models::Entity;

/// Kinds of organization resources that can be listed.
///
/// Each kind knows both the URL path segment it is served under and the key
/// its records are wrapped in within the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Teams,
}

impl ResourceKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Teams => "teams",
        }
    }

    pub fn response_key(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Teams => "teams",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Optional query parameters for a list request.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    /// Sent as one `fields=<name>` pair per entry.
    pub fields: Vec<String>,
}

impl ResourceQuery {
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    fn to_pairs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|f| ("fields", f.as_str())).collect()
    }
}

/// Build the shared HTTP client with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PortSyncError::from)
}

/// HTTP client for Port organization and catalog operations.
pub struct PortClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl PortClient {
    /// Create a client for an authenticated session.
    pub fn new(http: reqwest::Client, api_url: &str, auth: &PortAuth) -> Self {
        Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            auth_token: auth.token().to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resource_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    fn entities_url(&self, blueprint: &str) -> String {
        format!("{}/blueprints/{}/entities", self.base_url, blueprint)
    }

    /// List all records of `kind` from the first (and only) response page.
    ///
    /// HTTP failures become [`PortSyncError::Status`], an `ok: false` body
    /// becomes [`PortSyncError::Rejected`].
    pub async fn list_resource<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &ResourceQuery,
    ) -> Result<Vec<T>> {
        info!(kind = %kind, fields = ?query.fields, "requesting Port resource");

        let resp = self
            .http
            .get(self.resource_url(kind))
            .bearer_auth(&self.auth_token)
            .query(&query.to_pairs())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PortSyncError::Status {
                context: format!("list {kind}"),
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            PortSyncError::Serialization(format!("list {kind} parse failed: {e}"))
        })?;

        if !value.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("response not ok")
                .to_string();
            return Err(PortSyncError::Rejected {
                kind: kind.to_string(),
                message,
            });
        }

        let records = value
            .get(kind.response_key())
            .cloned()
            .ok_or_else(|| {
                PortSyncError::Serialization(format!(
                    "list {kind} response has no `{}` key",
                    kind.response_key()
                ))
            })?;

        let records: Vec<T> = serde_json::from_value(records).map_err(|e| {
            PortSyncError::Serialization(format!("list {kind} records parse failed: {e}"))
        })?;

        info!(kind = %kind, count = records.len(), "received Port resource");
        Ok(records)
    }

    /// Like [`list_resource`](Self::list_resource), but any failure is logged
    /// and yields an empty list.
    pub async fn get_port_resource<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &ResourceQuery,
    ) -> Vec<T> {
        match self.list_resource(kind, query).await {
            Ok(records) => records,
            Err(PortSyncError::Status { status, body, .. }) => {
                error!(
                    kind = %kind,
                    status,
                    body = %body,
                    "HTTP error while listing Port resource"
                );
                Vec::new()
            }
            Err(PortSyncError::Rejected { message, .. }) => {
                warn!(
                    kind = %kind,
                    message = %message,
                    "Port returned ok=false while listing resource"
                );
                Vec::new()
            }
            Err(e) => {
                error!(kind = %kind, error = %e, "failed to list Port resource");
                Vec::new()
            }
        }
    }

    /// Create or merge-update one entity under `blueprint`.
    ///
    /// Uses `upsert=true&merge=true`: properties omitted from `entity` are left
    /// untouched on an existing entity. Returns the parsed response body.
    pub async fn upsert_entity(&self, blueprint: &str, entity: &Entity) -> Result<Value> {
        debug!(blueprint, identifier = %entity.identifier, "upserting entity");

        let resp = self
            .http
            .post(self.entities_url(blueprint))
            .bearer_auth(&self.auth_token)
            .query(&[("upsert", "true"), ("merge", "true")])
            .json(entity)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PortSyncError::Status {
                context: format!("upsert {blueprint} entity {}", entity.identifier),
                status: status.as_u16(),
                body,
            });
        }

        info!(blueprint, identifier = %entity.identifier, response = %body, "upserted entity");
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortTeam, PortUser};
    use std::collections::BTreeMap;
    use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, PortClient) {
        let server = MockServer::start().await;
        let auth = PortAuth::new("test-token".to_string());
        let client = PortClient::new(reqwest::Client::new(), &server.uri(), &auth);
        (server, client)
    }

    fn sample_entity() -> Entity {
        let mut properties = serde_json::Map::new();
        properties.insert("description".into(), Value::from("desc"));
        Entity {
            identifier: "Team-Alpha-".into(),
            title: "Team Alpha!".into(),
            properties,
            relations: BTreeMap::new(),
        }
    }

    #[test]
    fn resource_kind_path_and_key() {
        assert_eq!(ResourceKind::Users.path(), "users");
        assert_eq!(ResourceKind::Users.response_key(), "users");
        assert_eq!(ResourceKind::Teams.path(), "teams");
        assert_eq!(ResourceKind::Teams.response_key(), "teams");
        assert_eq!(ResourceKind::Teams.to_string(), "teams");
    }

    #[test]
    fn query_pairs_repeat_fields() {
        let query = ResourceQuery::with_fields(["email", "teams.name"]);
        assert_eq!(
            query.to_pairs(),
            vec![("fields", "email"), ("fields", "teams.name")]
        );
        assert!(ResourceQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let auth = PortAuth::new("t".into());
        let client = PortClient::new(reqwest::Client::new(), "https://api.getport.io/v1/", &auth);
        assert_eq!(client.base_url(), "https://api.getport.io/v1");
        assert_eq!(
            client.entities_url("team"),
            "https://api.getport.io/v1/blueprints/team/entities"
        );
    }

    #[test]
    fn build_http_client_with_timeout() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn list_users_success() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(bearer_token("test-token"))
            .and(query_param("fields", "email"))
            .and(query_param("fields", "teams.name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "users": [
                    {"email": "a@x.com", "firstName": "A", "lastName": "One"},
                    {"email": "b@x.com", "firstName": "B", "lastName": "Two"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ResourceQuery::with_fields(["email", "teams.name"]);
        let users: Vec<PortUser> = client
            .list_resource(ResourceKind::Users, &query)
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@x.com");
        assert_eq!(users[1].email, "b@x.com");
    }

    #[tokio::test]
    async fn get_port_resource_returns_raw_records() {
        let (server, client) = setup().await;

        let a = serde_json::json!({"email": "a@x.com"});
        let b = serde_json::json!({"email": "b@x.com"});
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "users": [a, b]})),
            )
            .mount(&server)
            .await;

        let records: Vec<Value> = client
            .get_port_resource(ResourceKind::Users, &ResourceQuery::default())
            .await;
        assert_eq!(records, vec![a, b]);
    }

    #[tokio::test]
    async fn list_teams_success() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/teams"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "teams": [
                    {"name": "Platform", "description": "Infra"},
                    {"name": "Team Alpha!"}
                ]
            })))
            .mount(&server)
            .await;

        let teams: Vec<PortTeam> = client
            .list_resource(ResourceKind::Teams, &ResourceQuery::default())
            .await
            .unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].description.as_deref(), Some("Infra"));
        assert!(teams[1].description.is_none());
    }

    #[tokio::test]
    async fn list_not_ok_is_rejected() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "message": "organization not found"
            })))
            .mount(&server)
            .await;

        let err = client
            .list_resource::<PortTeam>(ResourceKind::Teams, &ResourceQuery::default())
            .await
            .unwrap_err();
        match err {
            PortSyncError::Rejected { kind, message } => {
                assert_eq!(kind, "teams");
                assert_eq!(message, "organization not found");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_without_ok_flag_is_rejected() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": [{"email": "a@x.com"}]
            })))
            .mount(&server)
            .await;

        let err = client
            .list_resource::<PortUser>(ResourceKind::Users, &ResourceQuery::default())
            .await
            .unwrap_err();
        match err {
            PortSyncError::Rejected { kind, message } => {
                assert_eq!(kind, "users");
                assert_eq!(message, "response not ok");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_port_resource_not_ok_returns_empty() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": false})),
            )
            .mount(&server)
            .await;

        let users: Vec<PortUser> = client
            .get_port_resource(ResourceKind::Users, &ResourceQuery::default())
            .await;
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn list_server_error_carries_status() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = client
            .list_resource::<PortUser>(ResourceKind::Users, &ResourceQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(err.to_string().contains("internal error"));
    }

    #[tokio::test]
    async fn get_port_resource_server_error_returns_empty() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&server)
            .await;

        let users: Vec<PortUser> = client
            .get_port_resource(ResourceKind::Users, &ResourceQuery::default())
            .await;
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn list_missing_response_key_is_serialization_error() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let err = client
            .list_resource::<PortUser>(ResourceKind::Users, &ResourceQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortSyncError::Serialization(_)));
    }

    #[tokio::test]
    async fn upsert_entity_success() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/blueprints/team/entities"))
            .and(query_param("upsert", "true"))
            .and(query_param("merge", "true"))
            .and(bearer_token("test-token"))
            .and(body_json(serde_json::json!({
                "identifier": "Team-Alpha-",
                "title": "Team Alpha!",
                "properties": {"description": "desc"},
                "relations": {}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "ok": true,
                "entity": {"identifier": "Team-Alpha-"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client.upsert_entity("team", &sample_entity()).await.unwrap();
        assert_eq!(response["entity"]["identifier"], "Team-Alpha-");
    }

    #[tokio::test]
    async fn upsert_entity_validation_error() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/blueprints/team/entities"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("relation target does not exist"),
            )
            .mount(&server)
            .await;

        let err = client
            .upsert_entity("team", &sample_entity())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(422));
        let msg = err.to_string();
        assert!(msg.contains("Team-Alpha-"));
        assert!(msg.contains("relation target does not exist"));
    }
}
