//! Sync engine that mirrors Port users and teams into catalog entities.

use portsync_core::config::SyncConfig;
use tracing::{error, info};

use crate::client::{PortClient, ResourceKind, ResourceQuery};
use crate::models::{Entity, PortTeam, PortUser};
use crate::transform::{is_skipped_user, team_entity, user_entity, IdentifierPolicy};

/// Summary of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub users_upserted: usize,
    pub teams_upserted: usize,
    pub users_skipped: usize,
    pub failed: usize,
    pub dry_run: bool,
}

/// Fetches users and teams once and upserts them, one request at a time.
pub struct PortSyncEngine {
    client: PortClient,
    config: SyncConfig,
}

impl PortSyncEngine {
    /// Create a new sync engine.
    pub fn new(client: PortClient, config: SyncConfig) -> Self {
        Self { client, config }
    }

    /// Run a full sync. If `dry_run` is true, entities are built and logged but
    /// no upserts are sent.
    ///
    /// Never fails as a whole: fetch failures count as empty input, and upsert
    /// failures are logged and counted in [`SyncSummary::failed`].
    pub async fn run_sync(&self, dry_run: bool) -> SyncSummary {
        info!(dry_run, "starting Port user/team sync");

        let user_query = ResourceQuery::with_fields(self.config.user_fields.iter().cloned());
        let users: Vec<PortUser> = self
            .client
            .get_port_resource(ResourceKind::Users, &user_query)
            .await;
        let teams: Vec<PortTeam> = self
            .client
            .get_port_resource(ResourceKind::Teams, &ResourceQuery::default())
            .await;

        let mut summary = SyncSummary {
            dry_run,
            ..Default::default()
        };

        // Teams first, so user -> team relations resolve.
        info!(
            count = teams.len(),
            blueprint = %self.config.team_blueprint,
            "upserting team entities"
        );
        for team in &teams {
            let entity = team_entity(team);
            if self
                .push(&self.config.team_blueprint, &entity, dry_run)
                .await
            {
                summary.teams_upserted += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            count = users.len(),
            blueprint = %self.config.user_blueprint,
            "upserting user entities"
        );
        let policy = IdentifierPolicy::from_sanitize_flag(self.config.sanitize_user_identifiers);
        for user in &users {
            if is_skipped_user(user, &self.config.skip_email_prefixes) {
                info!(email = %user.email, "skipping service account");
                summary.users_skipped += 1;
                continue;
            }

            let entity = user_entity(user, policy);
            if self
                .push(&self.config.user_blueprint, &entity, dry_run)
                .await
            {
                summary.users_upserted += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            users_upserted = summary.users_upserted,
            teams_upserted = summary.teams_upserted,
            users_skipped = summary.users_skipped,
            failed = summary.failed,
            dry_run,
            "Port user/team sync completed"
        );

        summary
    }

    /// Upsert one entity. Returns false if the upsert failed.
    async fn push(&self, blueprint: &str, entity: &Entity, dry_run: bool) -> bool {
        if dry_run {
            info!(
                blueprint,
                identifier = %entity.identifier,
                entity = %serde_json::to_string(entity).unwrap_or_default(),
                "dry run: would upsert entity"
            );
            return true;
        }

        match self.client.upsert_entity(blueprint, entity).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    blueprint,
                    identifier = %entity.identifier,
                    error = %e,
                    "failed to upsert entity"
                );
                false
            }
        }
    }
}
