//! Baseline-related API endpoints

use crate::AnchorClient;
use crate::error::Result;
use anchor_core::domain::baseline::BaselineRecord;
use anchor_core::dto::baseline::{
    ACTOR_ID_HEADER, ACTOR_NAME_HEADER, BaselineDetailsQuery, MarkBaseline,
};
use uuid::Uuid;

impl AnchorClient {
    /// Mark (`mark = true`) or unmark an execution as baseline
    ///
    /// # Returns
    /// The baselines active for the execution after the call; empty when
    /// unmarking.
    pub async fn mark_baseline(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
        mark: bool,
    ) -> Result<Vec<BaselineRecord>> {
        let url = format!(
            "{}/app/{}/execution/{}/baseline",
            self.base_url, app_id, execution_id
        );
        let mut request = self.client.post(&url).json(&MarkBaseline { mark });
        if let Some(actor) = &self.actor {
            request = request
                .header(ACTOR_ID_HEADER, &actor.id)
                .header(ACTOR_NAME_HEADER, &actor.name);
        }

        tracing::debug!("POST {}", url);
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Get the baseline a verification state compares against
    pub async fn get_baseline_details(
        &self,
        app_id: Uuid,
        query: &BaselineDetailsQuery,
    ) -> Result<Option<BaselineRecord>> {
        let url = format!("{}/app/{}/baseline/details", self.base_url, app_id);
        let response = self.client.get(&url).query(query).send().await?;

        self.handle_response(response).await
    }

    /// List the current baselines of a workflow
    pub async fn list_baselines(&self, app_id: Uuid, workflow_id: Uuid) -> Result<Vec<BaselineRecord>> {
        let url = format!(
            "{}/app/{}/workflow/{}/baselines",
            self.base_url, app_id, workflow_id
        );
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
