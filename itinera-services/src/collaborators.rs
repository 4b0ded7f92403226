//! Engine collaborator contracts over [`HttpServices`].
//!
//! Transport and service errors surface as `EngineError::Collaborator`; the
//! engine decides whether to degrade or abort.

use anyhow::bail;
use async_trait::async_trait;
use tracing::debug;

use itinera_core::{
    BudgetRedistributor, CostEstimator, CostRequest, CostResponse, EngineError, GapRequest,
    GapResponse, GapScheduler, LocalSplit, RedistributionRequest, Result, TransportCoster,
    TransportRequest, TransportResponse,
};

use crate::client::HttpServices;
use crate::payload::{
    CostPayload, GapPayload, TransportPayload, ACTIVITY_COST_PATH, GAP_SCHEDULE_PATH,
    REBALANCE_PATH, TRANSPORT_COST_PATH,
};
use crate::sanitize;

fn collaborator(e: anyhow::Error) -> EngineError {
    EngineError::collaborator(format!("{e:#}"))
}

#[async_trait]
impl GapScheduler for HttpServices {
    async fn fill_gap(&self, request: &GapRequest) -> Result<GapResponse> {
        let body = self
            .post_json(GAP_SCHEDULE_PATH, &GapPayload::new(request))
            .await
            .map_err(collaborator)?;
        let out = sanitize::gap_items(&body);
        debug!(date = %request.date, items = out.items.len(), "gap schedule received");
        Ok(out)
    }
}

#[async_trait]
impl CostEstimator for HttpServices {
    async fn estimate(&self, request: &CostRequest) -> Result<CostResponse> {
        if request.activities.is_empty() {
            return Ok(CostResponse::default());
        }
        let payload = CostPayload {
            destination: &request.destination,
            activities: &request.activities,
            people: self.config().people,
        };
        let body = self
            .post_json(ACTIVITY_COST_PATH, &payload)
            .await
            .map_err(collaborator)?;
        Ok(sanitize::activity_costs(&body, request.activities.len()))
    }
}

#[async_trait]
impl TransportCoster for HttpServices {
    async fn route_cost(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let call = async {
            if request.route.len() < 2 {
                bail!("route needs at least two stops, got {}", request.route.len());
            }
            let payload = TransportPayload {
                destination: &request.destination,
                route: &request.route,
                people: self.config().people,
            };
            self.post_json(TRANSPORT_COST_PATH, &payload).await
        };
        let body = call.await.map_err(collaborator)?;
        Ok(sanitize::transport(&body))
    }
}

#[async_trait]
impl BudgetRedistributor for HttpServices {
    async fn redistribute(&self, request: &RedistributionRequest) -> Result<LocalSplit> {
        let split = async {
            let body = self.post_json(REBALANCE_PATH, request).await?;
            sanitize::local_split(&body)
        };
        split.await.map_err(collaborator)
    }
}
