//! Plan session: the current plan plus a revision counter, and the
//! reconciler that runs engine operations against it.
//!
//! Every edit bumps the revision. Asynchronous operations run against a
//! [`Snapshot`] without holding the session, so edits may land while they
//! are in flight; the caller then commits the result at the snapshot's
//! revision and a stale result is dropped, never merged.

use tracing::{debug, warn};

use crate::collaborators::{BudgetRedistributor, CostEstimator, GapScheduler, TransportCoster};
use crate::error::Result;
use crate::plan::Plan;
use crate::rebalance::{BudgetRebalancer, RealCosts, RebalanceOutcome};
use crate::transport::refresh_transport;
use crate::trimmer::{FlightTimes, TimeWindowTrimmer, TrimReport};

/// Revision-stamped copy of the plan an operation started from.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub plan: Plan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSession {
    current: Plan,
    revision: u64,
}

impl PlanSession {
    pub fn new(plan: Plan) -> Self {
        Self {
            current: plan,
            revision: 0,
        }
    }

    pub fn current(&self) -> &Plan {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            plan: self.current.clone(),
        }
    }

    /// Commit the result of an operation started at `revision`. Returns
    /// false, leaving the session untouched, when the plan moved on.
    pub fn commit(&mut self, revision: u64, plan: Plan) -> bool {
        if revision != self.revision {
            warn!(
                started_at = revision,
                current = self.revision,
                plan_id = %self.current.plan_id,
                "discarding stale result"
            );
            return false;
        }
        self.replace(plan);
        true
    }

    /// Unconditional edit (user changes to items or costs).
    pub fn replace(&mut self, plan: Plan) {
        self.current = plan;
        self.revision += 1;
        debug!(revision = self.revision, "plan revision bumped");
    }

    pub fn into_plan(self) -> Plan {
        self.current
    }
}

/// Bundles the trimmer, the rebalancer and transport lookups over one set
/// of collaborators. Operations read a snapshot; committing is up to the
/// caller, through [`PlanSession::commit`] at the snapshot's revision.
#[derive(Debug, Clone)]
pub struct Reconciler<G, C, T, R>
where
    G: GapScheduler,
    C: CostEstimator,
    T: TransportCoster,
    R: BudgetRedistributor,
{
    trimmer: TimeWindowTrimmer<G, C>,
    rebalancer: BudgetRebalancer<R>,
    transport: T,
}

impl<G, C, T, R> Reconciler<G, C, T, R>
where
    G: GapScheduler,
    C: CostEstimator,
    T: TransportCoster,
    R: BudgetRedistributor,
{
    pub fn new(trimmer: TimeWindowTrimmer<G, C>, rebalancer: BudgetRebalancer<R>, transport: T) -> Self {
        Self {
            trimmer,
            rebalancer,
            transport,
        }
    }

    pub async fn apply_flight_times(&self, snap: &Snapshot, times: FlightTimes) -> Result<TrimReport> {
        self.trimmer.apply(&snap.plan, times).await
    }

    /// Rebalance against real costs. An error leaves nothing to commit.
    pub async fn rebalance(&self, snap: &Snapshot, real: RealCosts) -> Result<RebalanceOutcome> {
        self.rebalancer.rebalance(&snap.plan, real).await
    }

    /// Re-price every day's route.
    pub async fn refresh_transport(&self, snap: &Snapshot) -> Plan {
        refresh_transport(&self.transport, &snap.plan).await
    }
}
