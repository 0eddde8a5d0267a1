//! Reconciler - one fetch, diff, apply pass over a list

use crate::diff::Diff;
use crate::error::{ApplyError, FetchError};
use crate::gateway::ListGateway;
use crate::types::{ApplyOutcome, CycleResult, Direction, Identifier, ListId, ReconcileOptions};
use log::{debug, info, warn};

/// Converges one list toward the reference set
///
/// The gateway and list id are fixed at construction; every cycle fetches
/// both sets again, so nothing carries over between cycles.
pub struct Reconciler<G> {
    gateway: G,
    list_id: ListId,
    options: ReconcileOptions,
}

impl<G: ListGateway> Reconciler<G> {
    pub fn new(gateway: G, list_id: ListId) -> Self {
        Self::with_options(gateway, list_id, ReconcileOptions::default())
    }

    pub fn with_options(gateway: G, list_id: ListId, options: ReconcileOptions) -> Self {
        Self {
            gateway,
            list_id,
            options,
        }
    }

    /// Fetch both sets and compute the diff without applying anything
    pub fn plan(&self) -> Result<Diff, FetchError> {
        info!("fetch friend IDs");
        let friends = self
            .gateway
            .fetch_reference_set()
            .map_err(FetchError::ReferenceSet)?;
        debug!("fetched {} friend IDs", friends.len());

        info!("fetch list members (list {})", self.list_id);
        let members = self
            .gateway
            .fetch_list_members(self.list_id)
            .map_err(FetchError::Members)?;
        debug!("fetched {} list members", members.len());

        Ok(Diff::compute(&friends, &members))
    }

    /// Run one reconciliation cycle
    ///
    /// A fetch failure aborts the cycle before any mutation. Once both sets
    /// are fetched, the add and remove batches are attempted independently.
    pub fn run_cycle(&self) -> CycleResult {
        let diff = match self.plan() {
            Ok(diff) => diff,
            Err(e) => {
                warn!("{e}");
                return CycleResult::Aborted(e);
            }
        };

        let additions = self.apply(Direction::Add, &diff.additions);
        let removals = self.apply(Direction::Remove, &diff.removals);

        CycleResult::Completed {
            additions,
            removals,
        }
    }

    /// Apply one direction of the diff
    fn apply(&self, direction: Direction, ids: &[Identifier]) -> ApplyOutcome {
        let count = ids.len();
        if count == 0 {
            info!("nothing to {direction}, skip");
            return ApplyOutcome::Skipped;
        }

        if self.options.dry_run {
            info!("dry run: would {direction} {count} IDs: {ids:?}");
            return ApplyOutcome::DryRun { count };
        }

        let response = match direction {
            Direction::Add => self.gateway.add_list_members(self.list_id, ids),
            Direction::Remove => self.gateway.remove_list_members(self.list_id, ids),
        };

        match response {
            Ok(status) if status.is_success() => {
                info!("{direction} success. count:{count}");
                ApplyOutcome::Applied { count }
            }
            Ok(status) => {
                warn!("{direction} failed. status:{status} count:{count}");
                ApplyOutcome::Failed {
                    count,
                    error: ApplyError::Rejected { direction, status },
                }
            }
            Err(source) => {
                warn!("{direction} failed. {source}");
                ApplyOutcome::Failed {
                    count,
                    error: ApplyError::Transport { direction, source },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::{GatewayCall, MockGateway};
    use crate::types::ApplyStatus;

    const LIST: ListId = 42;

    #[test]
    fn test_cycle_adds_missing_friend() {
        let mock = MockGateway::new(vec![1, 2, 3], vec![1, 2]);
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_success());
        assert_eq!(result.additions(), Some(&ApplyOutcome::Applied { count: 1 }));
        assert_eq!(result.removals(), Some(&ApplyOutcome::Skipped));
        assert_eq!(
            mock.apply_calls(),
            vec![GatewayCall::AddListMembers(LIST, vec![3])]
        );
    }

    #[test]
    fn test_cycle_removes_unfollowed_member() {
        let mock = MockGateway::new(vec![1, 2], vec![1, 2, 3]);
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_success());
        assert_eq!(result.additions(), Some(&ApplyOutcome::Skipped));
        assert_eq!(result.removals(), Some(&ApplyOutcome::Applied { count: 1 }));
        assert_eq!(
            mock.apply_calls(),
            vec![GatewayCall::RemoveListMembers(LIST, vec![3])]
        );
    }

    #[test]
    fn test_cycle_in_sync_issues_no_apply_calls() {
        let mock = MockGateway::new(vec![4, 5, 6], vec![6, 5, 4]);
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_success());
        assert!(mock.apply_calls().is_empty());
        assert_eq!(
            mock.calls(),
            vec![
                GatewayCall::FetchReferenceSet,
                GatewayCall::FetchListMembers(LIST)
            ]
        );
    }

    #[test]
    fn test_cycle_add_failure_does_not_block_remove() {
        let mock = MockGateway::new(vec![1, 2], vec![2, 3]);
        mock.fail_add(GatewayError::http("connection reset", None));
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_partial_failure());
        assert_eq!(result.failures(), 1);
        assert_eq!(result.additions_attempted(), 1);
        assert_eq!(result.additions_succeeded(), 0);
        assert_eq!(result.removals_succeeded(), 1);
        assert_eq!(
            mock.apply_calls(),
            vec![
                GatewayCall::AddListMembers(LIST, vec![1]),
                GatewayCall::RemoveListMembers(LIST, vec![3]),
            ]
        );
        assert_eq!(mock.members(), vec![2]);
    }

    #[test]
    fn test_cycle_remove_rejected_after_add_success() {
        let mock = MockGateway::new(vec![1, 2], vec![2, 3]);
        mock.set_remove_status(ApplyStatus::new(403));
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_partial_failure());
        assert_eq!(result.additions_succeeded(), 1);
        let errors = result.apply_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            &ApplyError::Rejected {
                direction: Direction::Remove,
                status: ApplyStatus::new(403),
            }
        );
    }

    #[test]
    fn test_cycle_remove_transport_failure_after_add_success() {
        let mock = MockGateway::new(vec![1, 2], vec![2, 3]);
        mock.fail_remove(GatewayError::http("connection reset", None));
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_partial_failure());
        assert_eq!(result.additions(), Some(&ApplyOutcome::Applied { count: 1 }));
        assert_eq!(result.failures(), 1);
        let errors = result.apply_errors();
        assert!(matches!(
            errors[0],
            ApplyError::Transport {
                direction: Direction::Remove,
                ..
            }
        ));
        assert_eq!(
            mock.apply_calls(),
            vec![
                GatewayCall::AddListMembers(LIST, vec![1]),
                GatewayCall::RemoveListMembers(LIST, vec![3]),
            ]
        );
        // the add went through, the failed remove left 3 on the list
        assert_eq!(mock.members(), vec![2, 3, 1]);
    }

    #[test]
    fn test_cycle_reference_fetch_failure_aborts() {
        let mock = MockGateway::new(vec![1, 2, 3], vec![]);
        mock.fail_fetch_friends(Some(GatewayError::http("HTTP 503", Some(503))));
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(result.is_aborted());
        assert!(matches!(
            result.fetch_error(),
            Some(FetchError::ReferenceSet(_))
        ));
        // members are never fetched, nothing is applied
        assert_eq!(mock.calls(), vec![GatewayCall::FetchReferenceSet]);
    }

    #[test]
    fn test_cycle_members_fetch_failure_aborts() {
        let mock = MockGateway::new(vec![1], vec![2]);
        mock.fail_fetch_members(Some(GatewayError::InvalidResponse("eof".into())));
        let reconciler = Reconciler::new(&mock, LIST);

        let result = reconciler.run_cycle();

        assert!(matches!(result.fetch_error(), Some(FetchError::Members(_))));
        assert!(mock.apply_calls().is_empty());
    }

    #[test]
    fn test_cycle_recovers_after_partial_failure() {
        let mock = MockGateway::new(vec![1, 2], vec![3]);
        mock.fail_add(GatewayError::http("HTTP 502", Some(502)));
        let reconciler = Reconciler::new(&mock, LIST);

        assert!(reconciler.run_cycle().is_partial_failure());
        assert_eq!(mock.members(), Vec::<Identifier>::new());

        mock.set_add_status(ApplyStatus::OK);
        let result = reconciler.run_cycle();
        assert!(result.is_success());
        assert_eq!(result.additions(), Some(&ApplyOutcome::Applied { count: 2 }));
        assert_eq!(mock.members(), vec![1, 2]);
    }

    #[test]
    fn test_cycle_passes_duplicates_through() {
        let mock = MockGateway::new(vec![7, 7, 1], vec![1]);
        let reconciler = Reconciler::new(&mock, LIST);

        reconciler.run_cycle();

        assert_eq!(
            mock.apply_calls(),
            vec![GatewayCall::AddListMembers(LIST, vec![7, 7])]
        );
    }

    #[test]
    fn test_dry_run_issues_no_apply_calls() {
        let mock = MockGateway::new(vec![1, 2], vec![2, 3]);
        let reconciler =
            Reconciler::with_options(&mock, LIST, ReconcileOptions { dry_run: true });

        let result = reconciler.run_cycle();

        assert!(result.is_success());
        assert_eq!(result.additions(), Some(&ApplyOutcome::DryRun { count: 1 }));
        assert_eq!(result.removals(), Some(&ApplyOutcome::DryRun { count: 1 }));
        assert!(mock.apply_calls().is_empty());
    }

    #[test]
    fn test_plan_returns_diff() {
        let mock = MockGateway::new(vec![1, 2, 3], vec![3, 4]);
        let reconciler = Reconciler::new(&mock, LIST);

        let diff = reconciler.plan().unwrap();

        assert_eq!(diff.additions, vec![1, 2]);
        assert_eq!(diff.removals, vec![4]);
        assert!(mock.apply_calls().is_empty());
    }
}
