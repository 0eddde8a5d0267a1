//! Gateway trait and an in-memory implementation for tests.
//!
//! The [`ListGateway`] trait is the boundary between the reconciliation
//! engine and the remote service. The engine only ever issues calls
//! sequentially, so implementations do not need internal locking for
//! correctness.
//!
//! # Testing
//!
//! Use [`MockGateway`] to drive cycles without network access:
//!
//! ```
//! use reconcile::{ListGateway, MockGateway};
//!
//! let mock = MockGateway::new(vec![1, 2, 3], vec![1, 2]);
//! let friends = mock.fetch_reference_set().unwrap();
//! assert_eq!(friends, vec![1, 2, 3]);
//! ```

use crate::error::GatewayError;
use crate::types::{ApplyStatus, Identifier, IdentifierSet, ListId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fetch and apply primitives against the remote service.
pub trait ListGateway {
    /// Fetch the reference set (accounts currently followed).
    ///
    /// Returns at most one bounded page of identifiers.
    fn fetch_reference_set(&self) -> Result<IdentifierSet, GatewayError>;

    /// Fetch the current members of a list.
    ///
    /// Returns at most one bounded page of identifiers.
    fn fetch_list_members(&self, list_id: ListId) -> Result<IdentifierSet, GatewayError>;

    /// Add identifiers to a list in one batch call.
    ///
    /// A completed call returns its status; only [`ApplyStatus::OK`] means
    /// the batch was accepted.
    fn add_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError>;

    /// Remove identifiers from a list in one batch call.
    fn remove_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError>;
}

impl<G: ListGateway + ?Sized> ListGateway for &G {
    fn fetch_reference_set(&self) -> Result<IdentifierSet, GatewayError> {
        (**self).fetch_reference_set()
    }

    fn fetch_list_members(&self, list_id: ListId) -> Result<IdentifierSet, GatewayError> {
        (**self).fetch_list_members(list_id)
    }

    fn add_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        (**self).add_list_members(list_id, ids)
    }

    fn remove_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        (**self).remove_list_members(list_id, ids)
    }
}

impl<G: ListGateway + ?Sized> ListGateway for Box<G> {
    fn fetch_reference_set(&self) -> Result<IdentifierSet, GatewayError> {
        (**self).fetch_reference_set()
    }

    fn fetch_list_members(&self, list_id: ListId) -> Result<IdentifierSet, GatewayError> {
        (**self).fetch_list_members(list_id)
    }

    fn add_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        (**self).add_list_members(list_id, ids)
    }

    fn remove_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        (**self).remove_list_members(list_id, ids)
    }
}

/// A call observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    FetchReferenceSet,
    FetchListMembers(ListId),
    AddListMembers(ListId, IdentifierSet),
    RemoveListMembers(ListId, IdentifierSet),
}

/// Scripted response for an apply call.
#[derive(Debug, Clone)]
enum ApplyResponse {
    Status(ApplyStatus),
    Error(GatewayError),
}

#[derive(Debug)]
struct MockState {
    friends: IdentifierSet,
    members: IdentifierSet,
    fetch_friends_error: Option<GatewayError>,
    fetch_members_error: Option<GatewayError>,
    add_response: ApplyResponse,
    remove_response: ApplyResponse,
    calls: Vec<GatewayCall>,
}

/// In-memory gateway for testing without network access.
///
/// Accepted add/remove batches are applied to the stored membership, so
/// consecutive cycles observe the result of earlier ones. Clones share state.
#[derive(Debug, Clone)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Create a mock with the given reference set and list membership.
    pub fn new(friends: IdentifierSet, members: IdentifierSet) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                friends,
                members,
                fetch_friends_error: None,
                fetch_members_error: None,
                add_response: ApplyResponse::Status(ApplyStatus::OK),
                remove_response: ApplyResponse::Status(ApplyStatus::OK),
                calls: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current list membership.
    pub fn members(&self) -> IdentifierSet {
        self.state().members.clone()
    }

    /// Make reference-set fetches fail (or succeed again with `None`).
    pub fn fail_fetch_friends(&self, error: Option<GatewayError>) {
        self.state().fetch_friends_error = error;
    }

    /// Make member fetches fail (or succeed again with `None`).
    pub fn fail_fetch_members(&self, error: Option<GatewayError>) {
        self.state().fetch_members_error = error;
    }

    /// Status returned by add calls.
    pub fn set_add_status(&self, status: ApplyStatus) {
        self.state().add_response = ApplyResponse::Status(status);
    }

    /// Make add calls fail at the transport level.
    pub fn fail_add(&self, error: GatewayError) {
        self.state().add_response = ApplyResponse::Error(error);
    }

    /// Status returned by remove calls.
    pub fn set_remove_status(&self, status: ApplyStatus) {
        self.state().remove_response = ApplyResponse::Status(status);
    }

    /// Make remove calls fail at the transport level.
    pub fn fail_remove(&self, error: GatewayError) {
        self.state().remove_response = ApplyResponse::Error(error);
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Only the add/remove calls observed so far.
    pub fn apply_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    GatewayCall::AddListMembers(..) | GatewayCall::RemoveListMembers(..)
                )
            })
            .collect()
    }
}

impl ListGateway for MockGateway {
    fn fetch_reference_set(&self) -> Result<IdentifierSet, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::FetchReferenceSet);
        match &state.fetch_friends_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.friends.clone()),
        }
    }

    fn fetch_list_members(&self, list_id: ListId) -> Result<IdentifierSet, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::FetchListMembers(list_id));
        match &state.fetch_members_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.members.clone()),
        }
    }

    fn add_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::AddListMembers(list_id, ids.to_vec()));
        match state.add_response.clone() {
            ApplyResponse::Error(err) => Err(err),
            ApplyResponse::Status(status) => {
                if status.is_success() {
                    for id in ids {
                        if !state.members.contains(id) {
                            state.members.push(*id);
                        }
                    }
                }
                Ok(status)
            }
        }
    }

    fn remove_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> Result<ApplyStatus, GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::RemoveListMembers(list_id, ids.to_vec()));
        match state.remove_response.clone() {
            ApplyResponse::Error(err) => Err(err),
            ApplyResponse::Status(status) => {
                if status.is_success() {
                    state.members.retain(|id| !ids.contains(id));
                }
                Ok(status)
            }
        }
    }
}
