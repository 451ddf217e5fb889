//! Entity activity state machine.
//!
//! Every hierarchy entity carries a single tagged state instead of the
//! legacy `is_active`/`is_deleted` boolean pair. `Deleted` implies
//! inactive, so the ambiguous deleted-but-active combination cannot be
//! represented. Deletion is a soft delete: rows stay in the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot activate a deleted entity")]
    ActivateDeleted,
}

impl From<StateError> for AppError {
    fn from(err: StateError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Activity state of an Application, Event or NotificationType.
///
/// New entities start `Inactive` and must be activated explicitly.
/// `Deleted` is terminal: no transition unsets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Active,
    #[default]
    Inactive,
    Deleted,
}

impl ActivityState {
    pub fn is_active(self) -> bool {
        self == ActivityState::Active
    }

    pub fn is_deleted(self) -> bool {
        self == ActivityState::Deleted
    }

    /// Activate the entity. Idempotent on `Active`, fails on `Deleted`.
    pub fn activate(self) -> Result<Self, StateError> {
        match self {
            ActivityState::Deleted => Err(StateError::ActivateDeleted),
            _ => Ok(ActivityState::Active),
        }
    }

    /// Deactivate the entity. Idempotent; a deleted entity stays deleted.
    pub fn deactivate(self) -> Self {
        match self {
            ActivityState::Deleted => ActivityState::Deleted,
            _ => ActivityState::Inactive,
        }
    }

    /// Soft-delete the entity. Terminal and idempotent.
    pub fn delete(self) -> Self {
        ActivityState::Deleted
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityState::Active => "active",
            ActivityState::Inactive => "inactive",
            ActivityState::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ActivityState::Active),
            "inactive" => Some(ActivityState::Inactive),
            "deleted" => Some(ActivityState::Deleted),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_inactive() {
        assert_eq!(ActivityState::default(), ActivityState::Inactive);
    }

    #[test]
    fn test_activate_from_inactive() {
        let state = ActivityState::Inactive.activate().unwrap();
        assert!(state.is_active());
    }

    #[test]
    fn test_activate_is_idempotent() {
        let state = ActivityState::Active.activate().unwrap();
        assert_eq!(state, ActivityState::Active);
    }

    #[test]
    fn test_activate_deleted_fails() {
        assert!(ActivityState::Deleted.activate().is_err());
    }

    #[test]
    fn test_deactivate() {
        assert_eq!(ActivityState::Active.deactivate(), ActivityState::Inactive);
        assert_eq!(ActivityState::Inactive.deactivate(), ActivityState::Inactive);
        assert_eq!(ActivityState::Deleted.deactivate(), ActivityState::Deleted);
    }

    #[test]
    fn test_delete_is_terminal_and_idempotent() {
        let deleted = ActivityState::Active.delete();
        assert_eq!(deleted, ActivityState::Deleted);
        assert!(!deleted.is_active());

        // Second delete is a no-op
        assert_eq!(deleted.delete(), ActivityState::Deleted);
    }

    #[test]
    fn test_roundtrip_str() {
        for state in [
            ActivityState::Active,
            ActivityState::Inactive,
            ActivityState::Deleted,
        ] {
            assert_eq!(ActivityState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ActivityState::parse("gone"), None);
    }
}
