//! Error taxonomy for registry operations
//!
//! Every fallible operation returns one of three shapes: a missing id
//! (`NotFound`), an integrity rule refusing a state change (`Conflict`),
//! or a field combination the data model does not allow (`Invalid`).

use std::fmt;

use thiserror::Error;

use crate::model::{DonationId, FamilyId, InventoryStatus};

/// Entity kinds, used to qualify ids in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    EvacuationCenter,
    Family,
    Evacuee,
    Donation,
    InventoryItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::EvacuationCenter => "evacuation center",
            EntityKind::Family => "family",
            EntityKind::Evacuee => "evacuee",
            EntityKind::Donation => "donation",
            EntityKind::InventoryItem => "inventory item",
        };
        f.write_str(name)
    }
}

/// Top-level error for all registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The target id, or an id referenced by the request, is not in the store.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// An integrity rule rejected the state change.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// The request describes an entity shape the model forbids.
    #[error(transparent)]
    Invalid(#[from] Invalid),
}

impl Error {
    pub(crate) fn not_found(kind: EntityKind, id: u64) -> Self {
        Error::NotFound { kind, id }
    }
}

/// Integrity-rule rejections. The store state is untouched when one of
/// these comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    /// The evacuee heads a family and must step down (or the family must
    /// be deleted) first.
    #[error("evacuee is head of family {family}")]
    EvacueeIsFamilyHead { family: FamilyId },

    /// The center still has evacuees assigned, in any status.
    #[error("center has {evacuees} evacuee(s) assigned")]
    CenterHasEvacuees { evacuees: usize },

    /// Donations or inventory items still reference the center.
    #[error("center still holds {donations} donation(s) and {inventory_items} inventory item(s)")]
    CenterHasStock {
        donations: usize,
        inventory_items: usize,
    },

    /// Receive is meaningless once a donation has been distributed.
    #[error("donation has already been distributed")]
    DonationDistributed,

    /// Distribution and expiry only apply to available stock.
    #[error("inventory item is not available (status: {status})")]
    ItemNotAvailable { status: InventoryStatus },

    /// At most one inventory item may be derived from a donation.
    #[error("donation {donation} already has a derived inventory item")]
    InventoryAlreadyDerived { donation: DonationId },

    /// Demoting or deactivating the last active admin would lock the
    /// system out of administration.
    #[error("cannot demote or deactivate the last active admin")]
    LastActiveAdmin,
}

/// Field-combination violations caught at insert/update time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("food items require an expiry date")]
    MissingExpiry,

    #[error("only food items may carry an expiry date")]
    UnexpectedExpiry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::not_found(EntityKind::Evacuee, 42);
        assert_eq!(err.to_string(), "evacuee 42 not found");

        let err: Error = Conflict::EvacueeIsFamilyHead { family: FamilyId(3) }.into();
        assert_eq!(err.to_string(), "evacuee is head of family 3");

        let err: Error = Invalid::MissingExpiry.into();
        assert_eq!(err.to_string(), "food items require an expiry date");
    }
}
