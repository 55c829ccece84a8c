//! List filters
//!
//! Each list operation takes a filter struct: every set field must match
//! (a conjunction), an all-default filter matches everything. Text search
//! is case-insensitive substring matching over the fields named on each
//! `search` doc comment.

use crate::model::*;

/// Case-insensitive substring test.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn opt_contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| contains_ci(h, needle))
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matches username, email, first or last name.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserFilter {
    pub(crate) fn matches(&self, user: &User) -> bool {
        if let Some(needle) = &self.search {
            let hit = contains_ci(&user.username, needle)
                || contains_ci(&user.email, needle)
                || contains_ci(&user.name.first, needle)
                || contains_ci(&user.name.last, needle);
            if !hit {
                return false;
            }
        }
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.active.is_some_and(|a| a != user.active) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct CenterFilter {
    /// Matches name or address.
    pub search: Option<String>,
    pub status: Option<CenterStatus>,
}

impl CenterFilter {
    pub(crate) fn matches(&self, center: &EvacuationCenter) -> bool {
        if let Some(needle) = &self.search {
            if !contains_ci(&center.name, needle) && !contains_ci(&center.address, needle) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != center.status) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct FamilyFilter {
    /// Matches the family name.
    pub search: Option<String>,
}

impl FamilyFilter {
    pub(crate) fn matches(&self, family: &Family) -> bool {
        match &self.search {
            Some(needle) => contains_ci(&family.name, needle),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvacueeFilter {
    /// Matches first name, last name or special-needs notes.
    pub search: Option<String>,
    pub status: Option<EvacueeStatus>,
    pub center: Option<CenterId>,
    pub family: Option<FamilyId>,
}

impl EvacueeFilter {
    pub(crate) fn matches(&self, evacuee: &Evacuee) -> bool {
        if let Some(needle) = &self.search {
            let hit = contains_ci(&evacuee.name.first, needle)
                || contains_ci(&evacuee.name.last, needle)
                || opt_contains_ci(evacuee.special_needs.as_deref(), needle);
            if !hit {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != evacuee.status) {
            return false;
        }
        if self.center.is_some_and(|c| c != evacuee.center) {
            return false;
        }
        if self.family.is_some_and(|f| Some(f) != evacuee.family) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    /// Matches the goods description.
    pub search: Option<String>,
    pub status: Option<DonationStatus>,
    pub kind: Option<CommodityKind>,
    pub donor: Option<UserId>,
    pub center: Option<CenterId>,
}

impl DonationFilter {
    pub(crate) fn matches(&self, donation: &Donation) -> bool {
        if let Some(needle) = &self.search {
            if !contains_ci(&donation.commodity.description, needle) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != donation.status) {
            return false;
        }
        if self.kind.is_some_and(|k| k != donation.commodity.kind) {
            return false;
        }
        if self.donor.is_some_and(|d| Some(d) != donation.donor) {
            return false;
        }
        if self.center.is_some_and(|c| c != donation.center) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    /// Matches the goods description.
    pub search: Option<String>,
    pub status: Option<InventoryStatus>,
    pub kind: Option<CommodityKind>,
    pub center: Option<CenterId>,
    pub donation: Option<DonationId>,
}

impl InventoryFilter {
    pub(crate) fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(needle) = &self.search {
            if !contains_ci(&item.commodity.description, needle) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        if self.kind.is_some_and(|k| k != item.commodity.kind) {
            return false;
        }
        if self.donation.is_some_and(|d| Some(d) != item.donation) {
            return false;
        }
        if self.center.is_some_and(|c| c != item.center) {
            return false;
        }
        true
    }
}
