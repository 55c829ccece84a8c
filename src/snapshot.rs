//! Snapshot persistence
//!
//! Serializes the whole registry to versioned JSON and restores it. Import
//! validates the file completely before touching the live registry: a
//! snapshot that violates any cross-reference invariant is rejected and the
//! current state stays as it was.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::EntityKind;
use crate::filter::{
    CenterFilter, DonationFilter, EvacueeFilter, FamilyFilter, InventoryFilter, UserFilter,
};
use crate::model::*;
use crate::registry::{IdCounters, Registry};

/// Schema version written to every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Complete registry state for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub ids: IdCounters,
    pub users: Vec<User>,
    pub centers: Vec<EvacuationCenter>,
    pub families: Vec<Family>,
    pub evacuees: Vec<Evacuee>,
    pub donations: Vec<Donation>,
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: EntityKind, id: u64 },

    #[error("{kind} {id} references missing {target_kind} {target_id}")]
    DanglingReference {
        kind: EntityKind,
        id: u64,
        target_kind: EntityKind,
        target_id: u64,
    },

    #[error("family {family} lists head {head} who is not one of its members")]
    HeadNotMember { family: u64, head: u64 },

    #[error("donation {donation} has more than one derived inventory item")]
    DuplicateDerivation { donation: u64 },

    #[error("{kind} {id}: {source}")]
    InvalidRecord {
        kind: EntityKind,
        id: u64,
        source: crate::error::Invalid,
    },
}

/// Counts restored by a successful import.
#[derive(Debug, Clone, Copy)]
pub struct ImportReport {
    pub users: u32,
    pub centers: u32,
    pub families: u32,
    pub evacuees: u32,
    pub donations: u32,
    pub inventory_items: u32,
}

/// Result of writing a snapshot to disk.
#[derive(Debug, Clone, Copy)]
pub struct SaveStats {
    pub records: u32,
    pub file_bytes: u64,
}

impl Registry {
    /// Capture the full registry state.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            ids: self.ids,
            users: self.users(&UserFilter::default()),
            centers: self.centers(&CenterFilter::default()),
            families: self.families(&FamilyFilter::default()),
            evacuees: self.evacuees(&EvacueeFilter::default()),
            donations: self.donations(&DonationFilter::default()),
            inventory: self.inventory_items(&InventoryFilter::default()),
        }
    }

    /// Replace the registry with the snapshot's state.
    ///
    /// The snapshot is staged and validated first; on any error the live
    /// registry is left untouched.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<ImportReport, SnapshotError> {
        let staged = Registry::from_snapshot(snapshot)?;
        let report = ImportReport {
            users: staged.user_count() as u32,
            centers: staged.center_count() as u32,
            families: staged.family_count() as u32,
            evacuees: staged.evacuee_count() as u32,
            donations: staged.donation_count() as u32,
            inventory_items: staged.inventory_count() as u32,
        };
        *self = staged;
        Ok(report)
    }

    /// Serialize the registry to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<SaveStats, SnapshotError> {
        let snapshot = self.export_snapshot();
        let records = (snapshot.users.len()
            + snapshot.centers.len()
            + snapshot.families.len()
            + snapshot.evacuees.len()
            + snapshot.donations.len()
            + snapshot.inventory.len()) as u32;
        let json = serde_json::to_string(&snapshot)?;
        fs::write(path.as_ref(), &json)?;
        info!(path = %path.as_ref().display(), records, "snapshot saved");
        Ok(SaveStats {
            records,
            file_bytes: json.len() as u64,
        })
    }

    /// Load a JSON snapshot file, replacing the registry on success.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<ImportReport, SnapshotError> {
        let json = fs::read_to_string(path.as_ref())?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        let report = self.import_snapshot(snapshot)?;
        info!(path = %path.as_ref().display(), "snapshot loaded");
        Ok(report)
    }

    /// Build a registry from a snapshot, validating everything up front.
    fn from_snapshot(snapshot: Snapshot) -> Result<Registry, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }

        validate_snapshot(&snapshot)?;

        let mut reg = Registry::new();
        reg.ids = normalized_counters(&snapshot);

        for user in &snapshot.users {
            let entity = reg.world.spawn((
                user.id,
                UserProfile {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    phone: user.phone.clone(),
                    active: user.active,
                },
                user.name.clone(),
                user.role,
                Stamps {
                    created_at: user.created_at,
                    updated_at: user.updated_at,
                },
            ));
            reg.users.insert(user.id, entity);
        }

        for center in &snapshot.centers {
            let entity = reg.world.spawn((
                center.id,
                CenterInfo {
                    name: center.name.clone(),
                    address: center.address.clone(),
                    capacity: center.capacity,
                    contact_person: center.contact_person.clone(),
                    contact_number: center.contact_number.clone(),
                },
                center.status,
                Stamps {
                    created_at: center.created_at,
                    updated_at: center.updated_at,
                },
            ));
            reg.centers.insert(center.id, entity);
        }

        for family in &snapshot.families {
            let entity = reg.world.spawn((
                family.id,
                FamilyInfo {
                    name: family.name.clone(),
                    address: family.address.clone(),
                    contact_number: family.contact_number.clone(),
                },
                Stamps {
                    created_at: family.created_at,
                    updated_at: family.updated_at,
                },
            ));
            if let Some(head) = family.head_of_family {
                let _ = reg.world.insert_one(entity, HeadOfFamily(head));
            }
            reg.families.insert(family.id, entity);
        }

        for evacuee in &snapshot.evacuees {
            let entity = reg.world.spawn((
                evacuee.id,
                evacuee.name.clone(),
                evacuee.gender,
                evacuee.status,
                CenterRef(evacuee.center),
                Stamps {
                    created_at: evacuee.created_at,
                    updated_at: evacuee.updated_at,
                },
            ));
            if let Some(dob) = evacuee.date_of_birth {
                let _ = reg.world.insert_one(entity, DateOfBirth(dob));
            }
            if let Some(family) = evacuee.family {
                let _ = reg.world.insert_one(entity, FamilyRef(family));
            }
            if let Some(notes) = &evacuee.special_needs {
                let _ = reg.world.insert_one(entity, SpecialNeeds(notes.clone()));
            }
            reg.evacuees.insert(evacuee.id, entity);
        }

        for donation in &snapshot.donations {
            let entity = reg.world.spawn((
                donation.id,
                donation.commodity.clone(),
                donation.status,
                CenterRef(donation.center),
                Stamps {
                    created_at: donation.created_at,
                    updated_at: donation.updated_at,
                },
            ));
            if let Some(donor) = donation.donor {
                let _ = reg.world.insert_one(entity, DonorRef(donor));
            }
            reg.donations.insert(donation.id, entity);
        }

        for item in &snapshot.inventory {
            let entity = reg.world.spawn((
                item.id,
                item.commodity.clone(),
                item.status,
                CenterRef(item.center),
                Stamps {
                    created_at: item.created_at,
                    updated_at: item.updated_at,
                },
            ));
            if let Some(donation) = item.donation {
                let _ = reg.world.insert_one(entity, DonationRef(donation));
            }
            reg.inventory.insert(item.id, entity);
        }

        Ok(reg)
    }
}

/// Check every invariant the live registry enforces, without building
/// anything.
fn validate_snapshot(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let users = unique_ids(snapshot.users.iter().map(|u| u.id.0), EntityKind::User)?;
    let centers = unique_ids(
        snapshot.centers.iter().map(|c| c.id.0),
        EntityKind::EvacuationCenter,
    )?;
    let families = unique_ids(snapshot.families.iter().map(|f| f.id.0), EntityKind::Family)?;
    let evacuees = unique_ids(snapshot.evacuees.iter().map(|e| e.id.0), EntityKind::Evacuee)?;
    let donations = unique_ids(
        snapshot.donations.iter().map(|d| d.id.0),
        EntityKind::Donation,
    )?;
    unique_ids(
        snapshot.inventory.iter().map(|i| i.id.0),
        EntityKind::InventoryItem,
    )?;

    // Membership first, so head checks can rely on it
    for evacuee in &snapshot.evacuees {
        if !centers.contains(&evacuee.center.0) {
            return Err(dangling(
                EntityKind::Evacuee,
                evacuee.id.0,
                EntityKind::EvacuationCenter,
                evacuee.center.0,
            ));
        }
        if let Some(family) = evacuee.family {
            if !families.contains(&family.0) {
                return Err(dangling(
                    EntityKind::Evacuee,
                    evacuee.id.0,
                    EntityKind::Family,
                    family.0,
                ));
            }
        }
    }

    for family in &snapshot.families {
        let Some(head) = family.head_of_family else {
            continue;
        };
        if !evacuees.contains(&head.0) {
            return Err(dangling(
                EntityKind::Family,
                family.id.0,
                EntityKind::Evacuee,
                head.0,
            ));
        }
        let is_member = snapshot
            .evacuees
            .iter()
            .any(|e| e.id == head && e.family == Some(family.id));
        if !is_member {
            return Err(SnapshotError::HeadNotMember {
                family: family.id.0,
                head: head.0,
            });
        }
    }

    for donation in &snapshot.donations {
        if !centers.contains(&donation.center.0) {
            return Err(dangling(
                EntityKind::Donation,
                donation.id.0,
                EntityKind::EvacuationCenter,
                donation.center.0,
            ));
        }
        if let Some(donor) = donation.donor {
            if !users.contains(&donor.0) {
                return Err(dangling(
                    EntityKind::Donation,
                    donation.id.0,
                    EntityKind::User,
                    donor.0,
                ));
            }
        }
        donation
            .commodity
            .validate()
            .map_err(|source| SnapshotError::InvalidRecord {
                kind: EntityKind::Donation,
                id: donation.id.0,
                source,
            })?;
    }

    let mut derived: HashSet<u64> = HashSet::new();
    for item in &snapshot.inventory {
        if !centers.contains(&item.center.0) {
            return Err(dangling(
                EntityKind::InventoryItem,
                item.id.0,
                EntityKind::EvacuationCenter,
                item.center.0,
            ));
        }
        if let Some(donation) = item.donation {
            if !donations.contains(&donation.0) {
                return Err(dangling(
                    EntityKind::InventoryItem,
                    item.id.0,
                    EntityKind::Donation,
                    donation.0,
                ));
            }
            if !derived.insert(donation.0) {
                return Err(SnapshotError::DuplicateDerivation {
                    donation: donation.0,
                });
            }
        }
        item.commodity
            .validate()
            .map_err(|source| SnapshotError::InvalidRecord {
                kind: EntityKind::InventoryItem,
                id: item.id.0,
                source,
            })?;
    }

    Ok(())
}

fn unique_ids(
    ids: impl Iterator<Item = u64>,
    kind: EntityKind,
) -> Result<HashSet<u64>, SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId { kind, id });
        }
    }
    Ok(seen)
}

fn dangling(kind: EntityKind, id: u64, target_kind: EntityKind, target_id: u64) -> SnapshotError {
    SnapshotError::DanglingReference {
        kind,
        id,
        target_kind,
        target_id,
    }
}

/// Counters from the file, bumped past any id actually present so later
/// inserts can never collide.
fn normalized_counters(snapshot: &Snapshot) -> IdCounters {
    fn floor(counter: u64, max_id: Option<u64>) -> u64 {
        counter.max(max_id.map_or(1, |m| m + 1))
    }

    IdCounters {
        user: floor(
            snapshot.ids.user,
            snapshot.users.iter().map(|u| u.id.0).max(),
        ),
        center: floor(
            snapshot.ids.center,
            snapshot.centers.iter().map(|c| c.id.0).max(),
        ),
        family: floor(
            snapshot.ids.family,
            snapshot.families.iter().map(|f| f.id.0).max(),
        ),
        evacuee: floor(
            snapshot.ids.evacuee,
            snapshot.evacuees.iter().map(|e| e.id.0).max(),
        ),
        donation: floor(
            snapshot.ids.donation,
            snapshot.donations.iter().map(|d| d.id.0).max(),
        ),
        inventory: floor(
            snapshot.ids.inventory,
            snapshot.inventory.iter().map(|i| i.id.0).max(),
        ),
    }
}
