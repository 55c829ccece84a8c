//! Entity model for the relief registry
//!
//! Entities live in the ECS world as small components; the record structs
//! at the bottom are the assembled views the registry hands back to callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Invalid;

/// Window, in days, for the expiring-soon flag on food stock.
pub const EXPIRING_SOON_DAYS: i64 = 7;

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CenterId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FamilyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EvacueeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DonationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InventoryId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for CenterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for EvacueeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Reference Components
// ============================================================================

/// Center the entity is assigned to (evacuees, donations, inventory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterRef(pub CenterId);

/// Family membership of an evacuee (absent = unaffiliated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRef(pub FamilyId);

/// Donation an inventory item was derived from (absent = manual stock entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRef(pub DonationId);

/// Registered user who made a donation (absent = walk-in donor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRef(pub UserId);

/// Designated head of a family (absent = no head designated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadOfFamily(pub EvacueeId);

// ============================================================================
// Shared Components
// ============================================================================

/// Creation and last-modification times, maintained by the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stamps {
    pub(crate) fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Name parts shared by users and evacuees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Goods description shared by donations and inventory items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    pub kind: CommodityKind,
    pub description: String,
    pub quantity: u32,
    /// Unit of measure, e.g. "boxes", "kg", "packs".
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl Commodity {
    /// Shape rule: food carries an expiry date, non-food never does.
    pub(crate) fn validate(&self) -> Result<(), Invalid> {
        match (self.kind, self.expiry_date) {
            (CommodityKind::Food, None) => Err(Invalid::MissingExpiry),
            (CommodityKind::NonFood, Some(_)) => Err(Invalid::UnexpectedExpiry),
            _ => Ok(()),
        }
    }

    /// True once the expiry date has passed. Only food expires.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match (self.kind, self.expiry_date) {
            (CommodityKind::Food, Some(expiry)) => expiry < today,
            _ => false,
        }
    }

    /// True when the expiry date falls within `days` days of `today`,
    /// inclusive on both ends. Already-expired goods do not count.
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        match (self.kind, self.expiry_date) {
            (CommodityKind::Food, Some(expiry)) => {
                let remaining = (expiry - today).num_days();
                (0..=days).contains(&remaining)
            }
            _ => false,
        }
    }
}

/// Account fields of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub active: bool,
}

/// Descriptive fields of an evacuation center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterInfo {
    pub name: String,
    pub address: String,
    /// Intended number of evacuees; 0 means not yet surveyed.
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// Descriptive fields of a family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// Birth date of an evacuee (often unknown at intake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth(pub NaiveDate);

/// Free-text care notes for an evacuee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialNeeds(pub String);

// ============================================================================
// Status Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Volunteer,
    Donor,
}

/// Rejected role string at the form boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "volunteer" => Ok(Role::Volunteer),
            "donor" => Ok(Role::Donor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Volunteer => "volunteer",
            Role::Donor => "donor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CenterStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvacueeStatus {
    Present,
    Relocated,
    Missing,
    Deceased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommodityKind {
    Food,
    NonFood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationStatus {
    Pending,
    Received,
    Distributed,
}

impl DonationStatus {
    /// Distributed donations accept no further lifecycle transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, DonationStatus::Distributed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryStatus {
    Available,
    Distributed,
    Expired,
}

impl InventoryStatus {
    /// Distributed and expired stock accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, InventoryStatus::Distributed | InventoryStatus::Expired)
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InventoryStatus::Available => "available",
            InventoryStatus::Distributed => "distributed",
            InventoryStatus::Expired => "expired",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Assembled Records
// ============================================================================

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: PersonName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An evacuation center and its standing capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationCenter {
    pub id: CenterId,
    pub name: String,
    pub address: String,
    pub capacity: u32,
    pub status: CenterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A family group of evacuees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_of_family: Option<EvacueeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A person registered at an evacuation center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evacuee {
    pub id: EvacueeId,
    pub name: PersonName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub status: EvacueeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<FamilyId>,
    pub center: CenterId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evacuee {
    /// Whole years of age as of `today`, or None when the birth date is
    /// unknown (or lies in the future).
    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        // Birthday not yet reached this year
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// Goods pledged or handed over by a donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub commodity: Commodity,
    pub status: DonationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor: Option<UserId>,
    pub center: CenterId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.commodity.is_expired(today)
    }

    /// Food due to expire within the standard window, unless the donation
    /// already reached a terminal status.
    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.commodity.expires_within(today, EXPIRING_SOON_DAYS)
    }
}

/// Stock held at a center, usually derived from a received donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryId,
    pub commodity: Commodity,
    pub status: InventoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation: Option<DonationId>,
    pub center: CenterId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.commodity.is_expired(today)
    }

    /// Food due to expire within the standard window, unless the item
    /// already reached a terminal status.
    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.commodity.expires_within(today, EXPIRING_SOON_DAYS)
    }
}
