//! Relief registry - the entity store
//!
//! Owns the ECS world plus a per-kind id index. Reads assemble owned record
//! structs; writes go through the insert/update/delete methods here and the
//! integrity rules layered on top in `rules`. Ids are dense u64s starting
//! at 1, never reused, independent per kind.

use std::collections::HashMap;

use chrono::NaiveDate;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::error::{Conflict, EntityKind, Error};
use crate::filter::{
    CenterFilter, DonationFilter, EvacueeFilter, FamilyFilter, InventoryFilter, UserFilter,
};
use crate::model::*;

// ============================================================================
// Id Counters
// ============================================================================

/// Next id to hand out, per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub user: u64,
    pub center: u64,
    pub family: u64,
    pub evacuee: u64,
    pub donation: u64,
    pub inventory: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            user: 1,
            center: 1,
            family: 1,
            evacuee: 1,
            donation: 1,
            inventory: 1,
        }
    }
}

impl IdCounters {
    fn next_user(&mut self) -> UserId {
        let id = UserId(self.user);
        self.user += 1;
        id
    }

    fn next_center(&mut self) -> CenterId {
        let id = CenterId(self.center);
        self.center += 1;
        id
    }

    fn next_family(&mut self) -> FamilyId {
        let id = FamilyId(self.family);
        self.family += 1;
        id
    }

    fn next_evacuee(&mut self) -> EvacueeId {
        let id = EvacueeId(self.evacuee);
        self.evacuee += 1;
        id
    }

    fn next_donation(&mut self) -> DonationId {
        let id = DonationId(self.donation);
        self.donation += 1;
        id
    }

    fn next_inventory(&mut self) -> InventoryId {
        let id = InventoryId(self.inventory);
        self.inventory += 1;
        id
    }
}

// ============================================================================
// Insert Inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: PersonName,
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewCenter {
    pub name: String,
    pub address: String,
    pub capacity: u32,
    pub status: CenterStatus,
    pub contact_person: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFamily {
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    /// Optional initial head; must already be registered as an evacuee.
    pub head: Option<EvacueeId>,
}

#[derive(Debug, Clone)]
pub struct NewEvacuee {
    pub name: PersonName,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub status: EvacueeStatus,
    pub special_needs: Option<String>,
    pub family: Option<FamilyId>,
    pub center: CenterId,
}

/// Donations always enter the registry as `Pending`; status moves through
/// the lifecycle rules only.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub commodity: Commodity,
    pub donor: Option<UserId>,
    pub center: CenterId,
}

/// Manually entered stock starts `Available`. Deriving stock from a
/// received donation normally happens through `receive_donation`.
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub commodity: Commodity,
    pub donation: Option<DonationId>,
    pub center: CenterId,
}

// ============================================================================
// Update Patches
// ============================================================================

/// Partial updates: `None` leaves a field untouched. Clearable fields nest
/// a second `Option` carrying the new value. Patches cover descriptive
/// fields only; statuses and cross-references owned by integrity rules
/// have no patch field.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CenterPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<u32>,
    pub status: Option<CenterStatus>,
    pub contact_person: Option<Option<String>>,
    pub contact_number: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FamilyPatch {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub contact_number: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct EvacueePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub gender: Option<Gender>,
    pub status: Option<EvacueeStatus>,
    pub special_needs: Option<Option<String>>,
    pub center: Option<CenterId>,
}

#[derive(Debug, Clone, Default)]
pub struct DonationPatch {
    pub kind: Option<CommodityKind>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub center: Option<CenterId>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryPatch {
    pub kind: Option<CommodityKind>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub center: Option<CenterId>,
}

// ============================================================================
// Registry
// ============================================================================

pub struct Registry {
    pub(crate) world: World,
    pub(crate) ids: IdCounters,
    pub(crate) users: HashMap<UserId, Entity>,
    pub(crate) centers: HashMap<CenterId, Entity>,
    pub(crate) families: HashMap<FamilyId, Entity>,
    pub(crate) evacuees: HashMap<EvacueeId, Entity>,
    pub(crate) donations: HashMap<DonationId, Entity>,
    pub(crate) inventory: HashMap<InventoryId, Entity>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            ids: IdCounters::default(),
            users: HashMap::new(),
            centers: HashMap::new(),
            families: HashMap::new(),
            evacuees: HashMap::new(),
            donations: HashMap::new(),
            inventory: HashMap::new(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn evacuee_count(&self) -> usize {
        self.evacuees.len()
    }

    pub fn donation_count(&self) -> usize {
        self.donations.len()
    }

    pub fn inventory_count(&self) -> usize {
        self.inventory.len()
    }

    // ------------------------------------------------------------------
    // Id lookups (NotFound on miss), shared with the rules modules
    // ------------------------------------------------------------------

    pub(crate) fn require_user(&self, id: UserId) -> Result<Entity, Error> {
        self.users
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::User, id.0))
    }

    pub(crate) fn require_center(&self, id: CenterId) -> Result<Entity, Error> {
        self.centers
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::EvacuationCenter, id.0))
    }

    pub(crate) fn require_family(&self, id: FamilyId) -> Result<Entity, Error> {
        self.families
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::Family, id.0))
    }

    pub(crate) fn require_evacuee(&self, id: EvacueeId) -> Result<Entity, Error> {
        self.evacuees
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::Evacuee, id.0))
    }

    pub(crate) fn require_donation(&self, id: DonationId) -> Result<Entity, Error> {
        self.donations
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::Donation, id.0))
    }

    pub(crate) fn require_inventory_item(&self, id: InventoryId) -> Result<Entity, Error> {
        self.inventory
            .get(&id)
            .copied()
            .ok_or(Error::not_found(EntityKind::InventoryItem, id.0))
    }

    /// Bump an entity's `updated_at`.
    pub(crate) fn touch(&mut self, entity: Entity) {
        if let Ok(mut stamps) = self.world.get::<&mut Stamps>(entity) {
            stamps.touch();
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn insert_user(&mut self, new: NewUser) -> Result<User, Error> {
        let id = self.ids.next_user();
        let profile = UserProfile {
            username: new.username,
            email: new.email,
            phone: new.phone,
            active: new.active,
        };
        let entity = self
            .world
            .spawn((id, profile, new.name, new.role, Stamps::now()));
        self.users.insert(id, entity);
        Ok(self.user_record(entity))
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|&e| self.user_record(e))
    }

    /// Exact-match lookup, mainly for bootstrap checks.
    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.world
            .query::<(&UserId, &UserProfile)>()
            .iter()
            .find(|(_, (_, profile))| profile.username == username)
            .map(|(entity, _)| self.user_record(entity))
    }

    pub fn users(&self, filter: &UserFilter) -> Vec<User> {
        let mut out: Vec<User> = self
            .world
            .query::<&UserId>()
            .iter()
            .map(|(entity, _)| self.user_record(entity))
            .filter(|user| filter.matches(user))
            .collect();
        out.sort_by_key(|user| user.id);
        out
    }

    pub fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<User, Error> {
        let entity = self.require_user(id)?;
        {
            let mut profile = self.world.get::<&mut UserProfile>(entity).unwrap();
            if let Some(v) = patch.username {
                profile.username = v;
            }
            if let Some(v) = patch.email {
                profile.email = v;
            }
            if let Some(v) = patch.phone {
                profile.phone = v;
            }
        }
        {
            let mut name = self.world.get::<&mut PersonName>(entity).unwrap();
            if let Some(v) = patch.first_name {
                name.first = v;
            }
            if let Some(v) = patch.last_name {
                name.last = v;
            }
        }
        self.touch(entity);
        Ok(self.user_record(entity))
    }

    // ------------------------------------------------------------------
    // Evacuation centers
    // ------------------------------------------------------------------

    pub fn insert_center(&mut self, new: NewCenter) -> Result<EvacuationCenter, Error> {
        let id = self.ids.next_center();
        let info = CenterInfo {
            name: new.name,
            address: new.address,
            capacity: new.capacity,
            contact_person: new.contact_person,
            contact_number: new.contact_number,
        };
        let entity = self.world.spawn((id, info, new.status, Stamps::now()));
        self.centers.insert(id, entity);
        Ok(self.center_record(entity))
    }

    pub fn center(&self, id: CenterId) -> Option<EvacuationCenter> {
        self.centers.get(&id).map(|&e| self.center_record(e))
    }

    pub fn centers(&self, filter: &CenterFilter) -> Vec<EvacuationCenter> {
        let mut out: Vec<EvacuationCenter> = self
            .world
            .query::<&CenterId>()
            .iter()
            .map(|(entity, _)| self.center_record(entity))
            .filter(|center| filter.matches(center))
            .collect();
        out.sort_by_key(|center| center.id);
        out
    }

    pub fn update_center(
        &mut self,
        id: CenterId,
        patch: CenterPatch,
    ) -> Result<EvacuationCenter, Error> {
        let entity = self.require_center(id)?;
        {
            let mut info = self.world.get::<&mut CenterInfo>(entity).unwrap();
            if let Some(v) = patch.name {
                info.name = v;
            }
            if let Some(v) = patch.address {
                info.address = v;
            }
            if let Some(v) = patch.capacity {
                info.capacity = v;
            }
            if let Some(v) = patch.contact_person {
                info.contact_person = v;
            }
            if let Some(v) = patch.contact_number {
                info.contact_number = v;
            }
        }
        if let Some(v) = patch.status {
            *self.world.get::<&mut CenterStatus>(entity).unwrap() = v;
        }
        self.touch(entity);
        Ok(self.center_record(entity))
    }

    // ------------------------------------------------------------------
    // Families
    // ------------------------------------------------------------------

    pub fn insert_family(&mut self, new: NewFamily) -> Result<Family, Error> {
        if let Some(head) = new.head {
            self.require_evacuee(head)?;
        }
        let id = self.ids.next_family();
        let info = FamilyInfo {
            name: new.name,
            address: new.address,
            contact_number: new.contact_number,
        };
        let entity = self.world.spawn((id, info, Stamps::now()));
        self.families.insert(id, entity);
        if let Some(head) = new.head {
            self.set_family_head(id, Some(head))?;
        }
        Ok(self.family_record(entity))
    }

    pub fn family(&self, id: FamilyId) -> Option<Family> {
        self.families.get(&id).map(|&e| self.family_record(e))
    }

    pub fn families(&self, filter: &FamilyFilter) -> Vec<Family> {
        let mut out: Vec<Family> = self
            .world
            .query::<&FamilyId>()
            .iter()
            .map(|(entity, _)| self.family_record(entity))
            .filter(|family| filter.matches(family))
            .collect();
        out.sort_by_key(|family| family.id);
        out
    }

    /// Descriptive fields only; headship changes go through
    /// `set_family_head`.
    pub fn update_family(&mut self, id: FamilyId, patch: FamilyPatch) -> Result<Family, Error> {
        let entity = self.require_family(id)?;
        {
            let mut info = self.world.get::<&mut FamilyInfo>(entity).unwrap();
            if let Some(v) = patch.name {
                info.name = v;
            }
            if let Some(v) = patch.address {
                info.address = v;
            }
            if let Some(v) = patch.contact_number {
                info.contact_number = v;
            }
        }
        self.touch(entity);
        Ok(self.family_record(entity))
    }

    // ------------------------------------------------------------------
    // Evacuees
    // ------------------------------------------------------------------

    pub fn insert_evacuee(&mut self, new: NewEvacuee) -> Result<Evacuee, Error> {
        self.require_center(new.center)?;
        if let Some(family) = new.family {
            self.require_family(family)?;
        }
        let id = self.ids.next_evacuee();
        let entity = self.world.spawn((
            id,
            new.name,
            new.gender,
            new.status,
            CenterRef(new.center),
            Stamps::now(),
        ));
        if let Some(dob) = new.date_of_birth {
            let _ = self.world.insert_one(entity, DateOfBirth(dob));
        }
        if let Some(family) = new.family {
            let _ = self.world.insert_one(entity, FamilyRef(family));
        }
        if let Some(notes) = new.special_needs {
            let _ = self.world.insert_one(entity, SpecialNeeds(notes));
        }
        self.evacuees.insert(id, entity);
        Ok(self.evacuee_record(entity))
    }

    pub fn evacuee(&self, id: EvacueeId) -> Option<Evacuee> {
        self.evacuees.get(&id).map(|&e| self.evacuee_record(e))
    }

    pub fn evacuees(&self, filter: &EvacueeFilter) -> Vec<Evacuee> {
        let mut out: Vec<Evacuee> = self
            .world
            .query::<&EvacueeId>()
            .iter()
            .map(|(entity, _)| self.evacuee_record(entity))
            .filter(|evacuee| filter.matches(evacuee))
            .collect();
        out.sort_by_key(|evacuee| evacuee.id);
        out
    }

    /// Descriptive fields and center transfer; family membership goes
    /// through `assign_evacuee_family`.
    pub fn update_evacuee(&mut self, id: EvacueeId, patch: EvacueePatch) -> Result<Evacuee, Error> {
        let entity = self.require_evacuee(id)?;
        if let Some(center) = patch.center {
            self.require_center(center)?;
        }
        {
            let mut name = self.world.get::<&mut PersonName>(entity).unwrap();
            if let Some(v) = patch.first_name {
                name.first = v;
            }
            if let Some(v) = patch.last_name {
                name.last = v;
            }
        }
        if let Some(v) = patch.gender {
            *self.world.get::<&mut Gender>(entity).unwrap() = v;
        }
        if let Some(v) = patch.status {
            *self.world.get::<&mut EvacueeStatus>(entity).unwrap() = v;
        }
        match patch.date_of_birth {
            Some(Some(dob)) => {
                let _ = self.world.insert_one(entity, DateOfBirth(dob));
            }
            Some(None) => {
                let _ = self.world.remove_one::<DateOfBirth>(entity);
            }
            None => {}
        }
        match patch.special_needs {
            Some(Some(notes)) => {
                let _ = self.world.insert_one(entity, SpecialNeeds(notes));
            }
            Some(None) => {
                let _ = self.world.remove_one::<SpecialNeeds>(entity);
            }
            None => {}
        }
        if let Some(center) = patch.center {
            self.world.get::<&mut CenterRef>(entity).unwrap().0 = center;
        }
        self.touch(entity);
        Ok(self.evacuee_record(entity))
    }

    // ------------------------------------------------------------------
    // Donations
    // ------------------------------------------------------------------

    pub fn insert_donation(&mut self, new: NewDonation) -> Result<Donation, Error> {
        new.commodity.validate()?;
        self.require_center(new.center)?;
        if let Some(donor) = new.donor {
            self.require_user(donor)?;
        }
        let id = self.ids.next_donation();
        let entity = self.world.spawn((
            id,
            new.commodity,
            DonationStatus::Pending,
            CenterRef(new.center),
            Stamps::now(),
        ));
        if let Some(donor) = new.donor {
            let _ = self.world.insert_one(entity, DonorRef(donor));
        }
        self.donations.insert(id, entity);
        Ok(self.donation_record(entity))
    }

    pub fn donation(&self, id: DonationId) -> Option<Donation> {
        self.donations.get(&id).map(|&e| self.donation_record(e))
    }

    pub fn donations(&self, filter: &DonationFilter) -> Vec<Donation> {
        let mut out: Vec<Donation> = self
            .world
            .query::<&DonationId>()
            .iter()
            .map(|(entity, _)| self.donation_record(entity))
            .filter(|donation| filter.matches(donation))
            .collect();
        out.sort_by_key(|donation| donation.id);
        out
    }

    /// Goods fields and center only; status moves through the donation
    /// lifecycle rules.
    pub fn update_donation(
        &mut self,
        id: DonationId,
        patch: DonationPatch,
    ) -> Result<Donation, Error> {
        let entity = self.require_donation(id)?;
        if let Some(center) = patch.center {
            self.require_center(center)?;
        }
        let mut commodity = (*self.world.get::<&Commodity>(entity).unwrap()).clone();
        apply_commodity_patch(
            &mut commodity,
            patch.kind,
            patch.description,
            patch.quantity,
            patch.unit,
            patch.expiry_date,
        );
        commodity.validate()?;
        *self.world.get::<&mut Commodity>(entity).unwrap() = commodity;
        if let Some(center) = patch.center {
            self.world.get::<&mut CenterRef>(entity).unwrap().0 = center;
        }
        self.touch(entity);
        Ok(self.donation_record(entity))
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    pub fn insert_inventory_item(
        &mut self,
        new: NewInventoryItem,
    ) -> Result<InventoryItem, Error> {
        new.commodity.validate()?;
        self.require_center(new.center)?;
        if let Some(donation) = new.donation {
            self.require_donation(donation)?;
            if self.donation_has_inventory(donation) {
                return Err(Conflict::InventoryAlreadyDerived { donation }.into());
            }
        }
        let id = self.ids.next_inventory();
        let entity = self.world.spawn((
            id,
            new.commodity,
            InventoryStatus::Available,
            CenterRef(new.center),
            Stamps::now(),
        ));
        if let Some(donation) = new.donation {
            let _ = self.world.insert_one(entity, DonationRef(donation));
        }
        self.inventory.insert(id, entity);
        Ok(self.inventory_record(entity))
    }

    pub fn inventory_item(&self, id: InventoryId) -> Option<InventoryItem> {
        self.inventory.get(&id).map(|&e| self.inventory_record(e))
    }

    pub fn inventory_items(&self, filter: &InventoryFilter) -> Vec<InventoryItem> {
        let mut out: Vec<InventoryItem> = self
            .world
            .query::<&InventoryId>()
            .iter()
            .map(|(entity, _)| self.inventory_record(entity))
            .filter(|item| filter.matches(item))
            .collect();
        out.sort_by_key(|item| item.id);
        out
    }

    /// Goods fields and center only; status moves through the stock
    /// lifecycle rules.
    pub fn update_inventory_item(
        &mut self,
        id: InventoryId,
        patch: InventoryPatch,
    ) -> Result<InventoryItem, Error> {
        let entity = self.require_inventory_item(id)?;
        if let Some(center) = patch.center {
            self.require_center(center)?;
        }
        let mut commodity = (*self.world.get::<&Commodity>(entity).unwrap()).clone();
        apply_commodity_patch(
            &mut commodity,
            patch.kind,
            patch.description,
            patch.quantity,
            patch.unit,
            patch.expiry_date,
        );
        commodity.validate()?;
        *self.world.get::<&mut Commodity>(entity).unwrap() = commodity;
        if let Some(center) = patch.center {
            self.world.get::<&mut CenterRef>(entity).unwrap().0 = center;
        }
        self.touch(entity);
        Ok(self.inventory_record(entity))
    }

    /// Stock corrections may remove an item outright; nothing references
    /// inventory ids, so no gate applies.
    pub fn delete_inventory_item(&mut self, id: InventoryId) -> Result<InventoryItem, Error> {
        let entity = self.require_inventory_item(id)?;
        let record = self.inventory_record(entity);
        let _ = self.world.despawn(entity);
        self.inventory.remove(&id);
        Ok(record)
    }

    /// True when some inventory item was already derived from the donation.
    pub(crate) fn donation_has_inventory(&self, donation: DonationId) -> bool {
        self.world
            .query::<(&InventoryId, &DonationRef)>()
            .iter()
            .any(|(_, (_, derived))| derived.0 == donation)
    }

    // ------------------------------------------------------------------
    // Record assembly
    // ------------------------------------------------------------------

    pub(crate) fn user_record(&self, entity: Entity) -> User {
        let mut query = self
            .world
            .query_one::<(&UserId, &UserProfile, &PersonName, &Role, &Stamps)>(entity)
            .unwrap();
        let (id, profile, name, role, stamps) = query.get().unwrap();
        User {
            id: *id,
            username: profile.username.clone(),
            email: profile.email.clone(),
            name: name.clone(),
            phone: profile.phone.clone(),
            role: *role,
            active: profile.active,
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }

    pub(crate) fn center_record(&self, entity: Entity) -> EvacuationCenter {
        let mut query = self
            .world
            .query_one::<(&CenterId, &CenterInfo, &CenterStatus, &Stamps)>(entity)
            .unwrap();
        let (id, info, status, stamps) = query.get().unwrap();
        EvacuationCenter {
            id: *id,
            name: info.name.clone(),
            address: info.address.clone(),
            capacity: info.capacity,
            status: *status,
            contact_person: info.contact_person.clone(),
            contact_number: info.contact_number.clone(),
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }

    pub(crate) fn family_record(&self, entity: Entity) -> Family {
        let mut query = self
            .world
            .query_one::<(&FamilyId, &FamilyInfo, Option<&HeadOfFamily>, &Stamps)>(entity)
            .unwrap();
        let (id, info, head, stamps) = query.get().unwrap();
        Family {
            id: *id,
            name: info.name.clone(),
            address: info.address.clone(),
            contact_number: info.contact_number.clone(),
            head_of_family: head.map(|h| h.0),
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }

    pub(crate) fn evacuee_record(&self, entity: Entity) -> Evacuee {
        let mut query = self
            .world
            .query_one::<(
                &EvacueeId,
                &PersonName,
                Option<&DateOfBirth>,
                &Gender,
                &EvacueeStatus,
                Option<&SpecialNeeds>,
                Option<&FamilyRef>,
                &CenterRef,
                &Stamps,
            )>(entity)
            .unwrap();
        let (id, name, dob, gender, status, needs, family, center, stamps) =
            query.get().unwrap();
        Evacuee {
            id: *id,
            name: name.clone(),
            date_of_birth: dob.map(|d| d.0),
            gender: *gender,
            status: *status,
            special_needs: needs.map(|n| n.0.clone()),
            family: family.map(|f| f.0),
            center: center.0,
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }

    pub(crate) fn donation_record(&self, entity: Entity) -> Donation {
        let mut query = self
            .world
            .query_one::<(
                &DonationId,
                &Commodity,
                &DonationStatus,
                Option<&DonorRef>,
                &CenterRef,
                &Stamps,
            )>(entity)
            .unwrap();
        let (id, commodity, status, donor, center, stamps) = query.get().unwrap();
        Donation {
            id: *id,
            commodity: commodity.clone(),
            status: *status,
            donor: donor.map(|d| d.0),
            center: center.0,
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }

    pub(crate) fn inventory_record(&self, entity: Entity) -> InventoryItem {
        let mut query = self
            .world
            .query_one::<(
                &InventoryId,
                &Commodity,
                &InventoryStatus,
                Option<&DonationRef>,
                &CenterRef,
                &Stamps,
            )>(entity)
            .unwrap();
        let (id, commodity, status, donation, center, stamps) = query.get().unwrap();
        InventoryItem {
            id: *id,
            commodity: commodity.clone(),
            status: *status,
            donation: donation.map(|d| d.0),
            center: center.0,
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_commodity_patch(
    commodity: &mut Commodity,
    kind: Option<CommodityKind>,
    description: Option<String>,
    quantity: Option<u32>,
    unit: Option<String>,
    expiry_date: Option<Option<NaiveDate>>,
) {
    if let Some(v) = kind {
        commodity.kind = v;
    }
    if let Some(v) = description {
        commodity.description = v;
    }
    if let Some(v) = quantity {
        commodity.quantity = v;
    }
    if let Some(v) = unit {
        commodity.unit = v;
    }
    if let Some(v) = expiry_date {
        commodity.expiry_date = v;
    }
}
