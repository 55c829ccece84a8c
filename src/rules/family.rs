//! Family membership and headship rules
//!
//! A family may designate one of its registered evacuees as head. The head
//! is always a member of the family they lead, an evacuee heads at most one
//! family, and an evacuee cannot be deleted while any family lists them as
//! head.

use hecs::Entity;
use tracing::info;

use crate::error::{Conflict, Error};
use crate::model::*;
use crate::registry::Registry;

/// Outcome of deleting a family group.
#[derive(Debug, Clone)]
pub struct FamilyDeletion {
    pub family: Family,
    /// Members whose family link was cleared by the deletion.
    pub detached: u32,
}

impl Registry {
    /// Designate `head` as the family's head, or clear the designation.
    ///
    /// A new head is pulled into the family's membership if not already a
    /// member, and unseated from any other family they were heading. A
    /// displaced previous head stays a regular member.
    pub fn set_family_head(
        &mut self,
        family: FamilyId,
        head: Option<EvacueeId>,
    ) -> Result<Family, Error> {
        let family_entity = self.require_family(family)?;

        let Some(head_id) = head else {
            if self.world.remove_one::<HeadOfFamily>(family_entity).is_ok() {
                self.touch(family_entity);
            }
            return Ok(self.family_record(family_entity));
        };

        let evacuee_entity = self.require_evacuee(head_id)?;

        // An evacuee heads at most one family; unseat them elsewhere first
        let unseat: Vec<Entity> = self
            .world
            .query::<(&FamilyId, &HeadOfFamily)>()
            .iter()
            .filter(|(_, (id, current))| current.0 == head_id && **id != family)
            .map(|(entity, _)| entity)
            .collect();
        for entity in unseat {
            let _ = self.world.remove_one::<HeadOfFamily>(entity);
            self.touch(entity);
        }

        let _ = self.world.insert_one(family_entity, HeadOfFamily(head_id));
        self.touch(family_entity);

        // The head is always a member of the family they lead
        let member_of = self
            .world
            .get::<&FamilyRef>(evacuee_entity)
            .ok()
            .map(|r| r.0);
        if member_of != Some(family) {
            let _ = self.world.insert_one(evacuee_entity, FamilyRef(family));
            self.touch(evacuee_entity);
        }

        Ok(self.family_record(family_entity))
    }

    /// Move an evacuee into `family`, or out of any family with `None`.
    ///
    /// Leaving a family the evacuee was heading steps them down from the
    /// headship; the family simply has no head afterwards.
    pub fn assign_evacuee_family(
        &mut self,
        evacuee: EvacueeId,
        family: Option<FamilyId>,
    ) -> Result<Evacuee, Error> {
        let evacuee_entity = self.require_evacuee(evacuee)?;
        if let Some(target) = family {
            self.require_family(target)?;
        }

        let current = self
            .world
            .get::<&FamilyRef>(evacuee_entity)
            .ok()
            .map(|r| r.0);
        if current == family {
            return Ok(self.evacuee_record(evacuee_entity));
        }

        // Step down from the headship of the family being left
        if let Some(old) = current {
            if let Some(&old_entity) = self.families.get(&old) {
                let heads_old = self
                    .world
                    .get::<&HeadOfFamily>(old_entity)
                    .ok()
                    .is_some_and(|h| h.0 == evacuee);
                if heads_old {
                    let _ = self.world.remove_one::<HeadOfFamily>(old_entity);
                    self.touch(old_entity);
                }
            }
        }

        match family {
            Some(target) => {
                let _ = self.world.insert_one(evacuee_entity, FamilyRef(target));
            }
            None => {
                let _ = self.world.remove_one::<FamilyRef>(evacuee_entity);
            }
        }
        self.touch(evacuee_entity);
        Ok(self.evacuee_record(evacuee_entity))
    }

    /// Delete a family group. Members are kept as evacuees with their
    /// family link cleared; they do not follow the family out of the store.
    pub fn delete_family(&mut self, family: FamilyId) -> Result<FamilyDeletion, Error> {
        let family_entity = self.require_family(family)?;
        let record = self.family_record(family_entity);

        let members: Vec<Entity> = self
            .world
            .query::<(&EvacueeId, &FamilyRef)>()
            .iter()
            .filter(|(_, (_, member))| member.0 == family)
            .map(|(entity, _)| entity)
            .collect();
        for &entity in &members {
            let _ = self.world.remove_one::<FamilyRef>(entity);
            self.touch(entity);
        }

        let _ = self.world.despawn(family_entity);
        self.families.remove(&family);

        let detached = members.len() as u32;
        info!(family = %family, detached, "family deleted");
        Ok(FamilyDeletion {
            family: record,
            detached,
        })
    }

    /// Delete an evacuee. Refused while any family lists them as head;
    /// step them down or delete the family first.
    pub fn delete_evacuee(&mut self, evacuee: EvacueeId) -> Result<Evacuee, Error> {
        let evacuee_entity = self.require_evacuee(evacuee)?;

        let heading = self
            .world
            .query::<(&FamilyId, &HeadOfFamily)>()
            .iter()
            .find(|(_, (_, head))| head.0 == evacuee)
            .map(|(_, (id, _))| *id);
        if let Some(family) = heading {
            return Err(Conflict::EvacueeIsFamilyHead { family }.into());
        }

        let record = self.evacuee_record(evacuee_entity);
        let _ = self.world.despawn(evacuee_entity);
        self.evacuees.remove(&evacuee);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NewCenter, NewEvacuee, NewFamily};

    fn setup() -> (Registry, CenterId) {
        let mut reg = Registry::new();
        let center = reg
            .insert_center(NewCenter {
                name: "Rizal Gym".to_string(),
                address: "Mabini St".to_string(),
                capacity: 100,
                status: CenterStatus::Active,
                contact_person: None,
                contact_number: None,
            })
            .unwrap();
        (reg, center.id)
    }

    fn add_evacuee(reg: &mut Registry, center: CenterId, first: &str) -> EvacueeId {
        reg.insert_evacuee(NewEvacuee {
            name: PersonName::new(first, "Cruz"),
            date_of_birth: None,
            gender: Gender::Female,
            status: EvacueeStatus::Present,
            special_needs: None,
            family: None,
            center,
        })
        .unwrap()
        .id
    }

    fn add_family(reg: &mut Registry, name: &str) -> FamilyId {
        reg.insert_family(NewFamily {
            name: name.to_string(),
            address: None,
            contact_number: None,
            head: None,
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_new_head_is_pulled_into_membership() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");

        let updated = reg.set_family_head(family, Some(head)).unwrap();
        assert_eq!(updated.head_of_family, Some(head));
        assert_eq!(reg.evacuee(head).unwrap().family, Some(family));
    }

    #[test]
    fn test_replaced_head_remains_a_member() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let first = add_evacuee(&mut reg, center, "Maria");
        let second = add_evacuee(&mut reg, center, "Pedro");

        reg.set_family_head(family, Some(first)).unwrap();
        let updated = reg.set_family_head(family, Some(second)).unwrap();

        assert_eq!(updated.head_of_family, Some(second));
        // The old head steps down but keeps their membership
        assert_eq!(reg.evacuee(first).unwrap().family, Some(family));
        assert_eq!(reg.evacuee(second).unwrap().family, Some(family));
    }

    #[test]
    fn test_head_of_two_families_is_unseated_from_the_first() {
        let (mut reg, center) = setup();
        let cruz = add_family(&mut reg, "Cruz");
        let reyes = add_family(&mut reg, "Reyes");
        let head = add_evacuee(&mut reg, center, "Maria");

        reg.set_family_head(cruz, Some(head)).unwrap();
        reg.set_family_head(reyes, Some(head)).unwrap();

        assert_eq!(reg.family(cruz).unwrap().head_of_family, None);
        assert_eq!(reg.family(reyes).unwrap().head_of_family, Some(head));
        assert_eq!(reg.evacuee(head).unwrap().family, Some(reyes));
    }

    #[test]
    fn test_clear_head() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");
        reg.set_family_head(family, Some(head)).unwrap();

        let updated = reg.set_family_head(family, None).unwrap();
        assert_eq!(updated.head_of_family, None);
        // Membership is untouched by stepping down
        assert_eq!(reg.evacuee(head).unwrap().family, Some(family));
    }

    #[test]
    fn test_set_head_requires_registered_evacuee() {
        let (mut reg, _) = setup();
        let family = add_family(&mut reg, "Cruz");
        let err = reg.set_family_head(family, Some(EvacueeId(99))).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(reg.family(family).unwrap().head_of_family, None);
    }

    #[test]
    fn test_insert_family_with_initial_head() {
        let (mut reg, center) = setup();
        let head = add_evacuee(&mut reg, center, "Maria");
        let family = reg
            .insert_family(NewFamily {
                name: "Cruz".to_string(),
                address: None,
                contact_number: None,
                head: Some(head),
            })
            .unwrap();

        assert_eq!(family.head_of_family, Some(head));
        assert_eq!(reg.evacuee(head).unwrap().family, Some(family.id));
    }

    #[test]
    fn test_moving_the_head_out_steps_them_down() {
        let (mut reg, center) = setup();
        let cruz = add_family(&mut reg, "Cruz");
        let reyes = add_family(&mut reg, "Reyes");
        let head = add_evacuee(&mut reg, center, "Maria");
        reg.set_family_head(cruz, Some(head)).unwrap();

        let moved = reg.assign_evacuee_family(head, Some(reyes)).unwrap();
        assert_eq!(moved.family, Some(reyes));
        // Cruz lost its head but is otherwise intact
        assert_eq!(reg.family(cruz).unwrap().head_of_family, None);
        // Reyes did not gain one
        assert_eq!(reg.family(reyes).unwrap().head_of_family, None);
    }

    #[test]
    fn test_leaving_all_families_steps_down_too() {
        let (mut reg, center) = setup();
        let cruz = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");
        reg.set_family_head(cruz, Some(head)).unwrap();

        let moved = reg.assign_evacuee_family(head, None).unwrap();
        assert_eq!(moved.family, None);
        assert_eq!(reg.family(cruz).unwrap().head_of_family, None);
    }

    #[test]
    fn test_assign_same_family_is_a_no_op() {
        let (mut reg, center) = setup();
        let cruz = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");
        reg.set_family_head(cruz, Some(head)).unwrap();

        let before = reg.evacuee(head).unwrap();
        let after = reg.assign_evacuee_family(head, Some(cruz)).unwrap();
        assert_eq!(after, before);
        // Headship survives a no-op reassignment
        assert_eq!(reg.family(cruz).unwrap().head_of_family, Some(head));
    }

    #[test]
    fn test_delete_family_detaches_members() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let a = add_evacuee(&mut reg, center, "Maria");
        let b = add_evacuee(&mut reg, center, "Pedro");
        let outsider = add_evacuee(&mut reg, center, "Luz");
        reg.assign_evacuee_family(a, Some(family)).unwrap();
        reg.assign_evacuee_family(b, Some(family)).unwrap();
        reg.set_family_head(family, Some(a)).unwrap();

        let outcome = reg.delete_family(family).unwrap();
        assert_eq!(outcome.detached, 2);
        assert!(reg.family(family).is_none());

        // Members survive with no family link; unrelated evacuees untouched
        assert_eq!(reg.evacuee(a).unwrap().family, None);
        assert_eq!(reg.evacuee(b).unwrap().family, None);
        assert_eq!(reg.evacuee(outsider).unwrap().family, None);
        assert_eq!(reg.evacuee_count(), 3);
    }

    #[test]
    fn test_delete_evacuee_blocked_while_head() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");
        reg.set_family_head(family, Some(head)).unwrap();

        let err = reg.delete_evacuee(head).unwrap_err();
        assert_eq!(err, Error::Conflict(Conflict::EvacueeIsFamilyHead { family }));
        assert!(reg.evacuee(head).is_some());

        // Stepping down unblocks the deletion
        reg.set_family_head(family, None).unwrap();
        let removed = reg.delete_evacuee(head).unwrap();
        assert_eq!(removed.id, head);
        assert!(reg.evacuee(head).is_none());
    }

    #[test]
    fn test_delete_plain_member_is_allowed() {
        let (mut reg, center) = setup();
        let family = add_family(&mut reg, "Cruz");
        let head = add_evacuee(&mut reg, center, "Maria");
        let member = add_evacuee(&mut reg, center, "Pedro");
        reg.set_family_head(family, Some(head)).unwrap();
        reg.assign_evacuee_family(member, Some(family)).unwrap();

        reg.delete_evacuee(member).unwrap();
        assert!(reg.evacuee(member).is_none());
        assert_eq!(reg.family(family).unwrap().head_of_family, Some(head));
    }
}
