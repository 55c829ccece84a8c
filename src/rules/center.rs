//! Evacuation-center lifecycle rules
//!
//! Centers are referenced by evacuees, donations and stock, so deletion is
//! gated on nothing pointing at the center any more. Closing a center for
//! new intake is a plain status update, not a deletion.

use crate::error::{Conflict, Error};
use crate::model::*;
use crate::registry::Registry;

impl Registry {
    /// Number of evacuees currently sheltered at the center, i.e. assigned
    /// and in `Present` status.
    pub fn center_occupancy(&self, center: CenterId) -> usize {
        self.world
            .query::<(&EvacueeId, &EvacueeStatus, &CenterRef)>()
            .iter()
            .filter(|(_, (_, status, at))| at.0 == center && **status == EvacueeStatus::Present)
            .count()
    }

    /// Delete an evacuation center.
    ///
    /// Refused while any evacuee in any status is still assigned, and
    /// likewise while donations or inventory items still reference the
    /// center. Transfer or remove those first.
    pub fn delete_center(&mut self, center: CenterId) -> Result<EvacuationCenter, Error> {
        let center_entity = self.require_center(center)?;

        let evacuees = self
            .world
            .query::<(&EvacueeId, &CenterRef)>()
            .iter()
            .filter(|(_, (_, at))| at.0 == center)
            .count();
        if evacuees > 0 {
            return Err(Conflict::CenterHasEvacuees { evacuees }.into());
        }

        let donations = self
            .world
            .query::<(&DonationId, &CenterRef)>()
            .iter()
            .filter(|(_, (_, at))| at.0 == center)
            .count();
        let inventory_items = self
            .world
            .query::<(&InventoryId, &CenterRef)>()
            .iter()
            .filter(|(_, (_, at))| at.0 == center)
            .count();
        if donations > 0 || inventory_items > 0 {
            return Err(Conflict::CenterHasStock {
                donations,
                inventory_items,
            }
            .into());
        }

        let record = self.center_record(center_entity);
        let _ = self.world.despawn(center_entity);
        self.centers.remove(&center);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EvacueePatch, NewCenter, NewDonation, NewEvacuee, NewInventoryItem};

    fn new_center(name: &str) -> NewCenter {
        NewCenter {
            name: name.to_string(),
            address: "Mabini St".to_string(),
            capacity: 50,
            status: CenterStatus::Active,
            contact_person: None,
            contact_number: None,
        }
    }

    fn add_evacuee(reg: &mut Registry, center: CenterId, status: EvacueeStatus) -> EvacueeId {
        reg.insert_evacuee(NewEvacuee {
            name: PersonName::new("Jose", "Cruz"),
            date_of_birth: None,
            gender: Gender::Male,
            status,
            special_needs: None,
            family: None,
            center,
        })
        .unwrap()
        .id
    }

    fn blankets() -> Commodity {
        Commodity {
            kind: CommodityKind::NonFood,
            description: "Blankets".to_string(),
            quantity: 40,
            unit: "pieces".to_string(),
            expiry_date: None,
        }
    }

    #[test]
    fn test_occupancy_counts_present_only() {
        let mut reg = Registry::new();
        let center = reg.insert_center(new_center("Rizal Gym")).unwrap().id;
        add_evacuee(&mut reg, center, EvacueeStatus::Present);
        add_evacuee(&mut reg, center, EvacueeStatus::Present);
        add_evacuee(&mut reg, center, EvacueeStatus::Relocated);
        add_evacuee(&mut reg, center, EvacueeStatus::Missing);

        assert_eq!(reg.center_occupancy(center), 2);
    }

    #[test]
    fn test_delete_blocked_by_assigned_evacuees() {
        let mut reg = Registry::new();
        let center = reg.insert_center(new_center("Rizal Gym")).unwrap().id;
        add_evacuee(&mut reg, center, EvacueeStatus::Present);

        let err = reg.delete_center(center).unwrap_err();
        assert_eq!(err, Error::Conflict(Conflict::CenterHasEvacuees { evacuees: 1 }));
        assert!(reg.center(center).is_some());
    }

    #[test]
    fn test_any_evacuee_status_blocks_deletion() {
        let mut reg = Registry::new();
        let center = reg.insert_center(new_center("Rizal Gym")).unwrap().id;
        // Relocated people still belong to this center's records
        add_evacuee(&mut reg, center, EvacueeStatus::Relocated);

        let err = reg.delete_center(center).unwrap_err();
        assert_eq!(err, Error::Conflict(Conflict::CenterHasEvacuees { evacuees: 1 }));
    }

    #[test]
    fn test_delete_unblocked_after_transfer() {
        let mut reg = Registry::new();
        let closing = reg.insert_center(new_center("Closing Gym")).unwrap().id;
        let receiving = reg.insert_center(new_center("Receiving Gym")).unwrap().id;
        let evacuee = add_evacuee(&mut reg, closing, EvacueeStatus::Present);

        assert!(reg.delete_center(closing).is_err());

        reg.update_evacuee(
            evacuee,
            EvacueePatch {
                center: Some(receiving),
                ..Default::default()
            },
        )
        .unwrap();

        let removed = reg.delete_center(closing).unwrap();
        assert_eq!(removed.id, closing);
        assert!(reg.center(closing).is_none());
        assert_eq!(reg.evacuee(evacuee).unwrap().center, receiving);
    }

    #[test]
    fn test_delete_blocked_by_stock() {
        let mut reg = Registry::new();
        let center = reg.insert_center(new_center("Depot")).unwrap().id;
        reg.insert_donation(NewDonation {
            commodity: blankets(),
            donor: None,
            center,
        })
        .unwrap();
        reg.insert_inventory_item(NewInventoryItem {
            commodity: blankets(),
            donation: None,
            center,
        })
        .unwrap();

        let err = reg.delete_center(center).unwrap_err();
        assert_eq!(
            err,
            Error::Conflict(Conflict::CenterHasStock {
                donations: 1,
                inventory_items: 1
            })
        );
    }

    #[test]
    fn test_delete_empty_center() {
        let mut reg = Registry::new();
        let center = reg.insert_center(new_center("Rizal Gym")).unwrap().id;
        let removed = reg.delete_center(center).unwrap();
        assert_eq!(removed.name, "Rizal Gym");
        assert!(reg.center(center).is_none());
        assert_eq!(reg.center_count(), 0);

        // Second delete reports the id as gone
        assert!(matches!(
            reg.delete_center(center),
            Err(Error::NotFound { .. })
        ));
    }
}
