//! Donation and stock lifecycle rules
//!
//! Donations move Pending -> Received -> Distributed; inventory moves
//! Available -> Distributed or Available -> Expired. Receiving a donation
//! derives at most one inventory item from it, and distributing derived
//! stock closes out the source donation.

use tracing::debug;

use crate::error::{Conflict, Error};
use crate::model::*;
use crate::registry::{NewInventoryItem, Registry};

impl Registry {
    /// Mark a donation as received at its center, deriving an available
    /// inventory item from it the first time around.
    ///
    /// Receiving again is harmless: the status and timestamp update, but
    /// no second item appears. Distributed donations can no longer be
    /// received.
    pub fn receive_donation(&mut self, donation: DonationId) -> Result<Donation, Error> {
        let donation_entity = self.require_donation(donation)?;

        let status = *self.world.get::<&DonationStatus>(donation_entity).unwrap();
        if status.is_terminal() {
            return Err(Conflict::DonationDistributed.into());
        }

        // Derive the stock before writing the status, so a failed
        // derivation leaves the donation untouched
        if self.donation_has_inventory(donation) {
            debug!(%donation, "inventory already derived, skipping");
        } else {
            let commodity = (*self.world.get::<&Commodity>(donation_entity).unwrap()).clone();
            let center = self.world.get::<&CenterRef>(donation_entity).unwrap().0;
            let item = self.insert_inventory_item(NewInventoryItem {
                commodity,
                donation: Some(donation),
                center,
            })?;
            debug!(%donation, item = %item.id, "inventory derived from donation");
        }

        *self
            .world
            .get::<&mut DonationStatus>(donation_entity)
            .unwrap() = DonationStatus::Received;
        self.touch(donation_entity);

        Ok(self.donation_record(donation_entity))
    }

    /// Hand an available item out to evacuees. Derived stock closes out
    /// its source donation as distributed too.
    pub fn distribute_inventory_item(&mut self, item: InventoryId) -> Result<InventoryItem, Error> {
        let item_entity = self.require_inventory_item(item)?;

        let status = *self.world.get::<&InventoryStatus>(item_entity).unwrap();
        if status != InventoryStatus::Available {
            return Err(Conflict::ItemNotAvailable { status }.into());
        }

        *self.world.get::<&mut InventoryStatus>(item_entity).unwrap() =
            InventoryStatus::Distributed;
        self.touch(item_entity);

        let source = self.world.get::<&DonationRef>(item_entity).ok().map(|d| d.0);
        if let Some(donation) = source {
            if let Some(&donation_entity) = self.donations.get(&donation) {
                *self
                    .world
                    .get::<&mut DonationStatus>(donation_entity)
                    .unwrap() = DonationStatus::Distributed;
                self.touch(donation_entity);
            }
        }

        Ok(self.inventory_record(item_entity))
    }

    /// Write an available item off as expired. The source donation keeps
    /// its status; the goods were received, just never handed out.
    pub fn expire_inventory_item(&mut self, item: InventoryId) -> Result<InventoryItem, Error> {
        let item_entity = self.require_inventory_item(item)?;

        let status = *self.world.get::<&InventoryStatus>(item_entity).unwrap();
        if status != InventoryStatus::Available {
            return Err(Conflict::ItemNotAvailable { status }.into());
        }

        *self.world.get::<&mut InventoryStatus>(item_entity).unwrap() = InventoryStatus::Expired;
        self.touch(item_entity);
        Ok(self.inventory_record(item_entity))
    }
}
