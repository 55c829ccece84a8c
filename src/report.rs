//! Reporting over the registry
//!
//! Read-only aggregations for operations dashboards: center loads,
//! evacuee and donation breakdowns, and the expiry worklists volunteers
//! act on. Thresholds come from `ReportConfig`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ReportConfig;
use crate::filter::{CenterFilter, DonationFilter, InventoryFilter};
use crate::model::*;
use crate::registry::Registry;

/// Occupancy as a whole percentage of capacity, rounded, capped at 100.
/// A center with no surveyed capacity reports 0 rather than dividing by
/// zero.
pub fn occupancy_percent(occupancy: usize, capacity: u32) -> u8 {
    if capacity == 0 {
        return 0;
    }
    let percent = (occupancy as f64 / capacity as f64 * 100.0).round();
    percent.min(100.0) as u8
}

/// One center's headcount against its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterLoad {
    pub center: CenterId,
    pub name: String,
    pub status: CenterStatus,
    pub occupancy: u32,
    pub capacity: u32,
    pub percent: u8,
    /// Strictly above the high-occupancy threshold.
    pub high_occupancy: bool,
    /// At or above the near-capacity threshold.
    pub near_capacity: bool,
}

/// Headline counts for the operations dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub centers: u32,
    pub active_centers: u32,
    pub high_occupancy_centers: u32,
    pub evacuees_total: u32,
    pub evacuees_present: u32,
    pub families: u32,
    pub donations_pending: u32,
    pub inventory_available: u32,
    pub inventory_expiring_soon: u32,
    pub active_users: u32,
}

/// Evacuee counts by status, gender and age group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvacueeBreakdown {
    pub present: u32,
    pub relocated: u32,
    pub missing: u32,
    pub deceased: u32,
    pub male: u32,
    pub female: u32,
    pub other: u32,
    pub age_groups: AgeGroups,
}

/// Age bands used on intake reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgeGroups {
    /// 0-12
    pub children: u32,
    /// 13-18
    pub teens: u32,
    /// 19-30
    pub young_adults: u32,
    /// 31-45
    pub adults: u32,
    /// 46-60
    pub middle_aged: u32,
    /// 61 and up
    pub seniors: u32,
    /// No recorded birth date
    pub unknown: u32,
}

impl AgeGroups {
    fn tally(&mut self, age: Option<u32>) {
        match age {
            None => self.unknown += 1,
            Some(0..=12) => self.children += 1,
            Some(13..=18) => self.teens += 1,
            Some(19..=30) => self.young_adults += 1,
            Some(31..=45) => self.adults += 1,
            Some(46..=60) => self.middle_aged += 1,
            Some(_) => self.seniors += 1,
        }
    }
}

/// Donation counts by kind and lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationBreakdown {
    pub food: u32,
    pub non_food: u32,
    pub pending: u32,
    pub received: u32,
    pub distributed: u32,
}

impl Registry {
    /// Load figures for every center, ordered by id.
    pub fn center_loads(&self, config: &ReportConfig) -> Vec<CenterLoad> {
        self.centers(&CenterFilter::default())
            .into_iter()
            .map(|center| {
                let occupancy = self.center_occupancy(center.id);
                let percent = occupancy_percent(occupancy, center.capacity);
                CenterLoad {
                    center: center.id,
                    name: center.name,
                    status: center.status,
                    occupancy: occupancy as u32,
                    capacity: center.capacity,
                    percent,
                    high_occupancy: percent > config.high_occupancy_percent,
                    near_capacity: percent >= config.near_capacity_percent,
                }
            })
            .collect()
    }

    /// Centers over the high-occupancy threshold, worst first.
    pub fn high_occupancy_centers(&self, config: &ReportConfig) -> Vec<CenterLoad> {
        let mut loads: Vec<CenterLoad> = self
            .center_loads(config)
            .into_iter()
            .filter(|load| load.high_occupancy)
            .collect();
        loads.sort_by(|a, b| b.percent.cmp(&a.percent).then(a.center.cmp(&b.center)));
        loads
    }

    pub fn dashboard(&self, today: NaiveDate, config: &ReportConfig) -> DashboardSummary {
        let mut evacuees_total = 0u32;
        let mut evacuees_present = 0u32;
        for (_, (_, status)) in self.world.query::<(&EvacueeId, &EvacueeStatus)>().iter() {
            evacuees_total += 1;
            if *status == EvacueeStatus::Present {
                evacuees_present += 1;
            }
        }

        let active_centers = self
            .world
            .query::<(&CenterId, &CenterStatus)>()
            .iter()
            .filter(|(_, (_, status))| **status == CenterStatus::Active)
            .count() as u32;

        let donations_pending = self
            .world
            .query::<(&DonationId, &DonationStatus)>()
            .iter()
            .filter(|(_, (_, status))| **status == DonationStatus::Pending)
            .count() as u32;

        let inventory_available = self
            .world
            .query::<(&InventoryId, &InventoryStatus)>()
            .iter()
            .filter(|(_, (_, status))| **status == InventoryStatus::Available)
            .count() as u32;

        let active_users = self
            .world
            .query::<(&UserId, &UserProfile)>()
            .iter()
            .filter(|(_, (_, profile))| profile.active)
            .count() as u32;

        let high_occupancy_centers = self
            .center_loads(config)
            .iter()
            .filter(|load| load.high_occupancy)
            .count() as u32;

        DashboardSummary {
            centers: self.center_count() as u32,
            active_centers,
            high_occupancy_centers,
            evacuees_total,
            evacuees_present,
            families: self.family_count() as u32,
            donations_pending,
            inventory_available,
            inventory_expiring_soon: self.expiring_inventory(today, config).len() as u32,
            active_users,
        }
    }

    pub fn evacuee_breakdown(&self, today: NaiveDate) -> EvacueeBreakdown {
        let mut breakdown = EvacueeBreakdown {
            present: 0,
            relocated: 0,
            missing: 0,
            deceased: 0,
            male: 0,
            female: 0,
            other: 0,
            age_groups: AgeGroups::default(),
        };

        for (entity, _) in self.world.query::<&EvacueeId>().iter() {
            let evacuee = self.evacuee_record(entity);
            match evacuee.status {
                EvacueeStatus::Present => breakdown.present += 1,
                EvacueeStatus::Relocated => breakdown.relocated += 1,
                EvacueeStatus::Missing => breakdown.missing += 1,
                EvacueeStatus::Deceased => breakdown.deceased += 1,
            }
            match evacuee.gender {
                Gender::Male => breakdown.male += 1,
                Gender::Female => breakdown.female += 1,
                Gender::Other => breakdown.other += 1,
            }
            breakdown.age_groups.tally(evacuee.age(today));
        }

        breakdown
    }

    pub fn donation_breakdown(&self) -> DonationBreakdown {
        let mut breakdown = DonationBreakdown {
            food: 0,
            non_food: 0,
            pending: 0,
            received: 0,
            distributed: 0,
        };

        for (_, (_, commodity, status)) in self
            .world
            .query::<(&DonationId, &Commodity, &DonationStatus)>()
            .iter()
        {
            match commodity.kind {
                CommodityKind::Food => breakdown.food += 1,
                CommodityKind::NonFood => breakdown.non_food += 1,
            }
            match status {
                DonationStatus::Pending => breakdown.pending += 1,
                DonationStatus::Received => breakdown.received += 1,
                DonationStatus::Distributed => breakdown.distributed += 1,
            }
        }

        breakdown
    }

    /// Available food due to expire within the configured window, soonest
    /// first.
    pub fn expiring_inventory(&self, today: NaiveDate, config: &ReportConfig) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self
            .inventory_items(&InventoryFilter::default())
            .into_iter()
            .filter(|item| {
                !item.status.is_terminal()
                    && item
                        .commodity
                        .expires_within(today, config.expiring_window_days)
            })
            .collect();
        items.sort_by_key(|item| (item.commodity.expiry_date, item.id));
        items
    }

    /// Undistributed food donations due to expire within the configured
    /// window, soonest first.
    pub fn expiring_donations(&self, today: NaiveDate, config: &ReportConfig) -> Vec<Donation> {
        let mut donations: Vec<Donation> = self
            .donations(&DonationFilter::default())
            .into_iter()
            .filter(|donation| {
                !donation.status.is_terminal()
                    && donation
                        .commodity
                        .expires_within(today, config.expiring_window_days)
            })
            .collect();
        donations.sort_by_key(|donation| (donation.commodity.expiry_date, donation.id));
        donations
    }

    /// Available stock already past its expiry date: the write-off
    /// worklist for `expire_inventory_item`.
    pub fn expired_inventory(&self, today: NaiveDate) -> Vec<InventoryItem> {
        self.inventory_items(&InventoryFilter {
            status: Some(InventoryStatus::Available),
            ..Default::default()
        })
        .into_iter()
        .filter(|item| item.is_expired(today))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NewCenter, NewDonation, NewEvacuee, NewInventoryItem, NewUser};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add_center(reg: &mut Registry, capacity: u32) -> CenterId {
        reg.insert_center(NewCenter {
            name: "Rizal Gym".to_string(),
            address: "Mabini St".to_string(),
            capacity,
            status: CenterStatus::Active,
            contact_person: None,
            contact_number: None,
        })
        .unwrap()
        .id
    }

    fn add_evacuee(reg: &mut Registry, center: CenterId, dob: Option<NaiveDate>) -> EvacueeId {
        reg.insert_evacuee(NewEvacuee {
            name: PersonName::new("Jose", "Cruz"),
            date_of_birth: dob,
            gender: Gender::Male,
            status: EvacueeStatus::Present,
            special_needs: None,
            family: None,
            center,
        })
        .unwrap()
        .id
    }

    fn food_expiring(expiry: NaiveDate) -> Commodity {
        Commodity {
            kind: CommodityKind::Food,
            description: "Rice".to_string(),
            quantity: 5,
            unit: "sacks".to_string(),
            expiry_date: Some(expiry),
        }
    }

    #[test]
    fn test_occupancy_percent_rounding_and_caps() {
        assert_eq!(occupancy_percent(0, 100), 0);
        assert_eq!(occupancy_percent(1, 3), 33);
        assert_eq!(occupancy_percent(2, 3), 67);
        assert_eq!(occupancy_percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(occupancy_percent(100, 100), 100);
        // Over capacity stays pinned at 100
        assert_eq!(occupancy_percent(125, 100), 100);
        // Unsurveyed capacity never divides by zero
        assert_eq!(occupancy_percent(0, 0), 0);
        assert_eq!(occupancy_percent(12, 0), 0);
    }

    #[test]
    fn test_center_load_thresholds() {
        let config = ReportConfig::default();
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 10);
        for _ in 0..8 {
            add_evacuee(&mut reg, center, None);
        }

        // 80% is not yet "high": the threshold is strict
        let load = &reg.center_loads(&config)[0];
        assert_eq!(load.percent, 80);
        assert!(!load.high_occupancy);
        assert!(!load.near_capacity);

        add_evacuee(&mut reg, center, None);
        let load = &reg.center_loads(&config)[0];
        assert_eq!(load.percent, 90);
        assert!(load.high_occupancy);
        assert!(load.near_capacity);

        assert_eq!(reg.high_occupancy_centers(&config).len(), 1);
    }

    #[test]
    fn test_only_present_evacuees_take_up_space() {
        let config = ReportConfig::default();
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 4);
        let a = add_evacuee(&mut reg, center, None);
        add_evacuee(&mut reg, center, None);

        reg.update_evacuee(
            a,
            crate::registry::EvacueePatch {
                status: Some(EvacueeStatus::Relocated),
                ..Default::default()
            },
        )
        .unwrap();

        let load = &reg.center_loads(&config)[0];
        assert_eq!(load.occupancy, 1);
        assert_eq!(load.percent, 25);
    }

    #[test]
    fn test_dashboard_counts() {
        let today = date(2026, 8, 23);
        let config = ReportConfig::default();
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 100);
        add_evacuee(&mut reg, center, None);
        add_evacuee(&mut reg, center, None);
        reg.insert_user(NewUser {
            username: "admin".to_string(),
            email: "admin@relief.local".to_string(),
            name: PersonName::new("System", "Administrator"),
            phone: None,
            role: Role::Admin,
            active: true,
        })
        .unwrap();

        let donation = reg
            .insert_donation(NewDonation {
                commodity: food_expiring(date(2026, 8, 25)),
                donor: None,
                center,
            })
            .unwrap()
            .id;

        let summary = reg.dashboard(today, &config);
        assert_eq!(summary.centers, 1);
        assert_eq!(summary.active_centers, 1);
        assert_eq!(summary.evacuees_total, 2);
        assert_eq!(summary.evacuees_present, 2);
        assert_eq!(summary.donations_pending, 1);
        assert_eq!(summary.inventory_available, 0);
        assert_eq!(summary.inventory_expiring_soon, 0);
        assert_eq!(summary.active_users, 1);

        // Receiving the donation moves the counts to stock
        reg.receive_donation(donation).unwrap();
        let summary = reg.dashboard(today, &config);
        assert_eq!(summary.donations_pending, 0);
        assert_eq!(summary.inventory_available, 1);
        assert_eq!(summary.inventory_expiring_soon, 1);
    }

    #[test]
    fn test_age_group_boundaries() {
        let today = date(2026, 8, 23);
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 100);

        // Ages 12, 13, 60 and 61 as of `today`, plus one unknown
        add_evacuee(&mut reg, center, Some(date(2014, 1, 1)));
        add_evacuee(&mut reg, center, Some(date(2013, 8, 1)));
        add_evacuee(&mut reg, center, Some(date(1966, 1, 1)));
        add_evacuee(&mut reg, center, Some(date(1965, 8, 1)));
        add_evacuee(&mut reg, center, None);

        let breakdown = reg.evacuee_breakdown(today);
        assert_eq!(breakdown.age_groups.children, 1);
        assert_eq!(breakdown.age_groups.teens, 1);
        assert_eq!(breakdown.age_groups.middle_aged, 1);
        assert_eq!(breakdown.age_groups.seniors, 1);
        assert_eq!(breakdown.age_groups.unknown, 1);
        assert_eq!(breakdown.present, 5);
        assert_eq!(breakdown.male, 5);
    }

    #[test]
    fn test_donation_breakdown() {
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 100);
        let food = reg
            .insert_donation(NewDonation {
                commodity: food_expiring(date(2026, 12, 1)),
                donor: None,
                center,
            })
            .unwrap()
            .id;
        reg.insert_donation(NewDonation {
            commodity: Commodity {
                kind: CommodityKind::NonFood,
                description: "Blankets".to_string(),
                quantity: 30,
                unit: "pieces".to_string(),
                expiry_date: None,
            },
            donor: None,
            center,
        })
        .unwrap();
        reg.receive_donation(food).unwrap();

        let breakdown = reg.donation_breakdown();
        assert_eq!(breakdown.food, 1);
        assert_eq!(breakdown.non_food, 1);
        assert_eq!(breakdown.pending, 1);
        assert_eq!(breakdown.received, 1);
        assert_eq!(breakdown.distributed, 0);
    }

    #[test]
    fn test_expiring_inventory_window_and_order() {
        let today = date(2026, 8, 23);
        let config = ReportConfig::default();
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 100);

        let add_item = |reg: &mut Registry, expiry: NaiveDate| {
            reg.insert_inventory_item(NewInventoryItem {
                commodity: food_expiring(expiry),
                donation: None,
                center,
            })
            .unwrap()
            .id
        };

        let in_window_late = add_item(&mut reg, date(2026, 8, 30));
        let in_window_soon = add_item(&mut reg, date(2026, 8, 24));
        let beyond_window = add_item(&mut reg, date(2026, 9, 15));
        let already_past = add_item(&mut reg, date(2026, 8, 20));

        let expiring = reg.expiring_inventory(today, &config);
        let ids: Vec<InventoryId> = expiring.iter().map(|i| i.id).collect();
        // Soonest expiry first; expired and far-out stock excluded
        assert_eq!(ids, vec![in_window_soon, in_window_late]);
        assert!(!ids.contains(&beyond_window));

        // The stale item shows up on the write-off list instead
        let backlog = reg.expired_inventory(today);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].id, already_past);

        // Terminal stock drops off the expiring list
        reg.distribute_inventory_item(in_window_soon).unwrap();
        let expiring = reg.expiring_inventory(today, &config);
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, in_window_late);
    }

    #[test]
    fn test_expiring_donations_skip_terminal() {
        let today = date(2026, 8, 23);
        let config = ReportConfig::default();
        let mut reg = Registry::new();
        let center = add_center(&mut reg, 100);

        let pending = reg
            .insert_donation(NewDonation {
                commodity: food_expiring(date(2026, 8, 26)),
                donor: None,
                center,
            })
            .unwrap()
            .id;
        let distributed = reg
            .insert_donation(NewDonation {
                commodity: food_expiring(date(2026, 8, 25)),
                donor: None,
                center,
            })
            .unwrap()
            .id;
        reg.receive_donation(distributed).unwrap();
        let item = reg
            .inventory_items(&InventoryFilter {
                donation: Some(distributed),
                ..Default::default()
            })[0]
            .id;
        reg.distribute_inventory_item(item).unwrap();

        let expiring = reg.expiring_donations(today, &config);
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, pending);
    }
}
