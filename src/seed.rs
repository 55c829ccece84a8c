//! Seed data
//!
//! Bootstraps the standing admin account and builds small deterministic
//! demo registries for development, demos and benchmarks. Everything goes
//! through the public registry operations, so seeded data always satisfies
//! the same invariants as live data.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::Error;
use crate::filter::InventoryFilter;
use crate::model::*;
use crate::registry::{
    NewCenter, NewDonation, NewEvacuee, NewFamily, NewInventoryItem, NewUser, Registry,
};

/// Username the bootstrap admin account is created under.
pub const ADMIN_USERNAME: &str = "admin";

const MALE_FIRST_NAMES: &[&str] = &[
    "Jose", "Juan", "Pedro", "Andres", "Marco", "Ramon", "Carlo", "Emilio",
    "Nico", "Paolo", "Miguel", "Antonio", "Danilo", "Ernesto", "Felipe", "Gabriel",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Maria", "Ana", "Luz", "Teresa", "Carmen", "Rosa", "Elena", "Josefa",
    "Liza", "Marites", "Imelda", "Nena", "Gloria", "Corazon", "Divina", "Perla",
];

const LAST_NAMES: &[&str] = &[
    "Cruz", "Reyes", "Santos", "Garcia", "Mendoza", "Torres", "Flores", "Ramos",
    "Gonzales", "Bautista", "Villanueva", "Fernandez", "Aquino", "Navarro", "Salazar", "Domingo",
];

const CENTER_NAMES: &[&str] = &[
    "Rizal Memorial Gym",
    "San Isidro Elementary School",
    "Poblacion Covered Court",
    "Bagong Silang Barangay Hall",
];

const FOOD_GOODS: &[(&str, &str)] = &[
    ("Rice", "sacks"),
    ("Canned sardines", "cans"),
    ("Instant noodles", "boxes"),
    ("Drinking water", "liters"),
];

const NON_FOOD_GOODS: &[(&str, &str)] = &[
    ("Blankets", "pieces"),
    ("Hygiene kits", "kits"),
    ("Sleeping mats", "pieces"),
    ("Used clothing", "bundles"),
];

fn pick<'a>(rng: &mut StdRng, pool: &'a [&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

/// Create the standing admin account if no user holds [`ADMIN_USERNAME`]
/// yet. Safe to call on every startup.
pub fn ensure_admin(reg: &mut Registry) -> Result<User, Error> {
    if let Some(user) = reg.user_by_username(ADMIN_USERNAME) {
        return Ok(user);
    }
    let user = reg.insert_user(NewUser {
        username: ADMIN_USERNAME.to_string(),
        email: "admin@relief.local".to_string(),
        name: PersonName::new("System", "Administrator"),
        phone: None,
        role: Role::Admin,
        active: true,
    })?;
    info!(user = %user.id, "bootstrap admin account created");
    Ok(user)
}

/// Build a small, fully populated registry. The same seed and reference
/// date always produce the same entities, which keeps demos and benchmark
/// runs comparable.
pub fn demo_registry(seed: u64, today: NaiveDate) -> Result<Registry, Error> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut reg = Registry::new();

    ensure_admin(&mut reg)?;
    reg.insert_user(NewUser {
        username: "vol_tess".to_string(),
        email: "tess@relief.local".to_string(),
        name: PersonName::new("Tess", "Navarro"),
        phone: Some("0917-555-0144".to_string()),
        role: Role::Volunteer,
        active: true,
    })?;
    let donor = reg.insert_user(NewUser {
        username: "donor_ong".to_string(),
        email: "ong.trading@relief.local".to_string(),
        name: PersonName::new("Benito", "Ong"),
        phone: None,
        role: Role::Donor,
        active: true,
    })?;

    // Three centers: a roomy one, a small one that will run hot, and one
    // already closed for intake
    let main = reg.insert_center(NewCenter {
        name: CENTER_NAMES[0].to_string(),
        address: "Mabini St, Poblacion".to_string(),
        capacity: 120,
        status: CenterStatus::Active,
        contact_person: Some("B. Santos".to_string()),
        contact_number: Some("0917-555-0100".to_string()),
    })?;
    let annex = reg.insert_center(NewCenter {
        name: CENTER_NAMES[1].to_string(),
        address: "Purok 5, San Isidro".to_string(),
        capacity: 12,
        status: CenterStatus::Active,
        contact_person: None,
        contact_number: None,
    })?;
    reg.insert_center(NewCenter {
        name: CENTER_NAMES[2].to_string(),
        address: "Gomez Ave".to_string(),
        capacity: 60,
        status: CenterStatus::Closed,
        contact_person: None,
        contact_number: None,
    })?;

    // Evacuees, weighted towards the small annex so it shows up on the
    // high-occupancy report
    let mut evacuees: Vec<EvacueeId> = Vec::new();
    for n in 0..18 {
        let (gender, first) = match rng.gen_range(0..20) {
            0..=8 => (Gender::Male, pick(&mut rng, MALE_FIRST_NAMES)),
            9..=18 => (Gender::Female, pick(&mut rng, FEMALE_FIRST_NAMES)),
            _ => (Gender::Other, pick(&mut rng, FEMALE_FIRST_NAMES)),
        };
        let age_years: i64 = rng.gen_range(1..80);
        let dob = today - Duration::days(age_years * 365 + rng.gen_range(0..365));
        let status = match rng.gen_range(0..10) {
            0 => EvacueeStatus::Relocated,
            1 => EvacueeStatus::Missing,
            _ => EvacueeStatus::Present,
        };
        let special_needs = if rng.gen_range(0..6) == 0 {
            Some("Needs maintenance medication".to_string())
        } else {
            None
        };
        let center = if n < 11 { annex.id } else { main.id };
        let evacuee = reg.insert_evacuee(NewEvacuee {
            name: PersonName::new(first, pick(&mut rng, LAST_NAMES)),
            date_of_birth: Some(dob),
            gender,
            status,
            special_needs,
            family: None,
            center,
        })?;
        evacuees.push(evacuee.id);
    }

    // Group the first twelve into three families of four, head first
    for (f, group) in evacuees.chunks(4).take(3).enumerate() {
        let family = reg.insert_family(NewFamily {
            name: format!("{} family", pick(&mut rng, LAST_NAMES)),
            address: Some(format!("Purok {}", f + 1)),
            contact_number: None,
            head: Some(group[0]),
        })?;
        for &member in &group[1..] {
            reg.assign_evacuee_family(member, Some(family.id))?;
        }
    }

    // Donations in every lifecycle stage
    let (desc, unit) = FOOD_GOODS[rng.gen_range(0..FOOD_GOODS.len())];
    let pending_food = NewDonation {
        commodity: Commodity {
            kind: CommodityKind::Food,
            description: desc.to_string(),
            quantity: rng.gen_range(10..200),
            unit: unit.to_string(),
            // Lands inside the expiring-soon window on purpose
            expiry_date: Some(today + Duration::days(3)),
        },
        donor: Some(donor.id),
        center: main.id,
    };
    reg.insert_donation(pending_food)?;

    let (desc, unit) = NON_FOOD_GOODS[rng.gen_range(0..NON_FOOD_GOODS.len())];
    reg.insert_donation(NewDonation {
        commodity: Commodity {
            kind: CommodityKind::NonFood,
            description: desc.to_string(),
            quantity: rng.gen_range(10..80),
            unit: unit.to_string(),
            expiry_date: None,
        },
        donor: None,
        center: annex.id,
    })?;

    let received = reg.insert_donation(NewDonation {
        commodity: Commodity {
            kind: CommodityKind::Food,
            description: "Canned goods".to_string(),
            quantity: 150,
            unit: "cans".to_string(),
            expiry_date: Some(today + Duration::days(40)),
        },
        donor: Some(donor.id),
        center: main.id,
    })?;
    reg.receive_donation(received.id)?;

    let distributed = reg.insert_donation(NewDonation {
        commodity: Commodity {
            kind: CommodityKind::Food,
            description: "Bread packs".to_string(),
            quantity: 60,
            unit: "packs".to_string(),
            expiry_date: Some(today + Duration::days(2)),
        },
        donor: None,
        center: annex.id,
    })?;
    reg.receive_donation(distributed.id)?;
    if let Some(item) = reg
        .inventory_items(&InventoryFilter {
            donation: Some(distributed.id),
            ..Default::default()
        })
        .first()
    {
        reg.distribute_inventory_item(item.id)?;
    }

    // Stock that never came through a donation
    reg.insert_inventory_item(NewInventoryItem {
        commodity: Commodity {
            kind: CommodityKind::NonFood,
            description: "Tarpaulin sheets".to_string(),
            quantity: 25,
            unit: "rolls".to_string(),
            expiry_date: None,
        },
        donation: None,
        center: main.id,
    })?;

    info!(
        evacuees = reg.evacuee_count(),
        centers = reg.center_count(),
        donations = reg.donation_count(),
        "demo registry seeded"
    );
    Ok(reg)
}
