//! Relief Registry Demo
//!
//! Standalone walkthrough of the registry: seeds demo data, runs a
//! donation through its lifecycle and prints the dashboard.

use chrono::{Duration, Utc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use relief_registry::filter::InventoryFilter;
use relief_registry::registry::NewDonation;
use relief_registry::{seed, Commodity, CommodityKind, ReportConfig};

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Relief registry demo starting...");

    let today = Utc::now().date_naive();
    let config = ReportConfig::default();
    let mut reg = seed::demo_registry(42, today)?;

    info!(
        centers = reg.center_count(),
        evacuees = reg.evacuee_count(),
        families = reg.family_count(),
        "registry seeded"
    );

    // Walk one donation through pledge, receipt and distribution
    let center = reg.center(relief_registry::CenterId(1)).expect("seeded center");
    let donation = reg.insert_donation(NewDonation {
        commodity: Commodity {
            kind: CommodityKind::Food,
            description: "Rice".to_string(),
            quantity: 25,
            unit: "sacks".to_string(),
            expiry_date: Some(today + Duration::days(30)),
        },
        donor: None,
        center: center.id,
    })?;
    info!(donation = %donation.id, center = %center.name, "donation pledged");

    let received = reg.receive_donation(donation.id)?;
    let item = reg
        .inventory_items(&InventoryFilter {
            donation: Some(donation.id),
            ..Default::default()
        })
        .into_iter()
        .next()
        .expect("receipt derives stock");
    info!(
        donation = %received.id,
        item = %item.id,
        status = ?received.status,
        "donation received, stock on hand"
    );

    let distributed = reg.distribute_inventory_item(item.id)?;
    info!(
        item = %distributed.id,
        donation_status = ?reg.donation(donation.id).expect("donation exists").status,
        "stock distributed"
    );

    let summary = reg.dashboard(today, &config);
    info!(
        active_centers = summary.active_centers,
        evacuees_present = summary.evacuees_present,
        donations_pending = summary.donations_pending,
        inventory_available = summary.inventory_available,
        expiring_soon = summary.inventory_expiring_soon,
        "dashboard"
    );

    for load in reg.center_loads(&config) {
        info!(
            center = %load.name,
            occupancy = load.occupancy,
            capacity = load.capacity,
            percent = load.percent,
            high_occupancy = load.high_occupancy,
            "center load"
        );
    }

    for item in reg.expiring_inventory(today, &config) {
        info!(
            item = %item.id,
            description = %item.commodity.description,
            expiry = ?item.commodity.expiry_date,
            "stock expiring soon"
        );
    }

    Ok(())
}
