use crate::inventory::Inventory;
use crate::models::{ConstraintSet, ElectricInterest, Vehicle};

/// How many vehicles a presentation directive carries.
const MAX_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Brand,
    Body,
    Fuel,
    Budget,
}

/// Relaxation ladder: when the strict filter yields nothing, drop
/// constraints in this order until something matches. Tunable policy, not
/// a business law.
const RELAXATION_ORDER: [Filter; 4] = [Filter::Brand, Filter::Body, Filter::Fuel, Filter::Budget];

/// Query the inventory against the accumulated constraints. Deterministic,
/// and never empty for a non-empty inventory: the ladder falls back to the
/// full catalog before giving up, so the conversation always has something
/// to present.
pub fn recommend(constraints: &ConstraintSet, inventory: &Inventory) -> Vec<Vehicle> {
    let mut active = [
        (Filter::Brand, !constraints.brands.is_empty()),
        (Filter::Body, !constraints.body_types.is_empty()),
        (Filter::Fuel, !constraints.fuel_types.is_empty()),
        (Filter::Budget, constraints.max_monthly_budget.is_some()),
    ];

    let mut candidates = filter_inventory(constraints, inventory, &active);

    for relax in RELAXATION_ORDER {
        if !candidates.is_empty() {
            break;
        }
        for slot in active.iter_mut() {
            if slot.0 == relax {
                slot.1 = false;
            }
        }
        candidates = filter_inventory(constraints, inventory, &active);
    }

    rank(constraints, &mut candidates);
    candidates.truncate(MAX_RESULTS);
    candidates
}

fn filter_inventory(
    constraints: &ConstraintSet,
    inventory: &Inventory,
    active: &[(Filter, bool)],
) -> Vec<Vehicle> {
    let enabled = |filter: Filter| active.iter().any(|(f, on)| *f == filter && *on);

    inventory
        .vehicles
        .iter()
        .filter(|v| !enabled(Filter::Brand) || brand_matches(constraints, v))
        .filter(|v| !enabled(Filter::Body) || constraints.body_types.contains(&v.body_type))
        .filter(|v| !enabled(Filter::Fuel) || constraints.fuel_types.contains(&v.fuel_type))
        .filter(|v| {
            !enabled(Filter::Budget)
                || constraints
                    .max_monthly_budget
                    .map(|b| v.monthly_price <= b)
                    .unwrap_or(true)
        })
        .cloned()
        .collect()
}

fn brand_matches(constraints: &ConstraintSet, vehicle: &Vehicle) -> bool {
    constraints
        .brands
        .iter()
        .any(|b| b.eq_ignore_ascii_case(&vehicle.make))
}

/// Number of originally requested constraints a vehicle still satisfies,
/// counted per requested family. Drives the post-relaxation ordering.
fn satisfied_count(constraints: &ConstraintSet, vehicle: &Vehicle) -> u32 {
    let mut count = 0;
    if !constraints.brands.is_empty() && brand_matches(constraints, vehicle) {
        count += 1;
    }
    if !constraints.body_types.is_empty() && constraints.body_types.contains(&vehicle.body_type) {
        count += 1;
    }
    if !constraints.fuel_types.is_empty() && constraints.fuel_types.contains(&vehicle.fuel_type) {
        count += 1;
    }
    if let Some(budget) = constraints.max_monthly_budget {
        if vehicle.monthly_price <= budget {
            count += 1;
        }
    }
    count
}

fn electric_interest_match(constraints: &ConstraintSet, vehicle: &Vehicle) -> bool {
    match constraints.electric_interest {
        ElectricInterest::Yes => vehicle.is_electrified(),
        ElectricInterest::No => !vehicle.is_electrified(),
        ElectricInterest::Unasked => false,
    }
}

fn rank(constraints: &ConstraintSet, candidates: &mut [Vehicle]) {
    // Stable sort over fixed catalog order keeps results deterministic.
    candidates.sort_by(|a, b| {
        satisfied_count(constraints, b)
            .cmp(&satisfied_count(constraints, a))
            .then_with(|| {
                electric_interest_match(constraints, b)
                    .cmp(&electric_interest_match(constraints, a))
            })
            .then_with(|| a.monthly_price.cmp(&b.monthly_price))
    });
}
