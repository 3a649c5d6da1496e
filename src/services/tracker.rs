use std::collections::BTreeSet;

use crate::models::{ConstraintSet, ElectricInterest, Intent, Preference, Usage};

/// Fold a classified intent into the constraint set. Pure: returns the new
/// set, leaving the input untouched. Only ExpressPreference changes
/// anything; every other intent is a no-op. Scalar fields overwrite, set
/// fields union, and a correction replaces the touched set fields instead
/// of growing them. Applying the same intent twice is the same as once.
pub fn apply(constraints: &ConstraintSet, intent: &Intent) -> ConstraintSet {
    let (prefs, correction) = match intent {
        Intent::ExpressPreference { prefs, correction } => (prefs, *correction),
        _ => return constraints.clone(),
    };

    let mut next = constraints.clone();

    if correction {
        // Replace only the fields this utterance touches; untouched
        // fields keep their accumulated values.
        if prefs.iter().any(|p| matches!(p, Preference::BodyType(_))) {
            next.body_types = BTreeSet::new();
        }
        if prefs.iter().any(|p| matches!(p, Preference::FuelType(_))) {
            next.fuel_types = BTreeSet::new();
        }
        if prefs.iter().any(|p| matches!(p, Preference::Brand(_))) {
            next.brands = BTreeSet::new();
        }
    }

    for pref in prefs {
        match pref {
            Preference::Usage(usage) => {
                if *usage != Usage::Unset {
                    next.usage = *usage;
                }
            }
            Preference::BodyType(body) => {
                next.body_types.insert(*body);
            }
            Preference::FuelType(fuel) => {
                next.fuel_types.insert(*fuel);
            }
            Preference::Brand(brand) => {
                next.brands.insert(brand.clone());
            }
            Preference::MaxMonthlyBudget(budget) => {
                next.max_monthly_budget = Some(*budget);
            }
            Preference::ElectricInterest(interested) => {
                next.electric_interest = if *interested {
                    ElectricInterest::Yes
                } else {
                    ElectricInterest::No
                };
            }
        }
    }

    next
}
