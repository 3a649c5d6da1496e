use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::vehicle::{BodyType, FuelType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    Personal,
    Business,
    #[default]
    Unset,
}

impl Usage {
    pub fn is_set(&self) -> bool {
        !matches!(self, Usage::Unset)
    }
}

/// Tri-state: "customer said no" is different from "we never asked".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElectricInterest {
    Yes,
    No,
    #[default]
    Unasked,
}

/// Accumulated customer preferences for one call. Set-valued fields union
/// across turns; scalar fields overwrite. BTreeSet keeps iteration order
/// stable so recommendations stay deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConstraintSet {
    pub usage: Usage,
    pub body_types: BTreeSet<BodyType>,
    pub fuel_types: BTreeSet<FuelType>,
    pub brands: BTreeSet<String>,
    pub max_monthly_budget: Option<i64>,
    pub electric_interest: ElectricInterest,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum discovery coverage before moving to presentation:
    /// usage plus at least one of body type, fuel type, or brand.
    pub fn covers_discovery_minimum(&self) -> bool {
        self.usage.is_set()
            && (!self.body_types.is_empty()
                || !self.fuel_types.is_empty()
                || !self.brands.is_empty())
    }

    /// Discovery fields still missing, for the probe directive.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.usage.is_set() {
            missing.push("usage");
        }
        if self.body_types.is_empty() && self.fuel_types.is_empty() && self.brands.is_empty() {
            missing.push("vehicle_preference");
        }
        missing
    }
}

impl BodyType {
    fn rank(&self) -> u8 {
        match self {
            BodyType::Hatchback => 0,
            BodyType::Saloon => 1,
            BodyType::Estate => 2,
            BodyType::Suv => 3,
            BodyType::Van => 4,
        }
    }
}

impl Ord for BodyType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for BodyType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl FuelType {
    fn rank(&self) -> u8 {
        match self {
            FuelType::Petrol => 0,
            FuelType::Diesel => 1,
            FuelType::Hybrid => 2,
            FuelType::Electric => 3,
        }
    }
}

impl Ord for FuelType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for FuelType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
