use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Hatchback,
    Saloon,
    Estate,
    Suv,
    Van,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Hatchback => "hatchback",
            BodyType::Saloon => "saloon",
            BodyType::Estate => "estate",
            BodyType::Suv => "suv",
            BodyType::Van => "van",
        }
    }
}

/// One catalog entry. Immutable after inventory load; identity is
/// (make, model, variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub variant: String,
    pub body_type: BodyType,
    pub fuel_type: FuelType,
    /// Monthly lease price in whole pounds.
    pub monthly_price: i64,
    pub initial_payment: i64,
    pub contract_months: u32,
    pub annual_mileage: u32,
    pub features: Vec<String>,
    /// WLTP range; electric and hybrid entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_miles: Option<u32>,
    /// Load volume for vans, boot capacity otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_volume_m3: Option<f64>,
}

impl Vehicle {
    pub fn identity(&self) -> String {
        format!("{} {} {}", self.make, self.model, self.variant)
    }

    pub fn is_electrified(&self) -> bool {
        matches!(self.fuel_type, FuelType::Electric | FuelType::Hybrid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOnService {
    pub name: String,
    /// "from £N/month" floor, in whole pounds.
    pub monthly_price_from: i64,
}
