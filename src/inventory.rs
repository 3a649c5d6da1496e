use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::models::{AddOnService, Vehicle};

/// The product catalog. Loaded once at startup, validated, then shared
/// read-only across call sessions (no locking needed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub add_on_services: Vec<AddOnService>,
}

impl Inventory {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read inventory file: {}", path.display()))?;
        let inventory: Inventory = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse inventory file: {}", path.display()))?;
        inventory.validate()?;
        Ok(inventory)
    }

    /// Strict load-time validation; the process must not start with a
    /// partial or malformed catalog.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.vehicles.is_empty() {
            bail!("inventory contains no vehicles");
        }

        let mut seen = HashSet::new();
        for v in &self.vehicles {
            let id = v.identity();
            if v.make.trim().is_empty() || v.model.trim().is_empty() || v.variant.trim().is_empty()
            {
                bail!("vehicle with blank identity field: {id:?}");
            }
            if !seen.insert(id.clone()) {
                bail!("duplicate vehicle identity: {id}");
            }
            if v.monthly_price <= 0 {
                bail!("vehicle {id} has non-positive monthly price ({})", v.monthly_price);
            }
            if v.initial_payment < 0 {
                bail!("vehicle {id} has negative initial payment");
            }
            if v.contract_months == 0 {
                bail!("vehicle {id} has zero contract length");
            }
            if v.range_miles.is_some() && !v.is_electrified() {
                bail!("vehicle {id} declares a range but is not electric or hybrid");
            }
        }

        for addon in &self.add_on_services {
            if addon.name.trim().is_empty() {
                bail!("add-on service with blank name");
            }
            if addon.monthly_price_from < 0 {
                bail!("add-on service {} has negative price floor", addon.name);
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Distinct makes in catalog order; the classifier's brand vocabulary.
    pub fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = Vec::new();
        for v in &self.vehicles {
            if !brands.iter().any(|b| b.eq_ignore_ascii_case(&v.make)) {
                brands.push(v.make.clone());
            }
        }
        brands
    }
}
