//! Decoding of raw dogma attribute lists into typed modules.
//!
//! Mutated items come back from the game API as a flat list of
//! `(attribute_id, value)` pairs. Each category reads the attributes it needs
//! and fails if a mandatory one is absent.

use fit_core::{
    AfterburnerStats, CapBatteryStats, Category, DpsStats, MicrowarpdriveStats, Module,
    ModuleKind, NeutralizerStats, NosferatuStats, SmartbombStats,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dogma attribute ids.
pub mod attr {
    pub const CPU: u32 = 50;
    pub const POWERGRID: u32 = 30;
    pub const DAMAGE_MULTIPLIER: u32 = 64;
    pub const RATE_OF_FIRE_MULTIPLIER: u32 = 204;
    pub const ACTIVATION_COST: u32 = 6;
    pub const DURATION: u32 = 73;
    pub const OPTIMAL_RANGE: u32 = 54;
    pub const SMARTBOMB_RANGE: u32 = 99;
    pub const EM_DAMAGE: u32 = 114;
    pub const EXPLOSIVE_DAMAGE: u32 = 116;
    pub const KINETIC_DAMAGE: u32 = 117;
    pub const THERMAL_DAMAGE: u32 = 118;
    pub const NEUTRALIZER_AMOUNT: u32 = 97;
    pub const NOSFERATU_AMOUNT: u32 = 90;
    pub const CAPACITOR_BONUS: u32 = 67;
    pub const DRAIN_RESISTANCE_BONUS: u32 = 2267;
    pub const VELOCITY_BONUS: u32 = 20;
    pub const SIGNATURE_RADIUS_BONUS: u32 = 554;

    pub const DAMAGE_TYPES: [u32; 4] = [EM_DAMAGE, EXPLOSIVE_DAMAGE, KINETIC_DAMAGE, THERMAL_DAMAGE];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DogmaAttribute {
    pub attribute_id: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DogmaItem {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub type_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "dogma_attributes")]
    pub dogma_attributes: Vec<DogmaAttribute>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{category} item {item} is missing dogma attribute {attribute}")]
    MissingAttribute {
        category: Category,
        item: String,
        attribute: u32,
    },
    #[error("{category} item {item} has non-finite dogma attribute {attribute}: {value}")]
    NonFinite {
        category: Category,
        item: String,
        attribute: u32,
        value: f64,
    },
}

struct Lookup<'a> {
    category: Category,
    item: &'a DogmaItem,
}

impl Lookup<'_> {
    fn item_label(&self) -> String {
        self.item
            .item_id
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    fn get(&self, attribute: u32) -> Result<Option<f64>, DecodeError> {
        let Some(found) = self
            .item
            .dogma_attributes
            .iter()
            .find(|a| a.attribute_id == attribute)
        else {
            return Ok(None);
        };
        if !found.value.is_finite() {
            return Err(DecodeError::NonFinite {
                category: self.category,
                item: self.item_label(),
                attribute,
                value: found.value,
            });
        }
        Ok(Some(found.value))
    }

    fn require(&self, attribute: u32) -> Result<f64, DecodeError> {
        self.get(attribute)?
            .ok_or_else(|| DecodeError::MissingAttribute {
                category: self.category,
                item: self.item_label(),
                attribute,
            })
    }

    /// Sum of every damage type present; at least one must be.
    fn damage(&self) -> Result<f64, DecodeError> {
        let mut total = None;
        for attribute in attr::DAMAGE_TYPES {
            if let Some(value) = self.get(attribute)? {
                total = Some(total.unwrap_or(0.0) + value);
            }
        }
        match total {
            Some(total) => Ok(total),
            None => self.require(attr::EM_DAMAGE),
        }
    }
}

fn decode_kind(lookup: &Lookup<'_>) -> Result<ModuleKind, DecodeError> {
    let kind = match lookup.category {
        Category::Dps => ModuleKind::Dps(DpsStats {
            dmg_multi: lookup.require(attr::DAMAGE_MULTIPLIER)?,
            // The multiplier shortens the cycle; 0.9 is a 10 % bonus.
            rof_bonus: (1.0 - lookup.require(attr::RATE_OF_FIRE_MULTIPLIER)?) * 100.0,
        }),
        Category::Smartbomb => ModuleKind::Smartbomb(SmartbombStats {
            activation_cost: lookup.require(attr::ACTIVATION_COST)?,
            activation_time: lookup.require(attr::DURATION)?,
            range: lookup.require(attr::SMARTBOMB_RANGE)?,
            damage: lookup.damage()?,
        }),
        Category::Neutralizer => ModuleKind::Neutralizer(NeutralizerStats {
            activation_cost: lookup.require(attr::ACTIVATION_COST)?,
            activation_time: lookup.require(attr::DURATION)?,
            range: lookup.require(attr::OPTIMAL_RANGE)?,
            neut_amount: lookup.require(attr::NEUTRALIZER_AMOUNT)?,
        }),
        Category::Nosferatu => ModuleKind::Nosferatu(NosferatuStats {
            activation_time: lookup.require(attr::DURATION)?,
            range: lookup.require(attr::OPTIMAL_RANGE)?,
            drain_amount: lookup.require(attr::NOSFERATU_AMOUNT)?,
        }),
        Category::CapBattery => ModuleKind::CapBattery(CapBatteryStats {
            capacitor_bonus: lookup.require(attr::CAPACITOR_BONUS)?,
            drain_resistance_bonus: lookup.require(attr::DRAIN_RESISTANCE_BONUS)?,
        }),
        Category::Afterburner => ModuleKind::Afterburner(AfterburnerStats {
            activation_cost: lookup.require(attr::ACTIVATION_COST)?,
            activation_time: lookup.require(attr::DURATION)?,
            velocity_bonus: lookup.require(attr::VELOCITY_BONUS)?,
        }),
        Category::Microwarpdrive => ModuleKind::Microwarpdrive(MicrowarpdriveStats {
            activation_cost: lookup.require(attr::ACTIVATION_COST)?,
            activation_time: lookup.require(attr::DURATION)?,
            velocity_bonus: lookup.require(attr::VELOCITY_BONUS)?,
            signature_radius_modifier: lookup.require(attr::SIGNATURE_RADIUS_BONUS)?,
        }),
    };
    Ok(kind)
}

/// Decodes one item as a module of `category`. The index is left at 0 for a
/// `CatalogBuilder` to assign.
pub fn decode(category: Category, item: &DogmaItem) -> Result<Module, DecodeError> {
    let lookup = Lookup { category, item };
    Ok(Module {
        index: 0,
        cpu: lookup.require(attr::CPU)?,
        powergrid: lookup.require(attr::POWERGRID)?,
        item_id: item.item_id.clone(),
        type_id: item.type_id,
        kind: decode_kind(&lookup)?,
    })
}
