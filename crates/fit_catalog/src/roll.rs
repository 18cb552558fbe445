//! Seeded random pools for demos and load tests.

use fit_core::{Module, ModuleKind};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A base module and how far each rolled attribute may stray from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollTemplate {
    pub name: String,
    /// Relative spread in `[0, 1)`: 0.1 rolls within ±10 %.
    pub spread: f64,
    pub module: Module,
}

pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn roll(value: f64, spread: f64, rng: &mut impl Rng) -> f64 {
    if spread > 0.0 {
        value * rng.gen_range(1.0 - spread..=1.0 + spread)
    } else {
        value
    }
}

fn roll_kind(kind: &ModuleKind, spread: f64, rng: &mut impl Rng) -> ModuleKind {
    let mut kind = kind.clone();
    let mut r = |value: &mut f64| *value = roll(*value, spread, rng);
    match &mut kind {
        ModuleKind::Dps(s) => {
            r(&mut s.dmg_multi);
            r(&mut s.rof_bonus);
        }
        ModuleKind::Smartbomb(s) => {
            r(&mut s.activation_cost);
            r(&mut s.activation_time);
            r(&mut s.range);
            r(&mut s.damage);
        }
        ModuleKind::Neutralizer(s) => {
            r(&mut s.activation_cost);
            r(&mut s.activation_time);
            r(&mut s.range);
            r(&mut s.neut_amount);
        }
        ModuleKind::Nosferatu(s) => {
            r(&mut s.activation_time);
            r(&mut s.range);
            r(&mut s.drain_amount);
        }
        ModuleKind::CapBattery(s) => {
            r(&mut s.capacitor_bonus);
            r(&mut s.drain_resistance_bonus);
        }
        ModuleKind::Afterburner(s) => {
            r(&mut s.activation_cost);
            r(&mut s.activation_time);
            r(&mut s.velocity_bonus);
        }
        ModuleKind::Microwarpdrive(s) => {
            r(&mut s.activation_cost);
            r(&mut s.activation_time);
            r(&mut s.velocity_bonus);
            r(&mut s.signature_radius_modifier);
        }
    }
    kind
}

/// Rolls `count` modules from `template`, indexed 1..=count.
pub fn roll_pool(template: &RollTemplate, count: u32, rng: &mut impl Rng) -> Vec<Module> {
    (1..=count)
        .map(|index| Module {
            index,
            cpu: roll(template.module.cpu, template.spread, rng),
            powergrid: roll(template.module.powergrid, template.spread, rng),
            item_id: None,
            type_id: template.module.type_id,
            kind: roll_kind(&template.module.kind, template.spread, rng),
        })
        .collect()
}
