//! Shared test fixtures for `fit_core` and downstream crates.
//!
//! Module builders take the common fields positionally and the category stats
//! in wire units (ms, GJ, percent).

use crate::{
    AfterburnerStats, CapBatteryStats, Category, DpsStats, FindRequest, LoadoutResult,
    MicrowarpdriveStats, Module, ModuleKind, ModuleRef, ModulesByCategory, NeutralizerStats,
    NosferatuStats, NumModules, SmartbombStats,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

pub fn module(index: u32, cpu: f64, powergrid: f64, kind: ModuleKind) -> Module {
    Module {
        index,
        cpu,
        powergrid,
        item_id: None,
        type_id: None,
        kind,
    }
}

pub fn dps(index: u32, cpu: f64, powergrid: f64, dmg_multi: f64, rof_bonus: f64) -> Module {
    module(
        index,
        cpu,
        powergrid,
        ModuleKind::Dps(DpsStats {
            dmg_multi,
            rof_bonus,
        }),
    )
}

/// Smartbomb costing 1 cpu / 1 pg.
pub fn smartbomb(
    index: u32,
    activation_cost: f64,
    activation_time: f64,
    range: f64,
    damage: f64,
) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::Smartbomb(SmartbombStats {
            activation_cost,
            activation_time,
            range,
            damage,
        }),
    )
}

/// Neutralizer costing 1 cpu / 1 pg.
pub fn neutralizer(
    index: u32,
    activation_cost: f64,
    activation_time: f64,
    range: f64,
    neut_amount: f64,
) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::Neutralizer(NeutralizerStats {
            activation_cost,
            activation_time,
            range,
            neut_amount,
        }),
    )
}

/// Nosferatu costing 1 cpu / 1 pg.
pub fn nosferatu(index: u32, activation_time: f64, range: f64, drain_amount: f64) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::Nosferatu(NosferatuStats {
            activation_time,
            range,
            drain_amount,
        }),
    )
}

/// Cap battery costing 1 cpu / 1 pg.
pub fn battery(index: u32, capacitor_bonus: f64, drain_resistance_bonus: f64) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::CapBattery(CapBatteryStats {
            capacitor_bonus,
            drain_resistance_bonus,
        }),
    )
}

/// Afterburner costing 1 cpu / 1 pg with a 10 s cycle.
pub fn afterburner(index: u32, activation_cost: f64, velocity_bonus: f64) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::Afterburner(AfterburnerStats {
            activation_cost,
            activation_time: 10_000.0,
            velocity_bonus,
        }),
    )
}

/// Microwarpdrive costing 1 cpu / 1 pg with a 10 s cycle.
pub fn microwarpdrive(
    index: u32,
    activation_cost: f64,
    velocity_bonus: f64,
    signature_radius_modifier: f64,
) -> Module {
    module(
        index,
        1.0,
        1.0,
        ModuleKind::Microwarpdrive(MicrowarpdriveStats {
            activation_cost,
            activation_time: 10_000.0,
            velocity_bonus,
            signature_radius_modifier,
        }),
    )
}

/// Groups modules into pools by their own category, keeping input order.
pub fn pool(modules: impl IntoIterator<Item = Module>) -> ModulesByCategory {
    let mut pool = ModulesByCategory::new();
    for module in modules {
        pool.entry(module.category()).or_default().push(module);
    }
    pool
}

pub fn counts(entries: &[(Category, u32)]) -> NumModules {
    entries
        .iter()
        .map(|&(category, count)| (category, i64::from(count)))
        .collect()
}

pub fn find_request(
    cpu_budget: f64,
    pg_budget: f64,
    modules: impl IntoIterator<Item = Module>,
    num_modules: &[(Category, u32)],
) -> FindRequest {
    FindRequest {
        cpu_budget,
        pg_budget,
        modules_by_category: pool(modules),
        num_modules: counts(num_modules),
        sort_keys: vec![],
        make_unique: false,
    }
}

/// A result with every stat zeroed and no prop mods, referencing `modules`.
pub fn blank_result(id: u64, modules: &[(Category, u32)]) -> LoadoutResult {
    LoadoutResult {
        id,
        modules: modules
            .iter()
            .map(|&(category, index)| ModuleRef {
                category,
                index,
                item_id: None,
                type_id: None,
            })
            .collect(),
        total_cpu: 0.0,
        total_pg: 0.0,
        dps_increase: 0.0,
        smartbomb_dps: 0.0,
        smartbomb_gjs: 0.0,
        smartbomb_range: 0.0,
        neut_amount: 0.0,
        neut_gjs: 0.0,
        neut_range: 0.0,
        nos_amount: 0.0,
        nos_range: 0.0,
        cap_bonus: 0.0,
        drain_resistance: 0.0,
        ab_velocity: None,
        ab_gj: None,
        mwd_velocity: None,
        mwd_gj: None,
        mwd_signature: None,
        total_gj: 0.0,
    }
}

/// `count` damage amplifiers with rolled stats in the usual abyssal spread.
pub fn random_dps_pool(rng: &mut impl Rng, count: u32) -> Vec<Module> {
    (1..=count)
        .map(|index| {
            dps(
                index,
                rng.gen_range(20.0..35.0),
                1.0,
                rng.gen_range(1.05..1.12),
                rng.gen_range(5.0..12.0),
            )
        })
        .collect()
}
