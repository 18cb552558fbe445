//! Loadout statistics.
//!
//! `score` turns a budget-feasible combination into a `LoadoutResult`. Pure;
//! empty categories contribute zero and never produce NaN.

use crate::assembler::Combination;
use crate::budget::ResourceTotals;
use crate::stacking::{stacked_bonus, stacked_reduction};
use crate::{
    AfterburnerStats, CapBatteryStats, DpsStats, LoadoutResult, MicrowarpdriveStats, ModuleKind,
    NeutralizerStats, NosferatuStats, SmartbombStats,
};

/// Selected modules split by category.
#[derive(Default)]
struct ByCategory<'a> {
    dps: Vec<&'a DpsStats>,
    smartbombs: Vec<&'a SmartbombStats>,
    neutralizers: Vec<&'a NeutralizerStats>,
    nosferatus: Vec<&'a NosferatuStats>,
    batteries: Vec<&'a CapBatteryStats>,
    afterburners: Vec<&'a AfterburnerStats>,
    microwarpdrives: Vec<&'a MicrowarpdriveStats>,
}

impl<'a> ByCategory<'a> {
    fn split(combination: &Combination<'a>) -> Self {
        let mut split = Self::default();
        for &module in &combination.modules {
            match &module.kind {
                ModuleKind::Dps(stats) => split.dps.push(stats),
                ModuleKind::Smartbomb(stats) => split.smartbombs.push(stats),
                ModuleKind::Neutralizer(stats) => split.neutralizers.push(stats),
                ModuleKind::Nosferatu(stats) => split.nosferatus.push(stats),
                ModuleKind::CapBattery(stats) => split.batteries.push(stats),
                ModuleKind::Afterburner(stats) => split.afterburners.push(stats),
                ModuleKind::Microwarpdrive(stats) => split.microwarpdrives.push(stats),
            }
        }
        split
    }
}

/// `amount` per activation converted to per second; activation time is in ms.
/// A non-positive cycle contributes nothing.
fn per_second(amount: f64, activation_time_ms: f64) -> f64 {
    if activation_time_ms > 0.0 {
        amount / (activation_time_ms / 1000.0)
    } else {
        0.0
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

fn max_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::max)
}

/// Percent DPS gained from damage amplifiers, stacking-penalized on both the
/// damage and the rate-of-fire axis.
pub fn dps_increase(modules: &[&DpsStats]) -> f64 {
    let total_dmg = stacked_bonus(modules.iter().map(|m| m.damage_bonus()));
    let total_cycle = stacked_reduction(modules.iter().map(|m| m.rof_reduction()));
    let total_rof = if total_cycle > 0.0 {
        1.0 / total_cycle
    } else {
        1.0
    };
    (total_dmg * total_rof - 1.0) * 100.0
}

/// Effective capacitor-warfare resistance in percent, reported negative the
/// way the game displays it.
pub fn drain_resistance(batteries: &[&CapBatteryStats]) -> f64 {
    let drain_multiplier = stacked_reduction(
        batteries
            .iter()
            .map(|b| b.drain_resistance_bonus.abs() / 100.0),
    );
    -((1.0 - drain_multiplier) * 100.0)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PulseStats {
    amount_per_sec: f64,
    gj_per_sec: f64,
    range: f64,
}

fn smartbomb_stats(smartbombs: &[&SmartbombStats]) -> PulseStats {
    PulseStats {
        amount_per_sec: smartbombs
            .iter()
            .map(|s| per_second(s.damage, s.activation_time))
            .sum(),
        gj_per_sec: smartbombs
            .iter()
            .map(|s| per_second(s.activation_cost, s.activation_time))
            .sum(),
        range: mean(smartbombs.iter().map(|s| s.range)),
    }
}

fn neutralizer_stats(neutralizers: &[&NeutralizerStats]) -> PulseStats {
    PulseStats {
        amount_per_sec: neutralizers
            .iter()
            .map(|n| per_second(n.neut_amount, n.activation_time))
            .sum(),
        gj_per_sec: neutralizers
            .iter()
            .map(|n| per_second(n.activation_cost, n.activation_time))
            .sum(),
        range: mean(neutralizers.iter().map(|n| n.range)),
    }
}

fn nosferatu_stats(nosferatus: &[&NosferatuStats]) -> PulseStats {
    PulseStats {
        amount_per_sec: nosferatus
            .iter()
            .map(|n| per_second(n.drain_amount, n.activation_time))
            .sum(),
        gj_per_sec: 0.0,
        range: mean(nosferatus.iter().map(|n| n.range)),
    }
}

/// Strongest active propulsion effect; prop mods do not stack.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PropulsionStats {
    ab_velocity: Option<f64>,
    ab_gj: Option<f64>,
    mwd_velocity: Option<f64>,
    mwd_gj: Option<f64>,
    mwd_signature: Option<f64>,
}

impl PropulsionStats {
    fn of(afterburners: &[&AfterburnerStats], microwarpdrives: &[&MicrowarpdriveStats]) -> Self {
        Self {
            ab_velocity: max_of(afterburners.iter().map(|ab| ab.velocity_bonus)),
            ab_gj: max_of(afterburners.iter().map(|ab| ab.activation_cost)),
            mwd_velocity: max_of(microwarpdrives.iter().map(|mwd| mwd.velocity_bonus)),
            mwd_gj: max_of(microwarpdrives.iter().map(|mwd| mwd.activation_cost)),
            mwd_signature: max_of(
                microwarpdrives
                    .iter()
                    .map(|mwd| mwd.signature_radius_modifier),
            ),
        }
    }

    /// Activation cost of the hungrier prop mod, floored at zero.
    fn gj(&self) -> f64 {
        [self.ab_gj, self.mwd_gj]
            .into_iter()
            .flatten()
            .fold(0.0, f64::max)
    }
}

/// Scores a combination. Budget filtering is the caller's job.
pub fn score(combination: &Combination<'_>) -> LoadoutResult {
    let split = ByCategory::split(combination);
    let totals = ResourceTotals::of(combination.modules.iter().copied());

    let smartbombs = smartbomb_stats(&split.smartbombs);
    let neuts = neutralizer_stats(&split.neutralizers);
    let noses = nosferatu_stats(&split.nosferatus);
    let propulsion = PropulsionStats::of(&split.afterburners, &split.microwarpdrives);

    // Nosferatus are a capacitor source, not a draw.
    let total_gj = smartbombs.gj_per_sec.max(0.0) + neuts.gj_per_sec.max(0.0) + propulsion.gj();

    LoadoutResult {
        id: combination.ordinal,
        modules: combination.modules.iter().map(|m| m.to_ref()).collect(),
        total_cpu: totals.cpu,
        total_pg: totals.powergrid,
        dps_increase: dps_increase(&split.dps),
        smartbomb_dps: smartbombs.amount_per_sec,
        smartbomb_gjs: smartbombs.gj_per_sec,
        smartbomb_range: smartbombs.range,
        neut_amount: neuts.amount_per_sec,
        neut_gjs: neuts.gj_per_sec,
        neut_range: neuts.range,
        nos_amount: noses.amount_per_sec,
        nos_range: noses.range,
        cap_bonus: split.batteries.iter().map(|b| b.capacitor_bonus).sum(),
        drain_resistance: drain_resistance(&split.batteries),
        ab_velocity: propulsion.ab_velocity,
        ab_gj: propulsion.ab_gj,
        mwd_velocity: propulsion.mwd_velocity,
        mwd_gj: propulsion.mwd_gj,
        mwd_signature: propulsion.mwd_signature,
        total_gj,
    }
}
