//! Type definitions for `fit_core`.
//!
//! Module records, request payloads, scored results and sort keys. Every wire
//! name is camelCase to match the worker message protocol.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::FitError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// Per-category module pools. Key order is the caller's and sets the
/// category order of every combination.
pub type ModulesByCategory = IndexMap<Category, Vec<Module>>;
/// Requested module count per category. Signed so that negative counts reach
/// validation instead of failing to parse.
pub type NumModules = IndexMap<Category, i64>;
/// Module references held by a result. Most loadouts fit inline.
pub type ModuleRefs = SmallVec<[ModuleRef; 4]>;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "dps")]
    Dps,
    #[serde(rename = "sb")]
    Smartbomb,
    #[serde(rename = "neut")]
    Neutralizer,
    #[serde(rename = "nos")]
    Nosferatu,
    #[serde(rename = "battery")]
    CapBattery,
    #[serde(rename = "ab")]
    Afterburner,
    #[serde(rename = "mwd")]
    Microwarpdrive,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 7] = [
        Category::Dps,
        Category::Smartbomb,
        Category::Neutralizer,
        Category::Nosferatu,
        Category::CapBattery,
        Category::Afterburner,
        Category::Microwarpdrive,
    ];

    /// Wire tag, identical to the serde name.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Dps => "dps",
            Category::Smartbomb => "sb",
            Category::Neutralizer => "neut",
            Category::Nosferatu => "nos",
            Category::CapBattery => "battery",
            Category::Afterburner => "ab",
            Category::Microwarpdrive => "mwd",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FitError::UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Module stats per category
// ---------------------------------------------------------------------------

/// Damage amplifier. Keeps the game's representation: `dmg_multi` is the raw
/// multiplier (1.10 = +10 %), `rof_bonus` is a cycle-time reduction in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpsStats {
    pub dmg_multi: f64,
    pub rof_bonus: f64,
}

impl DpsStats {
    /// Fractional damage bonus (`0.10` for a 1.10 multiplier).
    pub fn damage_bonus(&self) -> f64 {
        self.dmg_multi - 1.0
    }

    /// Fractional cycle-time reduction (`0.10` for a 10 % bonus).
    pub fn rof_reduction(&self) -> f64 {
        self.rof_bonus / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartbombStats {
    pub activation_cost: f64,
    /// Milliseconds.
    pub activation_time: f64,
    pub range: f64,
    pub damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeutralizerStats {
    pub activation_cost: f64,
    pub activation_time: f64,
    pub range: f64,
    pub neut_amount: f64,
}

/// Nosferatus draw no capacitor to cycle, so there is no activation cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NosferatuStats {
    pub activation_time: f64,
    pub range: f64,
    pub drain_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapBatteryStats {
    pub capacitor_bonus: f64,
    /// Percent; the sign is ignored when stacking.
    pub drain_resistance_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterburnerStats {
    pub activation_cost: f64,
    pub activation_time: f64,
    pub velocity_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrowarpdriveStats {
    pub activation_cost: f64,
    pub activation_time: f64,
    pub velocity_bonus: f64,
    pub signature_radius_modifier: f64,
}

/// Category-specific attributes, tagged by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleKind {
    #[serde(rename = "dps")]
    Dps(DpsStats),
    #[serde(rename = "sb")]
    Smartbomb(SmartbombStats),
    #[serde(rename = "neut")]
    Neutralizer(NeutralizerStats),
    #[serde(rename = "nos")]
    Nosferatu(NosferatuStats),
    #[serde(rename = "battery")]
    CapBattery(CapBatteryStats),
    #[serde(rename = "ab")]
    Afterburner(AfterburnerStats),
    #[serde(rename = "mwd")]
    Microwarpdrive(MicrowarpdriveStats),
}

impl ModuleKind {
    pub fn category(&self) -> Category {
        match self {
            ModuleKind::Dps(_) => Category::Dps,
            ModuleKind::Smartbomb(_) => Category::Smartbomb,
            ModuleKind::Neutralizer(_) => Category::Neutralizer,
            ModuleKind::Nosferatu(_) => Category::Nosferatu,
            ModuleKind::CapBattery(_) => Category::CapBattery,
            ModuleKind::Afterburner(_) => Category::Afterburner,
            ModuleKind::Microwarpdrive(_) => Category::Microwarpdrive,
        }
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// One rolled piece of equipment.
///
/// `index` identifies the module within its category pool only; the engine
/// never looks at `item_id` or `type_id`. Index 0 means not yet assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(default)]
    pub index: u32,
    pub cpu: f64,
    #[serde(rename = "pg")]
    pub powergrid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u64>,
    #[serde(flatten)]
    pub kind: ModuleKind,
}

impl Module {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn to_ref(&self) -> ModuleRef {
        ModuleRef {
            category: self.category(),
            index: self.index,
            item_id: self.item_id.clone(),
            type_id: self.type_id,
        }
    }
}

/// Back-reference from a result to the module it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRef {
    #[serde(rename = "type")]
    pub category: Category,
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u64>,
}

impl ModuleRef {
    /// Identity used for uniqueness: `(category, index)`.
    pub fn key(&self) -> (Category, u32) {
        (self.category, self.index)
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.category, self.index)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A scored, budget-feasible loadout.
///
/// Prop-mod fields are `None` when the loadout has no module of that type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutResult {
    /// Ordinal of the originating combination in enumeration order.
    pub id: u64,
    pub modules: ModuleRefs,
    pub total_cpu: f64,
    pub total_pg: f64,
    pub dps_increase: f64,
    pub smartbomb_dps: f64,
    pub smartbomb_gjs: f64,
    pub smartbomb_range: f64,
    pub neut_amount: f64,
    pub neut_gjs: f64,
    pub neut_range: f64,
    pub nos_amount: f64,
    pub nos_range: f64,
    pub cap_bonus: f64,
    pub drain_resistance: f64,
    pub ab_velocity: Option<f64>,
    pub ab_gj: Option<f64>,
    pub mwd_velocity: Option<f64>,
    pub mwd_gj: Option<f64>,
    pub mwd_signature: Option<f64>,
    pub total_gj: f64,
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Sortable `LoadoutResult` fields, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Modules,
    TotalCpu,
    TotalPg,
    DpsIncrease,
    SmartbombDps,
    SmartbombGjs,
    SmartbombRange,
    NeutAmount,
    NeutGjs,
    NeutRange,
    NosAmount,
    NosRange,
    CapBonus,
    DrainResistance,
    AbVelocity,
    AbGj,
    MwdVelocity,
    MwdGj,
    MwdSignature,
    TotalGj,
}

impl SortField {
    pub const ALL: [SortField; 21] = [
        SortField::Id,
        SortField::Modules,
        SortField::TotalCpu,
        SortField::TotalPg,
        SortField::DpsIncrease,
        SortField::SmartbombDps,
        SortField::SmartbombGjs,
        SortField::SmartbombRange,
        SortField::NeutAmount,
        SortField::NeutGjs,
        SortField::NeutRange,
        SortField::NosAmount,
        SortField::NosRange,
        SortField::CapBonus,
        SortField::DrainResistance,
        SortField::AbVelocity,
        SortField::AbGj,
        SortField::MwdVelocity,
        SortField::MwdGj,
        SortField::MwdSignature,
        SortField::TotalGj,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Modules => "modules",
            SortField::TotalCpu => "totalCpu",
            SortField::TotalPg => "totalPg",
            SortField::DpsIncrease => "dpsIncrease",
            SortField::SmartbombDps => "smartbombDps",
            SortField::SmartbombGjs => "smartbombGjs",
            SortField::SmartbombRange => "smartbombRange",
            SortField::NeutAmount => "neutAmount",
            SortField::NeutGjs => "neutGjs",
            SortField::NeutRange => "neutRange",
            SortField::NosAmount => "nosAmount",
            SortField::NosRange => "nosRange",
            SortField::CapBonus => "capBonus",
            SortField::DrainResistance => "drainResistance",
            SortField::AbVelocity => "abVelocity",
            SortField::AbGj => "abGj",
            SortField::MwdVelocity => "mwdVelocity",
            SortField::MwdGj => "mwdGj",
            SortField::MwdSignature => "mwdSignature",
            SortField::TotalGj => "totalGj",
        }
    }
}

impl FromStr for SortField {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FitError::UnknownSortField(s.to_string()))
    }
}

/// One entry of a composite sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub key: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(key: SortField) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(key: SortField) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

/// Parses `field[:asc|desc]`; the direction defaults to descending.
impl FromStr for SortKey {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s.split_once(':').unwrap_or((s, "desc"));
        let key = field.parse()?;
        match direction.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortKey::asc(key)),
            "desc" => Ok(SortKey::desc(key)),
            other => Err(FitError::UnknownSortDirection(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Payload of a `findCombinations` request.
///
/// Missing budgets deserialize as zero and are rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRequest {
    #[serde(default)]
    pub cpu_budget: f64,
    #[serde(default)]
    pub pg_budget: f64,
    #[serde(default)]
    pub modules_by_category: ModulesByCategory,
    #[serde(default)]
    pub num_modules: NumModules,
    #[serde(default)]
    pub sort_keys: Vec<SortKey>,
    #[serde(default)]
    pub make_unique: bool,
}

impl FindRequest {
    /// Sum of requested modules over all categories.
    pub fn total_modules(&self) -> i64 {
        self.num_modules.values().sum()
    }
}

/// Payload of a `sort` request; also echoed back as its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    #[serde(default)]
    pub results: Vec<LoadoutResult>,
    #[serde(default)]
    pub sort_keys: Vec<SortKey>,
    #[serde(default)]
    pub make_unique: bool,
}

/// Result of a completed `findCombinations` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub results: Vec<LoadoutResult>,
    /// Combinations with matching per-category counts, feasible or not.
    pub combinations_examined: u64,
}
