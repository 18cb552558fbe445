use std::path::Path;

use anyhow::{bail, Context, Result};
use fit_core::{validate_catalog, FindRequest, LoadoutResult, Module, ModulesByCategory};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::builder::{AddOutcome, CatalogBuilder};
use crate::dogma::DogmaItem;
use crate::roll::RollTemplate;

#[derive(Deserialize)]
struct RollTemplatesFile {
    templates: Vec<RollTemplate>,
}

/// A bare result list, or anything carrying one under `results`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultsFile {
    List(Vec<LoadoutResult>),
    Summary { results: Vec<LoadoutResult> },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Loads a JSON array of modules into per-category pools.
///
/// Modules without an index get one; repeated item ids are dropped.
pub fn load_catalog(path: &Path) -> Result<ModulesByCategory> {
    let modules: Vec<Module> = read_json(path)?;
    let mut builder = CatalogBuilder::new();
    let skipped = builder
        .extend(modules)
        .into_iter()
        .filter(|outcome| *outcome == AddOutcome::Skipped)
        .count();
    if skipped > 0 {
        tracing::warn!(
            path = %path.display(),
            skipped,
            "skipped modules with repeated item ids"
        );
    }
    let catalog = builder.build();
    validate_catalog(&catalog).with_context(|| format!("validating {}", path.display()))?;
    Ok(catalog)
}

pub fn load_find_request(path: &Path) -> Result<FindRequest> {
    read_json(path)
}

pub fn load_results(path: &Path) -> Result<Vec<LoadoutResult>> {
    Ok(match read_json(path)? {
        ResultsFile::List(results) | ResultsFile::Summary { results } => results,
    })
}

pub fn load_dogma_items(path: &Path) -> Result<Vec<DogmaItem>> {
    read_json(path)
}

/// Loads roll templates, rejecting spreads outside `[0, 1)`.
pub fn load_roll_templates(path: &Path) -> Result<Vec<RollTemplate>> {
    let file: RollTemplatesFile = read_json(path)?;
    for template in &file.templates {
        if !(0.0..1.0).contains(&template.spread) {
            bail!(
                "{}: template '{}' has spread {} outside [0, 1)",
                path.display(),
                template.name,
                template.spread
            );
        }
    }
    Ok(file.templates)
}
