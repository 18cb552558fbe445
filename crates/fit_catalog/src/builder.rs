use fit_core::{Category, Module, ModulesByCategory};

/// What `CatalogBuilder::add` did with a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(u32),
    /// An existing module with this index was overwritten.
    Replaced(u32),
    /// Another module with the same `item_id` is already in the category.
    Skipped,
}

/// Accumulates modules into per-category pools with unique indices.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    pool: ModulesByCategory,
}

fn smallest_free_index(modules: &[Module]) -> u32 {
    let mut index = 1;
    while modules.iter().any(|m| m.index == index) {
        index += 1;
    }
    index
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(pool: ModulesByCategory) -> Self {
        Self { pool }
    }

    /// Index 0 asks for the smallest free index in the module's category.
    pub fn add(&mut self, mut module: Module) -> AddOutcome {
        let modules = self.pool.entry(module.category()).or_default();

        if let Some(item_id) = &module.item_id {
            if modules.iter().any(|m| m.item_id.as_ref() == Some(item_id)) {
                return AddOutcome::Skipped;
            }
        }

        if module.index == 0 {
            module.index = smallest_free_index(modules);
        } else if let Some(existing) = modules.iter_mut().find(|m| m.index == module.index) {
            let index = module.index;
            *existing = module;
            return AddOutcome::Replaced(index);
        }

        let index = module.index;
        modules.push(module);
        AddOutcome::Added(index)
    }

    pub fn extend(&mut self, modules: impl IntoIterator<Item = Module>) -> Vec<AddOutcome> {
        modules.into_iter().map(|m| self.add(m)).collect()
    }

    pub fn remove(&mut self, category: Category, index: u32) -> Option<Module> {
        let modules = self.pool.get_mut(&category)?;
        let position = modules.iter().position(|m| m.index == index)?;
        let removed = modules.remove(position);
        if modules.is_empty() {
            self.pool.shift_remove(&category);
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.pool.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn catalog(&self) -> &ModulesByCategory {
        &self.pool
    }

    pub fn build(self) -> ModulesByCategory {
        self.pool
    }
}
