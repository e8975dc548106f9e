//! Recipe catalogue: default stage sequences per product type.
//!
//! Recipes are only read when a batch is created; the seeded templates are
//! handed to the planner and never consulted again.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::planner::StageTemplate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub product_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub stages: Vec<StageTemplate>,
}

impl Recipe {
    fn new(product_type: &str, display_name: &str, stages: &[(&str, u32)]) -> Self {
        Self {
            product_type: product_type.to_string(),
            display_name: display_name.to_string(),
            stages: stages
                .iter()
                .map(|(name, hours)| StageTemplate::new(*name, *hours))
                .collect(),
        }
    }

    pub fn total_hours(&self) -> u64 {
        self.stages.iter().map(|s| u64::from(s.duration_hours)).sum()
    }
}

/// On-disk shape of a user catalogue: a list of `[[recipe]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RecipeFile {
    #[serde(default, rename = "recipe")]
    recipes: Vec<Recipe>,
}

#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: BTreeMap<String, Recipe>,
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecipeCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self {
            recipes: BTreeMap::new(),
        };
        for recipe in [
            Recipe::new("salami", "Salami", &[("Fermentation", 72), ("Drying", 504)]),
            Recipe::new(
                "coppa",
                "Coppa",
                &[("Curing", 336), ("Casing rest", 24), ("Drying", 1440)],
            ),
            Recipe::new("bresaola", "Bresaola", &[("Curing", 336), ("Drying", 720)]),
            Recipe::new(
                "beer",
                "Beer",
                &[
                    ("Primary fermentation", 168),
                    ("Secondary fermentation", 336),
                    ("Bottle conditioning", 336),
                ],
            ),
            Recipe::new(
                "kimchi",
                "Kimchi",
                &[
                    ("Salting", 6),
                    ("Room temperature fermentation", 48),
                    ("Cold fermentation", 336),
                ],
            ),
            Recipe::new(
                "sauerkraut",
                "Sauerkraut",
                &[("Fermentation", 504), ("Cold storage", 168)],
            ),
            Recipe::new(
                "kombucha",
                "Kombucha",
                &[("First fermentation", 168), ("Second fermentation", 72)],
            ),
            Recipe::new(
                "wine",
                "Wine",
                &[
                    ("Primary fermentation", 168),
                    ("Secondary fermentation", 504),
                    ("Aging", 2160),
                ],
            ),
        ] {
            catalog.insert(recipe);
        }
        catalog
    }

    /// Built-in recipes overlaid with the user catalogue at `path`, if given.
    /// User entries replace built-ins of the same product type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::builtin();
        let Some(path) = path else {
            return Ok(catalog);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no user recipe file");
            return Ok(catalog);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file: {}", path.display()))?;
        let overlay = Self::parse(&content)
            .with_context(|| format!("Failed to parse recipe file: {}", path.display()))?;
        for recipe in overlay {
            catalog.insert(recipe);
        }
        Ok(catalog)
    }

    fn parse(content: &str) -> Result<Vec<Recipe>> {
        let file: RecipeFile = toml::from_str(content)?;
        for recipe in &file.recipes {
            if recipe.product_type.trim().is_empty() {
                anyhow::bail!("recipe without a product_type");
            }
            for stage in &recipe.stages {
                crate::validation::validate_name(&stage.name)
                    .and_then(|()| crate::validation::validate_duration(stage.duration_hours))
                    .with_context(|| {
                        format!("invalid stage in recipe '{}'", recipe.product_type)
                    })?;
            }
        }
        Ok(file.recipes)
    }

    fn insert(&mut self, mut recipe: Recipe) {
        recipe.product_type = normalize(&recipe.product_type);
        if recipe.display_name.trim().is_empty() {
            recipe.display_name = recipe.product_type.clone();
        }
        self.recipes.insert(recipe.product_type.clone(), recipe);
    }

    pub fn get(&self, product_type: &str) -> Option<&Recipe> {
        self.recipes.get(&normalize(product_type))
    }

    /// Ordered stage templates for a product type; empty when unknown.
    pub fn seed_stages(&self, product_type: &str) -> Vec<StageTemplate> {
        self.get(product_type)
            .map(|r| r.stages.clone())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn normalize(product_type: &str) -> String {
    product_type.trim().to_lowercase()
}
