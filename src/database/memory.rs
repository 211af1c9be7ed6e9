use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    schema::{
        IngredientRow, NewChildren, NewRecipe, PreparationStepRow, RecipeRecord, RecipeRow,
        RecipeUpdate,
    },
    store::RecipeStore,
};

const SLUG_CONSTRAINT: &str = "recipes_slug_key";

#[derive(Default)]
struct Tables {
    recipes: Vec<RecipeRow>,
    ingredients: Vec<IngredientRow>,
    preparation_steps: Vec<PreparationStepRow>,
}

impl Tables {
    fn record(&self, recipe: &RecipeRow) -> RecipeRecord {
        RecipeRecord {
            recipe: recipe.clone(),
            ingredients: self
                .ingredients
                .iter()
                .filter(|ingredient| ingredient.recipe_id == recipe.id)
                .cloned()
                .collect(),
            preparation_steps: self
                .preparation_steps
                .iter()
                .filter(|step| step.recipe_id == recipe.id)
                .cloned()
                .collect(),
        }
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.recipes
            .iter()
            .any(|recipe| recipe.slug == slug && Some(recipe.id) != except)
    }
}

/// In-process [`RecipeStore`] with the same unique-slug and cascade rules as
/// the relational schema. Children come back in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ingredient and step rows still referencing `recipe_id`.
    pub async fn count_children(&self, recipe_id: Uuid) -> (usize, usize) {
        let tables = self.tables.read().await;
        (
            tables
                .ingredients
                .iter()
                .filter(|ingredient| ingredient.recipe_id == recipe_id)
                .count(),
            tables
                .preparation_steps
                .iter()
                .filter(|step| step.recipe_id == recipe_id)
                .count(),
        )
    }
}

fn set<T>(column: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *column = value;
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecipeRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .map(|recipe| tables.record(recipe)))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<RecipeRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .iter()
            .find(|recipe| recipe.slug == slug)
            .map(|recipe| tables.record(recipe)))
    }

    async fn list_recent(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut recipes: Vec<&RecipeRow> = tables.recipes.iter().rev().collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(recipes
            .into_iter()
            .map(|recipe| tables.record(recipe))
            .collect())
    }

    async fn insert_nested(
        &self,
        recipe: NewRecipe,
        children: NewChildren,
    ) -> Result<RecipeRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.slug_taken(&recipe.slug, None) {
            return Err(StoreError::UniqueViolation(SLUG_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let row = RecipeRow {
            id: Uuid::new_v4(),
            slug: recipe.slug,
            name: recipe.name,
            intro: recipe.intro,
            author_username: recipe.author_username,
            author_id: recipe.author_id,
            cdn_path: recipe.cdn_path,
            serving_suggestion: recipe.serving_suggestion,
            tips: recipe.tips,
            difficulty: recipe.difficulty,
            servings: recipe.servings,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            cooking_method: recipe.cooking_method,
            meal_type: recipe.meal_type,
            category: recipe.category,
            season: recipe.season,
            occasion: recipe.occasion,
            region: recipe.region,
            created_at: now,
            updated_at: now,
        };

        let ingredients: Vec<IngredientRow> = children
            .ingredients
            .into_iter()
            .map(|ingredient| IngredientRow {
                id: ingredient.id.unwrap_or_else(Uuid::new_v4),
                recipe_id: row.id,
                quantity: ingredient.quantity,
                unit: ingredient.unit,
                name: ingredient.name,
                order: ingredient.order,
            })
            .collect();

        let preparation_steps: Vec<PreparationStepRow> = children
            .preparation_steps
            .into_iter()
            .map(|step| PreparationStepRow {
                id: step.id.unwrap_or_else(Uuid::new_v4),
                recipe_id: row.id,
                step_number: step.step_number,
                description: step.description,
            })
            .collect();

        let mut ingredient_ids: HashSet<Uuid> =
            tables.ingredients.iter().map(|existing| existing.id).collect();
        let mut step_ids: HashSet<Uuid> =
            tables.preparation_steps.iter().map(|existing| existing.id).collect();

        let child_ids_taken = !ingredients.iter().all(|new| ingredient_ids.insert(new.id))
            || !preparation_steps.iter().all(|new| step_ids.insert(new.id));
        if child_ids_taken {
            return Err(StoreError::UniqueViolation(String::from("pkey")));
        }

        tables.recipes.push(row.clone());
        tables.ingredients.extend(ingredients.iter().cloned());
        tables
            .preparation_steps
            .extend(preparation_steps.iter().cloned());

        Ok(RecipeRecord {
            recipe: row,
            ingredients,
            preparation_steps,
        })
    }

    async fn update_scalars(
        &self,
        id: Uuid,
        update: RecipeUpdate,
    ) -> Result<Option<RecipeRecord>, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.recipes.iter().position(|recipe| recipe.id == id) else {
            return Ok(None);
        };

        if let Some(slug) = &update.slug {
            if tables.slug_taken(slug, Some(id)) {
                return Err(StoreError::UniqueViolation(SLUG_CONSTRAINT.to_string()));
            }
        }

        let row = &mut tables.recipes[index];

        set(&mut row.slug, update.slug);
        set(&mut row.name, update.name);
        set(&mut row.intro, update.intro);
        set(&mut row.author_username, update.author_username);
        set(&mut row.author_id, update.author_id);
        set(&mut row.cdn_path, update.cdn_path);
        set(&mut row.serving_suggestion, update.serving_suggestion);
        set(&mut row.tips, update.tips);
        set(&mut row.difficulty, update.difficulty);
        set(&mut row.servings, update.servings);
        set(&mut row.prep_time, update.prep_time);
        set(&mut row.cook_time, update.cook_time);
        set(&mut row.cooking_method, update.cooking_method);
        set(&mut row.meal_type, update.meal_type);
        set(&mut row.category, update.category);
        set(&mut row.season, update.season);
        set(&mut row.occasion, update.occasion);
        set(&mut row.region, update.region);
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(Some(tables.record(&row)))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.recipes.len();
        tables.recipes.retain(|recipe| recipe.id != id);
        if tables.recipes.len() == before {
            return Err(StoreError::NotFound);
        }

        tables
            .ingredients
            .retain(|ingredient| ingredient.recipe_id != id);
        tables.preparation_steps.retain(|step| step.recipe_id != id);

        Ok(())
    }
}
