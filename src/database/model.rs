use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Difficulty, RecipeCategory};

#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub quantity: String,
    pub unit: Option<String>,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparationStep {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub step_number: i32,
    pub description: String,
}

/// A recipe with its ingredients and preparation steps, in display order.
///
/// `main_image_url` carries the stored CDN path; it is only expanded to an
/// absolute URL in [`RecipeDto`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub intro: Option<String>,
    pub author_username: String,
    pub author_id: Option<String>,
    pub main_image_url: Option<String>,
    pub serving_suggestion: Option<String>,
    pub tips: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub cooking_method: Option<String>,
    pub meal_type: Option<String>,
    pub category: RecipeCategory,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub region: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub preparation_steps: Vec<PreparationStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn is_in_category(&self, category: RecipeCategory) -> bool {
        self.category == category
    }

    /// Preparation plus cooking time in minutes, if either is known.
    pub fn total_time(&self) -> Option<i32> {
        match (self.prep_time, self.cook_time) {
            (None, None) => None,
            (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub quantity: String,
    pub unit: Option<String>,
    pub name: String,
    pub order: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreparationStepDto {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub step_number: i32,
    pub description: String,
}

/// Plain serializable projection of [`Recipe`] handed to boundary handlers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub intro: Option<String>,
    pub author_username: String,
    pub author_id: Option<String>,
    pub main_image_url: Option<String>,
    pub serving_suggestion: Option<String>,
    pub tips: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub cooking_method: Option<String>,
    pub meal_type: Option<String>,
    pub category: RecipeCategory,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub region: Option<String>,
    pub ingredients: Vec<IngredientDto>,
    pub preparation_steps: Vec<PreparationStepDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The persistable scalars of a recipe that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub slug: String,
    pub name: String,
    pub intro: Option<String>,
    pub author_username: String,
    pub author_id: Option<String>,
    pub main_image_url: Option<String>,
    pub serving_suggestion: Option<String>,
    pub tips: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub cooking_method: Option<String>,
    pub meal_type: Option<String>,
    pub category: RecipeCategory,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub region: Option<String>,
}

impl RecipeDraft {
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        author_username: impl Into<String>,
        category: RecipeCategory,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            intro: None,
            author_username: author_username.into(),
            author_id: None,
            main_image_url: None,
            serving_suggestion: None,
            tips: None,
            difficulty: None,
            servings: None,
            prep_time: None,
            cook_time: None,
            cooking_method: None,
            meal_type: None,
            category,
            season: None,
            occasion: None,
            region: None,
        }
    }
}

/// A partial recipe: only the fields a caller wants to change.
///
/// `None` means "leave as is". Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub intro: Option<Option<String>>,
    pub author_username: Option<String>,
    pub author_id: Option<Option<String>>,
    pub main_image_url: Option<Option<String>>,
    pub serving_suggestion: Option<Option<String>>,
    pub tips: Option<Option<String>>,
    pub difficulty: Option<Option<Difficulty>>,
    pub servings: Option<Option<i32>>,
    pub prep_time: Option<Option<i32>>,
    pub cook_time: Option<Option<i32>>,
    pub cooking_method: Option<Option<String>>,
    pub meal_type: Option<Option<String>>,
    pub category: Option<RecipeCategory>,
    pub season: Option<Option<String>>,
    pub occasion: Option<Option<String>>,
    pub region: Option<Option<String>>,
}
