use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    constants::{DIFFICULTY_LEVELS, RECIPE_CATEGORIES, UNKNOWN_CATEGORY_LABEL},
    error::TypeError,
};

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "difficulty_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn tag(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn display_name(&self) -> &'static str {
        DIFFICULTY_LEVELS
            .iter()
            .find(|(tag, _)| *tag == self.tag())
            .map(|(_, label)| *label)
            .unwrap_or_default()
    }
}

impl FromStr for Difficulty {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            _ => Err(TypeError::new(
                "Invalid difficulty, expected one of EASY, MEDIUM, HARD",
            )),
        }
    }
}

impl TryFrom<&Value> for Difficulty {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => value.parse(),
            None => Err(TypeError::new("Expected difficulty as string")),
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "recipe_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeCategory {
    GlavnaJela,
    Deserti,
    KruhIPeciva,
    Predjela,
    Juhe,
    Salate,
    Pica,
    SokoviINapici,
    Prilozi,
    Umaci,
}

impl RecipeCategory {
    pub const ALL: [RecipeCategory; 10] = [
        Self::GlavnaJela,
        Self::Deserti,
        Self::KruhIPeciva,
        Self::Predjela,
        Self::Juhe,
        Self::Salate,
        Self::Pica,
        Self::SokoviINapici,
        Self::Prilozi,
        Self::Umaci,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            RecipeCategory::GlavnaJela => "GLAVNA_JELA",
            RecipeCategory::Deserti => "DESERTI",
            RecipeCategory::KruhIPeciva => "KRUH_I_PECIVA",
            RecipeCategory::Predjela => "PREDJELA",
            RecipeCategory::Juhe => "JUHE",
            RecipeCategory::Salate => "SALATE",
            RecipeCategory::Pica => "PICA",
            RecipeCategory::SokoviINapici => "SOKOVI_I_NAPICI",
            RecipeCategory::Prilozi => "PRILOZI",
            RecipeCategory::Umaci => "UMACI",
        }
    }

    /// Croatian label shown in listings.
    pub fn display_name(&self) -> &'static str {
        RECIPE_CATEGORIES
            .iter()
            .find(|(tag, _)| *tag == self.tag())
            .map(|(_, label)| *label)
            .unwrap_or(UNKNOWN_CATEGORY_LABEL)
    }

    /// Every category paired with its label, in menu order.
    pub fn all() -> Vec<(RecipeCategory, &'static str)> {
        Self::ALL
            .iter()
            .map(|category| (*category, category.display_name()))
            .collect()
    }

    /// Case-insensitive tag lookup.
    pub fn from_str_loose(value: &str) -> Option<Self> {
        value.to_uppercase().parse().ok()
    }
}

impl fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for RecipeCategory {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|category| category.tag() == s)
            .copied()
            .ok_or_else(|| TypeError::new("Invalid recipe category"))
    }
}

impl TryFrom<&Value> for RecipeCategory {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => value.parse(),
            None => Err(TypeError::new("Expected recipe category as string")),
        }
    }
}

/// A row of `recipes`. The image column holds a CDN path, never an expanded URL.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct RecipeRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub intro: Option<String>,
    pub author_username: String,
    pub author_id: Option<String>,
    pub cdn_path: Option<String>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct IngredientRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub quantity: String,
    pub unit: Option<String>,
    pub name: String,
    pub order: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PreparationStepRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub step_number: i32,
    pub description: String,
}

/// A recipe row together with every child row it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub recipe: RecipeRow,
    pub ingredients: Vec<IngredientRow>,
    pub preparation_steps: Vec<PreparationStepRow>,
}

/// Scalar columns written when a recipe is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub slug: String,
    pub name: String,
    pub intro: Option<String>,
    pub author_username: String,
    pub author_id: Option<String>,
    pub cdn_path: Option<String>,
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

#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub id: Option<Uuid>,
    pub quantity: String,
    pub unit: Option<String>,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPreparationStep {
    pub id: Option<Uuid>,
    pub step_number: i32,
    pub description: String,
}

/// Children created together with their recipe in one nested create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewChildren {
    pub ingredients: Vec<NewIngredient>,
    pub preparation_steps: Vec<NewPreparationStep>,
}

/// Column-level update. `None` leaves the column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub intro: Option<Option<String>>,
    pub author_username: Option<String>,
    pub author_id: Option<Option<String>>,
    pub cdn_path: Option<Option<String>>,
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

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("GLAVNA_JELA", RecipeCategory::GlavnaJela)]
    #[case("KRUH_I_PECIVA", RecipeCategory::KruhIPeciva)]
    #[case("SOKOVI_I_NAPICI", RecipeCategory::SokoviINapici)]
    #[case("UMACI", RecipeCategory::Umaci)]
    fn category_tags_match_wire_format(#[case] tag: &str, #[case] category: RecipeCategory) {
        assert_eq!(tag.parse::<RecipeCategory>().unwrap(), category);
        assert_eq!(serde_json::to_value(category).unwrap(), json!(tag));
        assert_eq!(category.to_string(), tag);
    }

    #[test]
    fn category_table_covers_every_variant() {
        let all = RecipeCategory::all();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0], (RecipeCategory::GlavnaJela, "Glavna jela"));
        assert_eq!(RecipeCategory::Pica.display_name(), "Pića");
        assert!(all.iter().all(|(_, label)| *label != UNKNOWN_CATEGORY_LABEL));
    }

    #[test]
    fn loose_category_lookup_ignores_case() {
        assert_eq!(
            RecipeCategory::from_str_loose("deserti"),
            Some(RecipeCategory::Deserti)
        );
        assert_eq!(RecipeCategory::from_str_loose("pizza"), None);
    }

    #[test]
    fn difficulty_rejects_unknown_and_non_string_values() {
        assert_eq!(Difficulty::try_from(&json!("HARD")), Ok(Difficulty::Hard));
        assert!(Difficulty::try_from(&json!("hard")).is_err());
        assert!(Difficulty::try_from(&json!(2)).is_err());
        assert_eq!(Difficulty::Medium.display_name(), "Srednje zahtjevno");
    }

    #[test]
    fn empty_update_touches_nothing() {
        assert!(RecipeUpdate::default().is_empty());
        let update = RecipeUpdate {
            intro: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
