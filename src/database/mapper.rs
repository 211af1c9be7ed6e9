use crate::{
    cdn,
    error::{FieldIssue, ValidationError},
    model::{
        Ingredient, IngredientDto, PreparationStep, PreparationStepDto, Recipe, RecipeChanges,
        RecipeDraft, RecipeDto,
    },
    schema::{
        IngredientRow, NewChildren, NewIngredient, NewPreparationStep, NewRecipe,
        PreparationStepRow, RecipeRow, RecipeUpdate,
    },
    validation::RecipeInput,
};

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            recipe_id: row.recipe_id,
            quantity: row.quantity,
            unit: row.unit,
            name: row.name,
            order: row.order,
        }
    }
}

impl From<&Ingredient> for IngredientDto {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            recipe_id: ingredient.recipe_id,
            quantity: ingredient.quantity.to_owned(),
            unit: ingredient.unit.to_owned(),
            name: ingredient.name.to_owned(),
            order: ingredient.order,
        }
    }
}

impl From<PreparationStepRow> for PreparationStep {
    fn from(row: PreparationStepRow) -> Self {
        Self {
            id: row.id,
            recipe_id: row.recipe_id,
            step_number: row.step_number,
            description: row.description,
        }
    }
}

impl From<&PreparationStep> for PreparationStepDto {
    fn from(step: &PreparationStep) -> Self {
        Self {
            id: step.id,
            recipe_id: step.recipe_id,
            step_number: step.step_number,
            description: step.description.to_owned(),
        }
    }
}

/// Builds the entity from a row and its child rows. Children are taken in
/// the order given.
pub fn row_to_entity(
    row: RecipeRow,
    ingredients: Vec<IngredientRow>,
    preparation_steps: Vec<PreparationStepRow>,
) -> Recipe {
    Recipe {
        id: row.id,
        slug: row.slug,
        name: row.name,
        intro: row.intro,
        author_username: row.author_username,
        author_id: row.author_id,
        main_image_url: row.cdn_path,
        serving_suggestion: row.serving_suggestion,
        tips: row.tips,
        difficulty: row.difficulty,
        servings: row.servings,
        prep_time: row.prep_time,
        cook_time: row.cook_time,
        cooking_method: row.cooking_method,
        meal_type: row.meal_type,
        category: row.category,
        season: row.season,
        occasion: row.occasion,
        region: row.region,
        ingredients: ingredients.into_iter().map(Ingredient::from).collect(),
        preparation_steps: preparation_steps
            .into_iter()
            .map(PreparationStep::from)
            .collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Plain copy of the entity; the image path becomes an absolute URL.
pub fn entity_to_transfer_object(recipe: &Recipe, cdn_base_url: &str) -> RecipeDto {
    RecipeDto {
        id: recipe.id,
        slug: recipe.slug.to_owned(),
        name: recipe.name.to_owned(),
        intro: recipe.intro.to_owned(),
        author_username: recipe.author_username.to_owned(),
        author_id: recipe.author_id.to_owned(),
        main_image_url: cdn::image_url(cdn_base_url, recipe.main_image_url.as_deref()),
        serving_suggestion: recipe.serving_suggestion.to_owned(),
        tips: recipe.tips.to_owned(),
        difficulty: recipe.difficulty,
        servings: recipe.servings,
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        cooking_method: recipe.cooking_method.to_owned(),
        meal_type: recipe.meal_type.to_owned(),
        category: recipe.category,
        season: recipe.season.to_owned(),
        occasion: recipe.occasion.to_owned(),
        region: recipe.region.to_owned(),
        ingredients: recipe.ingredients.iter().map(IngredientDto::from).collect(),
        preparation_steps: recipe
            .preparation_steps
            .iter()
            .map(PreparationStepDto::from)
            .collect(),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}

pub fn entities_to_transfer_objects(recipes: &[Recipe], cdn_base_url: &str) -> Vec<RecipeDto> {
    recipes
        .iter()
        .map(|recipe| entity_to_transfer_object(recipe, cdn_base_url))
        .collect()
}

/// Persistable scalars only; id, timestamps and children are not part of it.
pub fn entity_to_create_input(draft: &RecipeDraft) -> NewRecipe {
    NewRecipe {
        slug: draft.slug.to_owned(),
        name: draft.name.to_owned(),
        intro: draft.intro.to_owned(),
        author_username: draft.author_username.to_owned(),
        author_id: draft.author_id.to_owned(),
        cdn_path: draft.main_image_url.to_owned(),
        serving_suggestion: draft.serving_suggestion.to_owned(),
        tips: draft.tips.to_owned(),
        difficulty: draft.difficulty,
        servings: draft.servings,
        prep_time: draft.prep_time,
        cook_time: draft.cook_time,
        cooking_method: draft.cooking_method.to_owned(),
        meal_type: draft.meal_type.to_owned(),
        category: draft.category,
        season: draft.season.to_owned(),
        occasion: draft.occasion.to_owned(),
        region: draft.region.to_owned(),
    }
}

/// Same projection as [`entity_to_create_input`], keeping "not mentioned"
/// distinct from "cleared".
pub fn entity_to_update_input(changes: &RecipeChanges) -> RecipeUpdate {
    RecipeUpdate {
        slug: changes.slug.to_owned(),
        name: changes.name.to_owned(),
        intro: changes.intro.to_owned(),
        author_username: changes.author_username.to_owned(),
        author_id: changes.author_id.to_owned(),
        cdn_path: changes.main_image_url.to_owned(),
        serving_suggestion: changes.serving_suggestion.to_owned(),
        tips: changes.tips.to_owned(),
        difficulty: changes.difficulty,
        servings: changes.servings,
        prep_time: changes.prep_time,
        cook_time: changes.cook_time,
        cooking_method: changes.cooking_method.to_owned(),
        meal_type: changes.meal_type.to_owned(),
        category: changes.category,
        season: changes.season.to_owned(),
        occasion: changes.occasion.to_owned(),
        region: changes.region.to_owned(),
    }
}

/// Turns validated create input into a draft. Fails only when the input
/// was validated in partial mode and lacks a required field.
pub fn input_to_draft(
    input: &RecipeInput,
    slug: String,
    cdn_base_url: &str,
) -> Result<RecipeDraft, ValidationError> {
    let mut issues = vec![];
    let mut missing = |key: &str, message: &str| {
        issues.push(FieldIssue::at(key, message));
    };

    let name = input.name.to_owned();
    if name.is_none() {
        missing("name", "Recipe name is required");
    }
    let author_username = input.author_username.to_owned();
    if author_username.is_none() {
        missing("authorUsername", "Author username is required");
    }
    let category = input.category;
    if category.is_none() {
        missing("category", "Recipe category is required");
    }

    let (Some(name), Some(author_username), Some(category)) = (name, author_username, category)
    else {
        return Err(ValidationError::new(issues));
    };

    Ok(RecipeDraft {
        slug,
        name,
        intro: input.intro.clone().flatten(),
        author_username,
        author_id: input.author_id.clone().flatten(),
        main_image_url: input
            .main_image_url
            .clone()
            .flatten()
            .map(|url| cdn::storable_image_path(cdn_base_url, &url)),
        serving_suggestion: input.serving_suggestion.clone().flatten(),
        tips: input.tips.clone().flatten(),
        difficulty: input.difficulty.flatten(),
        servings: input.servings.flatten(),
        prep_time: input.prep_time.flatten(),
        cook_time: input.cook_time.flatten(),
        cooking_method: input.cooking_method.clone().flatten(),
        meal_type: input.meal_type.clone().flatten(),
        category,
        season: input.season.clone().flatten(),
        occasion: input.occasion.clone().flatten(),
        region: input.region.clone().flatten(),
    })
}

/// Turns validated partial input into changes; only submitted fields are set.
pub fn input_to_changes(input: &RecipeInput, cdn_base_url: &str) -> RecipeChanges {
    RecipeChanges {
        slug: input.slug.to_owned(),
        name: input.name.to_owned(),
        intro: input.intro.to_owned(),
        author_username: input.author_username.to_owned(),
        author_id: input.author_id.to_owned(),
        main_image_url: input.main_image_url.as_ref().map(|url| {
            url.as_deref()
                .map(|url| cdn::storable_image_path(cdn_base_url, url))
        }),
        serving_suggestion: input.serving_suggestion.to_owned(),
        tips: input.tips.to_owned(),
        difficulty: input.difficulty,
        servings: input.servings,
        prep_time: input.prep_time,
        cook_time: input.cook_time,
        cooking_method: input.cooking_method.to_owned(),
        meal_type: input.meal_type.to_owned(),
        category: input.category,
        season: input.season.to_owned(),
        occasion: input.occasion.to_owned(),
        region: input.region.to_owned(),
    }
}

/// Children submitted with a create. Ingredients without an explicit order
/// get 0.
pub fn input_to_children(input: &RecipeInput) -> NewChildren {
    let ingredients = input
        .ingredients
        .iter()
        .flatten()
        .map(|ingredient| NewIngredient {
            id: ingredient.id,
            quantity: ingredient.quantity.to_owned(),
            unit: ingredient.unit.to_owned(),
            name: ingredient.name.to_owned(),
            order: ingredient.order.unwrap_or(0),
        })
        .collect();

    let preparation_steps = input
        .preparation_steps
        .iter()
        .flatten()
        .map(|step| NewPreparationStep {
            id: step.id,
            step_number: step.step_number,
            description: step.description.to_owned(),
        })
        .collect();

    NewChildren {
        ingredients,
        preparation_steps,
    }
}

/// Every scalar of a transfer object as a change set, with the image URL
/// mapped back to its stored path.
pub fn transfer_object_to_changes(dto: &RecipeDto, cdn_base_url: &str) -> RecipeChanges {
    RecipeChanges {
        slug: Some(dto.slug.to_owned()),
        name: Some(dto.name.to_owned()),
        intro: Some(dto.intro.to_owned()),
        author_username: Some(dto.author_username.to_owned()),
        author_id: Some(dto.author_id.to_owned()),
        main_image_url: Some(
            dto.main_image_url
                .as_deref()
                .map(|url| cdn::storable_image_path(cdn_base_url, url)),
        ),
        serving_suggestion: Some(dto.serving_suggestion.to_owned()),
        tips: Some(dto.tips.to_owned()),
        difficulty: Some(dto.difficulty),
        servings: Some(dto.servings),
        prep_time: Some(dto.prep_time),
        cook_time: Some(dto.cook_time),
        cooking_method: Some(dto.cooking_method.to_owned()),
        meal_type: Some(dto.meal_type.to_owned()),
        category: Some(dto.category),
        season: Some(dto.season.to_owned()),
        occasion: Some(dto.occasion.to_owned()),
        region: Some(dto.region.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Difficulty, RecipeCategory};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const BASE: &str = "http://localhost:3000";

    fn row() -> RecipeRow {
        let created = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        RecipeRow {
            id: Uuid::new_v4(),
            slug: String::from("zabe-na-dalmatinski"),
            name: String::from("Žabe na dalmatinski način"),
            intro: Some(String::from("Tradicionalni dalmatinski recept")),
            author_username: String::from("loveangels"),
            author_id: None,
            cdn_path: Some(String::from("/recipes/zabe-na-dalmatinski/hero.webp")),
            serving_suggestion: None,
            tips: Some(String::from("Ne prekuhati")),
            difficulty: Some(Difficulty::Medium),
            servings: Some(4),
            prep_time: Some(20),
            cook_time: Some(40),
            cooking_method: Some(String::from("Kuhanje")),
            meal_type: None,
            category: RecipeCategory::GlavnaJela,
            season: Some(String::from("Ljeto")),
            occasion: None,
            region: Some(String::from("Hrvatska")),
            created_at: created,
            updated_at: created,
        }
    }

    fn ingredient(recipe_id: Uuid, name: &str, order: i32) -> IngredientRow {
        IngredientRow {
            id: Uuid::new_v4(),
            recipe_id,
            quantity: String::from("1"),
            unit: None,
            name: name.to_string(),
            order,
        }
    }

    fn step(recipe_id: Uuid, step_number: i32) -> PreparationStepRow {
        PreparationStepRow {
            id: Uuid::new_v4(),
            recipe_id,
            step_number,
            description: format!("Korak {step_number}"),
        }
    }

    #[test]
    fn row_to_entity_keeps_given_child_order() {
        let row = row();
        let id = row.id;
        let recipe = row_to_entity(
            row,
            vec![ingredient(id, "Luk", 2), ingredient(id, "Žabe", 1)],
            vec![step(id, 2), step(id, 1)],
        );

        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Luk", "Žabe"]);
        assert_eq!(recipe.preparation_steps[0].step_number, 2);
        assert_eq!(
            recipe.main_image_url.as_deref(),
            Some("/recipes/zabe-na-dalmatinski/hero.webp")
        );
        assert_eq!(recipe.total_time(), Some(60));
        assert!(recipe.is_in_category(RecipeCategory::GlavnaJela));
    }

    #[test]
    fn transfer_object_expands_image_path_only() {
        let row = row();
        let id = row.id;
        let recipe = row_to_entity(row, vec![ingredient(id, "Žabe", 1)], vec![step(id, 1)]);
        let dto = entity_to_transfer_object(&recipe, BASE);

        assert_eq!(
            dto.main_image_url.as_deref(),
            Some("http://localhost:3000/api/cdn/recipes/zabe-na-dalmatinski/hero.webp")
        );
        assert_eq!(recipe.main_image_url.as_deref(), Some("/recipes/zabe-na-dalmatinski/hero.webp"));
        assert_eq!(dto.name, recipe.name);
        assert_eq!(dto.ingredients[0].recipe_id, id);
        assert_eq!(dto.preparation_steps[0].description, "Korak 1");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["authorUsername"], "loveangels");
        assert_eq!(json["category"], "GLAVNA_JELA");
        assert_eq!(json["difficulty"], "MEDIUM");
        assert_eq!(json["preparationSteps"][0]["stepNumber"], 1);
    }

    #[test]
    fn create_input_projects_scalars() {
        let mut draft = RecipeDraft::new("test-recipe", "Test Recipe", "testuser", RecipeCategory::Deserti);
        draft.main_image_url = Some(String::from("/cdn/test.jpg"));
        draft.servings = Some(4);

        let input = entity_to_create_input(&draft);
        assert_eq!(input.slug, "test-recipe");
        assert_eq!(input.cdn_path.as_deref(), Some("/cdn/test.jpg"));
        assert_eq!(input.servings, Some(4));
        assert_eq!(input.intro, None);
        assert_eq!(input.category, RecipeCategory::Deserti);
    }

    #[test]
    fn update_input_leaves_unmentioned_fields_alone() {
        let changes = RecipeChanges {
            name: Some(String::from("Updated Recipe")),
            main_image_url: Some(Some(String::from("/cdn/updated.jpg"))),
            tips: Some(None),
            ..Default::default()
        };

        let update = entity_to_update_input(&changes);
        assert_eq!(update.name.as_deref(), Some("Updated Recipe"));
        assert_eq!(update.cdn_path, Some(Some(String::from("/cdn/updated.jpg"))));
        assert_eq!(update.tips, Some(None));
        assert_eq!(update.intro, None);
        assert_eq!(update.slug, None);
        assert_eq!(update.category, None);
    }

    #[test]
    fn transfer_object_round_trip_changes_nothing() {
        let row = row();
        let recipe = row_to_entity(row.clone(), vec![], vec![]);
        let dto = entity_to_transfer_object(&recipe, BASE);
        let update = entity_to_update_input(&transfer_object_to_changes(&dto, BASE));

        assert_eq!(update.slug.as_deref(), Some(row.slug.as_str()));
        assert_eq!(update.cdn_path, Some(row.cdn_path.clone()));
        assert_eq!(update.intro, Some(row.intro.clone()));
        assert_eq!(update.author_id, Some(None));
        assert_eq!(update.difficulty, Some(row.difficulty));
        assert_eq!(update.servings, Some(row.servings));
    }

    #[test]
    fn draft_requires_the_create_fields() {
        let input = RecipeInput {
            name: Some(String::from("Juha")),
            ..Default::default()
        };

        let error = input_to_draft(&input, String::from("juha-1"), BASE).unwrap_err();
        assert_eq!(error.issues.len(), 2);
        assert!(error.has_issue_at(&["authorUsername"]));
        assert!(error.has_issue_at(&["category"]));
    }

    #[test]
    fn draft_stores_cdn_urls_as_paths() {
        let input = RecipeInput {
            name: Some(String::from("Juha")),
            author_username: Some(String::from("chef")),
            category: Some(RecipeCategory::Juhe),
            main_image_url: Some(Some(String::from(
                "http://localhost:3000/api/cdn/recipes/juha/hero.webp",
            ))),
            intro: Some(None),
            ..Default::default()
        };

        let draft = input_to_draft(&input, String::from("juha-1"), BASE).unwrap();
        assert_eq!(draft.main_image_url.as_deref(), Some("/recipes/juha/hero.webp"));
        assert_eq!(draft.intro, None);
        assert_eq!(draft.slug, "juha-1");
    }

    #[test]
    fn children_default_to_order_zero() {
        let input = RecipeInput {
            ingredients: Some(vec![crate::validation::IngredientInput {
                id: None,
                quantity: String::from("2"),
                unit: Some(String::from("kom")),
                name: String::from("Jaja"),
                order: None,
            }]),
            ..Default::default()
        };

        let children = input_to_children(&input);
        assert_eq!(children.ingredients[0].order, 0);
        assert!(children.preparation_steps.is_empty());
    }
}
