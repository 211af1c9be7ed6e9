use serde_json::Value;
use uuid::Uuid;

use crate::{
    constants::RECIPE_NAME_MAX_LENGTH,
    error::{FieldIssue, ValidationError},
    form::{Form, Presence},
    schema::{Difficulty, RecipeCategory},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Every field becomes optional; present fields are still checked.
    pub partial: bool,
}

impl ValidateOptions {
    pub fn full() -> Self {
        Self { partial: false }
    }

    pub fn partial() -> Self {
        Self { partial: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientInput {
    pub id: Option<Uuid>,
    pub quantity: String,
    pub unit: Option<String>,
    pub name: String,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparationStepInput {
    pub id: Option<Uuid>,
    pub step_number: i32,
    pub description: String,
}

/// A recipe body that passed validation.
///
/// Outer `None` means the field was not submitted. For nullable fields the
/// inner `None` is an explicit `null`. In full mode `name`,
/// `author_username` and `category` are always `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub slug: Option<String>,
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
    pub ingredients: Option<Vec<IngredientInput>>,
    pub preparation_steps: Option<Vec<PreparationStepInput>>,
}

fn required(partial: bool, message: &'static str) -> Presence {
    if partial {
        Presence::NonNull
    } else {
        Presence::Required(message)
    }
}

fn text(form: &mut Form, key: &str) -> Option<Option<String>> {
    form.get_str(key, Presence::Nullable, 0, None, "")
}

/// Checks an untyped recipe body and returns it typed, or every violation.
pub fn validate_recipe_input(
    input: &Value,
    options: ValidateOptions,
) -> Result<RecipeInput, ValidationError> {
    let Some(data) = input.as_object() else {
        return Err(ValidationError::single(FieldIssue::new(
            vec![],
            "Expected object",
        )));
    };

    let partial = options.partial;
    let mut form = Form::from_data(data);

    let name_required = "Recipe name is required";
    let author_required = "Author username is required";
    let category_required = "Recipe category is required";

    let input = RecipeInput {
        name: form
            .get_str(
                "name",
                required(partial, name_required),
                1,
                Some(RECIPE_NAME_MAX_LENGTH),
                name_required,
            )
            .flatten(),
        slug: form
            .get_str("slug", Presence::NonNull, 1, None, "Slug must not be empty")
            .flatten(),
        intro: text(&mut form, "intro"),
        author_username: form
            .get_str(
                "authorUsername",
                required(partial, author_required),
                1,
                None,
                author_required,
            )
            .flatten(),
        author_id: text(&mut form, "authorId"),
        main_image_url: form.get_url("mainImageUrl", Presence::Nullable),
        serving_suggestion: text(&mut form, "servingSuggestion"),
        tips: text(&mut form, "tips"),
        difficulty: form.get_value("difficulty", Presence::Nullable),
        servings: form.get_number(
            "servings",
            Presence::Nullable,
            1,
            "Number must be greater than 0",
        ),
        prep_time: form.get_number(
            "prepTime",
            Presence::Nullable,
            0,
            "Number must be greater than or equal to 0",
        ),
        cook_time: form.get_number(
            "cookTime",
            Presence::Nullable,
            0,
            "Number must be greater than or equal to 0",
        ),
        cooking_method: text(&mut form, "cookingMethod"),
        meal_type: text(&mut form, "mealType"),
        category: form
            .get_value("category", required(partial, category_required))
            .flatten(),
        season: text(&mut form, "season"),
        occasion: text(&mut form, "occasion"),
        region: text(&mut form, "region"),
        ingredients: validate_ingredients(&mut form),
        preparation_steps: validate_preparation_steps(&mut form),
    };

    let issues = form.into_issues();
    if issues.is_empty() {
        Ok(input)
    } else {
        Err(ValidationError::new(issues))
    }
}

fn validate_ingredients(form: &mut Form) -> Option<Vec<IngredientInput>> {
    let objects = form.get_objects("ingredients")?;
    let mut ingredients = vec![];

    for (index, data) in objects {
        let mut child = Form::nested(data, vec!["ingredients".into(), index.into()]);
        if let Some(ingredient) = validate_ingredient(&mut child) {
            ingredients.push(ingredient);
        }
        form.extend(child.into_issues());
    }

    Some(ingredients)
}

fn validate_ingredient(form: &mut Form) -> Option<IngredientInput> {
    let quantity_required = "Quantity is required";
    let name_required = "Ingredient name is required";

    let id = form.get_uuid("id", Presence::NonNull);
    let quantity = form.get_str(
        "quantity",
        Presence::Required(quantity_required),
        1,
        None,
        quantity_required,
    );
    let unit = text(form, "unit");
    let name = form.get_str(
        "name",
        Presence::Required(name_required),
        1,
        None,
        name_required,
    );
    let order = form.get_number(
        "order",
        Presence::NonNull,
        0,
        "Number must be greater than or equal to 0",
    );

    Some(IngredientInput {
        id: id.flatten(),
        quantity: quantity.flatten()?,
        unit: unit.flatten(),
        name: name.flatten()?,
        order: order.flatten(),
    })
}

fn validate_preparation_steps(form: &mut Form) -> Option<Vec<PreparationStepInput>> {
    let objects = form.get_objects("preparationSteps")?;
    let mut steps = vec![];

    for (index, data) in objects {
        let mut child = Form::nested(data, vec!["preparationSteps".into(), index.into()]);
        if let Some(step) = validate_preparation_step(&mut child) {
            steps.push(step);
        }
        form.extend(child.into_issues());
    }

    Some(steps)
}

fn validate_preparation_step(form: &mut Form) -> Option<PreparationStepInput> {
    let description_required = "Step description is required";

    let id = form.get_uuid("id", Presence::NonNull);
    let step_number = form.get_number(
        "stepNumber",
        Presence::Required("Step number is required"),
        1,
        "Number must be greater than or equal to 1",
    );
    let description = form.get_str(
        "description",
        Presence::Required(description_required),
        1,
        None,
        description_required,
    );

    Some(PreparationStepInput {
        id: id.flatten(),
        step_number: step_number.flatten()?,
        description: description.flatten()?,
    })
}

/// Parses a JSON body that may not even be well formed.
pub fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|e| {
        ValidationError::single(FieldIssue::new(vec![], format!("Invalid JSON: {e}")))
    })
}
