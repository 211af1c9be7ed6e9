use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::StoreError,
    schema::{
        IngredientRow, NewChildren, NewRecipe, PreparationStepRow, RecipeRecord, RecipeRow,
        RecipeUpdate,
    },
    store::RecipeStore,
};

const INGREDIENT_ORDER: &str = "\"order\" ASC, position ASC";

/// [`RecipeStore`] backed by Postgres through a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("{e}")))
    }

    /// Number of ingredient and step rows still referencing `recipe_id`.
    pub async fn count_children(&self, recipe_id: Uuid) -> Result<(i64, i64), StoreError> {
        let counts: (i64, i64) = sqlx::query_as(
            "
            SELECT
                (SELECT COUNT(*) FROM ingredients WHERE recipe_id = $1),
                (SELECT COUNT(*) FROM preparation_steps WHERE recipe_id = $1)
        ",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn with_children(&self, rows: Vec<RecipeRow>) -> Result<Vec<RecipeRecord>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let ingredients: Vec<IngredientRow> = sqlx::query_as(&format!(
            "SELECT * FROM ingredients WHERE recipe_id = ANY($1) ORDER BY {INGREDIENT_ORDER}"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let steps: Vec<PreparationStepRow> = sqlx::query_as(
            "SELECT * FROM preparation_steps WHERE recipe_id = ANY($1) ORDER BY step_number ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut ingredient_map: HashMap<Uuid, Vec<IngredientRow>> = HashMap::new();
        ingredients.into_iter().for_each(|ingredient| {
            ingredient_map
                .entry(ingredient.recipe_id)
                .or_default()
                .push(ingredient)
        });

        let mut step_map: HashMap<Uuid, Vec<PreparationStepRow>> = HashMap::new();
        steps
            .into_iter()
            .for_each(|step| step_map.entry(step.recipe_id).or_default().push(step));

        Ok(rows
            .into_iter()
            .map(|recipe| RecipeRecord {
                ingredients: ingredient_map.remove(&recipe.id).unwrap_or_default(),
                preparation_steps: step_map.remove(&recipe.id).unwrap_or_default(),
                recipe,
            })
            .collect())
    }

    async fn with_children_single(
        &self,
        row: Option<RecipeRow>,
    ) -> Result<Option<RecipeRecord>, StoreError> {
        match row {
            Some(row) => Ok(self.with_children(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

fn push_assignment<'args, T>(
    query_builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
{
    if let Some(value) = value {
        query_builder.push(format!(", {column} = ")).push_bind(value);
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecipeRecord>, StoreError> {
        let row: Option<RecipeRow> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        self.with_children_single(row).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<RecipeRecord>, StoreError> {
        let row: Option<RecipeRow> = sqlx::query_as("SELECT * FROM recipes WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        self.with_children_single(row).await
    }

    async fn list_recent(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        let rows: Vec<RecipeRow> =
            sqlx::query_as("SELECT * FROM recipes ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        self.with_children(rows).await
    }

    async fn insert_nested(
        &self,
        recipe: NewRecipe,
        children: NewChildren,
    ) -> Result<RecipeRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: RecipeRow = sqlx::query_as(
            "
            INSERT INTO recipes (
                id, slug, name, intro, author_username, author_id, cdn_path,
                serving_suggestion, tips, difficulty, servings, prep_time, cook_time,
                cooking_method, meal_type, category, season, occasion, region
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
        ",
        )
        .bind(Uuid::new_v4())
        .bind(recipe.slug)
        .bind(recipe.name)
        .bind(recipe.intro)
        .bind(recipe.author_username)
        .bind(recipe.author_id)
        .bind(recipe.cdn_path)
        .bind(recipe.serving_suggestion)
        .bind(recipe.tips)
        .bind(recipe.difficulty)
        .bind(recipe.servings)
        .bind(recipe.prep_time)
        .bind(recipe.cook_time)
        .bind(recipe.cooking_method)
        .bind(recipe.meal_type)
        .bind(recipe.category)
        .bind(recipe.season)
        .bind(recipe.occasion)
        .bind(recipe.region)
        .fetch_one(&mut *tx)
        .await?;

        let recipe_id = row.id;

        let ingredients: Vec<IngredientRow> = if children.ingredients.is_empty() {
            vec![]
        } else {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO ingredients (id, recipe_id, quantity, unit, name, \"order\", position) ",
            );

            query_builder.push_values(
                children.ingredients.into_iter().zip(0_i32..),
                |mut b, (ingredient, position)| {
                    b.push_bind(ingredient.id.unwrap_or_else(Uuid::new_v4))
                        .push_bind(recipe_id)
                        .push_bind(ingredient.quantity)
                        .push_bind(ingredient.unit)
                        .push_bind(ingredient.name)
                        .push_bind(ingredient.order)
                        .push_bind(position);
                },
            );
            query_builder.build().execute(&mut *tx).await?;

            sqlx::query_as(&format!(
                "SELECT * FROM ingredients WHERE recipe_id = $1 ORDER BY {INGREDIENT_ORDER}"
            ))
            .bind(recipe_id)
            .fetch_all(&mut *tx)
            .await?
        };

        let preparation_steps: Vec<PreparationStepRow> = if children.preparation_steps.is_empty()
        {
            vec![]
        } else {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO preparation_steps (id, recipe_id, step_number, description) ",
            );

            query_builder.push_values(children.preparation_steps, |mut b, step| {
                b.push_bind(step.id.unwrap_or_else(Uuid::new_v4))
                    .push_bind(recipe_id)
                    .push_bind(step.step_number)
                    .push_bind(step.description);
            });
            query_builder.push(" RETURNING *");

            query_builder
                .build_query_as()
                .fetch_all(&mut *tx)
                .await?
        };

        tx.commit().await?;

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
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE recipes SET updated_at = now()");

        push_assignment(&mut query_builder, "slug", update.slug);
        push_assignment(&mut query_builder, "name", update.name);
        push_assignment(&mut query_builder, "intro", update.intro);
        push_assignment(&mut query_builder, "author_username", update.author_username);
        push_assignment(&mut query_builder, "author_id", update.author_id);
        push_assignment(&mut query_builder, "cdn_path", update.cdn_path);
        push_assignment(&mut query_builder, "serving_suggestion", update.serving_suggestion);
        push_assignment(&mut query_builder, "tips", update.tips);
        push_assignment(&mut query_builder, "difficulty", update.difficulty);
        push_assignment(&mut query_builder, "servings", update.servings);
        push_assignment(&mut query_builder, "prep_time", update.prep_time);
        push_assignment(&mut query_builder, "cook_time", update.cook_time);
        push_assignment(&mut query_builder, "cooking_method", update.cooking_method);
        push_assignment(&mut query_builder, "meal_type", update.meal_type);
        push_assignment(&mut query_builder, "category", update.category);
        push_assignment(&mut query_builder, "season", update.season);
        push_assignment(&mut query_builder, "occasion", update.occasion);
        push_assignment(&mut query_builder, "region", update.region);

        query_builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *");

        let row: Option<RecipeRow> = query_builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;

        self.with_children_single(row).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
