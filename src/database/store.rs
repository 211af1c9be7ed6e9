use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreError,
    schema::{NewChildren, NewRecipe, RecipeRecord, RecipeUpdate},
};

/// Query interface of the relational store holding recipes.
///
/// Child rows may come back in any order; sorting them is the caller's job.
/// Deleting a recipe removes its children.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecipeRecord>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<RecipeRecord>, StoreError>;

    /// Every recipe, newest first.
    async fn list_recent(&self) -> Result<Vec<RecipeRecord>, StoreError>;

    /// Inserts the recipe and all of its children as one unit.
    async fn insert_nested(
        &self,
        recipe: NewRecipe,
        children: NewChildren,
    ) -> Result<RecipeRecord, StoreError>;

    /// Writes the columns set in `update`. `Ok(None)` if no row has `id`.
    async fn update_scalars(
        &self,
        id: Uuid,
        update: RecipeUpdate,
    ) -> Result<Option<RecipeRecord>, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no row has `id`.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
