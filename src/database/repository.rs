use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::StoreError,
    mapper,
    model::{Recipe, RecipeChanges, RecipeDraft, RecipeDto},
    schema::{NewChildren, RecipeRecord},
    store::RecipeStore,
};

/// Outcome of looking a recipe up by a value that may be an id or a slug.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    ById(Recipe),
    BySlug(Recipe),
    Unresolved,
}

impl Resolution {
    /// Which lookup matched, for logging.
    pub fn path(&self) -> &'static str {
        match self {
            Resolution::ById(_) => "id",
            Resolution::BySlug(_) => "slug",
            Resolution::Unresolved => "none",
        }
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            Resolution::ById(recipe) | Resolution::BySlug(recipe) => Some(recipe),
            Resolution::Unresolved => None,
        }
    }

    pub fn into_recipe(self) -> Option<Recipe> {
        match self {
            Resolution::ById(recipe) | Resolution::BySlug(recipe) => Some(recipe),
            Resolution::Unresolved => None,
        }
    }
}

/// Sole owner of store access for recipes. Returns entities (or transfer
/// objects for the `_dto` variants), never raw rows, with ingredients sorted
/// by `order` and steps by `step_number`.
pub struct RecipeRepository<S> {
    store: Arc<S>,
    cdn_base_url: String,
}

impl<S> Clone for RecipeRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cdn_base_url: self.cdn_base_url.clone(),
        }
    }
}

fn into_entity(record: RecipeRecord) -> Recipe {
    let RecipeRecord {
        recipe,
        mut ingredients,
        mut preparation_steps,
    } = record;

    ingredients.sort_by_key(|ingredient| ingredient.order);
    preparation_steps.sort_by_key(|step| step.step_number);

    mapper::row_to_entity(recipe, ingredients, preparation_steps)
}

impl<S: RecipeStore> RecipeRepository<S> {
    pub fn new(store: Arc<S>, cdn_base_url: impl Into<String>) -> Self {
        Self {
            store,
            cdn_base_url: cdn_base_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn cdn_base_url(&self) -> &str {
        &self.cdn_base_url
    }

    pub fn to_dto(&self, recipe: &Recipe) -> RecipeDto {
        mapper::entity_to_transfer_object(recipe, &self.cdn_base_url)
    }

    /// Every recipe, newest first.
    pub async fn get_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let records = self.store.list_recent().await?;
        Ok(records.into_iter().map(into_entity).collect())
    }

    pub async fn get_all_dto(&self) -> Result<Vec<RecipeDto>, StoreError> {
        let recipes = self.get_all().await?;
        Ok(mapper::entities_to_transfer_objects(
            &recipes,
            &self.cdn_base_url,
        ))
    }

    /// A value that is not a UUID cannot name any recipe and yields `None`.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        Ok(self.store.find_by_id(id).await?.map(into_entity))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.store.find_by_slug(slug).await?.map(into_entity))
    }

    /// Inserts the recipe and its children together and returns it fully loaded.
    pub async fn create(
        &self,
        draft: &RecipeDraft,
        children: NewChildren,
    ) -> Result<Recipe, StoreError> {
        let record = self
            .store
            .insert_nested(mapper::entity_to_create_input(draft), children)
            .await?;

        Ok(into_entity(record))
    }

    /// Writes only the fields set in `changes`; children are left alone.
    /// `None` if no recipe has `id`.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, StoreError> {
        let update = mapper::entity_to_update_input(changes);
        let record = if update.is_empty() {
            self.store.find_by_id(id).await?
        } else {
            self.store.update_scalars(id, update).await?
        };

        Ok(record.map(into_entity))
    }

    /// Children go with the recipe. Deleting an absent id fails with
    /// [`StoreError::NotFound`].
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.delete(id).await
    }

    /// Tries `value` as an id first, then as a slug.
    pub async fn resolve(&self, value: &str) -> Result<Resolution, StoreError> {
        let resolution = if let Some(recipe) = self.get_by_id(value).await? {
            Resolution::ById(recipe)
        } else if let Some(recipe) = self.get_by_slug(value).await? {
            Resolution::BySlug(recipe)
        } else {
            Resolution::Unresolved
        };

        log::debug!("Resolved recipe '{}' by {}", value, resolution.path());
        Ok(resolution)
    }
}
