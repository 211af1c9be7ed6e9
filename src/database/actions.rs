use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{RecipeError, StoreError},
    mapper,
    model::RecipeDto,
    repository::{RecipeRepository, Resolution},
    slug::SlugGenerator,
    store::RecipeStore,
    validation::{validate_recipe_input, ValidateOptions},
};

/// Operations exposed to boundary handlers. Input arrives untyped, output
/// leaves as transfer objects, failures as [`RecipeError`].
pub struct RecipeActions<S> {
    repository: RecipeRepository<S>,
    slugs: Arc<SlugGenerator>,
}

impl<S> Clone for RecipeActions<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            slugs: self.slugs.clone(),
        }
    }
}

fn conflict_or_store(error: StoreError, slug: &str) -> RecipeError {
    match error {
        StoreError::UniqueViolation(constraint) if constraint.contains("slug") => {
            RecipeError::Conflict(slug.to_string())
        }
        e => RecipeError::Store(e),
    }
}

impl<S: RecipeStore> RecipeActions<S> {
    pub fn new(store: Arc<S>, cdn_base_url: impl Into<String>) -> Self {
        Self {
            repository: RecipeRepository::new(store, cdn_base_url),
            slugs: Arc::new(SlugGenerator::new()),
        }
    }

    pub fn repository(&self) -> &RecipeRepository<S> {
        &self.repository
    }

    async fn resolve(&self, id_or_slug: &str) -> Result<Resolution, RecipeError> {
        match self.repository.resolve(id_or_slug).await? {
            Resolution::Unresolved => Err(RecipeError::NotFound),
            resolution => Ok(resolution),
        }
    }

    async fn ensure_slug_free(&self, slug: &str) -> Result<(), RecipeError> {
        match self.repository.get_by_slug(slug).await? {
            Some(_) => Err(RecipeError::Conflict(slug.to_string())),
            None => Ok(()),
        }
    }

    /// Every recipe, newest first.
    pub async fn list(&self) -> Result<Vec<RecipeDto>, RecipeError> {
        Ok(self.repository.get_all_dto().await?)
    }

    pub async fn get(&self, id_or_slug: &str) -> Result<RecipeDto, RecipeError> {
        let resolution = self.resolve(id_or_slug).await?;
        let recipe = resolution.recipe().ok_or(RecipeError::NotFound)?;

        Ok(self.repository.to_dto(recipe))
    }

    /// Validates `input` in full, generates a slug from the name unless one is
    /// given, and refuses slugs that are already taken.
    pub async fn create(&self, input: &Value) -> Result<RecipeDto, RecipeError> {
        let input = validate_recipe_input(input, ValidateOptions::full())?;

        let slug = match (&input.slug, &input.name) {
            (Some(slug), _) => slug.to_owned(),
            (None, Some(name)) => self.slugs.generate(name),
            (None, None) => self.slugs.generate(""),
        };
        self.ensure_slug_free(&slug).await?;

        let draft = mapper::input_to_draft(&input, slug, self.repository.cdn_base_url())?;
        let children = mapper::input_to_children(&input);

        let recipe = self
            .repository
            .create(&draft, children)
            .await
            .map_err(|e| conflict_or_store(e, &draft.slug))?;

        log::info!("Created recipe '{}' ({})", recipe.slug, recipe.id);
        Ok(self.repository.to_dto(&recipe))
    }

    /// Applies the submitted fields only. Children are not touched.
    pub async fn update(&self, id_or_slug: &str, input: &Value) -> Result<RecipeDto, RecipeError> {
        let input = validate_recipe_input(input, ValidateOptions::partial())?;
        let existing = self
            .resolve(id_or_slug)
            .await?
            .into_recipe()
            .ok_or(RecipeError::NotFound)?;

        let changes = mapper::input_to_changes(&input, self.repository.cdn_base_url());
        if let Some(slug) = &changes.slug {
            if *slug != existing.slug {
                self.ensure_slug_free(slug).await?;
            }
        }

        let slug = changes.slug.as_deref().unwrap_or(&existing.slug);
        let recipe = self
            .repository
            .update(existing.id, &changes)
            .await
            .map_err(|e| conflict_or_store(e, slug))?
            .ok_or(RecipeError::NotFound)?;

        log::info!("Updated recipe '{}' ({})", recipe.slug, recipe.id);
        Ok(self.repository.to_dto(&recipe))
    }

    pub async fn delete(&self, id_or_slug: &str) -> Result<(), RecipeError> {
        let existing = self
            .resolve(id_or_slug)
            .await?
            .into_recipe()
            .ok_or(RecipeError::NotFound)?;

        self.repository
            .delete(existing.id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => RecipeError::NotFound,
                e => RecipeError::Store(e),
            })?;

        log::info!("Deleted recipe '{}' ({})", existing.slug, existing.id);
        Ok(())
    }
}
