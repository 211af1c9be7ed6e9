//! State behind the recipe list page. Each page session owns its own
//! [`RecipeListState`] and advances it with [`reduce`].

use crate::{model::RecipeDto, schema::RecipeCategory};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeListState {
    pub recipes: Vec<RecipeDto>,
    /// Id of the selected recipe.
    pub selected: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecipeListEvent {
    LoadStarted,
    Loaded(Vec<RecipeDto>),
    LoadFailed(String),
    Selected(Option<String>),
    Removed(String),
}

fn is_listed(recipes: &[RecipeDto], id: &str) -> bool {
    recipes.iter().any(|recipe| recipe.id.to_string() == id)
}

pub fn reduce(state: RecipeListState, event: RecipeListEvent) -> RecipeListState {
    match event {
        RecipeListEvent::LoadStarted => RecipeListState {
            is_loading: true,
            error: None,
            ..state
        },
        RecipeListEvent::Loaded(recipes) => {
            let selected = state
                .selected
                .filter(|id| is_listed(&recipes, id));
            RecipeListState {
                recipes,
                selected,
                is_loading: false,
                error: None,
            }
        }
        RecipeListEvent::LoadFailed(error) => RecipeListState {
            is_loading: false,
            error: Some(error),
            ..state
        },
        RecipeListEvent::Selected(selected) => {
            let selected = selected.filter(|id| is_listed(&state.recipes, id));
            RecipeListState { selected, ..state }
        }
        RecipeListEvent::Removed(id) => {
            let recipes: Vec<RecipeDto> = state
                .recipes
                .into_iter()
                .filter(|recipe| recipe.id.to_string() != id)
                .collect();
            let selected = state.selected.filter(|selected| *selected != id);
            RecipeListState {
                recipes,
                selected,
                ..state
            }
        }
    }
}

impl RecipeListState {
    pub fn selected_recipe(&self) -> Option<&RecipeDto> {
        let selected = self.selected.as_deref()?;
        self.recipes
            .iter()
            .find(|recipe| recipe.id.to_string() == selected)
    }

    pub fn in_category(&self, category: RecipeCategory) -> Vec<&RecipeDto> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.category == category)
            .collect()
    }
}

/// `"45 min"`, as recipe cards show preparation and cooking times.
pub fn format_minutes(minutes: Option<i32>) -> Option<String> {
    minutes.map(|minutes| format!("{minutes} min"))
}
