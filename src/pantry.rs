//! "Surprise me" selection from a user's ingredient library.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::providers::CUISINES;

/// Category that supplies the main ingredient of a surprise pick
pub const MEAT_CATEGORY: &str = "肉类";

/// Most non-meat ingredients added to a surprise pick
pub const MAX_SIDE_INGREDIENTS: usize = 4;

/// An entry of a user's ingredient library, e.g. `{"name": "番茄", "category": "蔬菜"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItem {
    pub name: String,
    pub category: String,
}

/// Randomly chosen ingredients and cuisine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurprisePick {
    pub ingredients: Vec<String>,
    pub cuisine: String,
}

/// Pick one meat (when the pantry has any), up to four other ingredients and
/// a cuisine. Returns `None` for an empty pantry.
pub fn surprise_selection<R: Rng + ?Sized>(items: &[PantryItem], rng: &mut R) -> Option<SurprisePick> {
    let (meats, others): (Vec<&PantryItem>, Vec<&PantryItem>) =
        items.iter().partition(|item| item.category == MEAT_CATEGORY);

    let mut ingredients = Vec::new();
    if let Some(meat) = meats.choose(rng) {
        ingredients.push(meat.name.clone());
    }

    let mut others = others;
    others.shuffle(rng);
    ingredients.extend(
        others
            .into_iter()
            .take(MAX_SIDE_INGREDIENTS)
            .map(|item| item.name.clone()),
    );

    if ingredients.is_empty() {
        return None;
    }

    let cuisine = CUISINES.choose(rng).unwrap_or(&CUISINES[0]).to_string();
    Some(SurprisePick {
        ingredients,
        cuisine,
    })
}
