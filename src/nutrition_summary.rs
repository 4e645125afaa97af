use serde::{Deserialize, Serialize};

use crate::meal_analyzer::Ingredient;

/// Summed macros for one analyzed meal, rounded to one decimal.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MealTotals {
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MealTotals {
    pub fn from_ingredients(ingredients: &[Ingredient]) -> Self {
        let raw = ingredients.iter().fold(Self::default(), |acc, ingredient| Self {
            quantity: acc.quantity + ingredient.quantity,
            calories: acc.calories + ingredient.calories,
            protein: acc.protein + ingredient.protein,
            carbs: acc.carbs + ingredient.carbs,
            fat: acc.fat + ingredient.fat,
        });

        Self {
            quantity: round1(raw.quantity),
            calories: round1(raw.calories),
            protein: round1(raw.protein),
            carbs: round1(raw.carbs),
            fat: round1(raw.fat),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// CLI output: the ingredient list plus its totals.
#[derive(Debug, Serialize, Clone)]
pub struct MealReport {
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub totals: MealTotals,
}

impl MealReport {
    pub fn new(description: &str, ingredients: Vec<Ingredient>) -> Self {
        let totals = MealTotals::from_ingredients(&ingredients);
        Self {
            description: description.trim().to_string(),
            ingredients,
            totals,
        }
    }
}
