use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api_connection::endpoints::{ChatCompletionResponse, ChatMessage, CompletionOptions};
use crate::errors::{NutriError, Result};
use crate::gateway::CompletionGateway;

/// One food component of a meal with its estimated macros for one serving.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    /// Natural quantity expression, e.g. "2 huevos grandes".
    pub name: String,
    /// Grams or millilitres.
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Deserialize)]
struct IngredientsPayload {
    ingredients: Vec<Ingredient>,
}

pub const MEAL_ANALYSIS_SYSTEM_PROMPT: &str = "Eres un nutricionista experto en análisis de recetas y platos. \
Recibirás la descripción libre de una comida y debes estimar sus ingredientes y su valor nutricional.

Sigue estas reglas de estimación:
1. Interpreta la descripción como UNA receta o plato completo, no como palabras aisladas.
2. Asume una sola ración para una persona adulta.
3. Usa cantidades de referencia estándar para los ingredientes principales (por ejemplo, unos 150 g para una ración de proteína) y cantidades proporcionales para los acompañamientos.
4. Cada nombre de ingrediente DEBE incluir una expresión natural de cantidad: unidades contables (\"2 huevos\"), raciones (\"1 ración de arroz (150g)\") o medidas de cocina (\"2 cucharadas de aceite\").
5. Calcula los valores nutricionales según el peso real en gramos o mililitros: escala el valor de referencia por 100 g multiplicándolo por (peso_real / 100).
6. Redondea todos los valores nutricionales a 1 decimal.
7. Incluye los ingredientes de preparación (aceite, sal) e infiere un método de cocción plausible cuando corresponda. Si la descripción es ambigua, elige la interpretación culinaria más común. No inventes ingredientes inverosímiles; usa valores nutricionales estándar de la categoría del alimento.

Responde ÚNICAMENTE con un objeto JSON con esta forma exacta:
{\"ingredients\": [{\"name\": string, \"quantity\": number, \"calories\": number, \"protein\": number, \"carbs\": number, \"fat\": number}]}
donde \"quantity\" está en gramos o mililitros, \"calories\" en kcal y \"protein\", \"carbs\" y \"fat\" en gramos.";

pub fn build_meal_messages(description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(MEAL_ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Analiza la siguiente comida y devuelve sus ingredientes con su información nutricional: {description}"
        )),
    ]
}

/// Turns a free-text meal description into structured ingredients.
#[derive(Clone)]
pub struct MealAnalyzer {
    gateway: Arc<CompletionGateway>,
    options: CompletionOptions,
}

impl MealAnalyzer {
    pub fn new(gateway: Arc<CompletionGateway>) -> Self {
        let options = CompletionOptions::meal_analysis(gateway.analyzer_model());
        Self { gateway, options }
    }

    #[instrument(skip_all)]
    pub async fn analyze(&self, description: &str) -> Result<Vec<Ingredient>> {
        let description = description.trim();
        if description.is_empty() {
            return Err(NutriError::InvalidInput(
                "meal description is empty".to_string(),
            ));
        }

        let body = self
            .gateway
            .complete(build_meal_messages(description), &self.options)
            .await?;

        parse_ingredients(body)
    }
}

/// Extracts and validates the ingredient list from a raw completion body.
pub fn parse_ingredients(body: Value) -> Result<Vec<Ingredient>> {
    let response: ChatCompletionResponse = serde_json::from_value(body).map_err(|e| {
        warn!(error = %e, "completion body has an unexpected shape");
        NutriError::Parse(format!("unexpected completion body: {e}"))
    })?;

    let content = response.first_content().ok_or_else(|| {
        warn!("completion body has no message content");
        NutriError::Parse("completion has no message content".to_string())
    })?;
    info!(content = %content, "raw meal analysis content");
    if response.was_truncated() {
        warn!("meal analysis stopped at the token limit; ingredient list may be cut off");
    }

    let payload: Value = serde_json::from_str(strip_code_fences(content)).map_err(|e| {
        warn!(error = %e, content = %content, "meal analysis content is not valid JSON");
        NutriError::Parse(e.to_string())
    })?;

    let ingredients = match payload.get("ingredients") {
        Some(Value::Array(items)) if !items.is_empty() => {
            serde_json::from_value::<IngredientsPayload>(payload)
                .map(|p| p.ingredients)
                .map_err(|e| {
                    warn!(error = %e, "ingredient list is malformed");
                    NutriError::NoIngredientsFound
                })?
        }
        _ => return Err(NutriError::NoIngredientsFound),
    };

    Ok(ingredients)
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
