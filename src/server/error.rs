use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::errors::NutriError;

impl IntoResponse for NutriError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            NutriError::InvalidInput(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
            NutriError::NoIngredientsFound => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "No se pudieron identificar ingredientes en la descripción. Prueba a describir la comida con más detalle."
                }),
            ),
            NutriError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Se ha superado el límite de peticiones del servicio de IA. Usa otro token o espera unos minutos antes de volver a intentarlo.",
                    "type": "rate_limit",
                }),
            ),
            NutriError::Gateway { status, body } => {
                debug!(upstream_status = ?status, "reporting completion service failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Error en el servicio de IA. Inténtalo de nuevo.",
                        "details": body,
                    }),
                )
            }
            NutriError::Parse(m) => {
                debug!(error = %m, "reporting unparseable completion content");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "No se pudo interpretar la respuesta del servicio de IA. Inténtalo de nuevo." }),
                )
            }
            NutriError::Configuration(m) => {
                error!(error = %m, "service is misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "El servicio no está configurado correctamente." }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for NutriError {
    fn from(rejection: JsonRejection) -> Self {
        NutriError::InvalidInput(rejection.body_text())
    }
}
