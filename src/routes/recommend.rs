use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{RecommendError, Recommender};
use crate::models::{ErrorResponse, HealthResponse, RecommendRequest, RecommendResponse};
use crate::services::PreferenceStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<dyn PreferenceStore>,
}

/// Configure recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/groups/{group_id}/recommend", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend restaurants for a group
///
/// POST /api/v1/groups/{group_id}/recommend
///
/// Optional request body:
/// ```json
/// { "limit": 5 }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let group_id = path.into_inner();

    // An empty body means defaults
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RecommendRequest::default()
    } else {
        match serde_json::from_slice::<RecommendRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!("Invalid JSON body for group {}: {}", group_id, e);
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "invalid_json".to_string(),
                    message: format!("Invalid JSON: {}", e),
                    status_code: 400,
                    preferences: None,
                });
            }
        }
    };

    if let Err(errors) = request.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
            preferences: None,
        });
    }

    let limit = request.limit.map(usize::from);

    match state.recommender.recommend(&group_id, limit).await {
        Ok(result) => {
            tracing::info!(
                "Group {}: {} recommendations from {} candidates",
                group_id,
                result.recommendations.len(),
                result.total_candidates
            );
            HttpResponse::Ok().json(RecommendResponse {
                message: format!("Found {} restaurant recommendations", result.recommendations.len()),
                recommendations: result.recommendations,
                preferences: result.profile,
            })
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &RecommendError) -> HttpResponse {
    let (mut builder, error, status_code) = match err {
        RecommendError::EmptyInput { .. } => (HttpResponse::BadRequest(), "No preferences submitted", 400),
        RecommendError::NoLocation { .. } => (HttpResponse::BadRequest(), "No valid member locations", 400),
        RecommendError::NoCandidates { .. } => (HttpResponse::NotFound(), "No restaurants found", 404),
        RecommendError::ProviderTransient { .. } => {
            (HttpResponse::ServiceUnavailable(), "Search provider unavailable", 503)
        }
        RecommendError::Store(e) => {
            tracing::error!("Preference store failure: {}", e);
            (HttpResponse::InternalServerError(), "Failed to load preferences", 500)
        }
    };

    builder.json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
        preferences: err.profile().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, GroupProfileSummary};
    use crate::services::StoreError;

    fn summary() -> GroupProfileSummary {
        GroupProfileSummary {
            cuisines: vec!["italian".to_string()],
            dietary_restrictions: vec![],
            spice_level: 3,
            budget: Budget::Moderate,
            centroid_location: None,
        }
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (RecommendError::EmptyInput { group_id: "g".to_string() }, 400),
            (RecommendError::NoLocation { profile: summary() }, 400),
            (RecommendError::NoCandidates { profile: summary() }, 404),
            (RecommendError::ProviderTransient { profile: summary() }, 503),
            (RecommendError::Store(StoreError::InvalidRecord("bad".to_string())), 500),
        ];

        for (err, expected) in cases {
            assert_eq!(error_response(&err).status().as_u16(), expected, "{}", err);
        }
    }
}
