use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{SurveyResult, SurveyStats, SurveySubmission},
    routes::AppState,
    services::run_recommendation,
};

#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    /// Number of recommendations; zero or negative yields none
    pub top_n: Option<i64>,
}

/// Handler for survey submission
///
/// Builds the tag profile from the answers and returns the ranked
/// recommendations. The submission counter is best-effort.
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<SubmitQuery>, QueryRejection>,
    payload: Result<Json<SurveySubmission>, JsonRejection>,
) -> AppResult<Json<SurveyResult>> {
    let Query(query) = query?;
    let Json(survey) = payload?;

    let top_n = query
        .top_n
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or(state.default_top_n);

    let answers = survey.into_answers()?;

    if let Err(e) = state.counters.increment_survey_calls().await {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to count survey submission");
    }

    let profile = state.profile_builder.build_profile(&answers);

    tracing::info!(
        request_id = %request_id,
        profile_tags = profile.active_tags().count(),
        top_n,
        "Processing survey submission"
    );

    let recommendations = run_recommendation(&profile, state.catalog.as_ref(), top_n).await?;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendations ready"
    );

    Ok(Json(SurveyResult { recommendations }))
}

/// Handler for the survey call counter
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<SurveyStats>> {
    let survey_calls = state.counters.survey_calls().await?;
    Ok(Json(SurveyStats { survey_calls }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{
        db::{store::MockCounterStore, MemoryStore},
        error::AppError,
        models::NewDestination,
        routes::{create_router, AppState},
        services::auth::AuthSettings,
    };

    async fn beach_catalog() -> MemoryStore {
        let store = MemoryStore::with_tags([("beach", "Beach")]).await.unwrap();
        let beach = 1;
        for (name, score) in [("Busan", 10), ("Cebu", 8), ("Phuket", 6)] {
            let id = store
                .insert_destination(NewDestination {
                    name: name.to_string(),
                    country: "Asia".to_string(),
                    description: String::new(),
                    latitude: 0.0,
                    longitude: 0.0,
                })
                .await;
            store.link(id, beach, score).await.unwrap();
        }
        store
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "survey-secret".to_string(),
            access_token_ttl: chrono::Duration::minutes(5),
            bcrypt_cost: 4,
        }
    }

    #[tokio::test]
    async fn test_counter_failure_does_not_fail_survey() {
        let mut counters = MockCounterStore::new();
        counters
            .expect_increment_survey_calls()
            .times(1)
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let mut state = AppState::new(beach_catalog().await, settings());
        state.counters = Arc::new(counters);
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .post("/api/v1/survey/submit")
            .json(&json!({
                "q1": "A", "q2": "A", "q3": "A", "q4": "A",
                "q5": "A", "q6": "A", "q7": "A"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let scores: Vec<i64> = body["recommendations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["score"].as_i64().unwrap())
            .collect();
        assert_eq!(scores, vec![20, 16, 12]);
    }
}
