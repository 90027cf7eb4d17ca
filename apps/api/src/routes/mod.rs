pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::require_admin;
use crate::catalog::handle_list_categories;
use crate::refinement::handlers::handle_refine_abstract;
use crate::state::AppState;
use crate::submissions::handlers::{
    handle_export_submissions, handle_list_submissions, handle_submit_abstract,
};

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/submissions", get(handle_list_submissions))
        .route("/submissions/export", get(handle_export_submissions))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/submit-abstract", post(handle_submit_abstract))
        .route("/api/refine-abstract", post(handle_refine_abstract))
        .route("/api/categories", get(handle_list_categories))
        .nest("/api/admin", admin)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::refinement::{AbstractRefiner, RefinementOutput, RefinementRequest};
    use crate::submissions::store::SubmissionStore;

    struct EchoRefiner;

    #[async_trait]
    impl AbstractRefiner for EchoRefiner {
        async fn refine(
            &self,
            request: &RefinementRequest,
        ) -> Result<RefinementOutput, AppError> {
            Ok(RefinementOutput {
                refined_abstract: format!("Refined: {}", request.abstract_text),
                suggestions: vec![format!("Tie it to {}", request.ideathon_category)],
            })
        }
    }

    struct FailingRefiner;

    #[async_trait]
    impl AbstractRefiner for FailingRefiner {
        async fn refine(&self, _: &RefinementRequest) -> Result<RefinementOutput, AppError> {
            Err(AppError::ExternalService("upstream returned 529".to_string()))
        }
    }

    fn test_app(
        database_path: PathBuf,
        admin_api_token: Option<&str>,
        refiner: Arc<dyn AbstractRefiner>,
    ) -> Router {
        let config = Config {
            database_path: database_path.clone(),
            anthropic_api_key: None,
            admin_api_token: admin_api_token.map(str::to_string),
            port: 0,
            rust_log: "info".to_string(),
        };
        build_router(AppState {
            store: SubmissionStore::new(database_path),
            refiner,
            config,
        })
    }

    fn app_in(dir: &tempfile::TempDir) -> Router {
        test_app(
            dir.path().join("db").join("ecoinvent.db"),
            None,
            Arc::new(EchoRefiner),
        )
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn eco_team_payload() -> Value {
        json!({
            "participationType": "team",
            "teamName": "Eco Team",
            "contactPersonName": "A B",
            "mobileNumber": "9876543210",
            "email": "a@x.com",
            "teamMembers": [{"name": "C D", "email": "c@x.com"}],
            "concept": "A community-run depot that turns multilayer plastic packaging into tiles.",
            "objective": "Divert packaging waste from landfills.",
            "requirements": "Shredder, press, molds.",
            "technicalApplications": "Low-cost construction material for rural housing.",
            "slidesLink": "https://example.com/slides"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app_in(&dir).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_then_list_eco_team() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);

        let response = app
            .clone()
            .oneshot(post_json("/api/submit-abstract", &eco_team_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["message"], "Submission received successfully!");
        let id = created["id"].as_i64().unwrap();

        let response = app.oneshot(get("/api/admin/submissions")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        let submissions = listed["submissions"].as_array().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0]["id"], id);
        assert_eq!(submissions[0]["teamName"], "Eco Team");
        assert_eq!(submissions[0]["teamMemberCount"], 1);
        assert_eq!(submissions[0]["teamMembers"][0]["email"], "c@x.com");
    }

    #[tokio::test]
    async fn test_list_before_any_submission_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let response = app_in(&dir)
            .oneshot(get("/api/admin/submissions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "submissions": [] }));
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_fields_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        let mut payload = eco_team_payload();
        payload["teamMembers"] = json!([
            {"name": "M One", "email": "m1@x.com"},
            {"name": "M Two", "email": "m2@x.com"},
            {"name": "M Three", "email": "m3@x.com"},
            {"name": "M Four", "email": "m4@x.com"}
        ]);

        let response = app
            .clone()
            .oneshot(post_json("/api/submit-abstract", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid submission data.");
        let errors = body["errors"].as_object().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("teamMembers"));

        assert!(!dir.path().join("db").join("ecoinvent.db").exists());
        let response = app.oneshot(get("/api/admin/submissions")).await.unwrap();
        assert_eq!(body_json(response).await, json!({ "submissions": [] }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/submit-abstract")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"participationType\": "))
            .unwrap();
        let response = app_in(&dir).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        // The database path is a directory, so it can never be opened.
        let app = test_app(dir.path().to_path_buf(), None, Arc::new(EchoRefiner));

        let response = app
            .clone()
            .oneshot(post_json("/api/submit-abstract", &eco_team_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "A database error occurred." })
        );

        let response = app.oneshot(get("/api/admin/submissions")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_solo_submission_has_no_members() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        let mut payload = eco_team_payload();
        payload["participationType"] = json!("solo");

        let response = app
            .clone()
            .oneshot(post_json("/api/submit-abstract", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listed = body_json(app.oneshot(get("/api/admin/submissions")).await.unwrap()).await;
        assert_eq!(listed["submissions"][0]["teamMemberCount"], 0);
        assert_eq!(listed["submissions"][0]["teamName"], Value::Null);
    }

    #[tokio::test]
    async fn test_admin_routes_require_token_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            dir.path().join("ecoinvent.db"),
            Some("s3cret"),
            Arc::new(EchoRefiner),
        );

        let response = app
            .clone()
            .oneshot(get("/api/admin/submissions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let wrong = Request::builder()
            .uri("/api/admin/submissions/export")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(wrong).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let authorized = Request::builder()
            .uri("/api/admin/submissions")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(authorized).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The public submission route stays open.
        let response = app
            .oneshot(post_json("/api/submit-abstract", &eco_team_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_export_returns_csv_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        app.clone()
            .oneshot(post_json("/api/submit-abstract", &eco_team_payload()))
            .await
            .unwrap();

        let response = app
            .oneshot(get("/api/admin/submissions/export"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"ecoinvent_submissions_"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Member 2 Name,Member 2 Email"));
        assert!(lines[1].contains("Eco Team"));
        assert!(lines[1].ends_with("C D,c@x.com"));
    }

    #[tokio::test]
    async fn test_refine_abstract() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({
            "abstractText": "Shredded bottle caps pressed into paving tiles.",
            "ideathonCategory": "Waste to Wealth",
            "currentEnvironmentalTrends": "Extended producer responsibility rules.",
            "successfulSubmissionExamples": "Compostable packaging from husks."
        });
        let response = app_in(&dir)
            .oneshot(post_json("/api/refine-abstract", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let output = body_json(response).await;
        assert!(output["refinedAbstract"]
            .as_str()
            .unwrap()
            .starts_with("Refined: Shredded"));
        assert_eq!(output["suggestions"][0], "Tie it to Waste to Wealth");
    }

    #[tokio::test]
    async fn test_refine_abstract_rejects_short_input() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({
            "abstractText": "tiles",
            "ideathonCategory": "Waste to Wealth",
            "currentEnvironmentalTrends": "Extended producer responsibility rules.",
            "successfulSubmissionExamples": "Compostable packaging from husks."
        });
        let response = app_in(&dir)
            .oneshot(post_json("/api/refine-abstract", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Abstract text is too short."
        );
    }

    #[tokio::test]
    async fn test_refine_abstract_upstream_failure_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            dir.path().join("ecoinvent.db"),
            None,
            Arc::new(FailingRefiner),
        );
        let body = json!({
            "abstractText": "Shredded bottle caps pressed into paving tiles.",
            "ideathonCategory": "Waste to Wealth",
            "currentEnvironmentalTrends": "Extended producer responsibility rules.",
            "successfulSubmissionExamples": "Compostable packaging from husks."
        });
        let response = app
            .oneshot(post_json("/api/refine-abstract", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = body_json(response).await["message"].as_str().unwrap().to_string();
        assert!(!message.contains("529"));
    }

    #[tokio::test]
    async fn test_categories() {
        let dir = tempfile::tempdir().unwrap();
        let response = app_in(&dir).oneshot(get("/api/categories")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let categories = body_json(response).await;
        assert_eq!(categories.as_array().unwrap().len(), 6);
        assert_eq!(categories[1]["icon"], "recycle");
    }
}
