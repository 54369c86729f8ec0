//! Router tests against an in-memory pipeline

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fault_core::logic::encoder::{EncoderState, EncoderStore, Vocabulary};
use fault_core::logic::features::FeatureSchema;
use fault_core::logic::history::SqliteResultStore;
use fault_core::logic::model::{Classifier, FeatureView, InferenceError, ModelMetadata};
use fault_core::{FaultPipeline, PipelineConfig};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::{create_router, AppState};

/// Predicts round(feature[0])
struct FirstFeatureClassifier {
    width: usize,
}

impl Classifier for FirstFeatureClassifier {
    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn predict(&self, features: FeatureView<'_>) -> Result<Vec<i64>, InferenceError> {
        Ok(features.outer_iter().map(|row| row[0].round() as i64).collect())
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model_path: "<test>".to_string(),
            model_type: "first-feature".to_string(),
            features: self.width,
            checksum: None,
            loaded_at: chrono::Utc::now(),
        }
    }
}

fn app() -> Router {
    let schema = FeatureSchema::new(vec!["code".to_string(), "fuel_type".to_string()]).unwrap();
    let encoder = EncoderStore::in_memory(
        EncoderState::new().with_column("fuel_type", Vocabulary::from_categories(["Diesel", "Petrol"])),
    );
    let classifier = FirstFeatureClassifier { width: schema.len() };
    let store = SqliteResultStore::in_memory("fault_predictions").unwrap();
    let pipeline = FaultPipeline::new(encoder, schema, Box::new(classifier), Box::new(store));

    create_router(AppState {
        pipeline: Arc::new(pipeline),
        config: Config {
            port: 0,
            max_upload_bytes: 1024 * 1024,
            environment: "test".to_string(),
            pipeline: PipelineConfig::default(),
        },
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_csv(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(filename: &str, content: &str) -> Request<Body> {
    let boundary = "X-FAULT-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/predict/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_home_and_health() {
    let (status, body) = send(app(), Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(app(), Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["features"], 2);
}

#[tokio::test]
async fn test_predict_csv_body() {
    let (status, body) = send(
        app(),
        post_csv("/predict/", "vin,code,fuel_type\nA,3,Diesel\nB,2,Petrol\n"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["vin"], "A");
    assert_eq!(results[0]["Predicted_Fault"], "No Fault");
    assert_eq!(results[1]["Predicted_Fault"], "Engine Fault");
    assert!(results[1]["Prediction_Message"].is_string());
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_predict_multipart_upload() {
    let (status, body) = send(app(), multipart("readings.csv", "code,fuel_type\n0,Diesel")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["Predicted_Fault"], "Electrical Fault");
}

#[tokio::test]
async fn test_predict_rejects_non_csv_upload() {
    let (status, body) = send(app(), multipart("readings.xlsx", "code\n0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_json_records() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"[{"code": 4, "fuel_type": "Hybrid"}, {"code": 9, "fuel_type": null}]"#))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["Predicted_Fault"], "Transmission Fault");
    assert_eq!(body["results"][1]["Predicted_Fault"], "Unknown Fault");
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let (status, body) = send(app(), post_csv("/predict/", "code,fuel_type\n")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "batch is empty");
}

#[tokio::test]
async fn test_history_after_predict() {
    let app = app();
    let (status, _) = send(app.clone(), post_csv("/predict/", "code,fuel_type\n3,Diesel\n1,Petrol\n")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, Request::get("/history?limit=1").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["row_index"], 1);
    assert_eq!(records[0]["row"]["Predicted_Fault"], "Emission Fault");
}

#[tokio::test]
async fn test_status_reports_model_and_layout() {
    let app = app();
    send(app.clone(), post_csv("/predict/", "code\n3\n")).await;

    let (status, body) = send(app, Request::get("/status").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["engine"]["model"]["model_type"], "first-feature");
    assert_eq!(body["engine"]["inference_count"], 1);
    assert_eq!(body["layout"]["feature_count"], 2);
    assert_eq!(body["environment"], "test");
}
