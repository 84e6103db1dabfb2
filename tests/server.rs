//! `POST /check` driven through the router without binding a socket.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use plagcheck::{
    Comparator, Corpus, Document, Threshold,
    core::MatcherOptions,
    server::router,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const AREA: &str = "def area(w, h):\n    return w * h\n";

fn app(docs: &[(&str, &str)]) -> Router {
    let corpus: Corpus = docs
        .iter()
        .map(|(name, text)| Document::new(*name, *text))
        .collect();
    let comparator = Comparator::new(&corpus, Threshold::default(), MatcherOptions::default()).unwrap();
    router(Arc::new(comparator))
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/check")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let resp = ServiceExt::<Request<Body>>::oneshot(app, req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn scores_submission() {
    let app = app(&[("hello.py", "print('hi')\n"), ("area.py", AREA)]);

    let (status, body) = post(app, json!({ "code": AREA }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["most_similar_file"]["file"], "area.py");
    assert_eq!(body["most_similar_file"]["match_score"], 100.0);
    assert_eq!(body["most_similar_file"]["plagiarism_risk"], "HIGH");
    assert_eq!(
        body["most_similar_file"]["plagiarism_statement"],
        "The submitted source code is classified as plagiarised."
    );
    assert_eq!(body["all_results"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["all_results"][0]["detailed_metrics"]["variable_renaming_similarity"],
        100.0
    );
}

#[tokio::test]
async fn missing_code_is_bad_request() {
    for payload in ["{}", r#"{"code": null}"#, "not json", "[]"] {
        let (status, body) = post(app(&[("area.py", AREA)]), payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body, json!({ "error": "No code provided" }));
    }
}

#[tokio::test]
async fn empty_code_is_still_scored() {
    let (status, body) = post(app(&[("area.py", AREA)]), r#"{"code": ""}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["most_similar_file"]["plagiarism_risk"], "LOW");
}

#[tokio::test]
async fn empty_corpus_is_server_error() {
    let (status, body) = post(app(&[]), json!({ "code": AREA }).to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "reference corpus is empty");
}

#[tokio::test]
async fn only_post_is_routed() {
    let req = Request::builder()
        .method("GET")
        .uri("/check")
        .body(Body::empty())
        .unwrap();
    let resp = ServiceExt::<Request<Body>>::oneshot(app(&[("area.py", AREA)]), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
