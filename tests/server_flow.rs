#![cfg(feature = "server")]

use std::path::PathBuf;

use titanic_predictor::model::load_artifact;
use titanic_predictor::server::http::route;

fn model() -> titanic_predictor::model::LogisticPipeline {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model/titanic_survival_model.json");
    load_artifact(&path, None).unwrap()
}

#[test]
fn test_submit_privileged_passenger() {
    let model = model();
    let reply = route(
        &tiny_http::Method::Post,
        "/predict",
        "pclass=1&sex=female&age=4&fare=151.55&embarked=S",
        &model,
    );
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("SURVIVED"));
    assert!(reply.body.contains("Survival Probability"));
    assert!(reply.body.contains("Non-Survival Probability"));
    assert!(reply.body.contains("<td>1</td><td>female</td><td>4.0</td><td>151.55</td><td>S</td>"));
}

#[test]
fn test_submit_unknown_port_reports_and_allows_resubmit() {
    let model = model();
    let reply = route(
        &tiny_http::Method::Post,
        "/predict",
        "pclass=3&sex=male&age=25&fare=7.25&embarked=X",
        &model,
    );
    assert_eq!(reply.status, 422);
    assert!(reply.body.contains("unknown value &#39;X&#39; for column &#39;Embarked&#39;"));
    assert!(reply.body.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(!reply.body.contains("Non-Survival Probability"));

    // The same model keeps serving after the failed request.
    let reply = route(
        &tiny_http::Method::Post,
        "/predict",
        "pclass=3&sex=male&age=25&fare=7.25&embarked=S",
        &model,
    );
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("DID NOT SURVIVE"));
}

#[test]
fn test_out_of_range_fare_is_rejected_at_the_form() {
    let reply = route(
        &tiny_http::Method::Post,
        "/predict",
        "pclass=1&sex=female&age=4&fare=601&embarked=S",
        &model(),
    );
    assert_eq!(reply.status, 400);
    assert!(reply.body.contains("field &#39;fare&#39; must be between 0 and 600"));
}
