use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    BonusInputs, BonusSnapshot, DiscountInputs, InputError, LoanInputs, LoanPricing,
    OrderSummary, RuleBook, parse_membership, run_bonus_snapshot, run_loan_pricing,
    run_order_summary,
};
use crate::report::{render_bonus_snapshot, render_loan_pricing, render_order_summary};

type SharedRules = Arc<RuleBook>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BonusPayload {
    salary: f64,
    performance_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscountPayload {
    purchase_amount: f64,
    #[serde(alias = "member")]
    membership: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanPayload {
    credit_score: i64,
    annual_income: f64,
    loan_amount: f64,
    maturity_years: i64,
}

impl TryFrom<BonusPayload> for BonusInputs {
    type Error = InputError;

    fn try_from(payload: BonusPayload) -> Result<Self, Self::Error> {
        BonusInputs::new(payload.salary, payload.performance_score)
    }
}

impl TryFrom<DiscountPayload> for DiscountInputs {
    type Error = InputError;

    fn try_from(payload: DiscountPayload) -> Result<Self, Self::Error> {
        let membership = parse_membership(&payload.membership)?;
        DiscountInputs::new(payload.purchase_amount, membership)
    }
}

impl TryFrom<LoanPayload> for LoanInputs {
    type Error = InputError;

    fn try_from(payload: LoanPayload) -> Result<Self, Self::Error> {
        LoanInputs::new(
            payload.credit_score,
            payload.annual_income,
            payload.loan_amount,
            payload.maturity_years,
        )
    }
}

/// A computed result alongside its rendered text report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation<T> {
    pub result: T,
    pub report: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

pub fn evaluate_bonus(rules: &RuleBook, inputs: &BonusInputs) -> Evaluation<BonusSnapshot> {
    let result = run_bonus_snapshot(rules, inputs);
    let report = render_bonus_snapshot(&result, rules.tax_year);
    Evaluation { result, report }
}

pub fn evaluate_discount(rules: &RuleBook, inputs: &DiscountInputs) -> Evaluation<OrderSummary> {
    let result = run_order_summary(rules, inputs);
    let report = render_order_summary(&result);
    Evaluation { result, report }
}

pub fn evaluate_loan(rules: &RuleBook, inputs: &LoanInputs) -> Evaluation<LoanPricing> {
    let result = run_loan_pricing(rules, inputs);
    let report = render_loan_pricing(&result);
    Evaluation { result, report }
}

pub fn router(rules: SharedRules) -> Router {
    Router::new()
        .route("/api/bonus", get(bonus_get_handler).post(bonus_post_handler))
        .route(
            "/api/discount",
            get(discount_get_handler).post(discount_post_handler),
        )
        .route("/api/loan", get(loan_get_handler).post(loan_post_handler))
        .fallback(not_found_handler)
        .with_state(rules)
}

pub async fn run_http_server(port: u16, rules: RuleBook) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(rules));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "bizcalc HTTP API listening");
    println!("bizcalc HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/bonus");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn bonus_get_handler(
    State(rules): State<SharedRules>,
    payload: Result<Query<BonusPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => bonus_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

async fn bonus_post_handler(
    State(rules): State<SharedRules>,
    payload: Result<Json<BonusPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => bonus_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

async fn discount_get_handler(
    State(rules): State<SharedRules>,
    payload: Result<Query<DiscountPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => discount_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

async fn discount_post_handler(
    State(rules): State<SharedRules>,
    payload: Result<Json<DiscountPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => discount_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

async fn loan_get_handler(
    State(rules): State<SharedRules>,
    payload: Result<Query<LoanPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => loan_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

async fn loan_post_handler(
    State(rules): State<SharedRules>,
    payload: Result<Json<LoanPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => loan_handler_impl(&rules, payload),
        Err(rejection) => malformed_request_response(&rejection.body_text()),
    }
}

fn bonus_handler_impl(rules: &RuleBook, payload: BonusPayload) -> Response {
    match BonusInputs::try_from(payload) {
        Ok(inputs) => json_response(StatusCode::OK, evaluate_bonus(rules, &inputs)),
        Err(err) => input_error_response(&err),
    }
}

fn discount_handler_impl(rules: &RuleBook, payload: DiscountPayload) -> Response {
    match DiscountInputs::try_from(payload) {
        Ok(inputs) => json_response(StatusCode::OK, evaluate_discount(rules, &inputs)),
        Err(err) => input_error_response(&err),
    }
}

fn loan_handler_impl(rules: &RuleBook, payload: LoanPayload) -> Response {
    match LoanInputs::try_from(payload) {
        Ok(inputs) => json_response(StatusCode::OK, evaluate_loan(rules, &inputs)),
        Err(err) => input_error_response(&err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn input_error_response(err: &InputError) -> Response {
    debug!(field = err.field().key(), %err, "request rejected");
    error_response(
        StatusCode::BAD_REQUEST,
        &err.to_string(),
        Some(err.field().key()),
    )
}

/// Bodies and query strings that never reach input validation.
fn malformed_request_response(detail: &str) -> Response {
    debug!(detail, "malformed request rejected");
    error_response(StatusCode::BAD_REQUEST, detail, None)
}

fn error_response(status: StatusCode, msg: &str, field: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field,
        },
    )
}

#[cfg(test)]
fn bonus_inputs_from_json(json: &str) -> Result<BonusInputs, String> {
    let payload = serde_json::from_str::<BonusPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    BonusInputs::try_from(payload).map_err(|e| e.to_string())
}

#[cfg(test)]
fn discount_inputs_from_json(json: &str) -> Result<DiscountInputs, String> {
    let payload = serde_json::from_str::<DiscountPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    DiscountInputs::try_from(payload).map_err(|e| e.to_string())
}

#[cfg(test)]
fn loan_inputs_from_json(json: &str) -> Result<LoanInputs, String> {
    let payload = serde_json::from_str::<LoanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    LoanInputs::try_from(payload).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Membership, RiskCategory};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn rules() -> RuleBook {
        RuleBook::tax_year_2026().expect("built-in tables are valid")
    }

    #[test]
    fn bonus_inputs_from_json_parses_web_keys() {
        let inputs = bonus_inputs_from_json(r#"{"salary": 100000, "performanceScore": 92}"#)
            .expect("json should parse");
        assert_approx(inputs.salary, 100_000.0);
        assert_approx(inputs.performance_score, 92.0);
    }

    #[test]
    fn bonus_inputs_from_json_rejects_out_of_range_score() {
        let err = bonus_inputs_from_json(r#"{"salary": 100000, "performanceScore": 150}"#)
            .expect_err("must reject");
        assert!(err.contains("performance score"));
    }

    #[test]
    fn discount_inputs_from_json_accepts_member_alias() {
        let inputs = discount_inputs_from_json(r#"{"purchaseAmount": 120, "member": "YES"}"#)
            .expect("json should parse");
        assert_eq!(inputs.membership, Membership::Member);
    }

    #[test]
    fn discount_inputs_from_json_rejects_unknown_membership() {
        let err = discount_inputs_from_json(r#"{"purchaseAmount": 120, "membership": "maybe"}"#)
            .expect_err("must reject");
        assert!(err.contains("membership status"));
    }

    #[test]
    fn loan_inputs_from_json_rejects_fractional_credit_score() {
        let err = loan_inputs_from_json(
            r#"{"creditScore": 720.5, "annualIncome": 80000, "loanAmount": 20000, "maturityYears": 10}"#,
        )
        .expect_err("must reject");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn loan_evaluation_serialization_contains_expected_fields() {
        let rules = rules();
        let inputs = loan_inputs_from_json(
            r#"{"creditScore": 760, "annualIncome": 80000, "loanAmount": 20000, "maturityYears": 10}"#,
        )
        .expect("json should parse");
        let evaluation = evaluate_loan(&rules, &inputs);
        assert_eq!(evaluation.result.risk_category, RiskCategory::Low);

        let json = serde_json::to_string(&evaluation).expect("evaluation should serialize");
        assert!(json.contains("\"result\""));
        assert!(json.contains("\"report\""));
        assert!(json.contains("\"riskCategory\":\"Low Risk\""));
        assert!(json.contains("\"treasuryMaturityYears\":10"));
        assert!(json.contains("\"spreadBps\":225"));
    }

    #[test]
    fn discount_evaluation_serializes_membership_kebab_case() {
        let rules = rules();
        let inputs = DiscountInputs::new(200.0, Membership::NonMember).expect("valid inputs");
        let evaluation = evaluate_discount(&rules, &inputs);
        assert_approx(evaluation.result.final_price, 180.0);

        let json = serde_json::to_string(&evaluation).expect("evaluation should serialize");
        assert!(json.contains("\"membership\":\"non-member\""));
        assert!(json.contains("\"finalPrice\""));
        assert!(evaluation.report.contains("ORDER SUMMARY"));
    }

    #[test]
    fn error_response_body_names_the_field() {
        let err = InputError::Range {
            field: crate::core::Field::AnnualIncome,
            domain: crate::core::Domain::Positive,
        };
        let body = ErrorResponse {
            error: err.to_string(),
            field: Some(err.field().key()),
        };
        let json = serde_json::to_string(&body).expect("error should serialize");
        assert_eq!(
            json,
            r#"{"error":"annual income must be greater than 0","field":"annualIncome"}"#
        );
    }

    async fn send(request: Request<Body>) -> (StatusCode, Option<String>, serde_json::Value) {
        let app = router(Arc::new(rules()));
        let response = app.oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, cache_control, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build")
    }

    #[tokio::test]
    async fn post_bonus_returns_result_and_report() {
        let (status, cache_control, body) = send(post_json(
            "/api/bonus",
            r#"{"salary": 100000, "performanceScore": 92}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        let take_home = body["result"]["takeHome"].as_f64().expect("numeric take-home");
        assert_approx(take_home, 93_250.0);
        assert!(
            body["report"]
                .as_str()
                .is_some_and(|report| report.contains("$93,250.00"))
        );
    }

    #[tokio::test]
    async fn get_loan_reads_query_string() {
        let (status, _, body) = send(get(
            "/api/loan?creditScore=760&annualIncome=80000&loanAmount=20000&maturityYears=10",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["riskCategory"], "Low Risk");
        assert_eq!(body["result"]["spreadBps"], 225);
    }

    #[tokio::test]
    async fn malformed_json_field_is_a_json_400() {
        let (status, cache_control, body) = send(post_json(
            "/api/bonus",
            r#"{"salary": "abc", "performanceScore": 90}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        assert!(body["error"].is_string());
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn malformed_query_field_is_a_json_400() {
        let (status, cache_control, body) =
            send(get("/api/discount?purchaseAmount=abc&membership=yes")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn out_of_range_input_names_the_field() {
        let (status, _, body) = send(post_json(
            "/api/loan",
            r#"{"creditScore": 760, "annualIncome": 0, "loanAmount": 20000, "maturityYears": 10}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "annualIncome");
        assert_eq!(body["error"], "annual income must be greater than 0");
    }

    #[tokio::test]
    async fn unknown_path_is_a_json_404() {
        let (status, _, body) = send(get("/api/payroll")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
