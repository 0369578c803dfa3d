//! Router tests over the in-memory fee ledger

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use core_kernel::AdapterHealth;
use domain_fees::ports::mock::InMemoryFeeLedger;
use interface_api::{config::ApiConfig, create_router};
use test_utils::{RosterBuilder, ScopeFixtures};

fn mixed_roster() -> RosterBuilder {
    RosterBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(1000))
        .learner("Zawadi Achieng", &[dec!(1000)], &[])
        .learner("Baraka Mwangi", &[dec!(400)], &[dec!(100)])
        .learner("Amani Otieno", &[], &[])
}

fn app(ledger: InMemoryFeeLedger) -> Router {
    create_router(Arc::new(ledger), ApiConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not an amount: {}", other),
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get(app(InMemoryFeeLedger::default()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_ledger() {
        let (status, body) = get(app(InMemoryFeeLedger::default()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ledger"]["adapter_id"], "in-memory-fee-ledger");
    }

    #[tokio::test]
    async fn test_unhealthy_ledger_is_not_ready() {
        let ledger = InMemoryFeeLedger::default().with_health(AdapterHealth::Unhealthy);
        let (status, body) = get(app(ledger), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}

mod grade_roster {
    use super::*;

    fn roster_uri(roster: &RosterBuilder, extra: &str) -> String {
        format!(
            "/api/v1/grades/{}/fee-balances?academic_year=2024&term=term_1{}",
            Uuid::from(roster.grade_id()),
            extra
        )
    }

    #[tokio::test]
    async fn test_roster_summary_and_entries() {
        let roster = mixed_roster();
        let uri = roster_uri(&roster, "");
        let (status, body) = get(app(roster.into_ledger()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["learner_count"], 3);
        assert_eq!(body["summary"]["paid_count"], 1);
        assert_eq!(amount(&body["summary"]["total_outstanding"]), dec!(1500));
        assert_eq!(amount(&body["collection_rate"]), dec!(50));

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1]["learner"]["full_name"], "Baraka Mwangi");
        assert_eq!(entries[1]["balance"]["status"], "partial");
        assert_eq!(amount(&entries[1]["balance"]["balance"]), dec!(500));
    }

    #[tokio::test]
    async fn test_status_filter_keeps_full_summary() {
        let roster = mixed_roster();
        let uri = roster_uri(&roster, "&status=pending");
        let (status, body) = get(app(roster.into_ledger()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status_filter"], "pending");
        assert_eq!(body["summary"]["learner_count"], 3);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["learner"]["full_name"], "Amani Otieno");
    }

    #[tokio::test]
    async fn test_order_by_name() {
        let roster = mixed_roster();
        let uri = roster_uri(&roster, "&order=name");
        let (_, body) = get(app(roster.into_ledger()), &uri).await;

        let names: Vec<&str> = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["learner"]["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Amani Otieno", "Baraka Mwangi", "Zawadi Achieng"]);
    }

    #[tokio::test]
    async fn test_failed_learner_is_reported_inline() {
        let roster = mixed_roster();
        let uri = roster_uri(&roster, "");
        let failing = roster.learners()[0].id;
        let (status, body) = get(app(roster.into_ledger().fail_for(failing)), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["failed_count"], 1);
        let first = &body["entries"][0];
        assert!(first.get("balance").is_none());
        assert_eq!(first["error"]["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn test_listing_failure_is_service_unavailable() {
        let roster = mixed_roster();
        let uri = roster_uri(&roster, "");
        let (status, body) = get(app(roster.into_ledger().fail_listing()), &uri).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn test_unknown_term_is_bad_request() {
        let roster = mixed_roster();
        let uri = format!(
            "/api/v1/grades/{}/fee-balances?academic_year=2024&term=term_9",
            Uuid::from(roster.grade_id())
        );
        let (status, body) = get(app(roster.into_ledger()), &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_malformed_grade_id_is_bad_request() {
        let (status, _) = get(
            app(InMemoryFeeLedger::default()),
            "/api/v1/grades/not-a-uuid/fee-balances?academic_year=2024&term=term_1",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlong_year_fails_validation() {
        let roster = mixed_roster();
        let uri = format!(
            "/api/v1/grades/{}/fee-balances?academic_year={}&term=term_1",
            Uuid::from(roster.grade_id()),
            "9".repeat(40)
        );
        let (status, body) = get(app(roster.into_ledger()), &uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
    }
}

mod single_learner {
    use super::*;

    #[tokio::test]
    async fn test_learner_balance() {
        let roster = mixed_roster();
        let learner = roster.learners()[1].clone();
        let uri = format!(
            "/api/v1/learners/{}/fee-balance?academic_year=2024&term=term_1",
            learner.id
        );
        let (status, body) = get(app(roster.into_ledger()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["learner"]["admission_number"], learner.admission_number);
        assert_eq!(amount(&body["balance"]["direct_payments"]), dec!(400));
        assert_eq!(amount(&body["balance"]["invoice_transactions"]), dec!(100));
        assert_eq!(body["balance"]["scope"]["term"], "term_1");
    }

    #[tokio::test]
    async fn test_unknown_learner_is_not_found() {
        let uri = format!(
            "/api/v1/learners/{}/fee-balance?academic_year=2024&term=term_1",
            Uuid::new_v4()
        );
        let (status, body) = get(app(mixed_roster().into_ledger()), &uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_missing_scope_is_bad_request() {
        let roster = mixed_roster();
        let uri = format!("/api/v1/learners/{}/fee-balance", Uuid::from(roster.learners()[0].id));
        let (status, _) = get(app(roster.into_ledger()), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod inline_compute {
    use super::*;

    const URI: &str = "/api/v1/fee-balances/compute";

    fn overpaid_request(reference_a: &str, reference_b: &str) -> Value {
        let grade = Uuid::new_v4();
        let structure = Uuid::new_v4();
        let invoice = Uuid::new_v4();
        json!({
            "grade_id": grade,
            "academic_year": "2024",
            "term": "term_1",
            "fee_structures": [
                { "id": structure, "grade_id": grade, "academic_year": "2024", "term": "term_1", "amount": "5000" }
            ],
            "payments": [
                { "fee_structure_id": structure, "amount_paid": 3000, "payment_method": "cash", "transaction_reference": reference_a }
            ],
            "invoices": [
                { "id": invoice, "grade_id": grade, "academic_year": "2024", "term": "term_1" }
            ],
            "transactions": [
                { "invoice_id": invoice, "amount_paid": "2500.00", "payment_method": "mobile_money", "transaction_reference": reference_b }
            ]
        })
    }

    #[tokio::test]
    async fn test_overpayment_is_clamped() {
        let (status, body) = post_json(
            app(InMemoryFeeLedger::default()),
            URI,
            overpaid_request("CASH-1", "MM-1"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(amount(&body["balance"]["amount_paid"]), dec!(5500));
        assert_eq!(amount(&body["balance"]["balance"]), dec!(0));
        assert_eq!(amount(&body["balance"]["overpayment"]), dec!(500));
        assert_eq!(body["balance"]["status"], "paid");
        assert_eq!(body["reconciliation"]["issues"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_shared_reference_is_reported() {
        let (status, body) = post_json(
            app(InMemoryFeeLedger::default()),
            URI,
            overpaid_request("QK7HX91", "QK7HX91"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reconciliation"]["issues"][0]["kind"], "cross_channel_reference");
    }

    #[tokio::test]
    async fn test_strict_channels_rejects_shared_reference() {
        let mut request = overpaid_request("QK7HX91", "QK7HX91");
        request["strict_channels"] = json!(true);
        let (status, body) = post_json(app(InMemoryFeeLedger::default()), URI, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "unprocessable");
    }

    #[tokio::test]
    async fn test_unbilled_policy_override() {
        let body = json!({ "grade_id": Uuid::new_v4(), "academic_year": "2024", "term": "term_2" });

        let (_, literal) = post_json(app(InMemoryFeeLedger::default()), URI, body.clone()).await;
        assert_eq!(literal["balance"]["status"], "paid");

        let mut pending = body;
        pending["zero_balance_policy"] = json!("pending_when_unbilled");
        let (_, pending) = post_json(app(InMemoryFeeLedger::default()), URI, pending).await;
        assert_eq!(pending["balance"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_non_numeric_amount_is_unprocessable() {
        let mut request = overpaid_request("A", "B");
        request["payments"][0]["amount_paid"] = json!("three thousand");
        let (status, body) = post_json(app(InMemoryFeeLedger::default()), URI, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("three thousand"));
    }

    #[tokio::test]
    async fn test_oversized_payment_list_fails_validation() {
        let mut request = overpaid_request("A", "B");
        let payment = request["payments"][0].clone();
        request["payments"] = Value::Array(vec![payment; 1001]);
        let (status, body) = post_json(app(InMemoryFeeLedger::default()), URI, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_negative_payment_is_unprocessable() {
        let mut request = overpaid_request("A", "B");
        request["payments"][0]["amount_paid"] = json!("-3000");
        let (status, body) = post_json(app(InMemoryFeeLedger::default()), URI, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("negative amount"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let request = Request::post(URI)
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(InMemoryFeeLedger::default()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }
}

mod middleware {
    use super::*;

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app(InMemoryFeeLedger::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
