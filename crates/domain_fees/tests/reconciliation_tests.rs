//! Tests for fee record reconciliation

use rust_decimal_macros::dec;

use domain_fees::{reconcile, ReconciliationIssue};
use test_utils::{FeeAccountBuilder, LearnerBuilder, ScenarioFixtures, ScopeFixtures};

#[test]
fn test_reference_scenarios_are_clean() {
    for scenario in ScenarioFixtures::all() {
        let account = &scenario.account;
        let report = reconcile(&account.learner, &account.scope, &account.records);
        assert!(report.is_clean(), "{} reported {:?}", scenario.name, report.issues);
    }
}

#[test]
fn test_duplicate_structures_are_reported() {
    let account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(5000))
        .fee(dec!(5200))
        .build();

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert_eq!(report.issues.len(), 1);
    match &report.issues[0] {
        ReconciliationIssue::DuplicateFeeStructure { structure_ids, term, .. } => {
            assert_eq!(structure_ids.len(), 2);
            assert_eq!(structure_ids[0], account.records.structures[0].id);
            assert_eq!(*term, account.scope.term);
        }
        other => panic!("unexpected issue: {:?}", other),
    }
}

#[test]
fn test_repeated_payment_row_is_reported_once() {
    let mut account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(5000))
        .direct_payment(dec!(1000))
        .build();
    let payment = account.records.payments[0].clone();
    account.records.payments.push(payment.clone());
    account.records.payments.push(payment.clone());

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert_eq!(
        report.issues,
        vec![ReconciliationIssue::DuplicatePaymentRow { payment_id: payment.id }]
    );
}

#[test]
fn test_repeated_transaction_row_is_reported() {
    let mut account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(5000))
        .invoice_payment(dec!(1000))
        .build();
    let transaction = account.records.transactions[0].clone();
    account.records.transactions.push(transaction.clone());

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert_eq!(
        report.issues,
        vec![ReconciliationIssue::DuplicateTransactionRow { transaction_id: transaction.id }]
    );
}

#[test]
fn test_cross_channel_reference_is_reported() {
    let account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(5000))
        .direct_payment_with_reference(dec!(2500), "RBT-4471")
        .invoice_payment_with_reference(dec!(2500), "rbt-4471")
        .build();

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert!(report.has_channel_overlap());
    match &report.issues[0] {
        ReconciliationIssue::CrossChannelReference { reference, payment_id, transaction_id } => {
            assert_eq!(reference, "RBT-4471");
            assert_eq!(*payment_id, account.records.payments[0].id);
            assert_eq!(*transaction_id, account.records.transactions[0].id);
        }
        other => panic!("unexpected issue: {:?}", other),
    }
}

#[test]
fn test_out_of_scope_rows_are_not_inspected() {
    let mut account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(5000))
        .out_of_scope_payment(dec!(700))
        .build();
    let transaction = account.records.transactions[0].clone();
    account.records.transactions.push(transaction);

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert!(report.is_clean());
}

#[test]
fn test_ungraded_learner_has_nothing_to_reconcile() {
    let learner = LearnerBuilder::new().build();
    let account = FeeAccountBuilder::for_learner(learner, ScopeFixtures::term_one())
        .fee(dec!(5000))
        .fee(dec!(6000))
        .build();

    let report = reconcile(&account.learner, &account.scope, &account.records);
    assert!(report.is_clean());
    assert_eq!(report.learner_id, account.learner.id);
}

#[test]
fn test_report_serializes_with_kind_tag() {
    let account = FeeAccountBuilder::new(ScopeFixtures::term_one())
        .fee(dec!(1))
        .fee(dec!(2))
        .build();

    let report = reconcile(&account.learner, &account.scope, &account.records);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["issues"][0]["kind"], "duplicate_fee_structure");
    assert_eq!(json["scope"]["term"], "term_1");
}
