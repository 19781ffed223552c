//! Alert repository tests: pure enum mappings and the de-duplication
//! branches of `create_if_absent` against a mock connection.

use std::collections::BTreeMap;

use rebar_core::alert::{AlertDraft, AlertSeverity as CoreSeverity, AlertType as CoreType};
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use uuid::Uuid;

use super::{AlertRepository, db_alert_type, db_severity};
use crate::entities::budget_alerts;
use crate::entities::sea_orm_active_enums::{AlertSeverity, AlertStatus, AlertType};

#[test]
fn test_alert_type_mapping() {
    assert_eq!(
        db_alert_type(CoreType::ThresholdWarning),
        AlertType::ThresholdWarning
    );
    assert_eq!(
        db_alert_type(CoreType::ThresholdCritical),
        AlertType::ThresholdCritical
    );
    assert_eq!(db_alert_type(CoreType::OverBudget), AlertType::OverBudget);
}

#[test]
fn test_severity_mapping() {
    assert_eq!(db_severity(CoreSeverity::Warning), AlertSeverity::Warning);
    assert_eq!(db_severity(CoreSeverity::Critical), AlertSeverity::Critical);
}

fn count_row(num_items: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(num_items))])
}

fn warning_draft() -> AlertDraft {
    AlertDraft {
        alert_type: CoreType::ThresholdWarning,
        severity: CoreSeverity::Warning,
        message: "Budget warning: 85% of budget consumed".to_string(),
    }
}

#[tokio::test]
async fn test_create_if_absent_suppresses_duplicate_unresolved_alert() {
    // One unresolved alert of the same type already exists, so
    // re-evaluating the same warning state inserts nothing.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(1)]])
        .into_connection();

    let inserted =
        AlertRepository::create_if_absent(&db, Uuid::new_v4(), Uuid::new_v4(), &warning_draft())
            .await
            .unwrap();

    assert!(inserted.is_none());
}

#[tokio::test]
async fn test_create_if_absent_inserts_when_prior_alerts_are_resolved() {
    let organization_id = Uuid::new_v4();
    let project_id = Uuid::new_v4();
    let now = chrono::Utc::now().into();
    let row = budget_alerts::Model {
        id: Uuid::new_v4(),
        organization_id,
        project_id,
        alert_type: AlertType::ThresholdWarning,
        severity: AlertSeverity::Warning,
        message: "Budget warning: 85% of budget consumed".to_string(),
        status: AlertStatus::Active,
        acknowledged_by: None,
        acknowledged_at: None,
        resolved_by: None,
        resolved_at: None,
        created_at: now,
        updated_at: now,
    };

    // Resolved alerts do not count as unresolved, so the same condition
    // recurring after resolution raises a fresh alert.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(0)]])
        .append_query_results([[row]])
        .into_connection();

    let inserted =
        AlertRepository::create_if_absent(&db, organization_id, project_id, &warning_draft())
            .await
            .unwrap()
            .expect("a fresh alert should be inserted");

    assert_eq!(inserted.alert_type, AlertType::ThresholdWarning);
    assert_eq!(inserted.status, AlertStatus::Active);
}

#[test]
fn test_severity_follows_type() {
    assert_eq!(
        db_severity(CoreType::ThresholdWarning.severity()),
        AlertSeverity::Warning
    );
    assert_eq!(
        db_severity(CoreType::ThresholdCritical.severity()),
        AlertSeverity::Critical
    );
    assert_eq!(
        db_severity(CoreType::OverBudget.severity()),
        AlertSeverity::Critical
    );
}
