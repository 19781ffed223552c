use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use super::*;

fn labour_only_allocation(
    allocation_id: Uuid,
    organization_id: Uuid,
    status: AllocationStatus,
) -> cost_allocations::Model {
    let now = chrono::Utc::now();
    cost_allocations::Model {
        id: allocation_id,
        organization_id,
        project_id: Uuid::new_v4(),
        line_item_id: Uuid::new_v4(),
        labour_cost: dec!(400),
        material_cost: dec!(0),
        quantity: dec!(8),
        unit_cost: dec!(50),
        total_cost: dec!(400),
        status,
        entered_by: Uuid::new_v4(),
        date_incurred: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        description: None,
        submitted_by: Some(Uuid::new_v4()),
        submitted_at: Some(now.into()),
        decided_by: None,
        decided_at: None,
        decision_comments: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_second_approval_fails_when_guarded_update_matches_no_rows() {
    let organization_id = Uuid::new_v4();
    let allocation_id = Uuid::new_v4();

    let pending = labour_only_allocation(allocation_id, organization_id, AllocationStatus::Pending);
    let mut approved = pending.clone();
    approved.status = AllocationStatus::Approved;

    // The first read sees pending, a concurrent approval lands before the
    // guarded update (zero rows matched), and the re-read sees the
    // allocation already approved. The consumed-amount increment never
    // runs: no project update is mocked and none is attempted. Exec
    // results: SET LOCAL tenant context, then the guarded update.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![pending], vec![approved]])
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = CostAllocationRepository::new(db);
    let err = repo
        .approve(organization_id, allocation_id, Uuid::new_v4(), None)
        .await
        .unwrap_err();

    match err {
        AllocationError::Workflow(WorkflowError::InvalidTransition { from, to }) => {
            assert_eq!(from, CoreStatus::Approved);
            assert_eq!(to, CoreStatus::Approved);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_status_mapping_to_core() {
    assert_eq!(core_status(&AllocationStatus::Draft), CoreStatus::Draft);
    assert_eq!(core_status(&AllocationStatus::Pending), CoreStatus::Pending);
    assert_eq!(
        core_status(&AllocationStatus::Approved),
        CoreStatus::Approved
    );
    assert_eq!(
        core_status(&AllocationStatus::Rejected),
        CoreStatus::Rejected
    );
}

#[test]
fn test_status_mapping_round_trip() {
    for status in [
        AllocationStatus::Draft,
        AllocationStatus::Pending,
        AllocationStatus::Approved,
        AllocationStatus::Rejected,
    ] {
        assert_eq!(db_status(core_status(&status)), status);
    }
}
