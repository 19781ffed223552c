//! Tenant context for `PostgreSQL` row-level security.
//!
//! Every tenant table carries a `tenant_isolation` policy keyed on the
//! `app.current_organization_id` session variable. Repositories set it
//! with `SET LOCAL` at the start of each transaction, so the database
//! enforces isolation underneath the explicit organization filters in
//! the queries themselves.

use sea_orm::{ConnectionTrait, DbErr};
use uuid::Uuid;

/// Sets the tenant context for the current transaction.
///
/// `SET LOCAL` scopes the variable to the transaction, so nothing leaks
/// onto the pooled connection afterwards.
///
/// # Errors
///
/// Returns an error if the statement fails to execute.
pub async fn set_rls_context<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<(), DbErr> {
    // Uuid displays as hyphenated hex only, so the literal is injection-safe.
    conn.execute_unprepared(&format!(
        "SET LOCAL app.current_organization_id = '{organization_id}'"
    ))
    .await?;
    Ok(())
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    // The policies themselves need a live PostgreSQL; integration tests
    // cover those. Here we pin down the statement we emit.

    #[tokio::test]
    async fn test_emits_set_local_with_org_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let org_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        set_rls_context(&db, org_id).await.unwrap();

        let log = db.into_transaction_log();
        assert_eq!(
            log[0],
            Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SET LOCAL app.current_organization_id = '550e8400-e29b-41d4-a716-446655440000'",
                []
            )
        );
    }
}
