use proptest::prelude::*;
use wardgate_core::AppError;
use wardgate_domain::{FieldValue, Resource, Role, RowId, RowScope, UpdateRequest, UserId};

use crate::query_plan::{QueryKind, RowExpectation};
use crate::row_scope::resolve_scope;

use super::QueryBuilder;

fn builder() -> QueryBuilder {
    QueryBuilder::default()
}

#[test]
fn schema_name_must_be_plain_identifier() {
    assert!(QueryBuilder::new("hospital_db").is_ok());
    assert!(QueryBuilder::new("_staging2").is_ok());
    assert!(QueryBuilder::new("").is_err());
    assert!(QueryBuilder::new("1hospital").is_err());
    assert!(QueryBuilder::new("hospital\"; DROP SCHEMA public; --").is_err());
    assert!(QueryBuilder::new("a".repeat(64)).is_err());
}

#[test]
fn unrestricted_select_has_no_where_clause() {
    let plan = builder().build_select(Resource::Doctors, &RowScope::Unrestricted, Some(10));

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"Doctors\" ORDER BY \"doctor_id\" LIMIT $1"
    );
    assert_eq!(plan.params(), &[FieldValue::Integer(10)]);
    assert_eq!(plan.kind(), QueryKind::Select);
    assert_eq!(plan.expectation(), RowExpectation::Many);
}

#[test]
fn select_without_limit_omits_limit_clause() {
    let plan = builder().build_select(Resource::Admissions, &RowScope::Unrestricted, None);

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"Admissions\" ORDER BY \"admission_id\""
    );
    assert!(plan.params().is_empty());
}

#[test]
fn doctor_scope_binds_acting_user_id() {
    let scope = resolve_scope(Role::Doctor, Resource::MedicalRecords, UserId::new(42));
    let plan = builder().build_select(Resource::MedicalRecords, &scope, Some(10));

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"MedicalRecords\" WHERE \"doctor_id\" = $1 ORDER BY \"medicalrecord_id\" LIMIT $2"
    );
    assert_eq!(
        plan.params(),
        &[FieldValue::Integer(42), FieldValue::Integer(10)]
    );
}

#[test]
fn patient_indirect_scope_uses_patients_subselect() {
    let scope = resolve_scope(Role::Patient, Resource::Appointments, UserId::new(7));
    let plan = builder().build_select(Resource::Appointments, &scope, Some(10));

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"Appointments\" WHERE \"patient_id\" IN (SELECT \"patient_id\" FROM \"hospital_db\".\"Patients\" WHERE \"user_id\" = $1) ORDER BY \"appointment_id\" LIMIT $2"
    );
    assert_eq!(plan.params(), &[FieldValue::Integer(7), FieldValue::Integer(10)]);
}

#[test]
fn row_fetch_binds_primary_key() {
    let plan = builder().build_row_fetch(Resource::Patients, RowId::new(5));

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"Patients\" WHERE \"patient_id\" = $1"
    );
    assert_eq!(plan.params(), &[FieldValue::Integer(5)]);
    assert_eq!(plan.expectation(), RowExpectation::One);
}

#[test]
fn scoped_row_fetch_combines_key_and_scope() {
    let scope = resolve_scope(Role::Patient, Resource::Patients, UserId::new(8));
    let plan = builder().build_scoped_row_fetch(Resource::Patients, &scope, RowId::new(99));

    assert_eq!(
        plan.statement(),
        "SELECT * FROM \"hospital_db\".\"Patients\" WHERE \"patient_id\" = $1 AND \"user_id\" = $2"
    );
    assert_eq!(plan.params(), &[FieldValue::Integer(99), FieldValue::Integer(8)]);
}

#[test]
fn update_binds_every_value_and_strips_primary_key() {
    let update = UpdateRequest::new()
        .with("admission_id", "777")
        .with("room_number", "12B")
        .with("admission_date", "2024-05-01");
    let plan = builder().build_update(Resource::Admissions, RowId::new(3), &update);

    assert!(plan.is_ok());
    let Ok(plan) = plan else {
        return;
    };
    assert_eq!(
        plan.statement(),
        "UPDATE \"hospital_db\".\"Admissions\" SET \"admission_date\" = $1, \"room_number\" = $2 WHERE \"admission_id\" = $3 RETURNING *"
    );
    assert_eq!(plan.params().len(), 3);
    assert!(matches!(plan.params()[0], FieldValue::Date(_)));
    assert_eq!(plan.params()[1], FieldValue::Text("12B".to_owned()));
    assert_eq!(plan.params()[2], FieldValue::Integer(3));
    assert!(!plan.params().contains(&FieldValue::Integer(777)));
    assert_eq!(plan.kind(), QueryKind::Update);
}

#[test]
fn update_rejects_columns_outside_allow_list() {
    let update = UpdateRequest::new().with("role", "Admin");
    let result = builder().build_update(Resource::Patients, RowId::new(1), &update);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn update_rejects_identity_link_column() {
    let update = UpdateRequest::new().with("user_id", "1");
    let result = builder().build_update(Resource::Patients, RowId::new(1), &update);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn empty_update_is_invalid_input() {
    let result = builder().build_update(Resource::Patients, RowId::new(1), &UpdateRequest::new());

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn update_with_only_primary_key_is_invalid_input() {
    let update = UpdateRequest::new().with("patient_id", "2");
    let result = builder().build_update(Resource::Patients, RowId::new(1), &update);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn fetch_then_empty_update_does_not_build_malformed_plan() {
    let fetch = builder().build_row_fetch(Resource::Doctors, RowId::new(4));
    assert_eq!(fetch.params(), &[FieldValue::Integer(4)]);

    let update = builder().build_update(Resource::Doctors, RowId::new(4), &UpdateRequest::new());
    assert!(matches!(update, Err(AppError::InvalidInput(_))));
}

#[test]
fn update_rejects_values_of_wrong_type() {
    let update = UpdateRequest::new().with("doctor_id", "3; DELETE FROM Users");
    let result = builder().build_update(Resource::Appointments, RowId::new(1), &update);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn scoped_update_cannot_reassign_owner_column() {
    let scope = resolve_scope(Role::Doctor, Resource::Appointments, UserId::new(42));
    let update = UpdateRequest::new().with("doctor_id", "43");
    let result =
        builder().build_scoped_update(Resource::Appointments, &scope, RowId::new(1), &update);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn unrestricted_update_may_reassign_owner_column() {
    let update = UpdateRequest::new().with("doctor_id", "43");
    let result = builder().build_update(Resource::Appointments, RowId::new(1), &update);

    assert!(result.is_ok());
}

#[test]
fn scoped_update_appends_scope_after_primary_key() {
    let scope = resolve_scope(Role::Patient, Resource::Appointments, UserId::new(8));
    let update = UpdateRequest::new().with("reason", "follow-up");
    let plan = builder().build_scoped_update(Resource::Appointments, &scope, RowId::new(2), &update);

    assert!(plan.is_ok());
    let Ok(plan) = plan else {
        return;
    };
    assert_eq!(
        plan.statement(),
        "UPDATE \"hospital_db\".\"Appointments\" SET \"reason\" = $1 WHERE \"appointment_id\" = $2 AND \"patient_id\" IN (SELECT \"patient_id\" FROM \"hospital_db\".\"Patients\" WHERE \"user_id\" = $3) RETURNING *"
    );
}

#[test]
fn delete_binds_primary_key_and_returns_row() {
    let plan = builder().build_delete(Resource::MedicalRecords, RowId::new(11));

    assert_eq!(
        plan.statement(),
        "DELETE FROM \"hospital_db\".\"MedicalRecords\" WHERE \"medicalrecord_id\" = $1 RETURNING *"
    );
    assert_eq!(plan.params(), &[FieldValue::Integer(11)]);
    assert_eq!(plan.kind(), QueryKind::Delete);
    assert_eq!(plan.expectation(), RowExpectation::One);
}

#[test]
fn custom_schema_qualifies_lookup_tables_too() {
    let builder = QueryBuilder::new("ward_7");
    assert!(builder.is_ok());
    let Ok(builder) = builder else {
        return;
    };
    let scope = resolve_scope(Role::Patient, Resource::Appointments, UserId::new(1));
    let plan = builder.build_select(Resource::Appointments, &scope, None);

    assert!(plan.statement().starts_with("SELECT * FROM \"ward_7\".\"Appointments\""));
    assert!(plan.statement().contains("FROM \"ward_7\".\"Patients\""));
}

proptest! {
    #[test]
    fn submitted_values_never_reach_statement_text(payload in "[a-zA-Z0-9 ;=()-]{0,24}") {
        let hostile = format!("{payload}' OR '1'='1");
        let update = UpdateRequest::new()
            .with("diagnosis", hostile.clone())
            .with("notes", "ok");
        let plan = builder().build_update(Resource::MedicalRecords, RowId::new(1), &update);

        prop_assert!(plan.is_ok());
        let plan = plan.map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert!(!plan.statement().contains('\''));
        prop_assert!(plan.params().contains(&FieldValue::Text(hostile)));
    }

    #[test]
    fn unknown_columns_are_always_rejected(column in "[a-z_]{1,20}") {
        let schema = Resource::Doctors.schema();
        prop_assume!(column != schema.primary_key());
        prop_assume!(schema.updatable_column(column.as_str()).is_none());

        let update = UpdateRequest::new().with(column, "value");
        let result = builder().build_update(Resource::Doctors, RowId::new(1), &update);
        prop_assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn placeholders_match_parameter_count(user_id in any::<i64>(), row_id in any::<i64>()) {
        for resource in Resource::all() {
            let scope = resolve_scope(Role::Patient, *resource, UserId::new(user_id));
            let plan = builder().build_scoped_row_fetch(*resource, &scope, RowId::new(row_id));
            let placeholder_count = plan.statement().matches('$').count();
            prop_assert_eq!(placeholder_count, plan.params().len());
        }
    }
}
