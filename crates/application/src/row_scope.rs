use std::str::FromStr;

use wardgate_core::AppError;
use wardgate_domain::{OwnerLookup, OwnershipFilter, Resource, Role, RowScope, UserId};

/// How a doctor's login is matched against `doctor_id` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoctorIdentity {
    /// The acting user id is compared with `doctor_id` as is.
    ///
    /// This assumes doctor rows are keyed by the login id, which existing
    /// deployments rely on even though the two ids are not guaranteed equal.
    #[default]
    UserId,
    /// `doctor_id` is resolved from the doctors row linked to the login.
    DoctorsLookup,
}

impl DoctorIdentity {
    /// Returns the configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::DoctorsLookup => "doctors_lookup",
        }
    }
}

impl FromStr for DoctorIdentity {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user_id" => Ok(Self::UserId),
            "doctors_lookup" => Ok(Self::DoctorsLookup),
            _ => Err(AppError::InvalidInput(format!(
                "doctor identity must be 'user_id' or 'doctors_lookup', got '{value}'"
            ))),
        }
    }
}

/// Row-level visibility rules per role and resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopePolicy {
    doctor_identity: DoctorIdentity,
}

impl ScopePolicy {
    /// Creates a policy with the given doctor identification.
    #[must_use]
    pub fn new(doctor_identity: DoctorIdentity) -> Self {
        Self { doctor_identity }
    }

    /// Returns the configured doctor identification.
    #[must_use]
    pub fn doctor_identity(&self) -> DoctorIdentity {
        self.doctor_identity
    }

    /// Derives the row filter for one request.
    ///
    /// Callers must have checked the permission table first; this only narrows
    /// rows and never grants access.
    #[must_use]
    pub fn resolve_scope(&self, role: Role, resource: Resource, user_id: UserId) -> RowScope {
        match (role, resource) {
            (Role::Doctor, Resource::MedicalRecords | Resource::Appointments) => {
                RowScope::OwnedByDoctor(self.doctor_filter(user_id))
            }
            (Role::Patient, Resource::Patients) => {
                RowScope::OwnedByPatient(OwnershipFilter::direct(OwnerLookup::USER_COLUMN, user_id))
            }
            (Role::Patient, Resource::MedicalRecords | Resource::Appointments) => {
                RowScope::OwnedByPatient(OwnershipFilter::through(
                    "patient_id",
                    user_id,
                    OwnerLookup::new(Resource::Patients, Resource::Patients.primary_key()),
                ))
            }
            (Role::Admin | Role::Nurse | Role::Doctor | Role::Patient, _) => {
                RowScope::Unrestricted
            }
        }
    }

    fn doctor_filter(&self, user_id: UserId) -> OwnershipFilter {
        match self.doctor_identity {
            DoctorIdentity::UserId => OwnershipFilter::direct("doctor_id", user_id),
            DoctorIdentity::DoctorsLookup => OwnershipFilter::through(
                "doctor_id",
                user_id,
                OwnerLookup::new(Resource::Doctors, Resource::Doctors.primary_key()),
            ),
        }
    }
}

/// Resolves the row scope with the default policy.
#[must_use]
pub fn resolve_scope(role: Role, resource: Resource, user_id: UserId) -> RowScope {
    ScopePolicy::default().resolve_scope(role, resource, user_id)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use wardgate_domain::{OwnerLookup, OwnershipFilter, Resource, Role, RowScope, UserId};

    use super::{DoctorIdentity, ScopePolicy, resolve_scope};

    #[test]
    fn admin_and_nurse_are_unrestricted_everywhere() {
        for role in [Role::Admin, Role::Nurse] {
            for resource in Resource::all() {
                assert_eq!(
                    resolve_scope(role, *resource, UserId::new(3)),
                    RowScope::Unrestricted
                );
            }
        }
    }

    #[test]
    fn doctor_clinical_tables_filter_on_doctor_id() {
        for resource in [Resource::MedicalRecords, Resource::Appointments] {
            assert_eq!(
                resolve_scope(Role::Doctor, resource, UserId::new(12)),
                RowScope::OwnedByDoctor(OwnershipFilter::direct("doctor_id", UserId::new(12)))
            );
        }
        assert!(resolve_scope(Role::Doctor, Resource::Patients, UserId::new(12)).is_unrestricted());
        assert!(resolve_scope(Role::Doctor, Resource::Admissions, UserId::new(12)).is_unrestricted());
    }

    #[test]
    fn doctor_lookup_goes_through_doctors_table() {
        let policy = ScopePolicy::new(DoctorIdentity::DoctorsLookup);
        let scope = policy.resolve_scope(Role::Doctor, Resource::MedicalRecords, UserId::new(12));
        let lookup = scope.ownership().and_then(|filter| filter.lookup()).copied();
        assert_eq!(
            lookup,
            Some(OwnerLookup::new(Resource::Doctors, "doctor_id"))
        );
    }

    #[test]
    fn patient_sees_own_patient_row_directly() {
        let scope = resolve_scope(Role::Patient, Resource::Patients, UserId::new(8));
        assert_eq!(
            scope,
            RowScope::OwnedByPatient(OwnershipFilter::direct("user_id", UserId::new(8)))
        );
    }

    #[test]
    fn patient_appointments_resolve_through_patients() {
        let scope = resolve_scope(Role::Patient, Resource::Appointments, UserId::new(8));
        let filter = scope.ownership().copied();
        assert_eq!(
            filter,
            Some(OwnershipFilter::through(
                "patient_id",
                UserId::new(8),
                OwnerLookup::new(Resource::Patients, "patient_id"),
            ))
        );
    }

    #[test]
    fn doctor_identity_parses_config_values() {
        assert_eq!(
            DoctorIdentity::from_str("doctors_lookup").ok(),
            Some(DoctorIdentity::DoctorsLookup)
        );
        assert_eq!(
            DoctorIdentity::from_str(DoctorIdentity::UserId.as_str()).ok(),
            Some(DoctorIdentity::UserId)
        );
        assert!(DoctorIdentity::from_str("doctor").is_err());
    }
}
