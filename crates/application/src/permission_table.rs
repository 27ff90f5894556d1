use std::collections::BTreeMap;

use wardgate_domain::{PermissionSet, Resource, Role};

/// Returns every resource the role holds at least one permission on.
///
/// Resources missing from the returned map are inaccessible.
#[must_use]
pub fn permissions_for(role: Role) -> BTreeMap<Resource, PermissionSet> {
    role_grants(role)
        .iter()
        .filter(|(_, permissions)| !permissions.is_empty())
        .copied()
        .collect()
}

/// Returns the role's permissions on one resource, empty when not granted.
#[must_use]
pub fn permission_for(role: Role, resource: Resource) -> PermissionSet {
    role_grants(role)
        .iter()
        .find(|(granted, _)| *granted == resource)
        .map(|(_, permissions)| *permissions)
        .unwrap_or(PermissionSet::NONE)
}

fn role_grants(role: Role) -> &'static [(Resource, PermissionSet)] {
    match role {
        Role::Admin => &[
            (Resource::Patients, PermissionSet::ALL),
            (Resource::Doctors, PermissionSet::ALL),
            (Resource::Appointments, PermissionSet::ALL),
            (Resource::MedicalRecords, PermissionSet::ALL),
            (Resource::Admissions, PermissionSet::ALL),
        ],
        Role::Doctor => &[
            (Resource::Patients, PermissionSet::READ_WRITE),
            (Resource::Doctors, PermissionSet::READ),
            (Resource::Appointments, PermissionSet::READ_WRITE),
            (Resource::MedicalRecords, PermissionSet::READ_WRITE),
            (Resource::Admissions, PermissionSet::READ),
        ],
        Role::Nurse => &[
            (Resource::Patients, PermissionSet::READ),
            (Resource::Doctors, PermissionSet::READ),
            (Resource::Appointments, PermissionSet::READ_WRITE),
            (Resource::MedicalRecords, PermissionSet::READ),
            (Resource::Admissions, PermissionSet::READ_WRITE),
        ],
        Role::Patient => &[
            (Resource::Patients, PermissionSet::READ),
            (Resource::Appointments, PermissionSet::READ_WRITE),
        ],
    }
}
