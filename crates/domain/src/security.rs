use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wardgate_core::AppError;

/// Role assigned to a user at authentication time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Hospital administrator.
    Admin,
    /// Treating physician.
    Doctor,
    /// Ward nurse.
    Nurse,
    /// Patient with access to their own data.
    Patient,
}

impl Role {
    /// Returns the stored role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Doctor => "Doctor",
            Self::Nurse => "Nurse",
            Self::Patient => "Patient",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Doctor, Role::Nurse, Role::Patient];

        ALL
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Doctor" => Ok(Self::Doctor),
            "Nurse" => Ok(Self::Nurse),
            "Patient" => Ok(Self::Patient),
            _ => Err(AppError::Forbidden(format!("unknown role '{value}'"))),
        }
    }
}

/// Access-controlled entity set in the hospital store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    /// Patient master data.
    Patients,
    /// Doctor master data.
    Doctors,
    /// Scheduled appointments.
    Appointments,
    /// Clinical records.
    MedicalRecords,
    /// Ward admissions.
    Admissions,
}

impl Resource {
    /// Returns the table name in the hospital store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patients => "Patients",
            Self::Doctors => "Doctors",
            Self::Appointments => "Appointments",
            Self::MedicalRecords => "MedicalRecords",
            Self::Admissions => "Admissions",
        }
    }

    /// Returns all resources in dashboard order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Patients,
            Resource::Doctors,
            Resource::Appointments,
            Resource::MedicalRecords,
            Resource::Admissions,
        ];

        ALL
    }
}

impl Display for Resource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Patients" => Ok(Self::Patients),
            "Doctors" => Ok(Self::Doctors),
            "Appointments" => Ok(Self::Appointments),
            "MedicalRecords" => Ok(Self::MedicalRecords),
            "Admissions" => Ok(Self::Admissions),
            _ => Err(AppError::Forbidden(format!("unknown resource '{value}'"))),
        }
    }
}

/// Single operation grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// List and fetch rows.
    Read,
    /// Update rows.
    Write,
    /// Delete rows.
    Delete,
}

impl Permission {
    /// Returns the lowercase permission name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }

    /// Returns the compact flag used in permission strings.
    #[must_use]
    pub fn flag(&self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
            Self::Delete => 'D',
        }
    }
}

/// Set of permissions a role holds on one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    read: bool,
    write: bool,
    delete: bool,
}

impl PermissionSet {
    /// No access.
    pub const NONE: Self = Self {
        read: false,
        write: false,
        delete: false,
    };

    /// Read only.
    pub const READ: Self = Self {
        read: true,
        write: false,
        delete: false,
    };

    /// Read and write.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
        delete: false,
    };

    /// Read, write and delete.
    pub const ALL: Self = Self {
        read: true,
        write: true,
        delete: true,
    };

    /// Returns whether the set grants the permission.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => self.read,
            Permission::Write => self.write,
            Permission::Delete => self.delete,
        }
    }

    /// Returns whether no permission is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.read || self.write || self.delete)
    }
}

impl Display for PermissionSet {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        for permission in [Permission::Read, Permission::Write, Permission::Delete] {
            if self.contains(permission) {
                write!(formatter, "{}", permission.flag())?;
            }
        }

        Ok(())
    }
}
