//! Column catalogue of the hospital store.
//!
//! Every identifier that ends up in a statement comes from this module. Callers
//! name columns by string, and those strings are only ever used as lookup keys
//! into these tables.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wardgate_core::{AppError, AppResult};

use crate::Resource;

/// Storage type of an updatable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// 64-bit integer.
    Integer,
    /// Free text.
    Text,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
}

impl ColumnType {
    /// Returns the lowercase type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Date => "date",
        }
    }
}

/// Typed value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// Date value.
    Date(NaiveDate),
    /// SQL NULL of the given column type.
    Null(ColumnType),
}

/// Updatable column with its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
    name: &'static str,
    column_type: ColumnType,
    nullable: bool,
}

impl ColumnDefinition {
    const fn new(name: &'static str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name,
            column_type,
            nullable,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared storage type.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns whether the column accepts NULL.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Converts a submitted string into a value of the declared type.
    ///
    /// An empty string on a nullable column becomes NULL and is rejected on a
    /// required one.
    pub fn parse_value(&self, raw: &str) -> AppResult<FieldValue> {
        if raw.is_empty() {
            if self.nullable {
                return Ok(FieldValue::Null(self.column_type));
            }
            return Err(AppError::InvalidInput(format!(
                "column '{}' is required and cannot be empty",
                self.name
            )));
        }

        match self.column_type {
            ColumnType::Text => Ok(FieldValue::Text(raw.to_owned())),
            ColumnType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| self.type_mismatch()),
            ColumnType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| self.type_mismatch()),
        }
    }

    fn type_mismatch(&self) -> AppError {
        AppError::InvalidInput(format!(
            "column '{}' expects a {} value",
            self.name,
            self.column_type.as_str()
        ))
    }
}

/// Primary key and updatable columns of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    resource: Resource,
    primary_key: &'static str,
    updatable_columns: &'static [ColumnDefinition],
}

impl ResourceSchema {
    /// Returns the described resource.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the primary-key column.
    #[must_use]
    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    /// Returns the updatable columns in declaration order.
    #[must_use]
    pub fn updatable_columns(&self) -> &'static [ColumnDefinition] {
        self.updatable_columns
    }

    /// Finds an updatable column by name.
    #[must_use]
    pub fn updatable_column(&self, name: &str) -> Option<&'static ColumnDefinition> {
        self.updatable_columns
            .iter()
            .find(|column| column.name == name)
    }
}

use ColumnType::{Date, Integer, Text};

// user_id links rows to login accounts and is owned by the identity service,
// so it is never updatable through this layer.
const PATIENTS: ResourceSchema = ResourceSchema {
    resource: Resource::Patients,
    primary_key: "patient_id",
    updatable_columns: &[
        ColumnDefinition::new("first_name", Text, false),
        ColumnDefinition::new("last_name", Text, false),
        ColumnDefinition::new("date_of_birth", Date, true),
        ColumnDefinition::new("gender", Text, true),
        ColumnDefinition::new("phone", Text, true),
        ColumnDefinition::new("address", Text, true),
    ],
};

const DOCTORS: ResourceSchema = ResourceSchema {
    resource: Resource::Doctors,
    primary_key: "doctor_id",
    updatable_columns: &[
        ColumnDefinition::new("first_name", Text, false),
        ColumnDefinition::new("last_name", Text, false),
        ColumnDefinition::new("specialization", Text, true),
        ColumnDefinition::new("phone", Text, true),
        ColumnDefinition::new("email", Text, true),
    ],
};

const APPOINTMENTS: ResourceSchema = ResourceSchema {
    resource: Resource::Appointments,
    primary_key: "appointment_id",
    updatable_columns: &[
        ColumnDefinition::new("patient_id", Integer, false),
        ColumnDefinition::new("doctor_id", Integer, false),
        ColumnDefinition::new("appointment_date", Date, false),
        ColumnDefinition::new("status", Text, true),
        ColumnDefinition::new("reason", Text, true),
    ],
};

// Existing stores key this table as medicalrecord_id.
const MEDICAL_RECORDS: ResourceSchema = ResourceSchema {
    resource: Resource::MedicalRecords,
    primary_key: "medicalrecord_id",
    updatable_columns: &[
        ColumnDefinition::new("patient_id", Integer, false),
        ColumnDefinition::new("doctor_id", Integer, false),
        ColumnDefinition::new("record_date", Date, false),
        ColumnDefinition::new("diagnosis", Text, true),
        ColumnDefinition::new("treatment", Text, true),
        ColumnDefinition::new("notes", Text, true),
    ],
};

const ADMISSIONS: ResourceSchema = ResourceSchema {
    resource: Resource::Admissions,
    primary_key: "admission_id",
    updatable_columns: &[
        ColumnDefinition::new("patient_id", Integer, false),
        ColumnDefinition::new("room_number", Text, true),
        ColumnDefinition::new("admission_date", Date, false),
        ColumnDefinition::new("discharge_date", Date, true),
        ColumnDefinition::new("reason", Text, true),
    ],
};

impl Resource {
    /// Returns the column catalogue for this resource.
    #[must_use]
    pub fn schema(&self) -> &'static ResourceSchema {
        match self {
            Self::Patients => &PATIENTS,
            Self::Doctors => &DOCTORS,
            Self::Appointments => &APPOINTMENTS,
            Self::MedicalRecords => &MEDICAL_RECORDS,
            Self::Admissions => &ADMISSIONS,
        }
    }

    /// Returns the primary-key column for this resource.
    #[must_use]
    pub fn primary_key(&self) -> &'static str {
        self.schema().primary_key()
    }
}

/// Column name to submitted value for a single-row update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateRequest(BTreeMap<String, String>);

impl UpdateRequest {
    /// Creates an empty update request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one assignment.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Iterates assignments ordered by column name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }

    /// Returns whether no assignment was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for UpdateRequest {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self(value)
    }
}
