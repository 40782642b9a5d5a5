//! # Employee
//!
//! Staff records managed from the CEO dashboard. Creating an employee also
//! creates the login account (`user`) the backend attaches to it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{active_label, lookup_str, normalize_key, unknown};
use crate::error::CoreError;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::{Named, Ref, Role, Screen};
use crate::validation::Violations;

/// Login account attached to an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    /// Only sent when the account is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    #[serde(default)]
    pub employee_no: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub nic_no: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub status: Option<Named>,
    #[serde(default)]
    pub user: Option<EmployeeAccount>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeFacet {
    Role,
    Status,
}

impl FromStr for EmployeeFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "role" => Ok(EmployeeFacet::Role),
            "status" => Ok(EmployeeFacet::Status),
            _ => Err(unknown("employee filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSort {
    Name,
    EmployeeNo,
    Role,
}

impl FromStr for EmployeeSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "name" => Ok(EmployeeSort::Name),
            "employee-no" | "number" => Ok(EmployeeSort::EmployeeNo),
            "role" => Ok(EmployeeSort::Role),
            _ => Err(unknown("employee sort key", s)),
        }
    }
}

impl Listable for Employee {
    type Facet = EmployeeFacet;
    type SortKey = EmployeeSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.first_name.as_str()),
            Some(self.last_name.as_str()),
            Some(self.employee_no.as_str()),
            Some(self.nic_no.as_str()),
            Some(self.mobile_number.as_str()),
            self.email.as_deref(),
        ]
    }

    /// Role matches either spelling (`CEO`, `product manager`); status falls
    /// back to the active flag when no status row is attached.
    fn facet_value(&self, facet: EmployeeFacet) -> Option<Cow<'_, str>> {
        match facet {
            EmployeeFacet::Role => Some(Cow::Borrowed(self.role.as_str())),
            EmployeeFacet::Status => match lookup_str(&self.status) {
                Some(name) => Some(Cow::Borrowed(name)),
                None => Some(active_label(self.is_active)),
            },
        }
    }

    fn sort_value(&self, key: EmployeeSort) -> SortValue {
        match key {
            EmployeeSort::Name => SortValue::text(Some(self.full_name().as_str())),
            EmployeeSort::EmployeeNo => SortValue::text(Some(self.employee_no.as_str())),
            EmployeeSort::Role => SortValue::text(Some(self.role.as_str())),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub employee_no: String,
    pub first_name: String,
    pub last_name: String,
    pub nic_no: String,
    pub mobile_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: bool,
    pub status: Option<Ref>,
    pub user: EmployeeAccount,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        EmployeeForm {
            employee_no: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            nic_no: String::new(),
            mobile_number: String::new(),
            email: None,
            role: None,
            is_active: true,
            status: None,
            user: EmployeeAccount::default(),
        }
    }
}

impl EmployeeForm {
    pub fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.required("Employee number", &self.employee_no);
        v.required("First name", &self.first_name);
        v.required("Last name", &self.last_name);
        v.nic("NIC number", &self.nic_no);
        v.mobile_number("Mobile number", &self.mobile_number);
        v.optional_email("Email", self.email.as_deref());
        v.selected("Role", &self.role);
        v.selected("Status", &self.status);
        v.required("Username", &self.user.username);
        // Edits leave the password untouched.
        if self.user.id.is_none() {
            v.min_len(
                "Password",
                self.user.password.as_deref().unwrap_or_default(),
                crate::MIN_PASSWORD_LEN,
            );
        }
        v
    }
}

impl From<&Employee> for EmployeeForm {
    fn from(e: &Employee) -> Self {
        EmployeeForm {
            employee_no: e.employee_no.clone(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            nic_no: e.nic_no.clone(),
            mobile_number: e.mobile_number.clone(),
            email: e.email.clone(),
            role: Some(e.role),
            is_active: e.is_active,
            status: e.status.as_ref().map(Named::reference),
            user: e
                .user
                .as_ref()
                .map(|u| EmployeeAccount {
                    id: u.id,
                    username: u.username.clone(),
                    password: None,
                })
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

pub struct EmployeeSchema;

impl EntitySchema for EmployeeSchema {
    const RESOURCE: &'static str = "employees";
    const LABEL: &'static str = "employees";
    const SEARCH_FIELD: &'static str = "name";
    const SCREEN: Screen = Screen::Employees;

    type Record = Employee;
    type Form = EmployeeForm;

    fn record_id(record: &Employee) -> i64 {
        record.id
    }

    fn new_form() -> EmployeeForm {
        EmployeeForm {
            employee_no: numbering::next_number(numbering::EMPLOYEE),
            ..EmployeeForm::default()
        }
    }

    fn edit_form(record: &Employee) -> EmployeeForm {
        EmployeeForm::from(record)
    }

    fn prepare(form: &mut EmployeeForm) {
        form.employee_no = numbering::ensure_number(&form.employee_no, numbering::EMPLOYEE);
        form.nic_no = form.nic_no.trim().to_uppercase();
        form.mobile_number = form.mobile_number.trim().to_string();
    }

    fn validate(form: &EmployeeForm) -> Violations {
        form.validate()
    }
}
