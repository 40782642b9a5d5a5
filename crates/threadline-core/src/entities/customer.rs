//! # Customer
//!
//! Customer rows are created two ways: by the CEO from the back office, or by
//! the customer through self-registration, which also creates their login.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{lookup_name, lookup_str, normalize_key, unknown};
use crate::error::CoreError;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::{Named, Ref, Screen};
use crate::validation::Violations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub customer_no: String,
    pub full_name: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nic_no: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub province: Option<Named>,
    #[serde(default)]
    pub status: Option<Named>,
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerFacet {
    Province,
    Status,
}

impl FromStr for CustomerFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "province" => Ok(CustomerFacet::Province),
            "status" => Ok(CustomerFacet::Status),
            _ => Err(unknown("customer filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSort {
    Name,
    CustomerNo,
    DateOfBirth,
    Province,
}

impl FromStr for CustomerSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "name" | "full-name" => Ok(CustomerSort::Name),
            "customer-no" | "number" => Ok(CustomerSort::CustomerNo),
            "dob" | "date-of-birth" => Ok(CustomerSort::DateOfBirth),
            "province" => Ok(CustomerSort::Province),
            _ => Err(unknown("customer sort key", s)),
        }
    }
}

impl Listable for Customer {
    type Facet = CustomerFacet;
    type SortKey = CustomerSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.full_name.as_str()),
            Some(self.customer_no.as_str()),
            Some(self.email.as_str()),
            Some(self.nic_no.as_str()),
            Some(self.mobile_number.as_str()),
            Some(self.address.as_str()),
        ]
    }

    fn facet_value(&self, facet: CustomerFacet) -> Option<Cow<'_, str>> {
        match facet {
            CustomerFacet::Province => lookup_name(&self.province),
            CustomerFacet::Status => lookup_name(&self.status),
        }
    }

    fn sort_value(&self, key: CustomerSort) -> SortValue {
        match key {
            CustomerSort::Name => SortValue::text(Some(self.full_name.as_str())),
            CustomerSort::CustomerNo => SortValue::text(Some(self.customer_no.as_str())),
            // ISO dates order correctly as text.
            CustomerSort::DateOfBirth => {
                SortValue::text(self.date_of_birth.map(|d| d.to_string()).as_deref())
            }
            CustomerSort::Province => SortValue::text(lookup_str(&self.province)),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
    pub customer_no: String,
    pub full_name: String,
    #[ts(type = "string | null")]
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub nic_no: String,
    pub mobile_number: String,
    pub address: String,
    pub zip_code: String,
    pub province: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Ref>,
}

impl CustomerForm {
    pub fn validate(&self) -> Violations {
        self.validate_on(Utc::now().date_naive())
    }

    /// Same rules with an explicit "today" for the birth-date check.
    pub fn validate_on(&self, today: NaiveDate) -> Violations {
        let mut v = Violations::new();
        v.required("Full name", &self.full_name);
        v.not_in_future("Date of birth", self.date_of_birth, today);
        v.email("Email", &self.email);
        v.nic("NIC number", &self.nic_no);
        v.mobile_number("Mobile number", &self.mobile_number);
        v.required("Address", &self.address);
        v.zip_code("Zip code", &self.zip_code);
        v.selected("Province", &self.province);
        v
    }
}

impl From<&Customer> for CustomerForm {
    fn from(c: &Customer) -> Self {
        CustomerForm {
            customer_no: c.customer_no.clone(),
            full_name: c.full_name.clone(),
            date_of_birth: c.date_of_birth,
            email: c.email.clone(),
            nic_no: c.nic_no.clone(),
            mobile_number: c.mobile_number.clone(),
            address: c.address.clone(),
            zip_code: c.zip_code.clone(),
            province: c.province.as_ref().map(Named::reference),
            status: c.status.as_ref().map(Named::reference),
        }
    }
}

/// Self-registration body for `POST /auth/register`: the customer profile
/// plus the credentials of the account to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(flatten)]
    #[ts(flatten)]
    pub customer: CustomerForm,
    pub username: String,
    pub password: String,
    /// Checked locally, never sent.
    #[serde(skip)]
    #[ts(skip)]
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Violations {
        self.validate_on(Utc::now().date_naive())
    }

    pub fn validate_on(&self, today: NaiveDate) -> Violations {
        let mut v = self.customer.validate_on(today);
        v.required("Username", &self.username);
        v.min_len("Password", &self.password, crate::MIN_PASSWORD_LEN);
        if self.password != self.confirm_password {
            v.push(crate::error::ValidationError::Mismatch {
                field: "Password confirmation",
                other: "password",
            });
        }
        v
    }

    /// Fills the customer number if the caller left it blank.
    pub fn prepare(&mut self) {
        self.customer.customer_no =
            numbering::ensure_number(&self.customer.customer_no, numbering::CUSTOMER);
    }
}

// =============================================================================
// Schema
// =============================================================================

pub struct CustomerSchema;

impl EntitySchema for CustomerSchema {
    const RESOURCE: &'static str = "customers";
    const LABEL: &'static str = "customers";
    const SEARCH_FIELD: &'static str = "fullName";
    const SCREEN: Screen = Screen::Customers;

    type Record = Customer;
    type Form = CustomerForm;

    fn record_id(record: &Customer) -> i64 {
        record.id
    }

    fn new_form() -> CustomerForm {
        CustomerForm {
            customer_no: numbering::next_number(numbering::CUSTOMER),
            ..CustomerForm::default()
        }
    }

    fn edit_form(record: &Customer) -> CustomerForm {
        CustomerForm::from(record)
    }

    fn prepare(form: &mut CustomerForm) {
        form.customer_no = numbering::ensure_number(&form.customer_no, numbering::CUSTOMER);
    }

    fn validate(form: &CustomerForm) -> Violations {
        form.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn valid_form() -> CustomerForm {
        CustomerForm {
            full_name: "Sunethra Silva".into(),
            date_of_birth: Some(date("1994-02-11")),
            email: "sunethra@example.lk".into(),
            nic_no: "199412345678".into(),
            mobile_number: "0712345678".into(),
            address: "12 Galle Road, Colombo".into(),
            zip_code: "00300".into(),
            province: Some(Ref::new(1)),
            ..CustomerSchema::new_form()
        }
    }

    #[test]
    fn test_valid_customer() {
        assert!(valid_form().validate_on(date("2024-06-01")).is_empty());
    }

    #[test]
    fn test_customer_rules() {
        let form = CustomerForm {
            date_of_birth: Some(date("2030-01-01")),
            zip_code: "0030".into(),
            email: "sunethra.example.lk".into(),
            ..valid_form()
        };
        assert_eq!(
            form.validate_on(date("2024-06-01")).messages(),
            vec![
                "Date of birth cannot be in the future",
                "Email must be a valid email address",
                "Zip code must be exactly 5 digits",
            ]
        );
    }

    #[test]
    fn test_registration_body_is_flat_and_omits_confirmation() {
        let mut form = RegistrationForm {
            customer: CustomerForm {
                customer_no: String::new(),
                ..valid_form()
            },
            username: "sunethra".into(),
            password: "cotton-candy".into(),
            confirm_password: "cotton-candy".into(),
        };
        form.prepare();
        assert!(form.customer.customer_no.starts_with("CUS"));
        assert!(form.validate_on(date("2024-06-01")).is_empty());

        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["fullName"], "Sunethra Silva");
        assert_eq!(body["dateOfBirth"], "1994-02-11");
        assert_eq!(body["username"], "sunethra");
        assert!(body.get("confirmPassword").is_none());
        assert!(body.get("customer").is_none());
    }

    #[test]
    fn test_registration_password_mismatch() {
        let form = RegistrationForm {
            customer: valid_form(),
            username: "sunethra".into(),
            password: "cotton-candy".into(),
            confirm_password: "cotton-candi".into(),
        };
        assert_eq!(
            form.validate_on(date("2024-06-01")).joined(),
            "Password confirmation does not match password"
        );
    }
}
