//! # Supplier

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{active_label, normalize_key, unknown};
use crate::error::CoreError;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::Screen;
use crate::validation::Violations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    #[serde(default)]
    pub supplier_no: String,
    pub supplier_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierFacet {
    Country,
    Status,
}

impl FromStr for SupplierFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "country" => Ok(SupplierFacet::Country),
            "status" => Ok(SupplierFacet::Status),
            _ => Err(unknown("supplier filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierSort {
    Name,
    SupplierNo,
    Country,
}

impl FromStr for SupplierSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "name" | "supplier-name" => Ok(SupplierSort::Name),
            "supplier-no" | "number" => Ok(SupplierSort::SupplierNo),
            "country" => Ok(SupplierSort::Country),
            _ => Err(unknown("supplier sort key", s)),
        }
    }
}

impl Listable for Supplier {
    type Facet = SupplierFacet;
    type SortKey = SupplierSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.supplier_name.as_str()),
            Some(self.supplier_no.as_str()),
            Some(self.country.as_str()),
            Some(self.contact_no.as_str()),
            self.email.as_deref(),
        ]
    }

    fn facet_value(&self, facet: SupplierFacet) -> Option<Cow<'_, str>> {
        match facet {
            SupplierFacet::Country => Some(Cow::Borrowed(self.country.as_str())),
            SupplierFacet::Status => Some(active_label(self.is_active)),
        }
    }

    fn sort_value(&self, key: SupplierSort) -> SortValue {
        match key {
            SupplierSort::Name => SortValue::text(Some(self.supplier_name.as_str())),
            SupplierSort::SupplierNo => SortValue::text(Some(self.supplier_no.as_str())),
            SupplierSort::Country => SortValue::text(Some(self.country.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierForm {
    pub supplier_no: String,
    pub supplier_name: String,
    pub country: String,
    pub contact_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_active: bool,
}

impl Default for SupplierForm {
    fn default() -> Self {
        SupplierForm {
            supplier_no: String::new(),
            supplier_name: String::new(),
            country: String::new(),
            contact_no: String::new(),
            email: None,
            is_active: true,
        }
    }
}

impl From<&Supplier> for SupplierForm {
    fn from(s: &Supplier) -> Self {
        SupplierForm {
            supplier_no: s.supplier_no.clone(),
            supplier_name: s.supplier_name.clone(),
            country: s.country.clone(),
            contact_no: s.contact_no.clone(),
            email: s.email.clone(),
            is_active: s.is_active,
        }
    }
}

pub struct SupplierSchema;

impl EntitySchema for SupplierSchema {
    const RESOURCE: &'static str = "suppliers";
    const LABEL: &'static str = "suppliers";
    const SEARCH_FIELD: &'static str = "supplierName";
    const SCREEN: Screen = Screen::Suppliers;

    type Record = Supplier;
    type Form = SupplierForm;

    fn record_id(record: &Supplier) -> i64 {
        record.id
    }

    fn new_form() -> SupplierForm {
        SupplierForm {
            supplier_no: numbering::next_number(numbering::SUPPLIER),
            ..SupplierForm::default()
        }
    }

    fn edit_form(record: &Supplier) -> SupplierForm {
        SupplierForm::from(record)
    }

    fn prepare(form: &mut SupplierForm) {
        form.supplier_no = numbering::ensure_number(&form.supplier_no, numbering::SUPPLIER);
    }

    fn validate(form: &SupplierForm) -> Violations {
        let mut v = Violations::new();
        v.required("Supplier number", &form.supplier_no);
        v.required("Supplier name", &form.supplier_name);
        v.required("Country", &form.country);
        v.mobile_number("Contact number", &form.contact_no);
        v.optional_email("Email", form.email.as_deref());
        v
    }
}
