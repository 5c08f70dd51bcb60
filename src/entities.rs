//! Backend record types.
//!
//! Each resource under `/api/v1/` has an explicit record type with a fixed
//! column list; tables are built from those columns rather than from
//! whatever keys a payload happens to carry. The API owns validation, so
//! every non-key field is optional here.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::PosError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Products,
    Employees,
    Branches,
    Transactions,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Customers,
        EntityKind::Products,
        EntityKind::Employees,
        EntityKind::Branches,
        EntityKind::Transactions,
    ];

    /// Resource segment under `/api/v1/`.
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Customers => "customers",
            EntityKind::Products => "products",
            EntityKind::Employees => "employees",
            EntityKind::Branches => "branches",
            EntityKind::Transactions => "transactions",
        }
    }

    /// Section heading shown above the table.
    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Customers => "Customers",
            EntityKind::Products => "Product Inventory",
            EntityKind::Employees => "Staff Members",
            EntityKind::Branches => "Store Branches",
            EntityKind::Transactions => "Sales Activity",
        }
    }

    /// Upper-case singular label used in form headings.
    pub fn singular(self) -> &'static str {
        match self {
            EntityKind::Customers => "CUSTOMER",
            EntityKind::Products => "PRODUCT",
            EntityKind::Employees => "EMPLOYEE",
            EntityKind::Branches => "BRANCH",
            EntityKind::Transactions => "TRANSACTION",
        }
    }

    /// Headers used when a collection comes back empty, so a table never
    /// renders without columns.
    pub fn fallback_headers(self) -> &'static [&'static str] {
        match self {
            EntityKind::Employees => &["id", "name", "age", "email", "role"],
            EntityKind::Branches => &["id", "name", "location", "size"],
            EntityKind::Transactions => &["id", "total", "dateOfTransaction"],
            EntityKind::Customers | EntityKind::Products => &["id", "name"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for EntityKind {
    type Err = PosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.resource() == wanted || k.singular().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| PosError::validation(format!("Unknown section: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One table cell, typed so the renderer can format booleans and nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl From<Option<String>> for CellValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(CellValue::Null, CellValue::Text)
    }
}

impl From<Option<i64>> for CellValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(CellValue::Null, CellValue::Int)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(CellValue::Null, CellValue::Decimal)
    }
}

impl From<Option<bool>> for CellValue {
    fn from(v: Option<bool>) -> Self {
        v.map_or(CellValue::Null, CellValue::Bool)
    }
}

pub trait EntityRecord: DeserializeOwned {
    const KIND: EntityKind;
    /// Columns in display order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Value of `column`, or `Null` for a column this record does not have.
    fn cell(&self, column: &str) -> CellValue;
}

// ---------------------------------------------------------------------------
// Lenient number decoding
// ---------------------------------------------------------------------------

/// Decimal columns arrive either as JSON numbers or as strings ("30.02").
fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid decimal: {s}"))),
    }
}

/// Category ids are stored as short strings but older rows carry numbers.
fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub membership: Option<bool>,
}

impl EntityRecord for Customer {
    const KIND: EntityKind = EntityKind::Customers;
    const COLUMNS: &'static [&'static str] = &["id", "name", "age", "email", "membership"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::Int(self.id),
            "name" => self.name.clone().into(),
            "age" => self.age.into(),
            "email" => self.email.clone().into(),
            "membership" => self.membership.into(),
            _ => CellValue::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default, rename = "sellPrice", deserialize_with = "flexible_f64")]
    pub sell_price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Shelf price; a product without one sells at zero.
    pub fn price(&self) -> f64 {
        self.sell_price.unwrap_or(0.0)
    }

    pub fn display_name(&self) -> String {
        crate::render::title_case(self.name.as_deref())
    }
}

impl EntityRecord for Product {
    const KIND: EntityKind = EntityKind::Products;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "stock",
        "sellPrice",
        "cost",
        "category_id",
        "category",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::Int(self.id),
            "name" => self.name.clone().into(),
            "stock" => self.stock.into(),
            "sellPrice" => self.sell_price.into(),
            "cost" => self.cost.into(),
            "category_id" => self.category_id.clone().into(),
            "category" => self.category.clone().into(),
            _ => CellValue::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "dateOfEmployment")]
    pub date_of_employment: Option<String>,
    #[serde(default, rename = "dateOfEndOfEmployment")]
    pub date_of_end_of_employment: Option<String>,
}

impl EntityRecord for Employee {
    const KIND: EntityKind = EntityKind::Employees;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "age",
        "email",
        "role",
        "dateOfEmployment",
        "dateOfEndOfEmployment",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::Int(self.id),
            "name" => self.name.clone().into(),
            "age" => self.age.into(),
            "email" => self.email.clone().into(),
            "role" => self.role.clone().into(),
            "dateOfEmployment" => self.date_of_employment.clone().into(),
            "dateOfEndOfEmployment" => self.date_of_end_of_employment.clone().into(),
            _ => CellValue::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub total_stock: Option<i64>,
}

impl Branch {
    pub fn display_name(&self) -> String {
        crate::render::title_case(self.name.as_deref())
    }
}

impl EntityRecord for Branch {
    const KIND: EntityKind = EntityKind::Branches;
    const COLUMNS: &'static [&'static str] = &["id", "name", "location", "size", "total_stock"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::Int(self.id),
            "name" => self.name.clone().into(),
            "location" => self.location.clone().into(),
            "size" => self.size.into(),
            "total_stock" => self.total_stock.into(),
            _ => CellValue::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub branch_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub total: Option<f64>,
    #[serde(default, rename = "dateOfTransaction")]
    pub date_of_transaction: Option<String>,
    #[serde(default, rename = "timeOfTransaction", deserialize_with = "flexible_string")]
    pub time_of_transaction: Option<String>,
}

impl EntityRecord for Transaction {
    const KIND: EntityKind = EntityKind::Transactions;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "branch_id",
        "customer_id",
        "employee_id",
        "total_amount",
        "total",
        "dateOfTransaction",
        "timeOfTransaction",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => CellValue::Int(self.id),
            "branch_id" => self.branch_id.into(),
            "customer_id" => self.customer_id.into(),
            "employee_id" => self.employee_id.into(),
            "total_amount" => self.total_amount.into(),
            "total" => self.total.into(),
            "dateOfTransaction" => self.date_of_transaction.clone().into(),
            "timeOfTransaction" => self.time_of_transaction.clone().into(),
            _ => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parses_plural_and_singular() {
        assert_eq!("products".parse::<EntityKind>().unwrap(), EntityKind::Products);
        assert_eq!("Branch".parse::<EntityKind>().unwrap(), EntityKind::Branches);
        assert!("suppliers".parse::<EntityKind>().is_err());
    }

    #[test]
    fn singular_labels() {
        assert_eq!(EntityKind::Employees.singular(), "EMPLOYEE");
        assert_eq!(EntityKind::Branches.singular(), "BRANCH");
    }

    #[test]
    fn fallback_headers_never_empty() {
        for kind in EntityKind::ALL {
            assert!(!kind.fallback_headers().is_empty());
            assert_eq!(kind.fallback_headers()[0], "id");
        }
        assert_eq!(
            EntityKind::Transactions.fallback_headers(),
            &["id", "total", "dateOfTransaction"]
        );
    }

    #[test]
    fn product_price_accepts_string_or_number() {
        let from_str: Product = serde_json::from_value(json!({
            "id": 1, "name": "redbull drink", "stock": 4,
            "sellPrice": "1.50", "cost": "0.90", "category_id": 2, "category": "drinks"
        }))
        .unwrap();
        assert_eq!(from_str.price(), 1.5);
        assert_eq!(from_str.category_id.as_deref(), Some("2"));

        let from_num: Product =
            serde_json::from_value(json!({ "id": 2, "name": "bread", "sellPrice": 0.75 })).unwrap();
        assert_eq!(from_num.price(), 0.75);
        assert_eq!(from_num.cell("stock"), CellValue::Null);
    }

    #[test]
    fn transaction_cells() {
        let t: Transaction = serde_json::from_value(json!({
            "id": 9, "branch_id": 1, "customer_id": null,
            "total_amount": "25.00", "total": "25.00",
            "dateOfTransaction": "2025-03-01", "timeOfTransaction": "PT10H30M"
        }))
        .unwrap();
        assert_eq!(t.cell("total"), CellValue::Decimal(25.0));
        assert_eq!(t.cell("customer_id"), CellValue::Null);
        assert_eq!(t.cell("nope"), CellValue::Null);
        assert_eq!(t.id(), 9);
    }
}
