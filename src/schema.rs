//! Create-form schemas and value coercion.
//!
//! Form input is always text. Each entity declares its fields and the JSON
//! type each one is sent as; [`coerce_form`] turns the raw `name=value`
//! pairs into the request body, rejecting bad input before anything goes
//! over the wire.

use serde_json::{Map, Number, Value};

use crate::entities::EntityKind;
use crate::error::{PosError, PosResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    Boolean,
    Json,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    /// Allowed values for select-style fields; empty means free input.
    pub choices: &'static [&'static str],
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required: true,
        default: None,
        choices: &[],
    }
}

const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required: false,
        default: None,
        choices: &[],
    }
}

const CUSTOMER_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text),
    field("age", "Age", FieldKind::Integer),
    field("email", "Email", FieldKind::Text),
    FieldSpec {
        default: Some("true"),
        choices: &["true", "false"],
        ..field("membership", "Membership", FieldKind::Boolean)
    },
];

const PRODUCT_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text),
    field("stock", "Stock", FieldKind::Integer),
    field("sellPrice", "Sell Price", FieldKind::Decimal),
    field("cost", "Cost", FieldKind::Decimal),
    field("category_id", "Category ID", FieldKind::Text),
    field("category", "Category Name", FieldKind::Text),
];

const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text),
    field("age", "Age", FieldKind::Integer),
    field("email", "Email", FieldKind::Text),
    FieldSpec {
        default: Some("CASHIER"),
        choices: &["CASHIER", "MANAGER", "STOCKER"],
        ..field("role", "Role", FieldKind::Text)
    },
    field("dateOfEmployment", "Employment Date", FieldKind::Text),
];

const BRANCH_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text),
    field("location", "Location", FieldKind::Text),
    field("size", "Size (sqft)", FieldKind::Integer),
    FieldSpec {
        default: Some("0"),
        ..optional("total_stock", "Initial Stock", FieldKind::Integer)
    },
];

const TRANSACTION_FIELDS: &[FieldSpec] = &[
    field("branch_id", "Branch ID", FieldKind::Integer),
    optional("customer_id", "Customer ID", FieldKind::Integer),
    field("employee_id", "Employee ID", FieldKind::Integer),
    field("total_amount", "Total Amount", FieldKind::Decimal),
    field("dateOfTransaction", "Date", FieldKind::Text),
    field("timeOfTransaction", "Time", FieldKind::Text),
    field("total", "Final Total", FieldKind::Decimal),
    optional("details", "Details JSON", FieldKind::Json),
];

pub fn schema_for(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::Customers => CUSTOMER_FIELDS,
        EntityKind::Products => PRODUCT_FIELDS,
        EntityKind::Employees => EMPLOYEE_FIELDS,
        EntityKind::Branches => BRANCH_FIELDS,
        EntityKind::Transactions => TRANSACTION_FIELDS,
    }
}

/// Integer prefix of `raw`, the way a browser `parseInt` reads "12kg".
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Decimal prefix of `raw`, the way `parseFloat` reads "10.5kg": an
/// optional sign, digits with at most one dot, then an optional exponent.
fn parse_leading_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let b = s.as_bytes();
    let digits = |from: usize| b[from..].iter().take_while(|c| c.is_ascii_digit()).count();

    let mut end = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    s[..end].parse().ok()
}

/// Coerce one raw form value to the JSON type of its field.
///
/// Empty integers become `null` and empty decimals `0`; values that do
/// not parse become `null` and are left for the API to reject. Malformed
/// JSON is the only local error.
pub fn coerce_value(spec: &FieldSpec, raw: &str) -> PosResult<Value> {
    let trimmed = raw.trim();
    let value = match spec.kind {
        FieldKind::Integer => {
            if trimmed.is_empty() {
                Value::Null
            } else {
                parse_leading_int(trimmed).map_or(Value::Null, Value::from)
            }
        }
        FieldKind::Decimal => {
            if trimmed.is_empty() {
                Value::from(0)
            } else {
                parse_leading_decimal(trimmed)
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        FieldKind::Boolean => Value::Bool(trimmed == "true"),
        FieldKind::Json if !trimmed.is_empty() => serde_json::from_str(trimmed)
            .map_err(|_| PosError::validation(format!("Invalid {} format", spec.label)))?,
        FieldKind::Json | FieldKind::Text => Value::String(raw.to_string()),
    };
    Ok(value)
}

/// Build a create-request body for `kind` from `name=value` pairs.
pub fn coerce_form(kind: EntityKind, fields: &[(String, String)]) -> PosResult<Map<String, Value>> {
    let schema = schema_for(kind);

    if let Some((unknown, _)) = fields
        .iter()
        .find(|(name, _)| !schema.iter().any(|f| f.name == name))
    {
        return Err(PosError::validation(format!(
            "Unknown field `{unknown}` for {kind}"
        )));
    }

    let mut body = Map::new();
    for spec in schema {
        let supplied = fields
            .iter()
            .rev()
            .find(|(name, _)| name == spec.name)
            .map(|(_, v)| v.as_str());
        let raw = match supplied.or(spec.default) {
            Some(v) => v,
            None if spec.required => {
                return Err(PosError::validation(format!(
                    "Missing required field: {}",
                    spec.label
                )));
            }
            None => "",
        };

        let raw = if spec.choices.is_empty() {
            raw.to_string()
        } else {
            spec.choices
                .iter()
                .find(|c| c.eq_ignore_ascii_case(raw.trim()))
                .map(|c| c.to_string())
                .ok_or_else(|| {
                    PosError::validation(format!(
                        "{} must be one of: {}",
                        spec.label,
                        spec.choices.join(", ")
                    ))
                })?
        };

        body.insert(spec.name.to_string(), coerce_value(spec, &raw)?);
    }
    Ok(body)
}

/// Split a `name=value` argument.
pub fn parse_assignment(arg: &str) -> PosResult<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| PosError::validation(format!("Expected name=value, got `{arg}`")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PosError::validation(format!("Missing field name in `{arg}`")));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn spec(kind: EntityKind, name: &str) -> FieldSpec {
        *schema_for(kind).iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn integer_coercion() {
        let age = spec(EntityKind::Customers, "age");
        assert_eq!(coerce_value(&age, "42").unwrap(), json!(42));
        assert_eq!(coerce_value(&age, "12kg").unwrap(), json!(12));
        assert_eq!(coerce_value(&age, "").unwrap(), Value::Null);
        assert_eq!(coerce_value(&age, "abc").unwrap(), Value::Null);
    }

    #[test]
    fn decimal_coercion() {
        let price = spec(EntityKind::Products, "sellPrice");
        assert_eq!(coerce_value(&price, "10.5").unwrap(), json!(10.5));
        assert_eq!(coerce_value(&price, "").unwrap(), json!(0));
        assert_eq!(coerce_value(&price, "cheap").unwrap(), Value::Null);
    }

    #[test]
    fn decimal_reads_leading_number() {
        let price = spec(EntityKind::Products, "sellPrice");
        assert_eq!(coerce_value(&price, "10.5kg").unwrap(), json!(10.5));
        assert_eq!(coerce_value(&price, "-2.5e2x").unwrap(), json!(-250.0));
        assert_eq!(coerce_value(&price, ".5").unwrap(), json!(0.5));
        assert_eq!(coerce_value(&price, "3e").unwrap(), json!(3.0));
        assert_eq!(coerce_value(&price, ".").unwrap(), Value::Null);
        assert_eq!(coerce_value(&price, "$4").unwrap(), Value::Null);
    }

    #[test]
    fn boolean_coercion() {
        let member = spec(EntityKind::Customers, "membership");
        assert_eq!(coerce_value(&member, "true").unwrap(), json!(true));
        assert_eq!(coerce_value(&member, "false").unwrap(), json!(false));
        assert_eq!(coerce_value(&member, "yes").unwrap(), json!(false));
    }

    #[test]
    fn details_json_is_parsed_or_rejected() {
        let details = spec(EntityKind::Transactions, "details");
        assert_eq!(
            coerce_value(&details, r#"[{"product_id": 1, "quantity": 2, "price": 10.50}]"#)
                .unwrap(),
            json!([{ "product_id": 1, "quantity": 2, "price": 10.5 }])
        );
        let err = coerce_value(&details, "[{product_id: 1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Details JSON format");
        assert_eq!(coerce_value(&details, "").unwrap(), json!(""));
    }

    #[test]
    fn customer_form_builds_typed_body() {
        let body = coerce_form(
            EntityKind::Customers,
            &pairs(&[
                ("name", "Jane Doe"),
                ("age", "31"),
                ("email", "jane@example.jo"),
                ("membership", "false"),
            ]),
        )
        .unwrap();
        assert_eq!(
            Value::Object(body),
            json!({ "name": "Jane Doe", "age": 31, "email": "jane@example.jo", "membership": false })
        );
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let body = coerce_form(
            EntityKind::Branches,
            &pairs(&[("name", "Airport"), ("location", "Amman"), ("size", "300")]),
        )
        .unwrap();
        assert_eq!(body["total_stock"], json!(0));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = coerce_form(EntityKind::Products, &pairs(&[("name", "Tea")])).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: Stock");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = coerce_form(EntityKind::Branches, &pairs(&[("color", "red")])).unwrap_err();
        assert!(err.to_string().contains("Unknown field `color`"));
    }

    #[test]
    fn role_choice_is_normalized() {
        let body = coerce_form(
            EntityKind::Employees,
            &pairs(&[
                ("name", "Sam"),
                ("age", "25"),
                ("email", "sam@example.jo"),
                ("role", "manager"),
                ("dateOfEmployment", "2024-02-01"),
            ]),
        )
        .unwrap();
        assert_eq!(body["role"], json!("MANAGER"));

        let err = coerce_form(
            EntityKind::Employees,
            &pairs(&[
                ("name", "Sam"),
                ("age", "25"),
                ("email", "sam@example.jo"),
                ("role", "janitor"),
                ("dateOfEmployment", "2024-02-01"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Role must be one of"));
    }

    #[test]
    fn transaction_form_without_customer() {
        let body = coerce_form(
            EntityKind::Transactions,
            &pairs(&[
                ("branch_id", "1"),
                ("employee_id", "3"),
                ("total_amount", "21"),
                ("dateOfTransaction", "2025-01-02"),
                ("timeOfTransaction", "10:15"),
                ("total", "21"),
                ("details", r#"[{"product_id":1,"quantity":2,"price":10.5}]"#),
            ]),
        )
        .unwrap();
        assert_eq!(body["customer_id"], Value::Null);
        assert_eq!(body["total"], json!(21.0));
        assert_eq!(body["details"][0]["quantity"], json!(2));
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("name=Main Branch").unwrap(),
            ("name".to_string(), "Main Branch".to_string())
        );
        assert_eq!(
            parse_assignment("details=[{\"a\":1}]").unwrap().1,
            "[{\"a\":1}]"
        );
        assert!(parse_assignment("oops").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
