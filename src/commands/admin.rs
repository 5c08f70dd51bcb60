//! Back-office commands: dashboard, section listing, create and delete.

use std::io::{self, BufRead, Write};

use crate::admin::{self, DeleteOutcome, SectionReload};
use crate::api::ApiTransport;
use crate::entities::EntityKind;
use crate::notify::Notice;
use crate::render::render_table;
use crate::schema::{schema_for, FieldKind};

pub async fn dashboard<A: ApiTransport>(api: &A) -> String {
    let dash = admin::load_dashboard(api).await;
    match dash.notice() {
        Some(notice) => format!("{notice}\n{}", dash.render()),
        None => dash.render(),
    }
}

pub async fn list<A: ApiTransport>(api: &A, kind: EntityKind) -> String {
    match admin::load_table(api, kind).await {
        Ok(table) => table.render(),
        Err(e) => Notice::from_error(&e, "Failed to fetch data").to_string(),
    }
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer => "integer",
        FieldKind::Decimal => "decimal",
        FieldKind::Boolean => "true/false",
        FieldKind::Json => "json",
        FieldKind::Text => "text",
    }
}

/// Form fields accepted by `create` for this section.
pub fn describe_fields(kind: EntityKind) -> String {
    let headers = ["field", "label", "type", "required", "default"].map(String::from);
    let rows: Vec<Vec<String>> = schema_for(kind)
        .iter()
        .map(|f| {
            let kind = if f.choices.is_empty() {
                kind_label(f.kind).to_string()
            } else {
                f.choices.join("|")
            };
            vec![
                f.name.to_string(),
                f.label.to_string(),
                kind,
                if f.required { "Yes" } else { "No" }.to_string(),
                f.default.unwrap_or("-").to_string(),
            ]
        })
        .collect();
    render_table(&format!("New {}", kind.singular()), &headers, &rows)
}

/// Ask for every field of the form in order. A blank answer leaves the
/// field out so its default (or the required-field check) applies.
pub fn prompt_fields<R: BufRead, W: Write>(
    kind: EntityKind,
    input: &mut R,
    output: &mut W,
) -> io::Result<Vec<(String, String)>> {
    let mut fields = Vec::new();
    for spec in schema_for(kind) {
        let mut hint = String::new();
        if !spec.choices.is_empty() {
            hint.push_str(&format!(" [{}]", spec.choices.join("/")));
        }
        if let Some(default) = spec.default {
            hint.push_str(&format!(" (default {default})"));
        } else if !spec.required {
            hint.push_str(" (optional)");
        }
        write!(output, "{}{hint}: ", spec.label)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let value = line.trim_end_matches(['\r', '\n']);
        if !value.trim().is_empty() {
            fields.push((spec.name.to_string(), value.to_string()));
        }
    }
    Ok(fields)
}

fn reload_text(reload: SectionReload) -> String {
    match reload.table {
        Ok(table) => format!("{}\n{}", reload.notice, table.render()),
        Err(e) => format!(
            "{}\n{}",
            reload.notice,
            Notice::from_error(&e, "Failed to fetch data")
        ),
    }
}

pub async fn create<A: ApiTransport>(
    api: &A,
    kind: EntityKind,
    fields: &[(String, String)],
) -> String {
    match admin::create_entity(api, kind, fields).await {
        Ok(reload) => reload_text(reload),
        Err(e) => Notice::from_error(&e, "Creation failed").to_string(),
    }
}

pub async fn delete<A, F>(api: &A, kind: EntityKind, id: i64, confirm: F) -> String
where
    A: ApiTransport,
    F: FnOnce() -> bool,
{
    match admin::delete_entity(api, kind, id, confirm).await {
        Ok(DeleteOutcome::Cancelled) => Notice::info("Delete cancelled").to_string(),
        Ok(DeleteOutcome::Deleted(reload)) => reload_text(reload),
        Err(e) => Notice::from_error(&e, "Delete failed").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn prompts_skip_blank_answers() {
        let mut input = io::Cursor::new("main\n\n120\n\n");
        let mut output = Vec::new();

        let fields = prompt_fields(EntityKind::Branches, &mut input, &mut output).unwrap();

        assert_eq!(
            fields,
            vec![
                ("name".to_string(), "main".to_string()),
                ("size".to_string(), "120".to_string()),
            ]
        );
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("(default 0)"));
    }

    #[test]
    fn prompts_stop_at_end_of_input() {
        let mut input = io::Cursor::new("Rana\n");
        let mut output = Vec::new();
        let fields = prompt_fields(EntityKind::Customers, &mut input, &mut output).unwrap();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn field_listing_shows_choices() {
        let text = describe_fields(EntityKind::Employees);
        assert!(text.contains("CASHIER|MANAGER|STOCKER"));
        assert!(text.starts_with("New EMPLOYEE"));
    }

    #[tokio::test]
    async fn create_reports_backend_detail() {
        let api = FakeApi::new().reply(
            422,
            json!({ "detail": [{ "msg": "value is not a valid email address" }] }),
        );
        let fields = vec![
            ("name".to_string(), "rana".to_string()),
            ("age".to_string(), "31".to_string()),
            ("email".to_string(), "nope".to_string()),
        ];
        let text = create(&api, EntityKind::Customers, &fields).await;
        assert_eq!(text, "[error] Error: value is not a valid email address");
    }

    #[tokio::test]
    async fn bad_details_json_never_reaches_server() {
        let api = FakeApi::new();
        let fields = vec![
            ("branch_id".to_string(), "1".to_string()),
            ("employee_id".to_string(), "2".to_string()),
            ("total_amount".to_string(), "5".to_string()),
            ("dateOfTransaction".to_string(), "2025-01-01".to_string()),
            ("timeOfTransaction".to_string(), "10:00:00".to_string()),
            ("total".to_string(), "5".to_string()),
            ("details".to_string(), "[{oops".to_string()),
        ];
        let text = create(&api, EntityKind::Transactions, &fields).await;
        assert_eq!(text, "[error] Invalid Details JSON format");
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn cancelled_delete_sends_nothing() {
        let api = FakeApi::new();
        let text = delete(&api, EntityKind::Products, 3, || false).await;
        assert_eq!(text, "[info] Delete cancelled");
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_reloads_section() {
        let api = FakeApi::new()
            .reply(204, json!(null))
            .reply(200, json!([]));
        let text = delete(&api, EntityKind::Branches, 9, || true).await;

        let requests = api.requests();
        assert_eq!(requests[0].method, Method::DELETE);
        assert_eq!(requests[0].path, "/api/v1/branches/9");
        assert_eq!(requests[1].method, Method::GET);
        assert!(text.starts_with("[ok] Record deleted"));
    }

    #[tokio::test]
    async fn unreachable_list_shows_generic_error() {
        let api = FakeApi::new().unreachable();
        let text = list(&api, EntityKind::Customers).await;
        assert_eq!(text, "[error] Failed to fetch data");
    }
}
