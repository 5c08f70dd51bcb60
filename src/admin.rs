//! Admin panel: entity tables, create/delete and the dashboard summary.
//!
//! Nothing is cached. Every section view re-fetches its collection, and a
//! successful create or delete is followed by a fresh load of the same
//! section.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{self, ApiTransport};
use crate::entities::{
    Branch, CellValue, Customer, EntityKind, EntityRecord, Employee, Product, Transaction,
};
use crate::error::PosResult;
use crate::notify::Notice;
use crate::render::{format_cell, render_table};
use crate::schema;

/// Number of transactions shown under "Recent Activity".
const RECENT_ACTIVITY_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Entity tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityTable {
    pub kind: EntityKind,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl EntityTable {
    /// Declared columns for a non-empty collection; the per-entity
    /// fallback list when it is empty.
    pub fn from_records<R: EntityRecord>(records: &[R]) -> Self {
        let headers: Vec<String> = if records.is_empty() {
            R::KIND
                .fallback_headers()
                .iter()
                .map(|h| h.to_string())
                .collect()
        } else {
            R::COLUMNS.iter().map(|h| h.to_string()).collect()
        };
        let rows = records
            .iter()
            .map(|r| TableRow {
                id: r.id(),
                cells: headers.iter().map(|h| r.cell(h)).collect(),
            })
            .collect();
        Self {
            kind: R::KIND,
            headers,
            rows,
        }
    }

    pub fn render(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(&row.cells)
                    .map(|(h, c)| format_cell(h, c))
                    .collect()
            })
            .collect();
        render_table(self.kind.title(), &self.headers, &rows)
    }
}

pub async fn load_records<R, A>(api: &A) -> PosResult<Vec<R>>
where
    R: EntityRecord,
    A: ApiTransport,
{
    api::get_json(api, &api::collection_path(R::KIND.resource())).await
}

async fn load_table_of<R, A>(api: &A) -> PosResult<EntityTable>
where
    R: EntityRecord,
    A: ApiTransport,
{
    let records = load_records::<R, A>(api).await?;
    Ok(EntityTable::from_records(&records))
}

/// Fetch a section and build its table.
pub async fn load_table<A: ApiTransport>(api: &A, kind: EntityKind) -> PosResult<EntityTable> {
    match kind {
        EntityKind::Customers => load_table_of::<Customer, A>(api).await,
        EntityKind::Products => load_table_of::<Product, A>(api).await,
        EntityKind::Employees => load_table_of::<Employee, A>(api).await,
        EntityKind::Branches => load_table_of::<Branch, A>(api).await,
        EntityKind::Transactions => load_table_of::<Transaction, A>(api).await,
    }
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Result of a successful write: the notice to show and the reloaded
/// section (which can itself fail independently of the write).
#[derive(Debug)]
pub struct SectionReload {
    pub notice: Notice,
    pub table: PosResult<EntityTable>,
}

/// Coerce the form, `POST` it, and reload the section.
///
/// Malformed input fails before any request. A rejected request reports
/// the backend's first validation message, or "Creation failed".
pub async fn create_entity<A: ApiTransport>(
    api: &A,
    kind: EntityKind,
    fields: &[(String, String)],
) -> PosResult<SectionReload> {
    let body = schema::coerce_form(kind, fields)?;
    let created = api::post_json(
        api,
        &api::collection_path(kind.resource()),
        Value::Object(body),
        "Creation failed",
    )
    .await?;

    let id = created.get("id").and_then(Value::as_i64);
    info!(entity = %kind, id, "record created");
    Ok(SectionReload {
        notice: Notice::success(format!("Success! {kind} created.")),
        table: load_table(api, kind).await,
    })
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted(SectionReload),
}

/// Delete one record after `confirm` agrees. There is no undo.
pub async fn delete_entity<A, F>(
    api: &A,
    kind: EntityKind,
    id: i64,
    confirm: F,
) -> PosResult<DeleteOutcome>
where
    A: ApiTransport,
    F: FnOnce() -> bool,
{
    if !confirm() {
        return Ok(DeleteOutcome::Cancelled);
    }
    api::delete(api, &api::item_path(kind.resource(), id)).await?;
    info!(entity = %kind, id, "record deleted");
    Ok(DeleteOutcome::Deleted(SectionReload {
        notice: Notice::success("Record deleted"),
        table: load_table(api, kind).await,
    }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub customers: usize,
    pub products: usize,
    pub transactions: usize,
    pub employees: usize,
    pub recent: Vec<Transaction>,
    /// Sections that failed to load and were counted as empty.
    pub failed: Vec<EntityKind>,
}

/// Load the dashboard. A section that fails to load counts as empty and
/// is listed in `failed` instead of failing the whole view.
pub async fn load_dashboard<A: ApiTransport>(api: &A) -> Dashboard {
    let mut dash = Dashboard::default();

    match load_records::<Customer, A>(api).await {
        Ok(rows) => dash.customers = rows.len(),
        Err(e) => dash.note_failure(EntityKind::Customers, &e),
    }
    match load_records::<Product, A>(api).await {
        Ok(rows) => dash.products = rows.len(),
        Err(e) => dash.note_failure(EntityKind::Products, &e),
    }
    match load_records::<Transaction, A>(api).await {
        Ok(rows) => {
            dash.transactions = rows.len();
            dash.recent = rows.into_iter().take(RECENT_ACTIVITY_ROWS).collect();
        }
        Err(e) => dash.note_failure(EntityKind::Transactions, &e),
    }
    match load_records::<Employee, A>(api).await {
        Ok(rows) => dash.employees = rows.len(),
        Err(e) => dash.note_failure(EntityKind::Employees, &e),
    }

    dash
}

impl Dashboard {
    fn note_failure(&mut self, kind: EntityKind, err: &crate::error::PosError) {
        warn!(entity = %kind, error = %err, "dashboard section failed to load");
        self.failed.push(kind);
    }

    pub fn notice(&self) -> Option<Notice> {
        if self.failed.is_empty() {
            None
        } else {
            Some(Notice::error("Failed to fetch data"))
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "Total Customers: {}\nActive Products: {}\nTotal Sales:     {}\nActive Staff:    {}\n\n",
            self.customers, self.products, self.transactions, self.employees
        );

        let headers = ["id", "type", "amount", "time"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .recent
            .iter()
            .map(|t| {
                vec![
                    format!("#{}", t.id),
                    "Sale".to_string(),
                    t.total.map_or_else(|| "-".to_string(), |v| format!("${v:.2}")),
                    format_transaction_time(t.time_of_transaction.as_deref()),
                ]
            })
            .collect();
        out.push_str(&render_table("Recent Activity", &headers, &rows));
        out
    }
}

/// Short time label for the activity list. ISO-8601 durations
/// (`PT10H30M`) become `10h30m`; clock times are cut to `HH:MM`.
pub fn format_transaction_time(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => "Recently".to_string(),
        Some(t) if t.contains("PT") => t
            .replacen("PT", "", 1)
            .replacen('H', "h", 1)
            .replacen('M', "m", 1),
        Some(t) => t.chars().take(5).collect(),
    }
}
