//! SQLite-backed voucher store.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::PersistenceError;
use crate::models::voucher::{AllocationRow, BudgetRow, LineItem, VoucherAggregate, VoucherId};

use super::VoucherStore;

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS vouchers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voucher_no TEXT NOT NULL DEFAULT '',
    paid_to TEXT NOT NULL DEFAULT '',
    staff_no TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    contact_no TEXT NOT NULL DEFAULT '',
    department TEXT NOT NULL DEFAULT '',
    cost_center TEXT NOT NULL DEFAULT '',
    station TEXT NOT NULL DEFAULT '',
    date TEXT NOT NULL DEFAULT '',
    amount_in_words TEXT NOT NULL DEFAULT '',
    approved_by TEXT NOT NULL DEFAULT '',
    received_cash TEXT NOT NULL DEFAULT '0',  -- decimal as text
    total_amount TEXT NOT NULL DEFAULT '0',   -- decimal as text
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS voucher_line_items (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    details TEXT NOT NULL,
    amount TEXT NOT NULL,
    item_date TEXT                             -- YYYY-MM-DD or NULL
);

CREATE TABLE IF NOT EXISTS budget_rows (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    account TEXT NOT NULL,
    cost_center TEXT NOT NULL,
    budget INTEGER NOT NULL,
    utilised INTEGER NOT NULL,
    variance INTEGER NOT NULL,
    this_payment TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS allocation_rows (
    id INTEGER PRIMARY KEY,
    voucher_id INTEGER NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    account TEXT NOT NULL,
    cost_center TEXT NOT NULL,
    flight_no TEXT NOT NULL,
    aircraft TEXT NOT NULL,
    project TEXT NOT NULL,
    amount TEXT NOT NULL,
    cross_reference TEXT NOT NULL,
    description TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_line_items_voucher ON voucher_line_items(voucher_id);
CREATE INDEX IF NOT EXISTS idx_budget_rows_voucher ON budget_rows(voucher_id);
CREATE INDEX IF NOT EXISTS idx_allocation_rows_voucher ON allocation_rows(voucher_id);
"#;

const HEADER_COLUMNS: &str = "id, voucher_no, paid_to, staff_no, email, contact_no, department, \
     cost_center, station, date, amount_in_words, approved_by, received_cash, total_amount";

/// Voucher store on a single SQLite connection.
///
/// The connection sits behind a mutex, so writes are serialized.
pub struct SqliteVoucherStore {
    conn: Mutex<Connection>,
}

impl SqliteVoucherStore {
    /// Open or create a database file.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!("Opening voucher database {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl VoucherStore for SqliteVoucherStore {
    fn find(&self, id: VoucherId) -> Result<Option<VoucherAggregate>, PersistenceError> {
        let conn = self.lock()?;
        let header = conn
            .query_row(
                &format!("SELECT {} FROM vouchers WHERE id = ?1", HEADER_COLUMNS),
                params![id],
                StoredHeader::from_row,
            )
            .optional()?;

        match header {
            Some(header) => Ok(Some(load_voucher(&conn, header)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, voucher: &VoucherAggregate) -> Result<VoucherId, PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO vouchers (voucher_no, paid_to, staff_no, email, contact_no, department, \
             cost_center, station, date, amount_in_words, approved_by, received_cash, total_amount) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                voucher.voucher_no,
                voucher.paid_to,
                voucher.staff_no,
                voucher.email,
                voucher.contact_no,
                voucher.department,
                voucher.cost_center,
                voucher.station,
                voucher.date,
                voucher.amount_in_words,
                voucher.approved_by,
                voucher.received_cash.to_string(),
                voucher.total_amount.to_string(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_children(&tx, id, voucher)?;

        tx.commit()?;
        debug!("Inserted voucher {}", id);
        Ok(id)
    }

    fn replace_all(
        &self,
        id: VoucherId,
        voucher: &VoucherAggregate,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE vouchers SET voucher_no = ?2, paid_to = ?3, staff_no = ?4, email = ?5, \
             contact_no = ?6, department = ?7, cost_center = ?8, station = ?9, date = ?10, \
             amount_in_words = ?11, approved_by = ?12, received_cash = ?13, total_amount = ?14 \
             WHERE id = ?1",
            params![
                id,
                voucher.voucher_no,
                voucher.paid_to,
                voucher.staff_no,
                voucher.email,
                voucher.contact_no,
                voucher.department,
                voucher.cost_center,
                voucher.station,
                voucher.date,
                voucher.amount_in_words,
                voucher.approved_by,
                voucher.received_cash.to_string(),
                voucher.total_amount.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(PersistenceError::NotFound(id));
        }

        for table in ["voucher_line_items", "budget_rows", "allocation_rows"] {
            tx.execute(
                &format!("DELETE FROM {} WHERE voucher_id = ?1", table),
                params![id],
            )?;
        }
        write_children(&tx, id, voucher)?;

        tx.commit()?;
        debug!("Replaced voucher {}", id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<VoucherAggregate>, PersistenceError> {
        let conn = self.lock()?;
        let headers = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM vouchers ORDER BY id DESC",
                HEADER_COLUMNS
            ))?;
            stmt.query_map([], StoredHeader::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        headers
            .into_iter()
            .map(|header| load_voucher(&conn, header))
            .collect()
    }
}

/// Header row as stored, before decimal columns are parsed.
struct StoredHeader {
    voucher: VoucherAggregate,
    received_cash: String,
    total_amount: String,
}

impl StoredHeader {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            voucher: VoucherAggregate {
                id: Some(row.get(0)?),
                voucher_no: row.get(1)?,
                paid_to: row.get(2)?,
                staff_no: row.get(3)?,
                email: row.get(4)?,
                contact_no: row.get(5)?,
                department: row.get(6)?,
                cost_center: row.get(7)?,
                station: row.get(8)?,
                date: row.get(9)?,
                amount_in_words: row.get(10)?,
                approved_by: row.get(11)?,
                ..Default::default()
            },
            received_cash: row.get(12)?,
            total_amount: row.get(13)?,
        })
    }
}

fn load_voucher(conn: &Connection, header: StoredHeader) -> Result<VoucherAggregate, PersistenceError> {
    let mut voucher = header.voucher;
    voucher.received_cash = decimal("received_cash", header.received_cash)?;
    voucher.total_amount = decimal("total_amount", header.total_amount)?;

    let id = voucher.id.unwrap_or_default();
    voucher.line_items = load_line_items(conn, id)?;
    voucher.budget_rows = load_budget_rows(conn, id)?;
    voucher.allocations = load_allocations(conn, id)?;
    Ok(voucher)
}

fn load_line_items(conn: &Connection, id: VoucherId) -> Result<Vec<LineItem>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT details, amount, item_date FROM voucher_line_items \
         WHERE voucher_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(details, amount, item_date)| {
            let item_date = match item_date {
                Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    PersistenceError::Corrupt {
                        column: "item_date",
                        value: raw,
                    }
                })?),
                None => None,
            };
            Ok(LineItem {
                details,
                amount: decimal("amount", amount)?,
                item_date,
            })
        })
        .collect()
}

fn load_budget_rows(conn: &Connection, id: VoucherId) -> Result<Vec<BudgetRow>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT account, cost_center, budget, utilised, variance, this_payment \
         FROM budget_rows WHERE voucher_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok((
                BudgetRow {
                    account: row.get(0)?,
                    cost_center: row.get(1)?,
                    budget: row.get(2)?,
                    utilised: row.get(3)?,
                    variance: row.get(4)?,
                    this_payment: Decimal::ZERO,
                },
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(mut budget, this_payment)| {
            budget.this_payment = decimal("this_payment", this_payment)?;
            Ok(budget)
        })
        .collect()
}

fn load_allocations(
    conn: &Connection,
    id: VoucherId,
) -> Result<Vec<AllocationRow>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT account, cost_center, flight_no, aircraft, project, amount, cross_reference, \
         description FROM allocation_rows WHERE voucher_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok(AllocationRow {
                account: row.get(0)?,
                cost_center: row.get(1)?,
                flight_no: row.get(2)?,
                aircraft: row.get(3)?,
                project: row.get(4)?,
                amount: row.get(5)?,
                cross_reference: row.get(6)?,
                description: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn write_children(
    conn: &Connection,
    id: VoucherId,
    voucher: &VoucherAggregate,
) -> Result<(), PersistenceError> {
    {
        let mut stmt = conn.prepare(
            "INSERT INTO voucher_line_items (voucher_id, position, details, amount, item_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, item) in voucher.line_items.iter().enumerate() {
            stmt.execute(params![
                id,
                position as i64,
                item.details,
                item.amount.to_string(),
                item.item_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO budget_rows (voucher_id, position, account, cost_center, budget, \
             utilised, variance, this_payment) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (position, row) in voucher.budget_rows.iter().enumerate() {
            stmt.execute(params![
                id,
                position as i64,
                row.account,
                row.cost_center,
                row.budget,
                row.utilised,
                row.variance,
                row.this_payment.to_string(),
            ])?;
        }
    }

    let mut stmt = conn.prepare(
        "INSERT INTO allocation_rows (voucher_id, position, account, cost_center, flight_no, \
         aircraft, project, amount, cross_reference, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for (position, row) in voucher.allocations.iter().enumerate() {
        stmt.execute(params![
            id,
            position as i64,
            row.account,
            row.cost_center,
            row.flight_no,
            row.aircraft,
            row.project,
            row.amount,
            row.cross_reference,
            row.description,
        ])?;
    }

    Ok(())
}

fn decimal(column: &'static str, raw: String) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(&raw).map_err(|_| PersistenceError::Corrupt { column, value: raw })
}
