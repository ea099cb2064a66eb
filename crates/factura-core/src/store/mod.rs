//! SQLite persistence: clients, invoices, and the invalid-invoice store.

pub mod clients;
pub mod router;

pub use clients::ClientResolver;
pub use router::{invoice_id, PersistenceRouter, RouteResult};

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::invoice::{ClientIdentity, ExtractedInvoice, InvoiceRecord};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        address TEXT,
        status TEXT DEFAULT 'active',
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_clients_email
        ON clients(email) WHERE email IS NOT NULL;

    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        client_id TEXT NOT NULL,
        invoice_number TEXT NOT NULL,
        date TEXT,
        due_date TEXT,
        bill_to TEXT,
        total NUMERIC,
        subtotal NUMERIC,
        tax NUMERIC,
        tax_percentage NUMERIC,
        gstin TEXT,
        discount NUMERIC,
        discount_percentage NUMERIC,
        currency TEXT,
        bank_name TEXT,
        branch_name TEXT,
        bank_account_number TEXT,
        bank_swift_code TEXT,
        status TEXT DEFAULT 'pending',
        items TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients (id)
    );

    CREATE TABLE IF NOT EXISTS invalid_invoices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        invoice_number TEXT,
        date TEXT,
        due_date TEXT,
        bill_to TEXT,
        total NUMERIC,
        subtotal NUMERIC,
        tax NUMERIC,
        tax_percentage NUMERIC,
        gstin TEXT,
        discount NUMERIC,
        discount_percentage NUMERIC,
        currency TEXT,
        bank_name TEXT,
        branch_name TEXT,
        bank_account_number TEXT,
        bank_swift_code TEXT,
        status TEXT,
        items TEXT,
        error_message TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    );
";

/// Single-writer handle over the invoice database.
///
/// All access funnels through one mutex-guarded connection, so two
/// batch invocations sharing a handle cannot interleave partial writes.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> crate::error::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(StoreError::Database)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::Database)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means another thread panicked mid-query;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a client by exact email match.
    pub fn find_client_by_email(&self, email: &str) -> Result<Option<ClientIdentity>, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT id, name, email, phone, address FROM clients WHERE email = ?1",
                params![email],
                map_client,
            )
            .optional()?;
        Ok(row)
    }

    /// Look up a client by exact phone match.
    pub fn find_client_by_phone(&self, phone: &str) -> Result<Option<ClientIdentity>, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT id, name, email, phone, address FROM clients WHERE phone = ?1",
                params![phone],
                map_client,
            )
            .optional()?;
        Ok(row)
    }

    /// Insert a client and return its id.
    ///
    /// The email column is unique; inserting an email that already
    /// exists is not an error and returns the existing row's id, so a
    /// lookup racing another writer can never create a duplicate.
    pub fn insert_client(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<String, StoreError> {
        let conn = self.lock();
        let id = Uuid::new_v4().to_string();

        let inserted = conn.execute(
            "INSERT INTO clients (id, name, email, phone, address)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(email) WHERE email IS NOT NULL DO NOTHING",
            params![id, name, email, phone, address],
        )?;

        if inserted == 0 {
            if let Some(email) = email {
                let existing: String = conn.query_row(
                    "SELECT id FROM clients WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )?;
                return Ok(existing);
            }
        }

        Ok(id)
    }

    /// Write a validated invoice, overwriting any prior row with the
    /// same id (reprocessing a numbered document is idempotent).
    pub fn upsert_invoice(&self, record: &InvoiceRecord) -> Result<(), StoreError> {
        let items = serde_json::to_string(&record.items)?;
        let conn = self.lock();

        conn.execute(
            "INSERT INTO invoices (
                id, client_id, invoice_number, date, due_date, bill_to,
                total, subtotal, tax, tax_percentage, gstin,
                discount, discount_percentage, currency,
                bank_name, branch_name, bank_account_number, bank_swift_code,
                status, items
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18, 'pending', ?19)
             ON CONFLICT(id) DO UPDATE SET
                client_id = excluded.client_id,
                invoice_number = excluded.invoice_number,
                date = excluded.date,
                due_date = excluded.due_date,
                bill_to = excluded.bill_to,
                total = excluded.total,
                subtotal = excluded.subtotal,
                tax = excluded.tax,
                tax_percentage = excluded.tax_percentage,
                gstin = excluded.gstin,
                discount = excluded.discount,
                discount_percentage = excluded.discount_percentage,
                currency = excluded.currency,
                bank_name = excluded.bank_name,
                branch_name = excluded.branch_name,
                bank_account_number = excluded.bank_account_number,
                bank_swift_code = excluded.bank_swift_code,
                items = excluded.items,
                updated_at = CURRENT_TIMESTAMP",
            params![
                record.id,
                record.client_id,
                record.invoice_number,
                record.date,
                record.due_date,
                record.bill_to,
                record.total.to_string(),
                record.subtotal.map(|d| d.to_string()),
                record.tax.map(|d| d.to_string()),
                record.tax_percentage.map(|d| d.to_string()),
                record.gstin,
                record.discount.map(|d| d.to_string()),
                record.discount_percentage.map(|d| d.to_string()),
                record.currency,
                record.bank_name,
                record.branch_name,
                record.account_number,
                record.bank_swift_code,
                items,
            ],
        )?;

        Ok(())
    }

    /// Write a rejected document to the invalid store.
    pub fn insert_invalid(
        &self,
        invoice: &ExtractedInvoice,
        error_message: &str,
    ) -> Result<(), StoreError> {
        let items = serde_json::to_string(&invoice.items)?;
        let conn = self.lock();

        conn.execute(
            "INSERT INTO invalid_invoices (
                invoice_number, date, due_date, bill_to,
                total, subtotal, tax, tax_percentage, gstin,
                discount, discount_percentage, currency,
                bank_name, branch_name, bank_account_number, bank_swift_code,
                status, items, error_message
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, 'invalid', ?17, ?18)",
            params![
                invoice.invoice_number,
                invoice.date,
                invoice.due_date,
                invoice.bill_to,
                invoice.total.map(|d| d.to_string()),
                invoice.subtotal.map(|d| d.to_string()),
                invoice.tax.map(|d| d.to_string()),
                invoice.tax_percentage.map(|d| d.to_string()),
                invoice.gstin,
                invoice.discount.map(|d| d.to_string()),
                invoice.discount_percentage.map(|d| d.to_string()),
                invoice.currency,
                invoice.bank_name,
                invoice.branch_name,
                invoice.account_number,
                invoice.bank_swift_code,
                items,
                error_message,
            ],
        )?;

        Ok(())
    }

    /// Number of rows in the valid store.
    pub fn invoice_count(&self) -> Result<i64, StoreError> {
        let conn = self.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))?)
    }

    /// Number of rows in the invalid store.
    pub fn invalid_invoice_count(&self) -> Result<i64, StoreError> {
        let conn = self.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM invalid_invoices", [], |row| row.get(0))?)
    }

    /// Number of known clients.
    pub fn client_count(&self) -> Result<i64, StoreError> {
        let conn = self.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?)
    }

    /// Most recent invalid-store error message, if any.
    pub fn last_invalid_error(&self) -> Result<Option<String>, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT error_message FROM invalid_invoices ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row)
    }
}

fn map_client(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClientIdentity> {
    Ok(ClientIdentity {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find_client() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .insert_client("Acme Corp", Some("a@a.com"), Some("+1 555"), None)
            .unwrap();

        let found = db.find_client_by_email("a@a.com").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Acme Corp");

        let by_phone = db.find_client_by_phone("+1 555").unwrap().unwrap();
        assert_eq!(by_phone.id, id);
    }

    #[test]
    fn test_duplicate_email_returns_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let first = db
            .insert_client("Acme Corp", Some("a@a.com"), None, None)
            .unwrap();
        let second = db
            .insert_client("Acme Corporation", Some("a@a.com"), None, None)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(db.client_count().unwrap(), 1);

        // The original row is untouched.
        let found = db.find_client_by_email("a@a.com").unwrap().unwrap();
        assert_eq!(found.name, "Acme Corp");
    }

    #[test]
    fn test_clients_without_email_never_conflict() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_client("Walk-in", None, None, None).unwrap();
        let second = db.insert_client("Walk-in", None, None, None).unwrap();

        assert_ne!(first, second);
        assert_eq!(db.client_count().unwrap(), 2);
    }
}
