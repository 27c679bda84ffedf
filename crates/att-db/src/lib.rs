//! Storage layer for attendance reconciliation.
//!
//! Provides persistence for raw punches, employees and reconciled attendance
//! using `rusqlite`, and implements the engine's [`PunchSource`] and
//! [`AttendanceRepository`] seams.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without a `Mutex`.
//! Use cases that reconcile in parallel only read punches up front and write
//! results afterwards, so they never need to share the connection.
//!
//! # Schema
//!
//! ## Raw Punches
//!
//! Punch fields are stored verbatim as TEXT, exactly as the device reported
//! them. A row with a malformed time or unknown direction is still stored and
//! still reaches reconciliation, where it is excluded and flagged. Only the
//! `day` column is validated on the way in, since it is needed to query.
//!
//! ## Attendance
//!
//! One row per employee and date. The `data` column stores the day as
//! [`AttendanceDto`] JSON; `status`, `confidence` and `needs_review` are
//! copied out for listing without decoding.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use att_core::{
    Attendance, AttendanceDto, AttendanceRepository, AttendanceValidator, DateRange, DtoError,
    Employee, EmployeeCode, PunchRecord, PunchSource, RawPunch, Subscribers, Subscription,
    UpdateCallback, ValidationError,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value failed domain validation.
    #[error("invalid stored value: {0}")]
    Validation(#[from] ValidationError),
    /// A stored date column could not be parsed.
    #[error("invalid stored date: {value}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Stored attendance JSON could not be decoded.
    #[error("invalid attendance data for {employee_code} on {date}")]
    AttendanceJson {
        employee_code: String,
        date: String,
        #[source]
        source: serde_json::Error,
    },
    /// Stored attendance decoded but did not form a valid day.
    #[error("invalid attendance for {employee_code} on {date}")]
    AttendanceData {
        employee_code: String,
        date: String,
        #[source]
        source: DtoError,
    },
    /// Attendance could not be encoded for storage.
    #[error("failed to encode attendance: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    subscribers: Subscribers,
    validator: AttendanceValidator,
}

/// A raw punch row, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPunch {
    pub id: String,
    pub employee_code: EmployeeCode,
    pub day: NaiveDate,
    pub time: String,
    pub direction: String,
    pub device_id: String,
    pub confidence: String,
    pub inferred: bool,
}

impl StoredPunch {
    /// Wraps a raw record for storage under a fresh id.
    pub fn new(employee_code: EmployeeCode, day: NaiveDate, record: PunchRecord) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), employee_code, day, record)
    }

    /// Wraps a raw record under a caller-chosen id; re-inserting the same id is a no-op.
    pub fn with_id(
        id: impl Into<String>,
        employee_code: EmployeeCode,
        day: NaiveDate,
        record: PunchRecord,
    ) -> Self {
        Self {
            id: id.into(),
            employee_code,
            day,
            time: record.time,
            direction: record.direction,
            device_id: record.device_id,
            confidence: record.confidence,
            inferred: record.inferred,
        }
    }
}

impl RawPunch for StoredPunch {
    fn time(&self) -> &str {
        &self.time
    }

    fn direction(&self) -> &str {
        &self.direction
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn confidence(&self) -> &str {
        &self.confidence
    }

    fn inferred(&self) -> bool {
        self.inferred
    }
}

/// Per-employee row counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeCounts {
    pub employee_code: String,
    pub name: Option<String>,
    pub punches: usize,
    pub attendance_days: usize,
    pub needs_review: usize,
}

/// A stored attendance row without its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub employee_code: String,
    pub date: String,
    pub status: String,
    pub confidence: String,
    pub total_hours: String,
    pub needs_review: bool,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn,
            subscribers: Subscribers::new(),
            validator: AttendanceValidator::default(),
        };
        db.init()?;
        Ok(db)
    }

    /// Replaces the validator used to compute `needs_review` on save.
    #[must_use]
    pub fn with_validator(mut self, validator: AttendanceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                department TEXT,
                designation TEXT,
                phone TEXT,
                join_date TEXT,
                location TEXT
            );

            CREATE TABLE IF NOT EXISTS punches (
                id TEXT PRIMARY KEY,
                employee_code TEXT NOT NULL,
                day TEXT NOT NULL,
                time TEXT NOT NULL,
                direction TEXT NOT NULL,
                device_id TEXT NOT NULL DEFAULT '',
                confidence TEXT NOT NULL DEFAULT 'high',
                inferred INTEGER NOT NULL DEFAULT 0,
                imported_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_punches_employee_day ON punches(employee_code, day);

            CREATE TABLE IF NOT EXISTS attendance (
                employee_code TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                confidence TEXT NOT NULL,
                total_hours TEXT NOT NULL,
                needs_review INTEGER NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (employee_code, date)
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of punches in one transaction, ignoring duplicate ids.
    ///
    /// Subscribers are notified after commit with the number of new rows for
    /// their employee.
    pub fn insert_punches(&mut self, punches: &[StoredPunch]) -> Result<usize, DbError> {
        if punches.is_empty() {
            return Ok(0);
        }
        let imported_at = now();
        let mut per_employee: HashMap<&EmployeeCode, usize> = HashMap::new();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO punches
                (id, employee_code, day, time, direction, device_id, confidence, inferred, imported_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for punch in punches {
                let inserted = stmt.execute(params![
                    punch.id,
                    punch.employee_code.as_str(),
                    punch.day.to_string(),
                    punch.time,
                    punch.direction,
                    punch.device_id,
                    punch.confidence,
                    punch.inferred,
                    imported_at,
                ])?;
                *per_employee.entry(&punch.employee_code).or_default() += inserted;
            }
        }
        tx.commit()?;

        let inserted: usize = per_employee.values().sum();
        tracing::debug!(
            received = punches.len(),
            inserted,
            employees = per_employee.len(),
            "inserted punches"
        );
        for (code, count) in per_employee {
            self.subscribers.notify(code, count);
        }
        Ok(inserted)
    }

    /// Lists punches for an employee within a date range, in insertion order per day.
    pub fn list_punches(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<StoredPunch>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, day, time, direction, device_id, confidence, inferred
            FROM punches
            WHERE employee_code = ? AND day >= ? AND day <= ?
            ORDER BY day ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                code.as_str(),
                range.start().to_string(),
                range.end().to_string()
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                ))
            },
        )?;
        let mut punches = Vec::new();
        for row in rows {
            let (id, day, time, direction, device_id, confidence, inferred) = row?;
            punches.push(StoredPunch {
                id,
                employee_code: code.clone(),
                day: parse_date(&day)?,
                time,
                direction,
                device_id,
                confidence,
                inferred,
            });
        }
        Ok(punches)
    }

    /// Inserts or replaces an employee.
    pub fn upsert_employee(&mut self, employee: &Employee) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT OR REPLACE INTO employees
            (code, name, email, role, department, designation, phone, join_date, location)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                employee.code.as_str(),
                employee.name,
                employee.email,
                employee.role,
                employee.department,
                employee.designation,
                employee.phone,
                employee.join_date.map(|d| d.to_string()),
                employee.location,
            ],
        )?;
        Ok(())
    }

    pub fn get_employee(&self, code: &EmployeeCode) -> Result<Option<Employee>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT code, name, email, role, department, designation, phone, join_date, location
            FROM employees
            WHERE code = ?
            ",
        )?;
        let row = stmt
            .query_row([code.as_str()], employee_columns)
            .optional()?;
        row.map(employee_from_columns).transpose()
    }

    /// Lists employees ordered by code.
    pub fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT code, name, email, role, department, designation, phone, join_date, location
            FROM employees
            ORDER BY code ASC
            ",
        )?;
        let rows = stmt.query_map([], employee_columns)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(employee_from_columns(row?)?);
        }
        Ok(employees)
    }

    /// Lists stored attendance rows for an employee without decoding them.
    pub fn list_attendance_rows(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<AttendanceRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT employee_code, date, status, confidence, total_hours, needs_review
            FROM attendance
            WHERE employee_code = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                code.as_str(),
                range.start().to_string(),
                range.end().to_string()
            ],
            |row| {
                Ok(AttendanceRow {
                    employee_code: row.get(0)?,
                    date: row.get(1)?,
                    status: row.get(2)?,
                    confidence: row.get(3)?,
                    total_hours: row.get(4)?,
                    needs_review: row.get(5)?,
                })
            },
        )?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Punch and attendance counts per employee code seen in either table.
    pub fn counts_by_employee(&self) -> Result<Vec<EmployeeCounts>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            WITH codes AS (
                SELECT employee_code AS code FROM punches
                UNION
                SELECT employee_code FROM attendance
                UNION
                SELECT code FROM employees
            )
            SELECT
                codes.code,
                e.name,
                (SELECT COUNT(*) FROM punches p WHERE p.employee_code = codes.code),
                (SELECT COUNT(*) FROM attendance a WHERE a.employee_code = codes.code),
                (SELECT COUNT(*) FROM attendance a
                    WHERE a.employee_code = codes.code AND a.needs_review = 1)
            FROM codes
            LEFT JOIN employees e ON e.code = codes.code
            ORDER BY codes.code ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(EmployeeCounts {
                employee_code: row.get(0)?,
                name: row.get(1)?,
                punches: row.get(2)?,
                attendance_days: row.get(3)?,
                needs_review: row.get(4)?,
            })
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn decode_attendance(
        employee_code: String,
        date: String,
        data: &str,
    ) -> Result<Attendance, DbError> {
        let dto: AttendanceDto = match serde_json::from_str(data) {
            Ok(dto) => dto,
            Err(source) => {
                return Err(DbError::AttendanceJson {
                    employee_code,
                    date,
                    source,
                });
            }
        };
        dto.into_domain().map_err(|source| DbError::AttendanceData {
            employee_code,
            date,
            source,
        })
    }
}

impl PunchSource for Database {
    type Punch = StoredPunch;
    type Error = DbError;

    fn punches_for_day(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
    ) -> Result<Vec<StoredPunch>, DbError> {
        self.list_punches(code, DateRange::single(date))
    }

    /// Reads the whole range with one query so every day comes from the same snapshot.
    fn punches_for_range(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<(NaiveDate, Vec<StoredPunch>)>, DbError> {
        let mut by_day: BTreeMap<NaiveDate, Vec<StoredPunch>> = BTreeMap::new();
        for punch in self.list_punches(code, range)? {
            by_day.entry(punch.day).or_default().push(punch);
        }
        Ok(range
            .days()
            .map(|day| (day, by_day.remove(&day).unwrap_or_default()))
            .collect())
    }

    fn punch_count(&self, code: &EmployeeCode, range: DateRange) -> Result<usize, DbError> {
        let count = self.conn.query_row(
            "
            SELECT COUNT(*) FROM punches
            WHERE employee_code = ? AND day >= ? AND day <= ?
            ",
            params![
                code.as_str(),
                range.start().to_string(),
                range.end().to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl AttendanceRepository for Database {
    type Error = DbError;

    fn get_by_employee_code(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<Attendance>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT employee_code, date, data
            FROM attendance
            WHERE employee_code = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                code.as_str(),
                range.start().to_string(),
                range.end().to_string()
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        let mut attendances = Vec::new();
        for row in rows {
            let (employee_code, date, data) = row?;
            attendances.push(Self::decode_attendance(employee_code, date, &data)?);
        }
        Ok(attendances)
    }

    fn get_by_date(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DbError> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM attendance WHERE employee_code = ? AND date = ?",
                params![code.as_str(), date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|data| Self::decode_attendance(code.to_string(), date.to_string(), &data))
            .transpose()
    }

    fn save(&mut self, attendance: &Attendance) -> Result<(), DbError> {
        let dto = AttendanceDto::from_attendance(attendance, &self.validator);
        let data = serde_json::to_string(&dto).map_err(DbError::Encode)?;
        self.conn.execute(
            "
            INSERT OR REPLACE INTO attendance
            (employee_code, date, status, confidence, total_hours, needs_review, data, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                dto.employee_code,
                dto.date.to_string(),
                dto.status.as_str(),
                dto.confidence.as_str(),
                dto.total_hours,
                dto.needs_review,
                data,
                now(),
            ],
        )?;
        Ok(())
    }

    fn subscribe_to_updates(&self, code: &EmployeeCode, callback: UpdateCallback) -> Subscription {
        self.subscribers.subscribe(code, callback)
    }
}

type EmployeeColumns = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn employee_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmployeeColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn employee_from_columns(columns: EmployeeColumns) -> Result<Employee, DbError> {
    let (code, name, email, role, department, designation, phone, join_date, location) = columns;
    let mut employee = Employee::new(EmployeeCode::new(code)?, name, email, role);
    employee.department = department;
    employee.designation = designation;
    employee.phone = phone;
    employee.join_date = join_date.as_deref().map(parse_date).transpose()?;
    employee.location = location;
    Ok(employee)
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DbError::DateParse {
        value: value.to_string(),
        source,
    })
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
