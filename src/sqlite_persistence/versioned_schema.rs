use anyhow::{bail, Result};
use rusqlite::{params, Connection};
use std::fmt;

/// Offset added to the schema version before it is stored in `PRAGMA user_version`,
/// so databases that were never stamped (version 0) are told apart from version 0 of ours.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Varchar(u16),
    DateTime,
}

impl SqlType {
    /// Parses a declared column type as reported by `PRAGMA table_info`.
    pub fn parse(declared: &str) -> Option<SqlType> {
        let declared = declared.trim().to_uppercase();
        match declared.as_str() {
            "INTEGER" => Some(SqlType::Integer),
            "DATETIME" => Some(SqlType::DateTime),
            _ => declared
                .strip_prefix("VARCHAR(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|len| len.trim().parse().ok())
                .map(SqlType::Varchar),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::Varchar(len) => write!(f, "VARCHAR({})", len),
            SqlType::DateTime => write!(f, "DATETIME"),
        }
    }
}

#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyOnChange {
    NoAction,
    SetNull,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a> {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

/// A column as found in an existing database.
struct ActualColumn {
    name: String,
    declared_type: String,
    non_null: bool,
    is_primary_key: bool,
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.as_sql()
                ));
            }
        }

        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        self.create_indices(conn)
    }

    /// Creates the table's secondary indices that are not there yet.
    pub fn create_indices(&self, conn: &Connection) -> Result<()> {
        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    fn actual_columns(&self, conn: &Connection) -> Result<Vec<ActualColumn>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let columns = stmt
            .query_map(params![], |row| {
                Ok(ActualColumn {
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn validate_columns(&self, conn: &Connection) -> Result<()> {
        let actual_columns = self.actual_columns(conn)?;
        if actual_columns.is_empty() {
            bail!("Table {} does not exist", self.name);
        }
        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} Column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if SqlType::parse(&actual.declared_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} Column {} type mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.declared_type
                );
            }
            // Primary keys are implicitly non-null for integer rowid aliases.
            if !expected.is_primary_key && actual.non_null != expected.non_null {
                bail!(
                    "Table {} Column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} Column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }
        Ok(())
    }

    fn validate_indices(&self, conn: &Connection) -> Result<()> {
        for (index_name, _column) in self.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !index_exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }
        Ok(())
    }

    fn validate_unique_constraints(&self, conn: &Connection) -> Result<()> {
        if self.unique_constraints.is_empty() {
            return Ok(());
        }

        // SQLite backs unique constraints with indices flagged unique in PRAGMA index_list.
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?)))?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
        for index_name in &unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut cols: Vec<String> = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            cols.sort();
            unique_index_columns.push(cols);
        }

        for expected_columns in self.unique_constraints {
            let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
            expected_sorted.sort();
            let found = unique_index_columns
                .iter()
                .any(|actual| actual.iter().map(String::as_str).eq(expected_sorted.iter().copied()));
            if !found {
                bail!(
                    "Table {} is missing unique constraint on columns ({})",
                    self.name,
                    expected_columns.join(", ")
                );
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, conn: &Connection) -> Result<()> {
        // PRAGMA foreign_key_list returns: id, seq, table, from, to, on_update, on_delete, match
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", self.name))?;
        let actual_fks: Vec<(String, String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(3)?, row.get(2)?, row.get(4)?, row.get(6)?)))?
            .filter_map(|r| r.ok())
            .collect();

        for column in self.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let found = actual_fks.iter().any(|(from, to_table, to_column, on_delete)| {
                from == column.name
                    && to_table == expected.foreign_table
                    && to_column == expected.foreign_column
                    && on_delete == expected.on_delete.as_sql()
            });
            if !found {
                bail!(
                    "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    expected.on_delete.as_sql()
                );
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        self.stamp(conn)
    }

    /// Writes this schema's version into `PRAGMA user_version`.
    pub fn stamp(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Checks an existing database against this schema.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate_columns(conn)?;
            table.validate_indices(conn)?;
            table.validate_unique_constraints(conn)?;
            table.validate_foreign_keys(conn)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_column;

    const PARENT_TABLE: Table = Table {
        name: "parent",
        columns: &[
            sqlite_column!("parent_id", SqlType::Integer, is_primary_key = true),
            sqlite_column!("name", SqlType::Varchar(64), non_null = true),
        ],
        indices: &[],
        unique_constraints: &[&["name"]],
    };

    const PARENT_FK: ForeignKey = ForeignKey {
        foreign_table: "parent",
        foreign_column: "parent_id",
        on_delete: ForeignKeyOnChange::NoAction,
    };

    const CHILD_TABLE: Table = Table {
        name: "child",
        columns: &[
            sqlite_column!("child_id", SqlType::Integer, is_primary_key = true),
            sqlite_column!("created", SqlType::DateTime, non_null = true),
            sqlite_column!(
                "parent_id",
                SqlType::Integer,
                foreign_key = Some(&PARENT_FK)
            ),
        ],
        indices: &[("idx_child_parent", "parent_id")],
        unique_constraints: &[],
    };

    const SCHEMA: VersionedSchema = VersionedSchema {
        version: 0,
        tables: &[PARENT_TABLE, CHILD_TABLE],
        migration: None,
    };

    #[test]
    fn parses_declared_types() {
        assert_eq!(SqlType::parse("INTEGER"), Some(SqlType::Integer));
        assert_eq!(SqlType::parse("varchar(255)"), Some(SqlType::Varchar(255)));
        assert_eq!(SqlType::parse("DATETIME"), Some(SqlType::DateTime));
        assert_eq!(SqlType::parse("BLOB"), None);
        assert_eq!(SqlType::Varchar(64).to_string(), "VARCHAR(64)");
    }

    #[test]
    fn created_schema_validates_and_is_stamped() {
        let conn = Connection::open_in_memory().unwrap();
        SCHEMA.create(&conn).unwrap();
        SCHEMA.validate(&conn).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, BASE_DB_VERSION as i64);
    }

    #[test]
    fn detects_missing_index() {
        let conn = Connection::open_in_memory().unwrap();
        PARENT_TABLE.create(&conn).unwrap();
        conn.execute(
            "CREATE TABLE child (child_id INTEGER PRIMARY KEY, created DATETIME NOT NULL, \
             parent_id INTEGER REFERENCES parent(parent_id))",
            [],
        )
        .unwrap();

        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("missing index"));

        CHILD_TABLE.create_indices(&conn).unwrap();
        SCHEMA.validate(&conn).unwrap();
    }

    #[test]
    fn detects_type_mismatch() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE parent (parent_id INTEGER PRIMARY KEY, name VARCHAR(32) NOT NULL, UNIQUE (name))",
            [],
        )
        .unwrap();

        let err = PARENT_TABLE.validate_columns(&conn).unwrap_err().to_string();
        assert!(err.contains("type mismatch"));
    }

    #[test]
    fn detects_missing_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE parent (parent_id INTEGER PRIMARY KEY, name VARCHAR(64) NOT NULL)",
            [],
        )
        .unwrap();

        let err = PARENT_TABLE
            .validate_unique_constraints(&conn)
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing unique constraint"));
    }

    #[test]
    fn detects_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SCHEMA.validate(&conn).unwrap_err().to_string();
        assert!(err.contains("does not exist"));
    }
}
