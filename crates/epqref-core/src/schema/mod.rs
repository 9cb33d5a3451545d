//! Typed promotion of raw wire tables. Each dump module declares a fixed,
//! ordered column schema; validation turns raw string rows into typed records
//! so consuming assertions never re-check shapes.

use crate::domain::{BridgeError, BridgeResult, RawTable};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Primitive column types of the oracle's CSV cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Int,
    Double,
    Bool,
    Text,
}

impl ColumnKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Double => "DOUBLE",
            Self::Bool => "BOOL",
            Self::Text => "STRING",
        }
    }
}

impl Display for ColumnKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
        }
    }
}

/// Fixed, ordered schema of one dump module. Column order in oracle output
/// always matches declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub module: &'static str,
    pub columns: &'static [Column],
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

/// Explicit module-name → schema map handed to the validator; the association
/// is plain data, not ambient class discovery.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<&'static str, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.module, schema);
    }

    pub fn contains(&self, module: &str) -> bool {
        self.schemas.contains_key(module)
    }

    pub fn get(&self, module: &str) -> BridgeResult<&Schema> {
        self.schemas.get(module).ok_or_else(|| {
            BridgeError::schema_violation(
                "SCHEMA.UNKNOWN_MODULE",
                format!("no schema registered for dump module '{module}'"),
            )
        })
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.schemas.keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One validated row: every declared field present, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    fields: Vec<(&'static str, TypedValue)>,
}

impl TypedRecord {
    pub fn fields(&self) -> &[(&'static str, TypedValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn require_int(&self, name: &str) -> BridgeResult<i64> {
        match self.get(name) {
            Some(TypedValue::Int(value)) => Ok(*value),
            other => Err(field_access_error(name, "INT", other)),
        }
    }

    pub fn require_double(&self, name: &str) -> BridgeResult<f64> {
        match self.get(name) {
            Some(TypedValue::Double(value)) => Ok(*value),
            other => Err(field_access_error(name, "DOUBLE", other)),
        }
    }

    pub fn require_bool(&self, name: &str) -> BridgeResult<bool> {
        match self.get(name) {
            Some(TypedValue::Bool(value)) => Ok(*value),
            other => Err(field_access_error(name, "BOOL", other)),
        }
    }

    pub fn require_text(&self, name: &str) -> BridgeResult<String> {
        match self.get(name) {
            Some(TypedValue::Text(value)) => Ok(value.clone()),
            other => Err(field_access_error(name, "STRING", other)),
        }
    }

    pub fn optional_int(&self, name: &str) -> BridgeResult<Option<i64>> {
        match self.get(name) {
            Some(TypedValue::Null) => Ok(None),
            Some(TypedValue::Int(value)) => Ok(Some(*value)),
            other => Err(field_access_error(name, "INT or null", other)),
        }
    }

    pub fn optional_double(&self, name: &str) -> BridgeResult<Option<f64>> {
        match self.get(name) {
            Some(TypedValue::Null) => Ok(None),
            Some(TypedValue::Double(value)) => Ok(Some(*value)),
            other => Err(field_access_error(name, "DOUBLE or null", other)),
        }
    }

    pub fn optional_bool(&self, name: &str) -> BridgeResult<Option<bool>> {
        match self.get(name) {
            Some(TypedValue::Null) => Ok(None),
            Some(TypedValue::Bool(value)) => Ok(Some(*value)),
            other => Err(field_access_error(name, "BOOL or null", other)),
        }
    }
}

fn field_access_error(name: &str, expected: &str, actual: Option<&TypedValue>) -> BridgeError {
    BridgeError::schema_violation(
        "SCHEMA.FIELD_ACCESS",
        match actual {
            Some(value) => format!("field '{name}' expected {expected}, found {value:?}"),
            None => format!("field '{name}' is not present in the record"),
        },
    )
}

/// Conversion from a validated record to a module-specific row struct.
pub trait FromRecord: Sized {
    fn from_record(record: &TypedRecord) -> BridgeResult<Self>;
}

pub fn typed_rows<T: FromRecord>(records: &[TypedRecord]) -> BridgeResult<Vec<T>> {
    records.iter().map(T::from_record).collect()
}

/// Promote every raw row to a typed record, enforcing header identity (names
/// and order), cell parseability, and nullability. A headerless empty table
/// validates to an empty record list.
pub fn validate_table(schema: &Schema, table: &RawTable) -> BridgeResult<Vec<TypedRecord>> {
    if table.rows().is_empty() && table.columns().is_empty() {
        return Ok(Vec::new());
    }

    check_header(schema, table.columns())?;

    let mut records = Vec::with_capacity(table.rows().len());
    for (row_index, row) in table.rows().iter().enumerate() {
        let mut fields = Vec::with_capacity(schema.columns.len());
        for (column, raw_value) in schema.columns.iter().zip(row) {
            fields.push((column.name, parse_cell(schema, column, raw_value, row_index)?));
        }
        records.push(TypedRecord { fields });
    }
    Ok(records)
}

fn check_header(schema: &Schema, columns: &[String]) -> BridgeResult<()> {
    let actual: Vec<&str> = columns.iter().map(|name| name.trim()).collect();

    for column in schema.columns {
        if !actual.contains(&column.name) {
            return Err(BridgeError::schema_violation(
                "SCHEMA.MISSING_COLUMN",
                format!(
                    "module '{}': column '{}' is missing from the output header",
                    schema.module, column.name
                ),
            ));
        }
    }
    for name in &actual {
        if schema.column(name).is_none() {
            return Err(BridgeError::schema_violation(
                "SCHEMA.EXTRA_COLUMN",
                format!(
                    "module '{}': output header has undeclared column '{}'",
                    schema.module, name
                ),
            ));
        }
    }
    if actual != schema.header() {
        return Err(BridgeError::schema_violation(
            "SCHEMA.COLUMN_ORDER",
            format!(
                "module '{}': output header order {:?} does not match declared order {:?}",
                schema.module,
                actual,
                schema.header()
            ),
        ));
    }
    Ok(())
}

fn parse_cell(
    schema: &Schema,
    column: &Column,
    raw_value: &str,
    row_index: usize,
) -> BridgeResult<TypedValue> {
    let trimmed = raw_value.trim();
    if trimmed.is_empty() {
        if column.nullable {
            return Ok(TypedValue::Null);
        }
        return Err(BridgeError::schema_violation(
            "SCHEMA.NULL_CELL",
            format!(
                "module '{}': column '{}' row {} is empty but not nullable",
                schema.module, column.name, row_index
            ),
        ));
    }

    let parsed = match column.kind {
        ColumnKind::Int => trimmed.parse::<i64>().ok().map(TypedValue::Int),
        ColumnKind::Double => trimmed.parse::<f64>().ok().map(TypedValue::Double),
        ColumnKind::Bool => match trimmed {
            "true" => Some(TypedValue::Bool(true)),
            "false" => Some(TypedValue::Bool(false)),
            _ => None,
        },
        ColumnKind::Text => Some(TypedValue::Text(trimmed.to_string())),
    };

    parsed.ok_or_else(|| {
        BridgeError::schema_violation(
            "SCHEMA.CELL_PARSE",
            format!(
                "module '{}': column '{}' row {} cannot parse '{}' as {}",
                schema.module, column.name, row_index, trimmed, column.kind
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnKind, Schema, SchemaRegistry, TypedValue, validate_table};
    use crate::domain::RawTable;

    const PROBE_SCHEMA: Schema = Schema {
        module: "Probe",
        columns: &[
            Column::new("id", ColumnKind::Int, false),
            Column::new("ratio", ColumnKind::Double, true),
        ],
    };

    #[test]
    fn valid_rows_promote_in_schema_order() {
        let table = RawTable::from_parts(
            vec!["id".to_string(), "ratio".to_string()],
            vec![
                vec!["7".to_string(), "5.585000000000e+01".to_string()],
                vec!["8".to_string(), "".to_string()],
            ],
        )
        .expect("table should build");

        let records = validate_table(&PROBE_SCHEMA, &table).expect("validation should succeed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].require_int("id").expect("id"), 7);
        assert_eq!(
            records[0].require_double("ratio").expect("ratio"),
            55.85
        );
        assert_eq!(records[1].optional_double("ratio").expect("ratio"), None);
        assert_eq!(records[1].get("ratio"), Some(&TypedValue::Null));
    }

    #[test]
    fn unknown_module_lookup_fails() {
        let registry = SchemaRegistry::new();
        assert!(registry.get("Element").is_err());
        assert!(!registry.contains("Element"));
    }
}
