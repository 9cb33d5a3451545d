pub mod errors;

pub use errors::{BridgeError, BridgeErrorCategory, BridgeResult, ErrorAttribution};

use std::fmt::{Display, Formatter};

/// Canonical identifier for one unit of reference computation: a dump-module
/// name plus key-sorted argument pairs.
///
/// Two requests built from any permutation of the same argument set compare,
/// order, and hash identically; the sorted order is also the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DumpRequest {
    module: String,
    arguments: Vec<(String, String)>,
}

impl DumpRequest {
    /// Normalize and sort the argument pairs, rejecting duplicate keys and
    /// tokens that would break the `module k=v ...` wire grammar.
    pub fn build<M, I, K, V>(module: M, arguments: I) -> BridgeResult<Self>
    where
        M: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let module = module.into();
        validate_wire_token(&module, "module name")?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        for (key, value) in arguments {
            let key = key.into();
            let value = value.into();
            validate_wire_token(&key, "argument key")?;
            validate_wire_token(&value, "argument value")?;
            pairs.push((key, value));
        }
        pairs.sort_by(|left, right| left.0.cmp(&right.0));

        if let Some(window) = pairs.windows(2).find(|window| window[0].0 == window[1].0) {
            return Err(BridgeError::request_construction(
                "REQUEST.DUPLICATE_KEY",
                format!(
                    "duplicate argument key '{}' for module '{}'",
                    window[0].0, module
                ),
            ));
        }

        Ok(Self {
            module,
            arguments: pairs,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Argument pairs in canonical (key-sorted) order.
    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    /// Render as `"<module> <k1>=<v1> <k2>=<v2> ..."` in canonical order.
    /// This string is both the batch-input line and the debug identifier.
    pub fn wire_line(&self) -> String {
        let mut line = self.module.clone();
        for (key, value) in &self.arguments {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

impl Display for DumpRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.wire_line())
    }
}

fn validate_wire_token(token: &str, role: &str) -> BridgeResult<()> {
    if token.is_empty() {
        return Err(BridgeError::request_construction(
            "REQUEST.EMPTY_TOKEN",
            format!("{role} must not be empty"),
        ));
    }
    if token
        .chars()
        .any(|character| character == '=' || character.is_whitespace())
    {
        return Err(BridgeError::request_construction(
            "REQUEST.DELIMITER",
            format!("{role} '{token}' must not contain '=' or whitespace"),
        ));
    }
    Ok(())
}

/// Decoded, untyped payload of one frame: header column names plus data rows,
/// every row exactly as wide as the header.
///
/// The oracle writes its CSV header lazily on the first data row, so an empty
/// result may arrive with no lines at all; both the headerless and the
/// header-only form are valid empty tables, distinct from a missing frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> BridgeResult<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BridgeError::protocol(
                    "WIRE.FIELD_COUNT",
                    format!(
                        "data row {} has {} fields but the header has {}",
                        index,
                        row.len(),
                        columns.len()
                    ),
                ));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
