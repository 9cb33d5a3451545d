//! `AtomicShell` dump module: quantum numbers, occupancy, and edge energy of
//! one shell of one element.

use crate::domain::BridgeResult;
use crate::schema::{Column, ColumnKind, FromRecord, Schema, TypedRecord};

pub const ATOMIC_SHELL_SCHEMA: Schema = Schema {
    module: "AtomicShell",
    columns: &[
        Column::new("Z", ColumnKind::Int, false),
        Column::new("shell_index", ColumnKind::Int, false),
        Column::new("shell_name_siegbahn", ColumnKind::Text, false),
        Column::new("shell_name_iupac", ColumnKind::Text, false),
        Column::new("shell_name_atomic", ColumnKind::Text, false),
        Column::new("family", ColumnKind::Text, false),
        Column::new("principal_quantum_number", ColumnKind::Int, false),
        Column::new("orbital_angular_momentum", ColumnKind::Int, false),
        Column::new("total_angular_momentum", ColumnKind::Double, false),
        Column::new("capacity", ColumnKind::Int, false),
        Column::new("exists", ColumnKind::Bool, true),
        Column::new("ground_state_occupancy", ColumnKind::Int, true),
        Column::new("edge_energy_ev", ColumnKind::Double, true),
        Column::new("energy_J", ColumnKind::Double, true),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub struct AtomicShellRow {
    pub z: i64,
    pub shell_index: i64,
    pub shell_name_siegbahn: String,
    pub shell_name_iupac: String,
    pub shell_name_atomic: String,
    pub family: String,
    pub principal_quantum_number: i64,
    pub orbital_angular_momentum: i64,
    pub total_angular_momentum: f64,
    pub capacity: i64,
    pub exists: Option<bool>,
    pub ground_state_occupancy: Option<i64>,
    pub edge_energy_ev: Option<f64>,
    pub energy_j: Option<f64>,
}

impl FromRecord for AtomicShellRow {
    fn from_record(record: &TypedRecord) -> BridgeResult<Self> {
        Ok(Self {
            z: record.require_int("Z")?,
            shell_index: record.require_int("shell_index")?,
            shell_name_siegbahn: record.require_text("shell_name_siegbahn")?,
            shell_name_iupac: record.require_text("shell_name_iupac")?,
            shell_name_atomic: record.require_text("shell_name_atomic")?,
            family: record.require_text("family")?,
            principal_quantum_number: record.require_int("principal_quantum_number")?,
            orbital_angular_momentum: record.require_int("orbital_angular_momentum")?,
            total_angular_momentum: record.require_double("total_angular_momentum")?,
            capacity: record.require_int("capacity")?,
            exists: record.optional_bool("exists")?,
            ground_state_occupancy: record.optional_int("ground_state_occupancy")?,
            edge_energy_ev: record.optional_double("edge_energy_ev")?,
            energy_j: record.optional_double("energy_J")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ATOMIC_SHELL_SCHEMA, AtomicShellRow};
    use crate::domain::RawTable;
    use crate::schema::{typed_rows, validate_table};

    #[test]
    fn k_shell_row_converts_to_typed_struct() {
        let header: Vec<String> = ATOMIC_SHELL_SCHEMA
            .header()
            .into_iter()
            .map(str::to_string)
            .collect();
        let table = RawTable::from_parts(
            header,
            vec![vec![
                "26".to_string(),
                "0".to_string(),
                "K".to_string(),
                "K".to_string(),
                "1S".to_string(),
                "K".to_string(),
                "1".to_string(),
                "0".to_string(),
                "5.000000000000e-01".to_string(),
                "2".to_string(),
                "true".to_string(),
                "2".to_string(),
                "7.112000000000e+03".to_string(),
                "1.139364000000e-15".to_string(),
            ]],
        )
        .expect("table should build");

        let records = validate_table(&ATOMIC_SHELL_SCHEMA, &table).expect("should validate");
        let rows: Vec<AtomicShellRow> = typed_rows(&records).expect("should convert");

        assert_eq!(rows[0].shell_index, 0);
        assert_eq!(rows[0].principal_quantum_number, 1);
        assert_eq!(rows[0].total_angular_momentum, 0.5);
        assert_eq!(rows[0].ground_state_occupancy, Some(2));
    }
}
