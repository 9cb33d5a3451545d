//! `Element` dump module: one row of bulk element properties per request.

use crate::domain::BridgeResult;
use crate::schema::{Column, ColumnKind, FromRecord, Schema, TypedRecord};

pub const ELEMENT_SCHEMA: Schema = Schema {
    module: "Element",
    columns: &[
        Column::new("Z", ColumnKind::Int, false),
        Column::new("symbol", ColumnKind::Text, false),
        Column::new("name", ColumnKind::Text, false),
        Column::new("atomic_weight", ColumnKind::Double, false),
        Column::new("mass_in_kg", ColumnKind::Double, false),
        Column::new("ionization_energy", ColumnKind::Double, true),
        Column::new("mean_ionization_potential", ColumnKind::Double, false),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub struct ElementRow {
    pub z: i64,
    pub symbol: String,
    pub name: String,
    pub atomic_weight: f64,
    pub mass_in_kg: f64,
    pub ionization_energy: Option<f64>,
    pub mean_ionization_potential: f64,
}

impl FromRecord for ElementRow {
    fn from_record(record: &TypedRecord) -> BridgeResult<Self> {
        Ok(Self {
            z: record.require_int("Z")?,
            symbol: record.require_text("symbol")?,
            name: record.require_text("name")?,
            atomic_weight: record.require_double("atomic_weight")?,
            mass_in_kg: record.require_double("mass_in_kg")?,
            ionization_energy: record.optional_double("ionization_energy")?,
            mean_ionization_potential: record.require_double("mean_ionization_potential")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ELEMENT_SCHEMA, ElementRow};
    use crate::domain::RawTable;
    use crate::schema::{typed_rows, validate_table};

    #[test]
    fn iron_row_converts_to_typed_struct() {
        let table = RawTable::from_parts(
            vec![
                "Z".to_string(),
                "symbol".to_string(),
                "name".to_string(),
                "atomic_weight".to_string(),
                "mass_in_kg".to_string(),
                "ionization_energy".to_string(),
                "mean_ionization_potential".to_string(),
            ],
            vec![vec![
                "26".to_string(),
                "Fe".to_string(),
                "Iron".to_string(),
                "5.584500000000e+01".to_string(),
                "9.273260200000e-26".to_string(),
                "1.266716000000e-18".to_string(),
                "4.517784120000e-17".to_string(),
            ]],
        )
        .expect("table should build");

        let records = validate_table(&ELEMENT_SCHEMA, &table).expect("row should validate");
        let rows: Vec<ElementRow> = typed_rows(&records).expect("row should convert");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].z, 26);
        assert_eq!(rows[0].symbol, "Fe");
        assert_eq!(rows[0].atomic_weight, 55.845);
        assert!(rows[0].ionization_energy.is_some());
    }

    #[test]
    fn missing_ionization_energy_is_null_not_error() {
        let table = RawTable::from_parts(
            vec![
                "Z".to_string(),
                "symbol".to_string(),
                "name".to_string(),
                "atomic_weight".to_string(),
                "mass_in_kg".to_string(),
                "ionization_energy".to_string(),
                "mean_ionization_potential".to_string(),
            ],
            vec![vec![
                "99".to_string(),
                "Es".to_string(),
                "Einsteinium".to_string(),
                "2.520000000000e+02".to_string(),
                "4.184588600000e-25".to_string(),
                "".to_string(),
                "1.368627000000e-16".to_string(),
            ]],
        )
        .expect("table should build");

        let records = validate_table(&ELEMENT_SCHEMA, &table).expect("row should validate");
        let rows: Vec<ElementRow> = typed_rows(&records).expect("row should convert");
        assert_eq!(rows[0].ionization_energy, None);
    }
}
