//! `XRayTransition` dump module: properties and line weights of one
//! transition of one element. A transition that does not exist for the
//! requested element legitimately yields zero rows.

use crate::domain::BridgeResult;
use crate::schema::{Column, ColumnKind, FromRecord, Schema, TypedRecord};

pub const XRAY_TRANSITION_SCHEMA: Schema = Schema {
    module: "XRayTransition",
    columns: &[
        Column::new("Z", ColumnKind::Int, false),
        Column::new("transition_index", ColumnKind::Int, false),
        Column::new("transition_name", ColumnKind::Text, false),
        Column::new("source_shell", ColumnKind::Text, false),
        Column::new("destination_shell", ColumnKind::Text, false),
        Column::new("family", ColumnKind::Text, false),
        Column::new("is_well_known", ColumnKind::Bool, false),
        Column::new("exists", ColumnKind::Bool, true),
        Column::new("energy_eV", ColumnKind::Double, true),
        Column::new("edge_energy_eV", ColumnKind::Double, true),
        Column::new("weight_default", ColumnKind::Double, true),
        Column::new("weight_family", ColumnKind::Double, true),
        Column::new("weight_destination", ColumnKind::Double, true),
        Column::new("weight_klm", ColumnKind::Double, true),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub struct XRayTransitionRow {
    pub z: i64,
    pub transition_index: i64,
    pub transition_name: String,
    pub source_shell: String,
    pub destination_shell: String,
    pub family: String,
    pub is_well_known: bool,
    pub exists: Option<bool>,
    pub energy_ev: Option<f64>,
    pub edge_energy_ev: Option<f64>,
    pub weight_default: Option<f64>,
    pub weight_family: Option<f64>,
    pub weight_destination: Option<f64>,
    pub weight_klm: Option<f64>,
}

impl FromRecord for XRayTransitionRow {
    fn from_record(record: &TypedRecord) -> BridgeResult<Self> {
        Ok(Self {
            z: record.require_int("Z")?,
            transition_index: record.require_int("transition_index")?,
            transition_name: record.require_text("transition_name")?,
            source_shell: record.require_text("source_shell")?,
            destination_shell: record.require_text("destination_shell")?,
            family: record.require_text("family")?,
            is_well_known: record.require_bool("is_well_known")?,
            exists: record.optional_bool("exists")?,
            energy_ev: record.optional_double("energy_eV")?,
            edge_energy_ev: record.optional_double("edge_energy_eV")?,
            weight_default: record.optional_double("weight_default")?,
            weight_family: record.optional_double("weight_family")?,
            weight_destination: record.optional_double("weight_destination")?,
            weight_klm: record.optional_double("weight_klm")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{XRAY_TRANSITION_SCHEMA, XRayTransitionRow};
    use crate::domain::RawTable;
    use crate::schema::{typed_rows, validate_table};

    fn header() -> Vec<String> {
        XRAY_TRANSITION_SCHEMA
            .header()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn ka1_row_converts_with_all_weights() {
        let table = RawTable::from_parts(
            header(),
            vec![vec![
                "26".to_string(),
                "1".to_string(),
                "Ka1".to_string(),
                "LIII".to_string(),
                "K".to_string(),
                "K".to_string(),
                "true".to_string(),
                "true".to_string(),
                "6.403840000000e+03".to_string(),
                "7.112000000000e+03".to_string(),
                "5.796560000000e-01".to_string(),
                "5.796560000000e-01".to_string(),
                "1.000000000000e+00".to_string(),
                "1.000000000000e+00".to_string(),
            ]],
        )
        .expect("table should build");

        let records = validate_table(&XRAY_TRANSITION_SCHEMA, &table).expect("should validate");
        let rows: Vec<XRayTransitionRow> = typed_rows(&records).expect("should convert");

        assert_eq!(rows[0].z, 26);
        assert_eq!(rows[0].transition_name, "Ka1");
        assert_eq!(rows[0].exists, Some(true));
        assert_eq!(rows[0].energy_ev, Some(6403.84));
    }

    #[test]
    fn nonexistent_transition_row_carries_nulls() {
        let table = RawTable::from_parts(
            header(),
            vec![vec![
                "1".to_string(),
                "9".to_string(),
                "Lb1".to_string(),
                "MIV".to_string(),
                "LII".to_string(),
                "L".to_string(),
                "true".to_string(),
                "false".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
            ]],
        )
        .expect("table should build");

        let records = validate_table(&XRAY_TRANSITION_SCHEMA, &table).expect("should validate");
        let rows: Vec<XRayTransitionRow> = typed_rows(&records).expect("should convert");

        assert_eq!(rows[0].exists, Some(false));
        assert_eq!(rows[0].energy_ev, None);
        assert_eq!(rows[0].weight_klm, None);
    }
}
