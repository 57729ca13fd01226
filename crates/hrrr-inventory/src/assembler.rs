//! Layer assembly: join parsed index records with a reference inventory.

use std::collections::BTreeMap;
use std::fmt;

use hrrr_common::{HrrrError, HrrrResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::forecast_valid::ForecastValid;
use crate::idx::IndexRecord;
use crate::reference::ReferenceInventory;

/// Separator between layer key components.
pub const LAYER_KEY_SEPARATOR: &str = "__";

/// Key of a layer within a GRIB asset:
/// `{variable}__{level with each whitespace character as an underscore}__{forecast time}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerKey(String);

impl LayerKey {
    pub fn new(variable: &str, level: &str, forecast_time: &str) -> Self {
        let level: String = level
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        Self(
            [variable, level.as_str(), forecast_time].join(LAYER_KEY_SEPARATOR),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single GRIB message, addressable by byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub variable: String,
    pub level: String,
    /// Forecast time rendered for the item's forecast hour
    pub forecast_time: String,
    pub description: String,
    pub start_byte: u64,
    pub byte_length: Option<u64>,
}

pub type LayerMap = BTreeMap<LayerKey, LayerDescriptor>;

/// Build the layer map for one index at `forecast_hour`.
///
/// Every record must have a row in `inventory` and every rendered key must
/// be unique.
pub fn assemble(
    records: &[IndexRecord],
    inventory: &ReferenceInventory,
    forecast_hour: u32,
) -> HrrrResult<LayerMap> {
    let mut layers = LayerMap::new();

    for record in records {
        let variable = inventory
            .variable(record.row_number)
            .ok_or_else(|| HrrrError::InventoryMismatch {
                row: record.row_number,
                table: inventory.name(),
            })?;

        if variable.parameter != record.variable || variable.level_layer != record.level {
            warn!(
                row = record.row_number,
                index_variable = %record.variable,
                index_level = %record.level,
                reference_variable = %variable.parameter,
                reference_level = %variable.level_layer,
                "Index row differs from reference inventory"
            );
        }

        let forecast_time = ForecastValid::parse(&variable.forecast_valid)?.render(forecast_hour);
        let key = LayerKey::new(&record.variable, &record.level, &forecast_time);
        if layers.contains_key(&key) {
            return Err(HrrrError::DuplicateLayerKey(key.to_string()));
        }

        layers.insert(
            key,
            LayerDescriptor {
                variable: record.variable.clone(),
                level: record.level.clone(),
                forecast_time,
                description: variable.description.clone(),
                start_byte: record.byte_offset,
                byte_length: record.byte_length,
            },
        );
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Variable;
    use hrrr_common::{ForecastHourSet, Product};

    fn variable(row: u32, parameter: &str, level: &str, pattern: &str) -> Variable {
        Variable {
            row_number: row,
            level_layer: level.to_string(),
            parameter: parameter.to_string(),
            forecast_valid: pattern.to_string(),
            description: format!("{} description", parameter),
        }
    }

    fn record(row: u32, offset: u64, variable: &str, level: &str, length: Option<u64>) -> IndexRecord {
        IndexRecord {
            row_number: row,
            byte_offset: offset,
            reference_time: "d=2024050112".to_string(),
            variable: variable.to_string(),
            level: level.to_string(),
            forecast_time: "ignored".to_string(),
            byte_length: length,
        }
    }

    fn inventory(variables: Vec<Variable>) -> ReferenceInventory {
        ReferenceInventory {
            product: Product::Surface,
            forecast_hour_set: ForecastHourSet::Fh02To48,
            reference_forecast_hour: 2,
            variables,
        }
    }

    #[test]
    fn test_layer_key_format() {
        let key = LayerKey::new("TMP", "2 m above ground", "5 hour fcst");
        assert_eq!(key.as_str(), "TMP__2_m_above_ground__5 hour fcst");
    }

    #[test]
    fn test_layer_key_keeps_every_whitespace_character() {
        let key = LayerKey::new("TMP", "2 m  above ground", "anl");
        assert_eq!(key.as_str(), "TMP__2_m__above_ground__anl");

        let key = LayerKey::new("HGT", " cloud\tbase ", "anl");
        assert_eq!(key.as_str(), "HGT___cloud_base___anl");
    }

    #[test]
    fn test_assemble_renders_for_requested_hour() {
        let inv = inventory(vec![
            variable(1, "REFC", "entire atmosphere", "2 hour fcst"),
            variable(2, "APCP", "surface", "0-2 hour acc fcst"),
        ]);
        let records = vec![
            record(1, 0, "REFC", "entire atmosphere", Some(120)),
            record(2, 120, "APCP", "surface", None),
        ];
        let layers = assemble(&records, &inv, 48).unwrap();
        assert_eq!(layers.len(), 2);

        let refc = &layers[&LayerKey::new("REFC", "entire atmosphere", "48 hour fcst")];
        assert_eq!(refc.start_byte, 0);
        assert_eq!(refc.byte_length, Some(120));
        assert_eq!(refc.description, "REFC description");

        let apcp = &layers[&LayerKey::new("APCP", "surface", "0-2 day acc fcst")];
        assert_eq!(apcp.start_byte, 120);
        assert_eq!(apcp.byte_length, None);
    }

    #[test]
    fn test_missing_row_is_mismatch() {
        let inv = inventory(vec![variable(1, "REFC", "entire atmosphere", "2 hour fcst")]);
        let records = vec![
            record(1, 0, "REFC", "entire atmosphere", Some(10)),
            record(2, 10, "RETOP", "cloud top", None),
        ];
        match assemble(&records, &inv, 3) {
            Err(HrrrError::InventoryMismatch { row, table }) => {
                assert_eq!(row, 2);
                assert_eq!(table, "sfc__fh02-48");
            }
            other => panic!("Expected InventoryMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_collision_fails() {
        let inv = inventory(vec![
            variable(1, "TMP", "2 m above ground", "2 hour fcst"),
            variable(2, "TMP", "2 m above ground", "2 hour fcst"),
        ]);
        let records = vec![
            record(1, 0, "TMP", "2 m above ground", Some(10)),
            record(2, 10, "TMP", "2 m above ground", None),
        ];
        match assemble(&records, &inv, 4) {
            Err(HrrrError::DuplicateLayerKey(key)) => {
                assert_eq!(key, "TMP__2_m_above_ground__4 hour fcst")
            }
            other => panic!("Expected DuplicateLayerKey, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_index_is_empty_map() {
        let inv = inventory(vec![variable(1, "REFC", "entire atmosphere", "2 hour fcst")]);
        assert!(assemble(&[], &inv, 2).unwrap().is_empty());
    }

    #[test]
    fn test_layer_map_serializes_with_string_keys() {
        let inv = inventory(vec![variable(1, "REFC", "entire atmosphere", "2 hour fcst")]);
        let layers = assemble(&[record(1, 0, "REFC", "entire atmosphere", None)], &inv, 2).unwrap();
        let json = serde_json::to_value(&layers).unwrap();
        let layer = &json["REFC__entire_atmosphere__2 hour fcst"];
        assert_eq!(layer["start_byte"], 0);
        assert!(layer["byte_length"].is_null());
    }
}
