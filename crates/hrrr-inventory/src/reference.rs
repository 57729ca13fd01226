//! Reference inventory tables.
//!
//! One table per (product, forecast-hour set) lists every message an index
//! file in that bucket carries, keyed by row number. Tables are YAML files
//! named `{product}__{forecast_hour_set}.yaml` (optionally gzip-compressed as
//! `.yaml.gz`) under `{CONFIG_DIR}/inventories/`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use hrrr_common::{ForecastHourSet, HrrrError, HrrrResult, Product};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::forecast_valid::ForecastValid;
use crate::idx::IndexRecord;

/// One row of a reference inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub row_number: u32,
    /// Vertical level, e.g. `2 m above ground`
    pub level_layer: String,
    /// GRIB parameter short name, e.g. `TMP`
    pub parameter: String,
    /// Forecast-valid pattern phrased for the table's reference forecast hour
    pub forecast_valid: String,
    #[serde(default)]
    pub description: String,
}

/// Reference table for one (product, forecast-hour set) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInventory {
    pub product: Product,
    pub forecast_hour_set: ForecastHourSet,
    /// Forecast hour of the index the table was generated from
    pub reference_forecast_hour: u32,
    pub variables: Vec<Variable>,
}

impl ReferenceInventory {
    /// File stem used for this table, e.g. `sfc__fh02-48`.
    pub fn table_name(product: Product, forecast_hour_set: ForecastHourSet) -> String {
        format!("{}__{}", product, forecast_hour_set)
    }

    pub fn name(&self) -> String {
        Self::table_name(self.product, self.forecast_hour_set)
    }

    /// Look up a row by its 1-based row number.
    pub fn variable(&self, row_number: u32) -> Option<&Variable> {
        self.variables
            .binary_search_by_key(&row_number, |v| v.row_number)
            .ok()
            .map(|i| &self.variables[i])
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Check the table is usable for assembly.
    ///
    /// Rows must be non-empty and strictly ascending, the reference forecast
    /// hour must fall in the table's bucket, and every forecast-valid pattern
    /// must be recognized.
    pub fn validate(&self) -> HrrrResult<()> {
        let name = self.name();
        if self.variables.is_empty() {
            return Err(HrrrError::InvalidConfig(format!(
                "reference inventory {} has no variables",
                name
            )));
        }
        if !self.product.forecast_hour_sets().contains(&self.forecast_hour_set) {
            return Err(HrrrError::InvalidConfig(format!(
                "{} is not a forecast hour set of product {}",
                self.forecast_hour_set, self.product
            )));
        }
        if !self.forecast_hour_set.contains(self.reference_forecast_hour) {
            return Err(HrrrError::InvalidConfig(format!(
                "reference forecast hour {} of {} is outside {}",
                self.reference_forecast_hour, name, self.forecast_hour_set
            )));
        }
        for pair in self.variables.windows(2) {
            if pair[1].row_number <= pair[0].row_number {
                return Err(HrrrError::InvalidConfig(format!(
                    "rows of {} must be unique and ascending (row {} follows row {})",
                    name, pair[1].row_number, pair[0].row_number
                )));
            }
        }
        for variable in &self.variables {
            ForecastValid::parse(&variable.forecast_valid).map_err(|e| {
                HrrrError::InvalidConfig(format!("{} row {}: {}", name, variable.row_number, e))
            })?;
        }
        Ok(())
    }

    /// Parse a YAML table body and validate it.
    pub fn from_yaml(yaml: &str) -> HrrrResult<Self> {
        let inventory: ReferenceInventory = serde_yaml::from_str(yaml)
            .map_err(|e| HrrrError::InvalidConfig(format!("invalid inventory YAML: {}", e)))?;
        inventory.validate()?;
        Ok(inventory)
    }

    pub fn to_yaml(&self) -> HrrrResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| HrrrError::InvalidConfig(format!("cannot serialize {}: {}", self.name(), e)))
    }

    /// Read a table from a `.yaml` or `.yaml.gz` file.
    pub fn load(path: &Path) -> HrrrResult<Self> {
        let bytes = fs::read(path)?;
        let yaml = if path.extension().is_some_and(|ext| ext == "gz") {
            let mut decoded = String::new();
            GzDecoder::new(bytes.as_slice())
                .read_to_string(&mut decoded)
                .map_err(|e| HrrrError::InvalidConfig(format!("cannot decompress {:?}: {}", path, e)))?;
            decoded
        } else {
            String::from_utf8(bytes)
                .map_err(|e| HrrrError::InvalidConfig(format!("{:?} is not UTF-8: {}", path, e)))?
        };
        Self::from_yaml(&yaml).map_err(|e| match e {
            HrrrError::InvalidConfig(msg) => HrrrError::InvalidConfig(format!("{:?}: {}", path, msg)),
            other => other,
        })
    }

    /// Build a table from a parsed index.
    ///
    /// Descriptions are carried over from `previous` for rows whose parameter
    /// and level both match an existing row.
    pub fn from_index_records(
        product: Product,
        forecast_hour_set: ForecastHourSet,
        reference_forecast_hour: u32,
        records: &[IndexRecord],
        previous: Option<&ReferenceInventory>,
    ) -> Self {
        let known: HashMap<(&str, &str), &str> = previous
            .map(|prev| {
                prev.variables
                    .iter()
                    .map(|v| {
                        (
                            (v.parameter.as_str(), v.level_layer.as_str()),
                            v.description.as_str(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let variables = records
            .iter()
            .map(|record| Variable {
                row_number: record.row_number,
                level_layer: record.level.clone(),
                parameter: record.variable.clone(),
                forecast_valid: record.forecast_time.clone(),
                description: known
                    .get(&(record.variable.as_str(), record.level.as_str()))
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            product,
            forecast_hour_set,
            reference_forecast_hour,
            variables,
        }
    }
}

/// Path of an existing table for a bucket, preferring plain YAML over gzip.
pub fn table_path(dir: &Path, product: Product, forecast_hour_set: ForecastHourSet) -> Option<PathBuf> {
    let stem = ReferenceInventory::table_name(product, forecast_hour_set);
    [format!("{}.yaml", stem), format!("{}.yaml.gz", stem)]
        .into_iter()
        .map(|file| dir.join(file))
        .find(|path| path.is_file())
}

/// Every reference table, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct InventoryCatalog {
    tables: BTreeMap<(Product, ForecastHourSet), ReferenceInventory>,
}

impl InventoryCatalog {
    /// Load a table for every (product, forecast-hour set) bucket from `dir`.
    ///
    /// A missing or invalid table is an error. Callers should treat errors
    /// as fatal startup errors.
    pub fn load(dir: &Path) -> HrrrResult<Self> {
        let mut catalog = Self::default();
        for product in Product::all() {
            for set in product.forecast_hour_sets() {
                let Some(path) = table_path(dir, *product, *set) else {
                    error!(
                        product = %product,
                        forecast_hour_set = %set,
                        dir = ?dir,
                        "CRITICAL: Reference inventory not found. Items cannot be built."
                    );
                    return Err(HrrrError::InvalidConfig(format!(
                        "reference inventory {} not found in {:?}",
                        ReferenceInventory::table_name(*product, *set),
                        dir
                    )));
                };

                let table = ReferenceInventory::load(&path).map_err(|e| {
                    error!(
                        path = ?path,
                        error = %e,
                        "CRITICAL: Failed to load reference inventory."
                    );
                    e
                })?;

                if table.product != *product || table.forecast_hour_set != *set {
                    return Err(HrrrError::InvalidConfig(format!(
                        "{:?} declares {} but is named for {}",
                        path,
                        table.name(),
                        ReferenceInventory::table_name(*product, *set)
                    )));
                }

                debug!(table = %table.name(), rows = table.len(), "Loaded reference inventory");
                catalog.insert(table);
            }
        }
        info!(tables = catalog.len(), dir = ?dir, "Reference inventories loaded");
        Ok(catalog)
    }

    /// Add or replace a table.
    pub fn insert(&mut self, table: ReferenceInventory) {
        self.tables
            .insert((table.product, table.forecast_hour_set), table);
    }

    pub fn get(&self, product: Product, forecast_hour_set: ForecastHourSet) -> Option<&ReferenceInventory> {
        self.tables.get(&(product, forecast_hour_set))
    }

    /// Like [`get`](Self::get), but a missing table is an error.
    pub fn require(
        &self,
        product: Product,
        forecast_hour_set: ForecastHourSet,
    ) -> HrrrResult<&ReferenceInventory> {
        self.get(product, forecast_hour_set).ok_or_else(|| {
            HrrrError::InvalidConfig(format!(
                "no reference inventory loaded for {}",
                ReferenceInventory::table_name(product, forecast_hour_set)
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
