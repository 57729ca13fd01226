//! Generators for synthetic `.idx` content.

/// Builds an index body one message at a time.
///
/// # Example
///
/// ```
/// use test_utils::IndexBuilder;
///
/// let body = IndexBuilder::new("d=2024050112")
///     .message("REFC", "entire atmosphere", "5 hour fcst", 1000)
///     .message("TMP", "2 m above ground", "5 hour fcst", 500)
///     .build();
/// assert_eq!(
///     body,
///     "1:0:d=2024050112:REFC:entire atmosphere:5 hour fcst:\n\
///      2:1000:d=2024050112:TMP:2 m above ground:5 hour fcst:\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    reference_time: String,
    lines: Vec<String>,
    next_offset: u64,
}

impl IndexBuilder {
    pub fn new(reference_time: &str) -> Self {
        Self {
            reference_time: reference_time.to_string(),
            lines: Vec::new(),
            next_offset: 0,
        }
    }

    /// Append a message of `size` bytes.
    pub fn message(mut self, variable: &str, level: &str, forecast_time: &str, size: u64) -> Self {
        self.lines.push(format!(
            "{}:{}:{}:{}:{}:{}:",
            self.lines.len() + 1,
            self.next_offset,
            self.reference_time,
            variable,
            level,
            forecast_time
        ));
        self.next_offset += size;
        self
    }

    /// Total bytes of all messages appended so far.
    pub fn total_size(&self) -> u64 {
        self.next_offset
    }

    pub fn build(&self) -> String {
        self.lines.iter().map(|l| format!("{}\n", l)).collect()
    }
}

/// Creates an index of `rows` distinct hybrid-level temperature messages,
/// each `message_size` bytes.
pub fn create_uniform_index(rows: usize, forecast_time: &str, message_size: u64) -> String {
    (1..=rows)
        .fold(IndexBuilder::new("d=2024050112"), |builder, row| {
            builder.message("TMP", &format!("{} hybrid level", row), forecast_time, message_size)
        })
        .build()
}

/// Creates a reference inventory YAML matching [`create_uniform_index`].
pub fn create_uniform_inventory_yaml(rows: usize, forecast_valid: &str) -> String {
    let mut yaml = String::from(
        "product: nat\nforecast_hour_set: fh02-48\nreference_forecast_hour: 2\nvariables:\n",
    );
    for row in 1..=rows {
        yaml.push_str(&format!(
            "- row_number: {row}\n  level_layer: {row} hybrid level\n  parameter: TMP\n  \
             forecast_valid: {forecast_valid}\n  description: Temperature\n"
        ));
    }
    yaml
}
