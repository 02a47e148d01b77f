use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV data row as uploaded, before any validation. Every field is kept
/// as an optional string so the validator can attribute precise errors.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct RawMetricRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) account_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) metric_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) period_start: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) period_end: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) unit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) source: Option<String>,
}

/// Parse the upload into raw rows. Headers are trimmed, lowercased, and
/// space-collapsed to underscores so "Account Name" and "account_name" both
/// address the same column.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawMetricRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(record.deserialize::<RawMetricRow>(Some(&headers))?);
    }

    Ok(rows)
}

fn normalize_header(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace(' ', "_")
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn headers_are_normalized_before_matching() {
        let csv = "Account Name,Metric Type,Period Start,Period End,Value\n\
Acme,nrr_percent,2025-01-01,2025-01-31,110\n";
        let rows = parse_rows(Cursor::new(csv)).expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account_name.as_deref(), Some("Acme"));
        assert_eq!(rows[0].metric_type.as_deref(), Some("nrr_percent"));
        assert_eq!(rows[0].value.as_deref(), Some("110"));
    }

    #[test]
    fn blank_lines_and_missing_columns_yield_none_fields() {
        let csv = "account_name,metric_type,period_start,period_end,value\n\
\n\
Acme,,2025-01-01,2025-01-31,\n";
        let rows = parse_rows(Cursor::new(csv)).expect("parse");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].metric_type.is_none());
        assert!(rows[0].value.is_none());
        assert!(rows[0].unit.is_none());
    }

    #[test]
    fn whitespace_around_fields_is_trimmed() {
        let csv = "account_name,metric_type,period_start,period_end,value\n\
  Acme  , nps_score ,2025-01-01,2025-01-31, 40 \n";
        let rows = parse_rows(Cursor::new(csv)).expect("parse");
        assert_eq!(rows[0].account_name.as_deref(), Some("Acme"));
        assert_eq!(rows[0].metric_type.as_deref(), Some("nps_score"));
        assert_eq!(rows[0].value.as_deref(), Some("40"));
    }
}
