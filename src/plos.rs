use crate::dataset::{norm_key, normalize_display};
use anyhow::Result;
use std::io::Read;
use tracing::{info, instrument};

/// The published breastfeeding / maternal mental-health study, kept as
/// a small column-oriented table. The service only ever filters rows
/// by equality on one or two columns and averages a numeric column, so
/// a generic table avoids hard-coding the study's header text.
#[derive(Debug, Clone, Default)]
pub struct PlosDataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[instrument(skip(reader), err)]
pub fn load_plos_csv<R: Read>(reader: R) -> Result<PlosDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| {
            anyhow::anyhow!("Failed to read study CSV headers: {}", e)
        })?
        .iter()
        .map(normalize_display)
        .collect();

    let mut rows = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| {
            anyhow::anyhow!("Failed to read study CSV row: {}", e)
        })?;
        rows.push(row.iter().map(normalize_display).collect());
    }

    info!("Loaded {} study rows", rows.len());
    Ok(PlosDataset { headers, rows })
}

impl PlosDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = norm_key(name);
        self.headers.iter().position(|h| norm_key(h) == wanted)
    }

    fn cell(&self, row: &[String], column: usize) -> String {
        row.get(column).map(|c| c.to_string()).unwrap_or_default()
    }

    /// Mean of `value_column` over the rows where every `(column,
    /// value)` filter matches by case-insensitive equality. Returns
    /// None when a named column is absent, no rows qualify, or no
    /// qualifying cell parses as a number.
    pub fn mean_where(
        &self,
        value_column: &str,
        filters: &[(&str, &str)],
    ) -> Option<f64> {
        let value_index = self.column_index(value_column)?;
        let mut filter_indexes = Vec::with_capacity(filters.len());
        for (column, value) in filters {
            filter_indexes.push((self.column_index(column)?, norm_key(value)));
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for row in &self.rows {
            let qualifies = filter_indexes.iter().all(|(index, wanted)| {
                norm_key(&self.cell(row, *index)) == *wanted
            });
            if !qualifies {
                continue;
            }
            if let Ok(score) = self.cell(row, value_index).parse::<f64>() {
                sum += score;
                count += 1;
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STUDY_CSV: &str = "\
Breastfeeding status,Timepoint,EPDS score
Exclusive,3 months,6.0
Exclusive,3 months,8.0
Exclusive,6 months,12.0
Mixed,3 months,9.0
None,3 months,not reported
";

    #[test]
    fn test_mean_with_single_filter() {
        let dataset = load_plos_csv(STUDY_CSV.as_bytes()).unwrap();
        let mean = dataset
            .mean_where("EPDS score", &[("Breastfeeding status", "exclusive")]);
        assert_eq!(mean, Some((6.0 + 8.0 + 12.0) / 3.0));
    }

    #[test]
    fn test_mean_with_two_filters() {
        let dataset = load_plos_csv(STUDY_CSV.as_bytes()).unwrap();
        let mean = dataset.mean_where(
            "EPDS score",
            &[
                ("Breastfeeding status", "Exclusive"),
                ("Timepoint", "3 months"),
            ],
        );
        assert_eq!(mean, Some(7.0));
    }

    #[test]
    fn test_mean_skips_non_numeric_cells() {
        let dataset = load_plos_csv(STUDY_CSV.as_bytes()).unwrap();
        let mean = dataset
            .mean_where("EPDS score", &[("Breastfeeding status", "None")]);
        assert_eq!(mean, None);
    }

    #[test]
    fn test_mean_with_no_matching_rows() {
        let dataset = load_plos_csv(STUDY_CSV.as_bytes()).unwrap();
        let mean = dataset
            .mean_where("EPDS score", &[("Breastfeeding status", "Unknown")]);
        assert_eq!(mean, None);
    }

    #[test]
    fn test_mean_with_unknown_column() {
        let dataset = load_plos_csv(STUDY_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.mean_where("No such column", &[]), None);
        assert_eq!(
            dataset.mean_where("EPDS score", &[("No such column", "x")]),
            None
        );
    }
}
