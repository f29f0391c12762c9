//! Result tables built from a train/predict response.

use core::fmt::Write as _;

use predictor_structs::{INDEX_COLUMN, Metrics, Prediction};

/// Metric columns shown per target, in display order.
pub const METRIC_COLUMNS: [&str; 3] = ["mse", "mae", "baseline_mse"];

/// A rectangular table of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Renders the table as aligned plain text with a header rule.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = cells.get(i).map_or("", String::as_str);
                    format!("{cell:<width$}")
                })
                .collect();
            padded.join("  ").trim_end().to_owned()
        };

        let mut out = format_line(&self.columns);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&format_line(row));
        }
        out
    }

    /// Renders the table as an HTML `<table>` with escaped cell text.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table>\n<thead><tr>");
        for column in &self.columns {
            let _ = write!(out, "<th>{}</th>", escape_html(column));
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            out.push_str("<tr>");
            for i in 0..self.columns.len() {
                let cell = row.get(i).map_or("", String::as_str);
                let _ = write!(out, "<td>{}</td>", escape_html(cell));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>");
        out
    }
}

/// Escapes text for use inside HTML elements.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per requested target: `target, mse, mae, baseline_mse`.
#[must_use]
pub fn metrics_table(metrics: &Metrics, targets: &[String]) -> Table {
    let columns = core::iter::once("target")
        .chain(METRIC_COLUMNS)
        .map(str::to_owned)
        .collect();

    let rows = targets
        .iter()
        .map(|target| {
            core::iter::once(target.clone())
                .chain(
                    METRIC_COLUMNS
                        .iter()
                        .map(|metric| format_number(metrics.get(metric, target))),
                )
                .collect()
        })
        .collect();

    Table { columns, rows }
}

/// One row per prediction: `index`, then every predicted target in
/// first-seen order across all predictions.
#[must_use]
pub fn predictions_table(predictions: &[Prediction]) -> Table {
    let mut columns = vec![INDEX_COLUMN.to_owned()];
    for prediction in predictions {
        for key in prediction.values.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_owned());
            }
        }
    }

    let rows = predictions
        .iter()
        .map(|prediction| {
            core::iter::once(prediction.index.to_string())
                .chain(
                    columns
                        .iter()
                        .skip(1)
                        .map(|target| format_number(prediction.values.get(target))),
                )
                .collect()
        })
        .collect();

    Table { columns, rows }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use predictor_structs::{PredictionValues, RowIndex};

    use super::*;

    fn prediction(index: RowIndex, values: &[(&str, f64)]) -> Prediction {
        Prediction {
            index,
            values: PredictionValues(
                values
                    .iter()
                    .map(|(name, value)| ((*name).to_owned(), *value))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_predictions_columns_union_first_seen() {
        let predictions = vec![
            prediction(RowIndex::Int(0), &[("zeta", 1.5)]),
            prediction(RowIndex::Int(1), &[("alpha", 2.0), ("zeta", 3.0)]),
            prediction(RowIndex::Text("c".to_owned()), &[("beta", 4.0)]),
        ];

        let table = predictions_table(&predictions);

        assert_eq!(table.columns, vec!["index", "zeta", "alpha", "beta"]);
        assert_eq!(table.rows[0], vec!["0", "1.5", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "3", "2", ""]);
        assert_eq!(table.rows[2], vec!["c", "", "", "4"]);
    }

    #[test]
    fn test_predictions_empty() {
        let table = predictions_table(&[]);
        assert_eq!(table.columns, vec!["index"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_metrics_table_one_row_per_target() {
        let metrics = Metrics(BTreeMap::from([
            (
                "mse".to_owned(),
                BTreeMap::from([("y".to_owned(), 0.25), ("z".to_owned(), 1.0)]),
            ),
            ("mae".to_owned(), BTreeMap::from([("y".to_owned(), 0.5)])),
        ]));

        let table = metrics_table(&metrics, &["y".to_owned(), "z".to_owned()]);

        assert_eq!(table.columns, vec!["target", "mse", "mae", "baseline_mse"]);
        assert_eq!(table.rows[0], vec!["y", "0.25", "0.5", ""]);
        assert_eq!(table.rows[1], vec!["z", "1", "", ""]);
    }

    #[test]
    fn test_render_text_aligns_columns() {
        let table = Table {
            columns: vec!["index".to_owned(), "y".to_owned()],
            rows: vec![vec!["0".to_owned(), "12.5".to_owned()]],
        };
        assert_eq!(table.render_text(), "index  y\n-----  ----\n0      12.5");
    }

    #[test]
    fn test_html_escapes_cells() {
        let table = Table {
            columns: vec!["target".to_owned()],
            rows: vec![vec!["<a&b>".to_owned()]],
        };
        let html = table.to_html();
        assert!(html.contains("<th>target</th>"));
        assert!(html.contains("<td>&lt;a&amp;b&gt;</td>"));
    }
}
