//! Table rendering helpers

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Rows shown from each end of a long table
pub const PREVIEW_EDGE: usize = 5;

/// Build a table with the dashboard's preset
pub fn build_table<H, R>(headers: H, rows: R) -> Table
where
    H: IntoIterator,
    H::Item: Into<comfy_table::Cell>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    table
}

/// Value rounded to two decimals, or `N/A`
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// First and last [`PREVIEW_EDGE`] rows, with an ellipsis row between them
pub fn preview_rows(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    if rows.len() <= 2 * PREVIEW_EDGE {
        return rows;
    }

    let width = rows.first().map_or(0, Vec::len);
    let hidden = rows.len() - 2 * PREVIEW_EDGE;
    let tail_start = rows.len() - PREVIEW_EDGE;

    let mut out: Vec<Vec<String>> = rows[..PREVIEW_EDGE].to_vec();
    let mut gap = vec!["…".to_string(); width];
    if let Some(first) = gap.first_mut() {
        *first = format!("… {hidden} more rows");
    }
    out.push(gap);
    out.extend_from_slice(&rows[tail_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(1.005_1)), "1.01");
        assert_eq!(fmt_opt(Some(-3.0)), "-3.00");
        assert_eq!(fmt_opt(None), "N/A");
    }

    #[test]
    fn test_preview_rows() {
        let rows: Vec<Vec<String>> = (0..20).map(|i| vec![i.to_string(), "x".to_string()]).collect();
        let preview = preview_rows(rows);

        assert_eq!(preview.len(), 2 * PREVIEW_EDGE + 1);
        assert_eq!(preview[0][0], "0");
        assert_eq!(preview[PREVIEW_EDGE][0], "… 10 more rows");
        assert_eq!(preview.last().unwrap()[0], "19");

        let short: Vec<Vec<String>> = (0..3).map(|i| vec![i.to_string()]).collect();
        assert_eq!(preview_rows(short.clone()), short);
    }

    #[test]
    fn test_build_table() {
        let table = build_table(
            vec!["date", "close"],
            vec![vec!["2024-06-14".to_string(), "212.49".to_string()]],
        );
        let rendered = table.to_string();
        assert!(rendered.contains("date"));
        assert!(rendered.contains("212.49"));
    }
}
