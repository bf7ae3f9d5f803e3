//! Plain-text views of session state for the terminal.
//!
//! All functions return strings; the CLI decides where to print them.

use crate::metrics::{format_currency, MetricSet};
use crate::session::{Conversation, LoadedDocument};
use crate::table::TableCollection;

/// File name, declared type and size of the loaded upload.
pub fn document_info(doc: &LoadedDocument) -> String {
    format!(
        "File: {}\nType: {}\nSize: {:.1} KB\n",
        doc.name,
        doc.media_type,
        doc.size as f64 / 1024.0
    )
}

/// One line per metric found: label and headline value.
pub fn metrics_panel(metrics: &MetricSet) -> String {
    if metrics.is_empty() {
        return "No financial metrics found.\n".to_string();
    }
    let mut out = String::from("Extracted Financial Metrics\n");
    for (key, value) in metrics.iter() {
        if let Some(v) = value.headline() {
            out.push_str(&format!("  {:<20} {:>18}\n", key.label(), format_currency(v)));
        }
    }
    out
}

/// Dimensions of each sheet plus describe-style statistics for its numeric
/// columns.
pub fn tables_view(tables: &TableCollection) -> String {
    if tables.is_empty() {
        return "No spreadsheet data.\n".to_string();
    }

    let mut out = String::new();
    for sheet in tables {
        out.push_str(&format!("Sheet: {}\n", sheet.name));
        out.push_str(&format!(
            "Dimensions: {} rows × {} columns\n",
            sheet.row_count(),
            sheet.column_count()
        ));

        let described: Vec<_> = sheet
            .numeric_columns()
            .into_iter()
            .filter_map(|idx| sheet.describe(idx).map(|d| (&sheet.columns[idx], d)))
            .collect();
        if !described.is_empty() {
            out.push_str(&format!(
                "  {:<20} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}\n",
                "COLUMN", "COUNT", "MEAN", "STD", "MIN", "25%", "50%", "75%", "MAX"
            ));
            for (name, d) in described {
                let std = d
                    .std
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "NaN".to_string());
                out.push_str(&format!(
                    "  {:<20} {:>6} {:>14.2} {:>14} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}\n",
                    name, d.count, d.mean, std, d.min, d.q25, d.q50, d.q75, d.max
                ));
            }
        }
        out.push('\n');
    }
    out
}

pub fn history(conversation: &Conversation) -> String {
    if conversation.is_empty() {
        return "No messages yet.\n".to_string();
    }
    conversation
        .turns()
        .iter()
        .map(|turn| format!("[{}] {}\n", turn.role, turn.text))
        .collect()
}
