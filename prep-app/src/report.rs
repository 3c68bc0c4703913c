//! Plain-terminal rendering for report sections.

const MAX_LABEL_WIDTH: usize = 28;

pub fn section(title: &str) {
    println!();
    println!("== {title} ==");
    println!();
}

/// Two-column table with the label column sized to the widest label.
pub fn kv_table(rows: &[(String, String)]) {
    let width = label_width(rows);
    for (label, value) in rows {
        println!("  {label:<width$}  {value}");
    }
}

pub fn notice(message: &str) {
    println!("! {message}");
}

fn label_width(rows: &[(String, String)]) -> usize {
    rows.iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH)
}
