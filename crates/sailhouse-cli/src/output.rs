use anyhow::Result;
use colored::Colorize;
use sailhouse_schema::{Change, ChangeKind};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Prints `data` as JSON or YAML, or calls `text` for the human format.
pub fn print_data<T: Serialize>(
    data: &T,
    format: OutputFormat,
    text: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Text => text(data),
    }
    Ok(())
}

/// Renders rows as a rounded table, or `empty` when there are none.
pub fn print_table<const N: usize>(headers: [&str; N], rows: Vec<[String; N]>, empty: &str) {
    if rows.is_empty() {
        println!("{empty}");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// `<type> <slug> <KIND>` with aligned columns and a colored kind.
pub fn change_line(change: &Change, slug_width: usize) -> String {
    let kind = format!("{}", change.kind);
    let kind = match change.kind {
        ChangeKind::Create => kind.green(),
        ChangeKind::Delete => kind.red(),
    };
    format!(
        "{:<12} {:<width$} {}",
        change.entity.to_string(),
        change.slug,
        kind,
        width = slug_width
    )
}

pub fn slug_width(changes: &[Change]) -> usize {
    changes.iter().map(|c| c.slug.len()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sailhouse_schema::EntityType;

    #[test]
    fn test_change_line_alignment() {
        colored::control::set_override(false);
        let changes = vec![
            Change::create(EntityType::Topic, "b"),
            Change::delete(EntityType::Subscription, "long-slug"),
        ];
        let width = slug_width(&changes);
        assert_eq!(width, 9);
        assert_eq!(change_line(&changes[0], width), "Topic        b         CREATE");
        assert_eq!(change_line(&changes[1], width), "Subscription long-slug DELETE");
    }
}
