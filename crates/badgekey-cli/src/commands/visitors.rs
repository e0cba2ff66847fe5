//! `badgekey visitors`: list the visitor table.

use crate::config::AppConfig;
use anyhow::Result;
use badgekey_core::VisitorRecord;

/// Print every visitor the resolver knows, one per line or as JSON.
pub fn run(config: &AppConfig, json: bool) -> Result<()> {
    let directory = config.visitor_directory();
    let visitors: Vec<&VisitorRecord> = directory.iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&visitors)?);
        return Ok(());
    }

    println!("{:<8} {:<24} {:<20} POSITION", "ID", "NAME", "COMPANY");
    for visitor in visitors {
        println!("{}", format_row(visitor));
    }
    Ok(())
}

fn format_row(visitor: &VisitorRecord) -> String {
    format!(
        "{:<8} {:<24} {:<20} {}",
        visitor.id, visitor.name, visitor.company, visitor.position
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        let visitor = VisitorRecord::new("1", "Dewi").with_company("PT Sinar");
        let row = format_row(&visitor);

        assert!(row.starts_with("1        Dewi"));
        assert!(row.contains("PT Sinar"));
    }
}
