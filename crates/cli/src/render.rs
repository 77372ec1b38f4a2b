//! Plain-text tables for terminal output.

use std::fmt::Write;

use equiptrack_ledger::{Catalog, HistoryEntry, Item};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn items(items: &[Item]) -> String {
    if items.is_empty() {
        return "no equipment registered\n".to_string();
    }
    let rows: Vec<[String; 6]> = items
        .iter()
        .map(|i| {
            [
                i.id.to_string(),
                i.name.clone(),
                i.item_type.to_string(),
                i.serial_number.clone(),
                i.location.to_string(),
                i.status.to_string(),
            ]
        })
        .collect();
    table(["ID", "NAME", "TYPE", "SERIAL", "LOCATION", "STATUS"], &rows)
}

pub fn item_detail(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", item.id, item.name);
    let _ = writeln!(out, "  type:     {}", item.item_type);
    let _ = writeln!(out, "  serial:   {}", item.serial_number);
    let _ = writeln!(out, "  specs:    {}", item.specs);
    let _ = writeln!(out, "  location: {}", item.location);
    let _ = writeln!(out, "  status:   {}", item.status);
    let _ = writeln!(out, "  created:  {}", item.created_at.format(TIME_FORMAT));
    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "no history\n".to_string();
    }
    let rows: Vec<[String; 6]> = entries
        .iter()
        .map(|e| {
            [
                e.date_time.format(TIME_FORMAT).to_string(),
                e.action.to_string(),
                format!("#{} {}", e.item_id, e.item_name),
                e.from_location
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
                e.to_location.to_string(),
                e.comment.clone(),
            ]
        })
        .collect();
    table(["WHEN", "ACTION", "ITEM", "FROM", "TO", "COMMENT"], &rows)
}

pub fn catalog(catalog: &Catalog) -> String {
    let join = |values: Vec<String>| values.join(", ");
    let mut out = String::new();
    let _ = writeln!(out, "locations: {}", join(catalog.locations().map(|l| l.to_string()).collect()));
    let _ = writeln!(out, "types:     {}", join(catalog.item_types().map(|t| t.to_string()).collect()));
    let _ = writeln!(out, "statuses:  {}", join(catalog.statuses().iter().map(|s| s.to_string()).collect()));
    out
}

fn table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths: [usize; N] = header.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(header.to_vec());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
    out
}

/// Warning for audit entries still parked when the process exits.
pub fn unwritten_audit(count: usize) -> String {
    let entries = if count == 1 { "entry" } else { "entries" };
    format!(
        "the equipment change was saved, but {count} history {entries} could not be written; \
         record the change manually"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use equiptrack_core::ItemId;
    use equiptrack_ledger::RegisterEquipment;

    fn item() -> Item {
        let new = RegisterEquipment {
            name: "ThinkPad T14".to_string(),
            item_type: "laptop".to_string(),
            serial_number: "SN123".to_string(),
            specs: String::new(),
            location: "Warehouse".to_string(),
            status: "new".to_string(),
        }
        .validate(&Catalog::default())
        .unwrap();
        Item::from_new(ItemId::new(0), new, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 0).unwrap())
    }

    #[test]
    fn item_table_aligns_columns() {
        let out = items(&[item()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID  NAME"));
        assert_eq!(lines[0].find("LOCATION"), lines[1].find("Warehouse"));
    }

    #[test]
    fn unwritten_audit_counts_entries() {
        assert!(unwritten_audit(1).contains("1 history entry could not"));
        assert!(unwritten_audit(3).contains("3 history entries could not"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(items(&[]), "no equipment registered\n");
        assert_eq!(history(&[]), "no history\n");
    }

    #[test]
    fn detail_shows_creation_time() {
        assert!(item_detail(&item()).contains("created:  2024-05-06 07:08"));
    }
}
