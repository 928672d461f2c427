//! Table formatting for CLI output

use comfy_table::{Cell, Color, ContentArrangement, Table};
use hwsel_kernel::{Grade, ScoredManifest};

const TABLE_WIDTH: u16 = 100;

/// Compatibility column value: stable and compatible, compatible but
/// devel-grade, or not compatible.
pub fn compat_label(engine: &ScoredManifest) -> (&'static str, Color) {
    if !engine.is_compatible() {
        ("no", Color::Red)
    } else if engine.grade() == Grade::Stable {
        ("yes", Color::Green)
    } else {
        ("devel", Color::Yellow)
    }
}

/// Engine table in the given order, marking `active` with `*`.
pub fn engines_table(engines: &[&ScoredManifest], active: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["engine", "vendor", "description", "compat"]);

    for engine in engines {
        let mut name = engine.name().to_string();
        if Some(engine.name()) == active {
            name.push('*');
        }
        let (compat, color) = compat_label(engine);
        table.add_row(vec![
            Cell::new(name),
            Cell::new(&engine.manifest.vendor),
            Cell::new(&engine.manifest.description),
            Cell::new(compat).fg(color),
        ]);
    }

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH);
    table
}
