use std::iter;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    core::{mix::EnergyMixRecord, source_type::SourceType},
    fmt::FormattedPercentage,
};

/// Render the records with one volume column per source type plus the totals.
pub fn build_mix_table(records: &[EnergyMixRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(
        iter::once("Timestamp".to_string())
            .chain(SourceType::ALL.iter().map(ToString::to_string))
            .chain(["Total".to_string(), "Green".to_string()])
            .collect_vec(),
    );
    for record in records {
        let mut row = vec![Cell::new(&record.timestamp).add_attribute(Attribute::Dim)];
        for source_type in SourceType::ALL {
            row.push(
                Cell::new(format!("{:.0}", record.volumes[source_type]))
                    .set_alignment(CellAlignment::Right),
            );
        }
        row.push(
            Cell::new(format!("{:.0}", record.total_volume))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
        );
        row.push(
            Cell::new(FormattedPercentage(record.green_percentage))
                .set_alignment(CellAlignment::Right)
                .fg(if record.green_percentage >= 50.0 { Color::Green } else { Color::DarkYellow }),
        );
        table.add_row(row);
    }
    table
}
