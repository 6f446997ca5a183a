use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::TypeRow;

pub fn print_types(rows: &[TypeRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Model"),
        header_cell("Column"),
        header_cell("Storage"),
        header_cell("Field type"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    align_column(&mut table, 3, CellAlignment::Center);

    let mut unresolved = 0usize;
    for row in rows {
        let type_cell = match &row.field_type {
            Some(field_type) if field_type.is_association() => Cell::new(field_type)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            Some(field_type) => Cell::new(field_type),
            None => {
                unresolved += 1;
                dim_cell("-")
            }
        };
        let storage_cell = if row.storage_type.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&row.storage_type)
        };
        table.add_row(vec![
            Cell::new(&row.model),
            Cell::new(&row.column),
            storage_cell,
            type_cell,
        ]);
    }
    println!("{table}");
    if unresolved > 0 {
        eprintln!("{unresolved} column(s) without a field type");
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
