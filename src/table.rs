//! Renders mapping rows as a terminal table.

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};

use crate::mapping::MappingRow;

/// Placeholder shown on the instance side of rows for unattached volumes.
pub const UNATTACHED_TEXT: &str = "(unattached)";

/// Placeholder shown in cells with no value to report.
pub const EMPTY_CELL_TEXT: &str = "-";

/// Builds the instance/volume mapping table.
///
/// Column set: Instance ID, Instance Name, Instance State, Volume ID, Volume
/// State, Volume Size, Volume Type.
#[must_use]
pub fn mapping_table(rows: &[MappingRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Instance ID",
            "Instance Name",
            "Instance State",
            "Volume ID",
            "Volume State",
            "Volume Size",
            "Volume Type",
        ]);

    for row in rows {
        let (instance_id, instance_name, instance_state) = row.instance.as_ref().map_or(
            (
                UNATTACHED_TEXT.to_owned(),
                EMPTY_CELL_TEXT.to_owned(),
                EMPTY_CELL_TEXT.to_owned(),
            ),
            |instance| {
                (
                    instance.id.clone(),
                    instance
                        .name
                        .clone()
                        .unwrap_or_else(|| EMPTY_CELL_TEXT.to_owned()),
                    instance.state.clone(),
                )
            },
        );

        let (volume_id, volume_state, volume_size, volume_type) = row.volume.as_ref().map_or(
            (
                EMPTY_CELL_TEXT.to_owned(),
                EMPTY_CELL_TEXT.to_owned(),
                EMPTY_CELL_TEXT.to_owned(),
                EMPTY_CELL_TEXT.to_owned(),
            ),
            |volume| {
                (
                    volume.id.clone(),
                    volume.state.clone(),
                    format!("{} GiB", volume.size_gib),
                    volume.volume_type.clone(),
                )
            },
        );

        table.add_row(vec![
            Cell::new(instance_id),
            Cell::new(instance_name),
            Cell::new(instance_state),
            Cell::new(volume_id),
            Cell::new(volume_state),
            Cell::new(volume_size),
            Cell::new(volume_type),
        ]);
    }

    table
}
