use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{battery::Battery, runner::DaySummary},
    fmt::FormattedPercentage,
    quantity::energy::WattHours,
};

/// Below this state of charge the energy cells turn red.
const LOW_STATE_OF_CHARGE: f64 = 0.2;

#[must_use]
pub fn build_days_table(days: &[DaySummary], battery: &Battery) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec![
        "Day",
        "Distance",
        "Race start",
        "SoC",
        "Race end",
        "SoC",
        "Day end",
        "SoC",
        "Stops",
    ]);
    for summary in days {
        let mut row = vec![
            Cell::new(summary.day + 1),
            Cell::new(format!("{:.1} km", summary.distance.as_kilometres()))
                .set_alignment(CellAlignment::Right),
        ];
        for energy in
            [summary.energy_at_race_start, summary.energy_at_race_end, summary.energy_at_day_end]
        {
            row.extend(build_energy_cells(energy, battery));
        }
        row.push(
            Cell::new(summary.n_control_stops)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        );
        table.add_row(row);
    }
    table
}

fn build_energy_cells(energy: WattHours, battery: &Battery) -> [Cell; 2] {
    let state_of_charge = battery.state_of_charge(energy);
    let color = if state_of_charge <= 0.0 {
        Color::Red
    } else if state_of_charge < LOW_STATE_OF_CHARGE {
        Color::DarkYellow
    } else {
        Color::Green
    };
    [
        Cell::new(energy).set_alignment(CellAlignment::Right),
        Cell::new(FormattedPercentage(state_of_charge)).set_alignment(CellAlignment::Right).fg(color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::vehicle::tests::vehicle, quantity::mechanics::Metres};

    #[test]
    fn one_row_per_day() {
        let summary = DaySummary {
            day: 0,
            distance: Metres(12_345.0),
            energy_at_race_start: WattHours(5000.0),
            energy_at_race_end: WattHours(500.0),
            energy_at_day_end: WattHours(1500.0),
            n_control_stops: 2,
        };
        let days = [summary, DaySummary { day: 1, ..summary }];
        let table = build_days_table(&days, &vehicle().battery);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("12.3 km"), "{rendered}");
        assert!(rendered.contains("10.0%"), "{rendered}");
        assert!(rendered.contains("100.0%"), "{rendered}");
    }
}
