use crate::display::{format_input, format_metric, DeltaIndicator};
use analytics::{ForecastReport, SweepPoint};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use core_types::{CampaignInputs, DisplayFormat, InputField, OutputMetric};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn range_label(field: InputField) -> String {
    let range = field.range();
    format!(
        "{} – {}",
        format_input(field, range.min),
        format_input(field, range.max)
    )
}

pub fn inputs_table(inputs: &CampaignInputs) -> Table {
    let mut table = new_table(vec!["Input", "Value", "Range"]);
    for field in InputField::ALL {
        let value = inputs.get(field);
        let mut value_cell = Cell::new(format_input(field, value));
        if !field.range().contains(value) {
            value_cell = value_cell.fg(Color::Yellow);
        }
        table.add_row(vec![
            Cell::new(field.label()),
            value_cell,
            Cell::new(range_label(field)),
        ]);
    }
    align_right(&mut table, &[1]);
    table
}

fn delta_cell(change: Option<f64>, threshold: f64) -> Cell {
    match DeltaIndicator::from_change(change, threshold) {
        Some(indicator) => {
            let color = if indicator.is_up() { Color::Green } else { Color::Red };
            Cell::new(indicator.to_string()).fg(color)
        }
        None => Cell::new(""),
    }
}

/// Metric, formatted value, delta indicator and description for every output.
pub fn results_table(report: &ForecastReport, threshold: f64) -> Table {
    let mut table = new_table(vec!["Metric", "Value", "Change", "Description"]);
    for metric in OutputMetric::ALL {
        let value = report.metrics.get(metric);
        let mut value_cell = Cell::new(format_metric(metric, value));
        if !value.is_finite() {
            value_cell = value_cell.fg(Color::Yellow);
        }
        table.add_row(vec![
            Cell::new(metric.label()),
            value_cell,
            delta_cell(report.deltas.get(metric), threshold),
            Cell::new(metric.help_text()),
        ]);
    }
    align_right(&mut table, &[1, 2]);
    table
}

pub fn sweep_table(field: InputField, points: &[SweepPoint], metrics: &[OutputMetric]) -> Table {
    let mut header = vec![field.label()];
    header.extend(metrics.iter().map(|m| m.label()));
    let mut table = new_table(header);

    for point in points {
        let mut row = vec![Cell::new(format_input(field, point.value))];
        row.extend(
            metrics
                .iter()
                .map(|m| Cell::new(format_metric(*m, point.metrics.get(*m)))),
        );
        table.add_row(row);
    }

    let value_columns: Vec<usize> = (0..=metrics.len()).collect();
    align_right(&mut table, &value_columns);
    table
}

fn impacts_label(field: InputField) -> String {
    field
        .impacts()
        .iter()
        .map(|m| m.key())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// The seven inputs with their slider ranges and downstream impacts.
pub fn input_fields_table() -> Table {
    let mut table = new_table(vec!["Key", "Label", "Range", "Step", "Impacts", "Help"]);
    for field in InputField::ALL {
        table.add_row(vec![
            field.key().to_string(),
            field.label().to_string(),
            range_label(field),
            field.range().step.to_string(),
            impacts_label(field),
            field.help_text().to_string(),
        ]);
    }
    table
}

/// The ten outputs with their display format.
pub fn output_metrics_table() -> Table {
    let mut table = new_table(vec!["Key", "Label", "Format", "Description"]);
    for metric in OutputMetric::ALL {
        let format = match metric.display_format() {
            DisplayFormat::Integer => "integer".to_string(),
            DisplayFormat::Currency => "currency".to_string(),
            DisplayFormat::Percent(decimals) => format!("percent ({decimals} dp)"),
        };
        table.add_row(vec![
            metric.key().to_string(),
            metric.label().to_string(),
            format,
            metric.help_text().to_string(),
        ]);
    }
    table
}
