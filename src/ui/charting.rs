use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, Widget},
};

use crate::ui::bold;

/// Points for a reaction-time chart: tap number against milliseconds
pub fn reaction_points(reaction_times: &[u64]) -> Vec<(f64, f64)> {
    reaction_times
        .iter()
        .enumerate()
        .map(|(i, ms)| ((i + 1) as f64, *ms as f64))
        .collect()
}

/// Compute X (hits) and Y (ms) bounds for the reaction chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let mut slowest = 0.0;
    for &(_, ms) in points {
        if ms > slowest {
            slowest = ms;
        }
    }

    let mut hits = points.last().map_or(1.0, |p| p.0);
    if hits < 1.0 {
        hits = 1.0;
    }

    (hits, slowest.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

pub fn render_reaction_chart(reaction_times: &[u64], area: Rect, buf: &mut Buffer) {
    let points = reaction_points(reaction_times);
    let (hits, slowest) = compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("hit")
                .bounds([1.0, hits])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(format_label(hits), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds([0.0, slowest])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(format_label(slowest), bold()),
                ]),
        )
        .render(area, buf);
}
