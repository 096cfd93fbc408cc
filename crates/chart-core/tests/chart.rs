// File: crates/chart-core/tests/chart.rs
// Purpose: End-to-end chart preparation and drawing against a recording canvas.

mod common;

use chart_core::{
    dimensions, Aggregation, Chart, ChartError, ChartKind, ChartRequest, Color, DrawType, LineChartRenderer, SeriesSpec,
    Side, SizeMode, StackRole, Stroke, TriggerMark, YAxisBound,
};
use common::{flat_rows, row, Op, RecordingCanvas};

// 2023-11-14 22:00:00 UTC
const FROM: i64 = 1_699_999_200;
const DAY: i64 = 86_400;

fn request(kind: ChartKind) -> ChartRequest {
    let mut req = ChartRequest::new(kind, 900, 300, FROM, DAY);
    req.now = Some(FROM + DAY);
    req.title = "CPU load".into();
    req
}

fn series(id: u64, name: &str, v: f64, width: u32) -> SeriesSpec {
    let mut spec = SeriesSpec::new(id, name).with_buckets(flat_rows(0..=width as usize, v, FROM, DAY, width));
    spec.host = "web-01".into();
    spec
}

fn render(req: &ChartRequest) -> (Chart, RecordingCanvas) {
    let chart = Chart::prepare(req).expect("prepare");
    let dims = chart.dimensions();
    let mut canvas = RecordingCanvas::new(dims.width, dims.height);
    chart.render(&mut canvas).expect("render");
    (chart, canvas)
}

#[test]
fn outer_size_is_kept_and_legend_reserved() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 1.0, 784));
    let dims = dimensions(&req).expect("dims");

    assert_eq!((dims.width, dims.height), (900, 300));
    assert_eq!(dims.plot_width, 900 - 85 - 30 - 1);
    assert_eq!(dims.plot_height, 300 - 24 - 90 - 28);
    assert!(dims.items_legend && dims.extended_legend);
}

#[test]
fn small_outer_size_drops_the_legend() {
    let mut req = request(ChartKind::Normal);
    req.height = 150;
    req.series.push(series(1, "load", 1.0, 784));
    let dims = dimensions(&req).expect("dims");
    assert!(!dims.items_legend);
    assert_eq!(dims.plot_height, 150 - 24 - 90);
}

#[test]
fn inner_size_grows_the_image() {
    let mut req = request(ChartKind::Normal);
    req.size_mode = SizeMode::Inner;
    req.width = 600;
    req.height = 200;
    req.percentile.left = 95.0;
    req.series.push(series(1, "load", 1.0, 600));
    let dims = dimensions(&req).expect("dims");

    assert_eq!((dims.plot_width, dims.plot_height), (600, 200));
    assert_eq!(dims.width, 600 + 85 + 30 + 1);
    assert_eq!(dims.height, 200 + 24 + 90 + 28 + 14);
}

#[test]
fn dimensions_only_matches_full_render() {
    for kind in [ChartKind::Normal, ChartKind::Stacked, ChartKind::Pie, ChartKind::Exploded3d] {
        let mut req = request(kind);
        req.series.push(series(1, "a", 2.0, 784));
        req.series.push(series(2, "b", 3.0, 784).with_side(Side::Right));
        let dims = dimensions(&req).expect("dims");
        let (chart, canvas) = render(&req);
        assert_eq!(chart.dimensions(), dims);
        assert_eq!((canvas.width, canvas.height), (dims.width, dims.height));
        assert!(matches!(canvas.ops.first(), Some(Op::Clear(_))));
    }
}

#[test]
fn invalid_requests_are_rejected() {
    let mut req = request(ChartKind::Normal);
    req.period = 0;
    assert!(matches!(Chart::prepare(&req), Err(ChartError::InvalidWindow(_))));

    let mut req = request(ChartKind::Normal);
    req.timezone = "Mars/Olympus".into();
    assert!(matches!(Chart::prepare(&req), Err(ChartError::InvalidTimezone(_))));

    let mut req = request(ChartKind::Normal);
    let mut spec = series(1, "a", 1.0, 10);
    spec.delay = "soon".into();
    req.series.push(spec);
    assert!(matches!(Chart::prepare(&req), Err(ChartError::InvalidInterval { field: "delay", .. })));

    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "a", 1.0, 784));
    req.y_min = YAxisBound::Fixed { value: 10.0 };
    req.y_max = YAxisBound::Fixed { value: 5.0 };
    let chart = Chart::prepare(&req).expect("prepare");
    let mut canvas = RecordingCanvas::new(900, 300);
    assert!(matches!(chart.render(&mut canvas), Err(ChartError::InvalidScale { .. })));
}

#[test]
fn header_and_legend_text() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 1.5, 784).with_units("%"));
    let (_, canvas) = render(&req);
    let texts = canvas.texts();

    assert!(texts.contains(&"web-01: CPU load"));
    // single host: legend captions omit it
    assert!(texts.contains(&"load"));
    assert!(texts.contains(&"[avg]"));
    assert!(texts.contains(&"1.5 %"));
    for header in ["last", "min", "avg", "max"] {
        assert!(texts.contains(&header), "missing legend header {header}");
    }
}

#[test]
fn series_without_data_shows_no_data() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 1.0, 784));
    let mut empty = SeriesSpec::new(2, "gone");
    empty.host = "db-01".into();
    req.series.push(empty);
    let (_, canvas) = render(&req);
    let texts = canvas.texts();
    assert!(texts.contains(&"[no data]"));
    // mixed hosts: captions carry the host
    assert!(texts.contains(&"db-01: gone"));
    assert!(texts.contains(&"CPU load"));
}

#[test]
fn stale_gaps_break_the_line() {
    let mut req = request(ChartKind::Normal);
    // two samples an hour apart with 60s polling: far beyond 16 cells
    let mut spec = SeriesSpec::new(1, "sparse").with_color(Color::rgb(0x10, 0x20, 0x30));
    spec.buckets = vec![row(100, 1.0, 1.0, 1.0, FROM + 11_000), row(200, 1.0, 1.0, 1.0, FROM + 22_000)];
    req.series.push(spec);
    let (_, canvas) = render(&req);
    let color = Color::rgb(0x10, 0x20, 0x30).with_alpha(chart_core::types::SERIES_OPACITY);
    // 0 -> 100 is stale, then 100 -> 200 and 200 -> end are marked with dots only
    assert_eq!(canvas.lines_with(color), 0);

    let mut req = request(ChartKind::Normal);
    let mut spec = SeriesSpec::new(1, "sparse").with_color(Color::rgb(0x10, 0x20, 0x30));
    spec.irregular = true;
    spec.buckets = vec![row(100, 1.0, 1.0, 1.0, FROM + 11_000), row(200, 1.0, 1.0, 1.0, FROM + 22_000)];
    req.series.push(spec);
    let (_, canvas) = render(&req);
    assert!(canvas.lines_with(color) >= 2, "irregular series always connect");
}

#[test]
fn triggers_inside_the_range_are_drawn() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 1.0, 784).with_buckets(
        (0..=784).map(|c| row(c, 0.0, c as f64 / 784.0 * 2.0, 2.0, FROM + c as i64 * 110)).collect(),
    ));
    let red = Color::rgb(0xDC, 0x14, 0x3C);
    for (value, name) in [(1.5, "High"), (500.0, "Impossible")] {
        req.triggers.push(TriggerMark {
            side: Side::Left,
            value,
            color: red,
            description: name.into(),
            constant: format!("[> {value}]"),
        });
    }
    let (_, canvas) = render(&req);
    let trigger_lines = canvas.styled_lines().into_iter().filter(|(_, _, p)| p.first() == Some(&Some(red))).count();
    assert_eq!(trigger_lines, 2, "one trigger in range, two dashed rows");
    let gaps = canvas.styled_lines().into_iter().filter(|(_, _, p)| p.first() == Some(&Some(red))).map(|(_, _, p)| p);
    for pattern in gaps {
        assert_eq!(&pattern[5..], &[Some(red.opposite()); 3]);
    }
    let texts = canvas.texts();
    assert!(texts.contains(&"High"));
    assert!(texts.contains(&"[> 1.5]"));
}

#[test]
fn all_aggregation_draws_an_envelope() {
    let mut req = request(ChartKind::Normal);
    req.series.push(
        series(1, "load", 1.0, 784)
            .with_aggregation(Aggregation::All)
            .with_buckets((0..=784).map(|c| row(c, 1.0, 2.0, 3.0, FROM + c as i64 * 110)).collect()),
    );
    let (_, canvas) = render(&req);
    let band = Color::rgb(255, 255, 150).with_alpha(chart_core::types::SERIES_OPACITY);
    assert!(canvas.ops.iter().any(|op| matches!(op, Op::FillPolygon { color, .. } if *color == band)));
}

#[test]
fn bold_envelope_edges_are_bold() {
    let mut req = request(ChartKind::Normal);
    req.series.push(
        series(1, "load", 1.0, 784)
            .with_aggregation(Aggregation::All)
            .with_draw_type(DrawType::BoldLine)
            .with_buckets((0..=784).map(|c| row(c, 1.0, 2.0, 3.0, FROM + c as i64 * 110)).collect()),
    );
    let (_, canvas) = render(&req);
    let alpha = chart_core::types::SERIES_OPACITY;
    let edges = [Color::rgb(255, 100, 100).with_alpha(alpha), Color::rgb(50, 255, 50).with_alpha(alpha)];
    let strokes: Vec<Stroke> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Line { color, stroke, .. } if edges.contains(color) => Some(*stroke),
            _ => None,
        })
        .collect();
    assert!(!strokes.is_empty());
    assert!(strokes.iter().all(|s| *s == Stroke::Bold), "{strokes:?}");
}

#[test]
fn gradient_covers_both_segment_ends() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 1.0, 784).with_draw_type(DrawType::GradientLine));
    let chart = Chart::prepare(&req).expect("prepare");
    let left = LineChartRenderer::prepare(&chart).expect("line").plot().left as i32;
    let mut canvas = RecordingCanvas::new(900, 300);
    chart.render(&mut canvas).expect("render");

    let xs: Vec<i32> = canvas.ops.iter().filter_map(|op| if let Op::Pixel { x, .. } = op { Some(*x) } else { None }).collect();
    assert_eq!(xs.iter().min(), Some(&left));
    assert_eq!(xs.iter().max(), Some(&(left + 784)));
}

#[test]
fn opposite_extremes_still_render() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "low", -1e308, 784));
    req.series.push(series(2, "high", 1e308, 784));
    let (chart, _) = render(&req);

    let line = LineChartRenderer::prepare(&chart).expect("line");
    let axis = line.axis(Side::Left).expect("left axis");
    assert!(axis.min.is_finite() && axis.max.is_finite());
    assert!(axis.min <= -1e308 && axis.max >= 1e308, "{axis:?}");
}

#[test]
fn item_bound_without_value_falls_back_to_data() {
    let mut req = request(ChartKind::Normal);
    req.series.push(series(1, "load", 50.0, 784));
    req.y_max = YAxisBound::Item { item_id: 7, last_value: None };
    let (chart, _) = render(&req);
    let fallback = *LineChartRenderer::prepare(&chart).expect("line").axis(Side::Left).expect("left axis");

    req.y_max = YAxisBound::Calculated;
    let chart = Chart::prepare(&req).expect("prepare");
    let calculated = *LineChartRenderer::prepare(&chart).expect("line").axis(Side::Left).expect("left axis");

    assert!(fallback.max >= 50.0);
    assert_eq!(fallback, calculated);
}

#[test]
fn stacked_axis_starts_at_zero() {
    let mut req = request(ChartKind::Stacked);
    req.series.push(series(1, "a", 500.0, 784));
    req.series.push(series(2, "b", 20.0, 784));
    let chart = Chart::prepare(&req).expect("prepare");
    let line = LineChartRenderer::prepare(&chart).expect("line");
    let axis = line.axis(Side::Left).expect("left axis");
    assert_eq!(axis.min, 0.0);
    assert!(axis.max >= 520.0);
}

#[test]
fn stacked_charts_fill_every_series() {
    let mut req = request(ChartKind::Stacked);
    req.series.push(series(1, "a", 1.0, 784).with_draw_type(DrawType::Line).with_color(Color::rgb(1, 2, 3)));
    req.series.push(series(2, "b", 2.0, 784).with_draw_type(DrawType::Dot).with_color(Color::rgb(4, 5, 6)));
    let (chart, canvas) = render(&req);
    assert!(chart.series.iter().all(|s| s.draw_type == DrawType::FilledRegion));
    let alpha = chart_core::types::SERIES_OPACITY;
    for c in [Color::rgb(1, 2, 3).with_alpha(alpha), Color::rgb(4, 5, 6).with_alpha(alpha)] {
        assert!(canvas.ops.iter().any(|op| matches!(op, Op::FillPolygon { color, .. } if *color == c)));
    }
}

#[test]
fn pie_slices_cover_a_full_turn() {
    let mut req = request(ChartKind::Pie);
    req.series.push(series(1, "a", 1.0, 100).with_color(Color::rgb(200, 0, 0)));
    req.series.push(series(2, "b", 3.0, 100).with_color(Color::rgb(0, 200, 0)));
    req.series.push(series(3, "c", 0.0, 100).with_color(Color::rgb(0, 0, 200)));
    let (_, canvas) = render(&req);

    let arcs = canvas.filled_arcs();
    assert_eq!(arcs.len(), 2, "zero slice is skipped");
    let sweep: f32 = arcs.iter().map(|(s, e, _)| e - s).sum();
    assert_eq!(sweep, 360.0);
    assert_eq!(arcs[0].1 - arcs[0].0, 90.0);
    assert!(canvas.texts().contains(&"(25%)"));
}

#[test]
fn exploded_slices_move_off_the_center() {
    let mut req = request(ChartKind::Exploded);
    req.series.push(series(1, "a", 1.0, 100).with_color(Color::rgb(200, 0, 0)));
    req.series.push(series(2, "b", 3.0, 100).with_color(Color::rgb(0, 200, 0)));
    let (chart, canvas) = render(&req);
    let dims = chart.dimensions();
    let center = (
        dims.insets.left as f32 + dims.plot_width as f32 / 2.0,
        dims.insets.top as f32 + dims.plot_height as f32 / 2.0,
    );

    let offsets: Vec<f32> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Arc { center: c, filled: true, .. } => Some(((c.0 - center.0).powi(2) + (c.1 - center.1).powi(2)).sqrt()),
            _ => None,
        })
        .collect();
    assert_eq!(offsets.len(), 2);
    assert!(offsets.iter().all(|d| *d > 1.0), "{offsets:?}");
    assert!((offsets[0] - offsets[1]).abs() < 1e-3);
}

#[test]
fn pie_3d_stacks_shadows_under_the_slices() {
    let mut req = request(ChartKind::Pie3d);
    let red = Color::rgb(200, 0, 0);
    req.series.push(series(1, "a", 1.0, 100).with_color(red));
    req.series.push(series(2, "b", 3.0, 100).with_color(Color::rgb(0, 200, 0)));
    let (chart, canvas) = render(&req);
    let depth = 12.min(chart.dimensions().plot_height / 4);

    let filled: Vec<(f32, Color)> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Arc { center, color, filled: true, .. } => Some((center.1, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(filled.len(), 2 * (depth as usize + 1));

    let top = filled.iter().position(|(_, c)| *c == red).expect("red slice");
    assert_eq!(top, 2 * depth as usize, "shadows come first");
    let shadows: Vec<f32> = filled[..top].iter().filter(|(_, c)| *c == red.shadow()).map(|(y, _)| y - filled[top].0).collect();
    let expected: Vec<f32> = (1..=depth).rev().map(|z| z as f32).collect();
    assert_eq!(shadows, expected);
}

#[test]
fn pie_total_series_shows_the_remainder() {
    let mut req = request(ChartKind::Pie);
    req.series.push(series(1, "used", 30.0, 100));
    req.series.push(series(2, "total", 100.0, 100).with_role(StackRole::Sum));
    let chart = Chart::prepare(&req).expect("prepare");
    let pie = chart_core::PieChartRenderer::prepare(&chart).expect("pie");
    assert_eq!(pie.values(), &[30.0, 70.0]);
    assert_eq!(pie.total(), 100.0);
}

#[test]
fn pie_without_values_draws_a_neutral_disc() {
    let mut req = request(ChartKind::Pie3d);
    req.series.push(SeriesSpec::new(1, "nothing"));
    let (chart, canvas) = render(&req);
    let arcs = canvas.filled_arcs();
    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0], (0.0, 360.0, chart.theme.grid));
}

#[test]
fn requests_load_from_json() {
    let json = r#"{
        "kind": "stacked",
        "width": 600,
        "height": 250,
        "from": 1699999200,
        "period": 3600,
        "y_min": { "mode": "fixed", "value": 0 },
        "y_max": { "mode": "item", "item_id": 42, "last_value": 120.5 },
        "percentile": { "left": 95 },
        "work_period": "1-5,09:00-18:00;6-7,10:00-14:00",
        "theme": "dark",
        "timezone": "Europe/Riga",
        "series": [
            { "id": 1, "name": "in", "units": "bps,Bits per second", "color": "00AA00", "draw_type": "gradient-line" }
        ]
    }"#;
    let req: ChartRequest = serde_json::from_str(json).expect("parse");
    assert_eq!(req.kind, ChartKind::Stacked);
    assert_eq!(req.y_max, YAxisBound::Item { item_id: 42, last_value: Some(120.5) });
    assert_eq!(req.work_period.spans().len(), 2);
    assert!(req.show_legend);

    let chart = Chart::prepare(&req).expect("prepare");
    assert_eq!(chart.theme.name, "dark");
    assert_eq!(chart.series[0].units, "bps");
    assert_eq!(chart.series[0].units_long, "Bits per second");
    assert_eq!(chart.series[0].color, Color::rgb(0, 0xAA, 0));
}
