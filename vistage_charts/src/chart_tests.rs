// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use kurbo::Rect;
use serde_json::json;
use vistage_core::{MarkDiff, MarkPayload};
use vistage_data::{DataSource, Record, StaticFetcher};

use crate::{
    Chart, ChartComponent, ChartEvent, ChartFrame, ChartInput, ChartKind, ChartOptions,
    ColumnChart, HighlightPhase, Size, StackedColumnChart,
};

fn rows(v: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(v).unwrap()
}

fn five_points() -> Vec<Record> {
    rows(json!([
        {"label": "a", "value": 0},
        {"label": "b", "value": 1},
        {"label": "c", "value": 2},
        {"label": "d", "value": 3, "highlight": true},
        {"label": "e", "value": 4},
    ]))
}

fn stack_bounds(frame: &ChartFrame, row: usize) -> Rect {
    frame
        .bars
        .iter()
        .filter(|b| b.row == row)
        .map(|b| b.rect)
        .reduce(|a, b| a.union(b))
        .unwrap()
}

fn texts(frame: &ChartFrame) -> Vec<&str> {
    frame
        .marks
        .iter()
        .filter_map(|m| match &m.payload {
            MarkPayload::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn flagged_datum_is_the_only_highlighted_bar() {
    let data = five_points();
    let options = ChartOptions::default();
    let frame = ColumnChart.layout(&ChartInput::new(&data, Size::new(600.0, 320.0), &options));
    let plot = frame.layout.plot;

    let highlighted: Vec<_> = frame.bars.iter().filter(|b| b.state.highlighted).collect();
    assert_eq!(highlighted.len(), 1);
    assert_eq!(highlighted[0].key, "d");
    let ratio = highlighted[0].rect.height() / plot.height();
    assert!((ratio - 0.75).abs() < 1e-9, "got {ratio}");
    assert!(
        frame.bars.iter().all(|b| !b.state.dimmed),
        "a static highlight does not dim the rest"
    );

    let zero = &frame.bars[0];
    assert!((zero.rect.height() - options.min_bar_size).abs() < 1e-9);
    assert!((zero.rect.y1 - plot.y1).abs() < 1e-9);
}

#[test]
fn active_highlight_dims_other_rows() {
    let data = five_points();
    let options = ChartOptions::default();
    let active = ["b".to_string()];
    let input = ChartInput::new(&data, Size::new(600.0, 320.0), &options).with_highlights(&active);
    let frame = ColumnChart.layout(&input);
    let states: Vec<_> = frame.bars.iter().map(|b| b.state).collect();
    assert!(states[1].highlighted && !states[1].dimmed);
    assert!(states[3].highlighted, "flagged rows stay highlighted");
    assert!(states[0].dimmed && states[2].dimmed && states[4].dimmed);
}

#[test]
fn stacked_totals_are_proportional_to_plot_height() {
    let data = rows(json!([
        {"date": 2006, "foo": 90, "bar": 10},
        {"date": 2007, "foo": 80, "bar": 10},
    ]));
    let options = ChartOptions::default()
        .with_label_field("date")
        .with_value_fields(["foo", "bar"]);
    let frame =
        StackedColumnChart.layout(&ChartInput::new(&data, Size::new(600.0, 320.0), &options));
    let plot = frame.layout.plot;
    assert_eq!(frame.keys, ["2006", "2007"]);
    let first = stack_bounds(&frame, 0).height() / plot.height();
    let second = stack_bounds(&frame, 1).height() / plot.height();
    assert!((first - 1.0).abs() < 1e-9, "got {first}");
    assert!((second - 0.9).abs() < 1e-9, "got {second}");
}

#[test]
fn narrow_charts_abbreviate_year_labels() {
    let data = rows(json!([
        {"date": 2006, "value": 1},
        {"date": 2007, "value": 2},
    ]));
    let options = ChartOptions::default().with_label_field("date");
    let wide = ColumnChart.layout(&ChartInput::new(&data, Size::new(600.0, 300.0), &options));
    let narrow = ColumnChart.layout(&ChartInput::new(&data, Size::new(320.0, 300.0), &options));
    assert!(texts(&wide).contains(&"2006"));
    assert!(texts(&narrow).contains(&"'06"));
    assert!(!texts(&narrow).contains(&"2006"));
}

#[test]
fn last_hover_wins() {
    let fetcher = Arc::new(StaticFetcher::new());
    let mut chart = ChartComponent::new(
        ChartKind::Column,
        ChartOptions::default().with_delays(100, 200),
        fetcher,
        Vec::<MarkDiff>::new(),
    );
    chart.set_source(DataSource::Rows(five_points()));
    chart.mount(Size::new(600.0, 320.0));

    chart.pointer_enter("a", 0);
    chart.pointer_enter("b", 50);
    chart.tick(100);
    assert!(chart.highlights().is_empty(), "a's timer was superseded");
    assert_eq!(chart.next_deadline(), Some(150));
    chart.tick(150);
    assert_eq!(chart.highlights(), ["b"]);

    let frame = chart.frame().unwrap();
    let hovered: Vec<_> = frame
        .bars
        .iter()
        .filter(|b| b.state.highlighted && b.key != "d")
        .map(|b| b.key.as_str())
        .collect();
    assert_eq!(hovered, ["b"]);
}

#[test]
fn leaving_restores_the_default_set_after_the_delay() {
    let options = ChartOptions::default()
        .with_delays(100, 200)
        .with_highlight(["e"]);
    let mut chart = ChartComponent::new(
        ChartKind::Bar,
        options,
        Arc::new(StaticFetcher::new()),
        Vec::<MarkDiff>::new(),
    );
    chart.set_source(DataSource::Rows(five_points()));
    chart.mount(Size::new(600.0, 320.0));
    assert_eq!(chart.highlights(), ["e"]);

    let b = chart.frame().unwrap().bars[1].rect.center();
    chart.pointer_move(b, 0);
    chart.tick(100);
    assert_eq!(chart.highlights(), ["b"]);

    chart.pointer_leave(500);
    chart.tick(600);
    assert_eq!(chart.highlights(), ["b"]);
    chart.tick(700);
    assert_eq!(chart.highlights(), ["e"]);
}

#[test]
fn hovering_a_series_highlights_it_in_the_legend() {
    let data = rows(json!([
        {"label": "a", "x": 1, "y": 2},
        {"label": "b", "x": 3, "y": 1},
    ]));
    let options = ChartOptions::default()
        .with_value_fields(["x", "y"])
        .with_delays(0, 0);
    let mut chart = ChartComponent::new(
        ChartKind::StackedBar,
        options,
        Arc::new(StaticFetcher::new()),
        Vec::<MarkDiff>::new(),
    );
    chart.set_source(DataSource::Rows(data));
    chart.mount(Size::new(600.0, 320.0));
    let entry = chart.frame().unwrap().legend[1].rect.center();
    chart.pointer_move(entry, 0);
    assert_eq!(chart.highlights(), ["y"]);
    let frame = chart.frame().unwrap();
    assert!(frame.series[1].state.highlighted);
    assert!(frame.series[0].state.dimmed);
    assert!(frame.bars.iter().all(|b| b.state.highlighted == (b.series == 1)));
}

#[test]
fn resize_re_lays_out_and_reports_narrow_width() {
    let mut chart = ChartComponent::new(
        ChartKind::Line,
        ChartOptions::default(),
        Arc::new(StaticFetcher::new()),
        Vec::<MarkDiff>::new(),
    );
    chart.set_source(DataSource::Rows(five_points()));
    chart.mount(Size::new(800.0, 300.0));
    chart.drain_events();

    assert_eq!(chart.resize(Size::new(800.0, 300.0)), None);
    let state = chart.resize(Size::new(400.0, 300.0)).unwrap();
    assert!(state.narrow_width);
    assert!(chart.frame().unwrap().layout.view.width() <= 400.0);
    match chart.drain_events().as_slice() {
        [ChartEvent::Resized(s)] => assert_eq!(s.width, 400.0),
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn hover_phase_is_observable_through_the_machine() {
    let mut machine = crate::HighlightMachine::new(crate::HighlightConfig::new(10, 10));
    machine.on_enter("x".to_string(), 0);
    assert_eq!(machine.phase(), HighlightPhase::HoverPending);
    machine.tick(10);
    assert_eq!(machine.phase(), HighlightPhase::Highlighted);
}
