// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use kurbo::Point;
use peniko::Color;
use serde_json::json;
use vistage_charts::{ChartEvent, Size};
use vistage_core::{MarkDiff, MarkPayload};
use vistage_data::{DataSource, StaticFetcher};

use crate::{
    Annotation, ChoroplethMap, ChoroplethOptions, LonLat, MapComponent, MapOptions,
    ProjectionKind, SymbolMap, SymbolMapOptions, Topology,
};

const C: [Color; 4] = [
    Color::from_rgb8(10, 0, 0),
    Color::from_rgb8(20, 0, 0),
    Color::from_rgb8(30, 0, 0),
    Color::from_rgb8(40, 0, 0),
];

/// Two 10x10 degree squares sharing the meridian: "West" (id 1) and "East" (id "E").
fn world_json() -> String {
    json!({
        "type": "Topology",
        "arcs": [
            [[0, 0], [0, 10]],
            [[0, 10], [-10, 10], [-10, 0], [0, 0]],
            [[0, 0], [10, 0], [10, 10], [0, 10]]
        ],
        "objects": {
            "regions": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "id": 1,
                     "properties": {"name": "West"}},
                    {"type": "Polygon", "arcs": [[2, -1]], "id": "E",
                     "properties": {"name": "East"}}
                ]
            }
        }
    })
    .to_string()
}

fn flat() -> MapOptions {
    MapOptions::default()
        .with_projection(ProjectionKind::Equirectangular)
        .with_topojson("world.json")
        .with_legend(false)
        .with_delays(0, 0)
}

fn choropleth(map: MapOptions) -> MapComponent<Vec<MarkDiff>> {
    let fetcher = StaticFetcher::new().with("world.json", world_json());
    let options = ChoroplethOptions::default()
        .with_map(map)
        .with_thresholds([100.0, 300.0, 700.0])
        .with_colors(C);
    let mut c = MapComponent::new(ChoroplethMap::new(options), Arc::new(fetcher), Vec::new());
    c.set_source(DataSource::from_value(json!([{"id": "1", "value": 150}])));
    c
}

#[test]
fn matched_features_take_their_bin_color_and_the_rest_stay_missing() {
    let mut map = choropleth(flat());
    map.mount(Size::new(400.0, 200.0));
    let frame = map.frame().unwrap();
    assert_eq!(frame.features.len(), 2);
    assert_eq!(frame.features[0].key.as_deref(), Some("1"), "numeric ids normalize");
    assert_eq!(frame.features[0].fill, C[1]);
    assert_eq!(frame.features[1].row, None);
    assert_eq!(frame.features[1].fill, MapOptions::default().missing_color);

    let west = frame.feature_at(Point::new(100.0, 100.0)).unwrap();
    assert_eq!(west.index, 0);
    let east = frame.feature_at(Point::new(300.0, 100.0)).unwrap();
    assert_eq!(east.key.as_deref(), Some("E"));
    let tip = map.tooltip_at(Point::new(100.0, 100.0)).unwrap();
    assert_eq!(tip.title, "West");
    assert_eq!(tip.lines, [("value".to_string(), "150".to_string())]);
}

#[test]
fn clicking_a_feature_zooms_to_it_and_clicking_again_resets() {
    let mut map = choropleth(flat().with_clickable(true));
    map.mount(Size::new(400.0, 400.0));
    map.drain_events();

    let click = map.click(Point::new(100.0, 200.0));
    assert_eq!(
        click,
        Some(ChartEvent::Click {
            key: "1".to_string()
        })
    );
    let t = map.zoom().transform;
    assert!((t.k - 1.8).abs() < 1e-9, "{t:?}");
    assert!((t.x - 20.0).abs() < 1e-9 && (t.y + 160.0).abs() < 1e-9);
    match map.drain_events().as_slice() {
        [ChartEvent::Click { .. }, ChartEvent::Zoomed { k, feature, .. }] => {
            assert!((k - 1.8).abs() < 1e-9);
            assert_eq!(feature.as_deref(), Some("1"));
        }
        other => panic!("unexpected events {other:?}"),
    }

    let zoomed_center = t.apply(Point::new(100.0, 200.0));
    assert!(map.click(zoomed_center).is_some());
    assert_eq!(map.zoom().transform.k, 1.0);
    assert_eq!(map.zoom().zoomed_feature, None);
}

#[test]
fn unclickable_maps_only_report_clicks() {
    let mut map = choropleth(flat());
    map.mount(Size::new(400.0, 200.0));
    map.drain_events();
    map.click(Point::new(300.0, 100.0));
    let names: Vec<_> = map.drain_events().iter().map(ChartEvent::name).collect();
    assert_eq!(names, ["click"]);
    assert_eq!(map.zoom().transform.k, 1.0);
}

#[test]
fn hovering_a_feature_highlights_it_and_dims_the_others() {
    let mut map = choropleth(flat());
    map.mount(Size::new(400.0, 200.0));
    map.pointer_move(Point::new(300.0, 100.0), 0);
    assert_eq!(map.highlights(), ["E"]);
    let frame = map.frame().unwrap();
    assert!(frame.features[1].state.highlighted);
    assert!(frame.features[0].state.dimmed);
    map.pointer_move(Point::new(-50.0, 100.0), 10);
    assert!(map.highlights().is_empty());
}

#[test]
fn missing_topology_is_a_load_failure_until_one_is_supplied() {
    let options = ChoroplethOptions::default().with_map(flat().with_topojson("nope.json"));
    let mut map = MapComponent::new(
        ChoroplethMap::new(options),
        Arc::new(StaticFetcher::new()),
        Vec::<MarkDiff>::new(),
    );
    assert!(map.mount(Size::new(400.0, 200.0)).is_empty());
    let names: Vec<_> = map.drain_events().iter().map(ChartEvent::name).collect();
    assert_eq!(names, ["resized", "load_failed", "loaded"]);

    map.set_topology(Topology::from_json(&world_json()).unwrap());
    assert_eq!(map.frame().map(|f| f.features.len()), Some(2));
    assert!(map.geometry().is_some_and(|g| !g.borders.is_empty()));
}

#[test]
fn wheel_zoom_moves_annotations_without_growing_them() {
    let mut map = choropleth(flat().with_max_zoom(4.0))
        .with_annotations([Annotation::new(7, LonLat::new(5.0, 5.0), "Here")]);
    map.mount(Size::new(400.0, 200.0));
    let anchor = |map: &MapComponent<Vec<MarkDiff>>| {
        let ctx = map.frame().unwrap().context();
        Annotation::new(7, LonLat::new(5.0, 5.0), "Here")
            .position(&ctx)
            .unwrap()
    };
    let before = anchor(&map);
    assert!((before.anchor - Point::new(300.0, 100.0)).hypot() < 1e-9);

    map.wheel(Point::new(0.0, 0.0), -500.0);
    let after = anchor(&map);
    assert!((after.anchor - Point::new(600.0, 200.0)).hypot() < 1e-9);
    assert_eq!(after.scale, 1.0);
    let texts: Vec<_> = map
        .frame()
        .unwrap()
        .marks
        .iter()
        .filter_map(|m| match &m.payload {
            MarkPayload::Text(t) => Some((t.text.clone(), t.font_size)),
            _ => None,
        })
        .collect();
    assert_eq!(texts, [("Here".to_string(), 12.0)]);
    assert_eq!(map.drain_events().last().map(ChartEvent::name), Some("zoomed"));
}

#[test]
fn dragging_a_globe_rotates_instead_of_panning() {
    let globe = flat().with_projection(ProjectionKind::Orthographic);
    let mut map = choropleth(globe);
    map.mount(Size::new(400.0, 400.0));
    map.drag(40.0, 0.0);
    assert_eq!(map.zoom().rotate_x, 10.0);
    assert_eq!(map.zoom().transform.x, 0.0);
    assert_eq!(map.frame().unwrap().projection.rotate.0, 10.0);

    let mut flat_map = choropleth(flat());
    flat_map.mount(Size::new(400.0, 200.0));
    flat_map.drag(40.0, 0.0);
    assert_eq!(flat_map.zoom().transform.x, 40.0);
    assert_eq!(flat_map.zoom().rotate_x, 0.0);
}

#[test]
fn symbol_maps_report_clicks_on_circles() {
    let fetcher = StaticFetcher::new().with("world.json", world_json());
    let options = SymbolMapOptions::default().with_map(flat());
    let mut map = MapComponent::new(SymbolMap::new(options), Arc::new(fetcher), Vec::new());
    map.set_source(DataSource::from_value(json!([
        {"id": "E", "value": 4},
        {"id": "1", "value": 1},
    ])));
    map.mount(Size::new(400.0, 200.0));
    let frame = map.frame().unwrap();
    assert_eq!(frame.symbols.len(), 2);
    assert_eq!(frame.symbols[0].key, "E");
    assert!((frame.symbols[0].radius - 2.0 * frame.symbols[1].radius).abs() < 1e-9);
    let center = frame.symbols[0].center;
    assert!((center - Point::new(300.0, 100.0)).hypot() < 1e-9);
    assert_eq!(
        map.click(center),
        Some(ChartEvent::Click {
            key: "E".to_string()
        })
    );
    let tip = map.tooltip_at(center).unwrap();
    assert_eq!(tip.title, "E");

    map.unmount();
    let enters = map
        .renderer()
        .iter()
        .filter(|d| matches!(d, MarkDiff::Enter { .. }))
        .count();
    let exits = map
        .renderer()
        .iter()
        .filter(|d| matches!(d, MarkDiff::Exit { .. }))
        .count();
    assert_eq!(enters, exits);
}

#[test]
fn an_unmounted_map_ignores_data_and_zoom_input() {
    let mut map = choropleth(flat().with_clickable(true));
    map.mount(Size::new(400.0, 200.0));
    map.unmount();
    map.drain_events();

    map.set_source(DataSource::from_value(json!([{"id": "E", "value": 900}])));
    map.wheel(Point::new(200.0, 100.0), -500.0);
    map.drag(40.0, 10.0);
    map.reset_zoom();
    map.set_topology(Topology::from_json(&world_json()).unwrap());
    assert!(map.drain_events().is_empty());
    assert_eq!(map.zoom().transform.k, 1.0);
    assert_eq!(map.zoom().transform.x, 0.0);
    assert!(map.frame().is_none());
    assert!(map.click(Point::new(300.0, 100.0)).is_none());
}
