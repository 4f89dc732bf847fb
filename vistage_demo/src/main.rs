// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders every vistage component to `vistage_demo.html`.
//!
//! Components are driven the way a host would drive them: mount at a size, feed pointer and
//! timer events, then read the retained SVG scene back out. Set `RUST_LOG=debug` to watch
//! loads, zoom changes and highlight transitions.

mod html;

use std::error::Error;
use std::sync::Arc;

use kurbo::{Point, Rect};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use vistage_charts::{ChartComponent, ChartEvent, ChartKind, ChartOptions, Size, ValueFormatter};
use vistage_core::SvgScene;
use vistage_data::{DataFormat, DataSource, SortKey, StaticFetcher};
use vistage_geo::{
    Annotation, ChoroplethMap, ChoroplethOptions, LonLat, MapComponent, MapOptions, Placement,
    ProjectionKind, SymbolMap, SymbolMapOptions,
};

const OUTPUT: &str = "vistage_demo.html";

const SALES_CSV: &str = "\
quarter,north,south,west
Q1,120,80,45
Q2,135,95,60
Q3,90,110,75
Q4,160,70,90
";

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let fetcher = Arc::new(
        StaticFetcher::new()
            .with("sales.csv", SALES_CSV)
            .with("regions.json", regions_topology().to_string()),
    );

    let mut sections = vec![
        chart_demo(
            &fetcher,
            ChartKind::Column,
            "Column chart",
            "Grouped columns loaded from CSV; the Q2 group is hovered and highlighted.",
            |o| o,
        )?,
        chart_demo(
            &fetcher,
            ChartKind::Bar,
            "Bar chart",
            "Horizontal bars for one series, sorted descending by value.",
            |o| {
                o.with_value_fields(["north"])
                    .with_sort_by([SortKey::desc("north")])
            },
        )?,
        chart_demo(
            &fetcher,
            ChartKind::Line,
            "Line chart",
            "One line per region with end labels.",
            |o| o,
        )?,
        chart_demo(
            &fetcher,
            ChartKind::StackedColumn,
            "Stacked column chart",
            "Regions stacked per quarter, values formatted with a thousands separator.",
            |o| o.with_value_format(ValueFormatter::parse(",.0f").unwrap_or_default()),
        )?,
        chart_demo(
            &fetcher,
            ChartKind::StackedBar,
            "Stacked bar chart",
            "Horizontal stacks with the Q4 row statically highlighted.",
            |o| o.with_highlight(["Q4"]),
        )?,
    ];
    sections.push(choropleth_demo(&fetcher));
    sections.push(symbol_demo(&fetcher));
    sections.push(globe_demo(&fetcher));

    let html = html::render_report("Vistage components demo", &sections);
    std::fs::write(OUTPUT, html)?;
    info!(sections = sections.len(), path = OUTPUT, "wrote report");
    println!("wrote {OUTPUT}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn scene_for(size: Size) -> SvgScene {
    let mut scene = SvgScene::new();
    scene.set_view_box(Rect::new(0.0, 0.0, size.width, size.height));
    scene
}

fn event_names(events: &[ChartEvent]) -> Vec<&'static str> {
    events.iter().map(ChartEvent::name).collect()
}

fn chart_demo(
    fetcher: &Arc<StaticFetcher>,
    kind: ChartKind,
    title: &'static str,
    description: &'static str,
    configure: impl FnOnce(ChartOptions) -> ChartOptions,
) -> Result<html::HtmlSection, Box<dyn Error>> {
    let size = Size::new(520.0, 300.0);
    let options = configure(
        ChartOptions::default()
            .with_label_field("quarter")
            .with_value_fields(["north", "south", "west"])
            .with_series_labels(["North", "South", "West"])
            .with_data_url_type(DataFormat::Csv)
            .with_delays(0, 0),
    );
    let mut chart = ChartComponent::new(kind, options, fetcher.clone(), scene_for(size));
    chart.set_source(DataSource::url("sales.csv"));
    chart.mount(size);

    if kind == ChartKind::Column {
        chart.pointer_enter("Q2", 0);
        chart.tick(0);
    }
    if let Some(state) = chart.resize_state() {
        info!(chart = title, width = state.width, narrow = state.narrow_width, "mounted");
    }

    let events = chart.drain_events();
    if let Some(message) = events.iter().find_map(|e| match e {
        ChartEvent::LoadFailed { message } => Some(message.clone()),
        _ => None,
    }) {
        return Err(message.into());
    }
    Ok(html::HtmlSection {
        title,
        description,
        svg: chart.renderer().to_svg_string(),
        events: event_names(&events),
    })
}

fn choropleth_demo(fetcher: &Arc<StaticFetcher>) -> html::HtmlSection {
    let size = Size::new(520.0, 320.0);
    let options = ChoroplethOptions::default()
        .with_map(
            MapOptions::default()
                .with_projection(ProjectionKind::Mercator)
                .with_topojson("regions.json")
                .with_feature_id_path("properties.code")
                .with_data_key_field("code")
                .with_value_field("population")
                .with_clickable(true)
                .with_delays(0, 0),
        )
        .with_thresholds([100.0, 300.0, 700.0]);
    let mut map = MapComponent::new(ChoroplethMap::new(options), fetcher.clone(), scene_for(size));
    map.set_source(DataSource::from_value(json!([
        {"code": "NW", "population": 80},
        {"code": "NE", "population": 250},
        {"code": "SW", "population": 520},
    ])));
    map.mount(size);
    // Zoom to the south-west region the way a click would.
    if let Some(target) = map
        .frame()
        .and_then(|f| f.features.iter().find(|f| f.key.as_deref() == Some("SW")))
        .and_then(|f| f.centroid)
    {
        map.click(target);
    }

    html::HtmlSection {
        title: "Choropleth map",
        description: "Threshold bins over a Mercator projection; SE has no data and keeps the missing color. The SW region was clicked and zoomed.",
        svg: map.renderer().to_svg_string(),
        events: event_names(&map.drain_events()),
    }
}

fn symbol_demo(fetcher: &Arc<StaticFetcher>) -> html::HtmlSection {
    let size = Size::new(520.0, 320.0);
    let options = SymbolMapOptions::default()
        .with_map(
            MapOptions::default()
                .with_projection(ProjectionKind::Equirectangular)
                .with_topojson("regions.json")
                .with_feature_id_path("properties.code")
                .with_data_key_field("code")
                .with_value_field("visitors")
                .with_legend(false)
                .with_delays(0, 0),
        )
        .with_max_radius(28.0);
    let mut map = MapComponent::new(SymbolMap::new(options), fetcher.clone(), scene_for(size));
    map.set_source(DataSource::from_value(json!([
        {"code": "NW", "visitors": 40},
        {"code": "SE", "visitors": 160},
        {"code": "harbor", "visitors": 90, "lon": 5, "lat": 12},
    ])));
    map.mount(size);
    if let Some(center) = map.frame().and_then(|f| f.symbols.first()).map(|s| s.center) {
        map.pointer_move(center, 0);
        map.tick(0);
        if let Some(tip) = map.tooltip_at(center) {
            info!(title = %tip.title, lines = ?tip.lines, "tooltip");
        }
    }

    html::HtmlSection {
        title: "Symbol map",
        description: "Area-proportional circles at feature centroids or explicit coordinates; the largest circle is hovered.",
        svg: map.renderer().to_svg_string(),
        events: event_names(&map.drain_events()),
    }
}

fn globe_demo(fetcher: &Arc<StaticFetcher>) -> html::HtmlSection {
    let size = Size::new(360.0, 360.0);
    let options = ChoroplethOptions::default().with_map(
        MapOptions::default()
            .with_projection(ProjectionKind::Orthographic)
            .with_rotate(-10.0, -20.0)
            .with_topojson("regions.json")
            .with_feature_id_path("properties.code")
            .with_data_key_field("code")
            .with_legend(false),
    );
    let mut map = MapComponent::new(ChoroplethMap::new(options), fetcher.clone(), scene_for(size))
        .with_annotations([
            Annotation::new(1, LonLat::new(0.0, 0.0), "Null Island")
                .with_placement(Placement::Bottom),
            Annotation::new(2, LonLat::new(170.0, 0.0), "Far side"),
        ]);
    map.set_source(DataSource::from_value(json!([
        {"code": "NW", "value": 1},
        {"code": "NE", "value": 2},
        {"code": "SW", "value": 3},
        {"code": "SE", "value": 4},
    ])));
    map.mount(size);
    map.drag(-40.0, 0.0);
    map.wheel(Point::new(180.0, 180.0), -200.0);

    html::HtmlSection {
        title: "Annotated globe",
        description: "An orthographic globe rotated by dragging and zoomed with the wheel; the far-side annotation is hidden.",
        svg: map.renderer().to_svg_string(),
        events: event_names(&map.drain_events()),
    }
}

/// Four 20x15 degree regions around the origin, keyed by `properties.code`.
fn regions_topology() -> serde_json::Value {
    let square = |x: i32, y: i32| json!([[x, y], [x + 20, y], [x + 20, y + 15], [x, y + 15], [x, y]]);
    let region = |i: usize, code: &str| {
        json!({"type": "Polygon", "arcs": [[i]], "properties": {"code": code, "name": code}})
    };
    json!({
        "type": "Topology",
        "arcs": [square(-20, 0), square(0, 0), square(-20, -15), square(0, -15)],
        "objects": {
            "regions": {
                "type": "GeometryCollection",
                "geometries": [
                    region(0, "NW"),
                    region(1, "NE"),
                    region(2, "SW"),
                    region(3, "SE"),
                ]
            }
        }
    })
}
