//! Drawing map frames with plotly.
//!
//! Each grid cell is drawn as a coloured marker on a mapbox layout using the
//! OpenStreetMap tile style, which provides the basemap (land, ocean,
//! coastlines, and country and state borders) without an access token.
use std::path::{Path, PathBuf};

use plotly::{
    common::{ColorBar, ColorScale, ColorScalePalette, Marker, Mode, Title},
    layout::{Center, Mapbox, MapboxStyle},
    ImageFormat, Layout, Plot, ScatterMapbox,
};

use super::{MapBounds, MapFrame, OutputFormat, PlotStyle};

const IMAGE_WIDTH: usize = 1200;
const IMAGE_HEIGHT: usize = 800;
const MARKER_SIZE: usize = 6;
const MAX_ZOOM: u8 = 18;

/// The grid cells of a frame that have a colour, as parallel vectors.
#[derive(Debug, Default, PartialEq)]
pub struct MapPoints {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub values: Vec<f64>,
}

/// Flatten a frame to points, leaving out cells with no colour (missing data,
/// or non-positive values under a log scale).
pub fn map_points(frame: &MapFrame, log_scale: bool) -> MapPoints {
    let mut points = MapPoints::default();
    for ((j, i), v) in frame.color_values(log_scale).indexed_iter() {
        if v.is_finite() {
            points.lat.push(frame.lat[j]);
            points.lon.push(frame.lon[i]);
            points.values.push(*v);
        }
    }
    points
}

pub fn colorbar_title(style: &PlotStyle) -> String {
    let label = style.colorbar_label.as_deref().unwrap_or_default();
    match (style.log_scale, label.is_empty()) {
        (false, _) => label.to_string(),
        (true, true) => "log10".to_string(),
        (true, false) => format!("log10({label})"),
    }
}

/// Mapbox zoom level at which `extent` fits in the image.
///
/// At zoom `z` one 256 pixel tile spans `360 / 2^z` degrees of longitude;
/// latitude is treated the same way, ignoring the Mercator stretch.
pub fn zoom_for_extent(extent: &MapBounds) -> u8 {
    let fit = |pixels: usize, span: f64| {
        if span > 0.0 {
            (360.0 * pixels as f64 / (256.0 * span)).log2()
        } else {
            MAX_ZOOM as f64
        }
    };
    let lon_zoom = fit(IMAGE_WIDTH, extent.max_lon - extent.min_lon);
    let lat_zoom = fit(IMAGE_HEIGHT, extent.max_lat - extent.min_lat);
    lon_zoom.min(lat_zoom).floor().clamp(0.0, MAX_ZOOM as f64) as u8
}

/// Build the plot of one frame over `extent`.
pub fn frame_plot(frame: &MapFrame, extent: &MapBounds, style: &PlotStyle) -> Plot {
    let points = map_points(frame, style.log_scale);
    let marker = Marker::new()
        .size(MARKER_SIZE)
        .color_array(points.values)
        .color_scale(ColorScale::Palette(ColorScalePalette::Jet))
        .show_scale(true)
        .color_bar(ColorBar::new().title(Title::new(&colorbar_title(style))));
    let trace = ScatterMapbox::new(points.lat, points.lon)
        .mode(Mode::Markers)
        .marker(marker);

    let center = Center::new(
        0.5 * (extent.min_lat + extent.max_lat),
        0.5 * (extent.min_lon + extent.max_lon),
    );
    let layout = Layout::new().title(Title::new(&frame.title)).mapbox(
        Mapbox::new()
            .style(MapboxStyle::OpenStreetMap)
            .center(center)
            .zoom(zoom_for_extent(extent)),
    );

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Draw `frame` into `out_dir`, returning the path written.
pub fn write_frame(
    frame: &MapFrame,
    extent: &MapBounds,
    style: &PlotStyle,
    out_dir: &Path,
) -> PathBuf {
    let path = out_dir.join(frame.file_name(style.format));
    let plot = frame_plot(frame, extent, style);
    match style.format {
        OutputFormat::Png => {
            plot.write_image(&path, ImageFormat::PNG, IMAGE_WIDTH, IMAGE_HEIGHT, 1.0)
        }
        OutputFormat::Html => plot.write_html(&path),
    }
    log::debug!("Wrote {}", path.display());
    path
}
