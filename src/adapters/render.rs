//! HTML page and CSV output for a lookup outcome.

use crate::core::engine::PlotOutcome;
use crate::domain::model::{BoundaryRing, GeographicCoordinate, PlotReport};
use crate::utils::error::Result;
use std::fmt::Write as _;
use std::io::Write;

const TILE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const TILE_ATTRIBUTION: &str =
    "Tiles &copy; Esri &mdash; Source: Esri, Maxar, Earthstar Geographics";
const MAP_ZOOM: u8 = 18;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.8}", value)
}

pub fn map_service_link(center: GeographicCoordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        format_coordinate(center.latitude),
        format_coordinate(center.longitude)
    )
}

/// Full page: the lookup form plus, when given, the outcome of a lookup.
pub fn render_page(title_deed: &str, outcome: Option<&PlotOutcome>) -> String {
    let body = match outcome {
        None => String::new(),
        Some(PlotOutcome::Plotted(report)) => render_report(report),
        Some(failed @ PlotOutcome::Failed { .. }) => status_error(failed.status_message()),
    };
    layout(title_deed, &body)
}

/// The form with a single error line, for failures that are not lookup outcomes.
pub fn render_message_page(title_deed: &str, message: &str) -> String {
    layout(title_deed, &status_error(message))
}

fn status_error(message: &str) -> String {
    format!("<p class=\"status error\">{}</p>", escape_html(message))
}

fn layout(title_deed: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Title Deed Boundary</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
#map {{ height: 520px; margin-top: 1em; }}
.status.error {{ color: red; }}
.status.ok {{ color: green; }}
table.coordinates td {{ padding: 0 1em; font-family: monospace; }}
</style>
</head>
<body>
<h1>Title Deed Boundary</h1>
<form method="post" action="/">
<label for="title_deed">Title deed number</label>
<input type="text" id="title_deed" name="title_deed" value="{}" required>
<button type="submit">Plot</button>
</form>
{}
</body>
</html>
"#,
        escape_html(title_deed),
        body
    )
}

fn render_report(report: &PlotReport) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<p class=\"status ok\">{}</p>",
        escape_html(&report.status)
    );

    html.push_str("<table class=\"coordinates\">\n<tr><th>#</th><th>Latitude</th><th>Longitude</th></tr>\n");
    for (i, p) in report.ring.vertices().iter().enumerate() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            format_coordinate(p.latitude),
            format_coordinate(p.longitude)
        );
    }
    html.push_str("</table>\n");

    let _ = writeln!(
        html,
        "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open in Google Maps</a> | \
         <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Source certificate</a>",
        escape_html(&map_service_link(report.center)),
        escape_html(&report.source_url)
    );
    if let Some(link) = &report.pdf_link {
        let _ = write!(
            html,
            " | <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Save as PDF</a>",
            escape_html(link)
        );
    }
    html.push_str("</p>\n");

    html.push_str(&render_map(&report.ring, report.center));
    html
}

/// Leaflet map: one marker per vertex and a polyline over the closed ring.
pub fn render_map(ring: &BoundaryRing, center: GeographicCoordinate) -> String {
    let ring_json = lat_lon_json(ring.points());
    let markers_json = lat_lon_json(ring.vertices());

    format!(
        r#"<div id="map"></div>
<script>
var map = L.map('map', {{ maxZoom: 22 }}).setView([{lat}, {lon}], {zoom});
L.tileLayer('{tiles}', {{ attribution: '{attribution}', maxZoom: 22 }}).addTo(map);
{markers}.forEach(function (p) {{ L.marker(p).bindPopup('Point').addTo(map); }});
L.polyline({ring}, {{ color: 'blue', weight: 2.5, opacity: 1 }}).addTo(map);
</script>
"#,
        lat = format_coordinate(center.latitude),
        lon = format_coordinate(center.longitude),
        zoom = MAP_ZOOM,
        tiles = TILE_URL,
        attribution = TILE_ATTRIBUTION,
        markers = markers_json,
        ring = ring_json,
    )
}

fn lat_lon_json(points: &[GeographicCoordinate]) -> String {
    let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.latitude, p.longitude]).collect();
    serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
}

/// `latitude,longitude` rows for each vertex, 8 decimals.
pub fn write_coordinates_csv<W: Write>(writer: W, ring: &BoundaryRing) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["latitude", "longitude"])?;
    for p in ring.vertices() {
        csv_writer.write_record([format_coordinate(p.latitude), format_coordinate(p.longitude)])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Correction;
    use crate::utils::error::{FailureReason, PlotError};

    fn report() -> PlotReport {
        let ring = BoundaryRing::close(vec![
            GeographicCoordinate::new(8.874, 38.796),
            GeographicCoordinate::new(8.875, 38.796),
            GeographicCoordinate::new(8.875, 38.797),
        ])
        .unwrap();
        PlotReport {
            title_deed: "AK/1".to_string(),
            status: "Valid title deed.".to_string(),
            source_url: "https://registry.test/certificate/AK/1".to_string(),
            pdf_link: Some("https://registry.test/x.axd?a=1&Format=PDF".to_string()),
            raw_point_count: 3,
            applied_correction: Correction::new(90.0, 200.0),
            center: ring.center(),
            ring,
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_render_empty_form() {
        let page = render_page("", None);
        assert!(page.contains("name=\"title_deed\""));
        assert!(!page.contains("id=\"map\""));
    }

    #[test]
    fn test_render_report_page() {
        let outcome = PlotOutcome::Plotted(Box::new(report()));
        let page = render_page("AK/1", Some(&outcome));

        assert!(page.contains("8.87400000"));
        assert!(page.contains("38.79600000"));
        assert!(page.contains("id=\"map\""));
        assert!(page.contains("google.com/maps"));
        assert!(page.contains("https://registry.test/certificate/AK/1"));
        assert!(page.contains("x.axd?a=1&amp;Format=PDF"));
        assert_eq!(page.matches("<tr><td>").count(), 3);
    }

    #[test]
    fn test_render_failure_escapes_input() {
        let outcome = PlotOutcome::Failed {
            title_deed: "<script>".to_string(),
            reason: FailureReason::ServerUnreachable,
            error: PlotError::HttpStatus {
                url: "u".to_string(),
                status: 502,
            },
        };
        let page = render_page("<script>", Some(&outcome));

        assert!(page.contains("value=\"&lt;script&gt;\""));
        assert!(page.contains(FailureReason::ServerUnreachable.message()));
        assert!(!page.contains("id=\"map\""));
    }

    #[test]
    fn test_render_message_page() {
        let page = render_message_page("1", "Calibration model could not be evaluated");
        assert!(page.contains("status error"));
        assert!(page.contains("Calibration model could not be evaluated"));
    }

    #[test]
    fn test_map_polyline_is_closed() {
        let r = report();
        let map = render_map(&r.ring, r.center);
        assert!(map.contains("[[8.874,38.796],[8.875,38.796],[8.875,38.797],[8.874,38.796]]"));
    }

    #[test]
    fn test_write_coordinates_csv() {
        let mut buf = Vec::new();
        write_coordinates_csv(&mut buf, &report().ring).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "latitude,longitude");
        assert_eq!(lines[1], "8.87400000,38.79600000");
        assert_eq!(lines.len(), 4);
    }
}
