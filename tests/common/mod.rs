#![allow(dead_code)]

use deed_plot::{build_pipeline, AppConfig, BoundaryPipeline, DeedEngine, HttpDocumentSource};
use httpmock::MockServer;
use std::time::Duration;

pub const TITLE_DEED: &str = "AK/1234/05";
pub const CERTIFICATE_PATH: &str = "/en-us/certificate/AK/1234/05";

pub const PDF_LINK: &str = "https://www.addisland.gov.et/Reserved.ReportViewerWebControl.axd?ReportSession=abc&ControlID=1&Format=PDF";

/// Certificate page laid out like the registry's report viewer:
/// an owner table, a nested coordinates table and the PDF export link.
pub fn certificate_page(rows: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (x, y) in rows {
        body.push_str(&format!(
            "<tr><td><div>{}</div></td><td><div>{}</div></td></tr>\n",
            x, y
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html><head><title>Certificate</title></head>
<body>
<table id="owner"><tr><td>Owner</td><td>Abebe Kebede</td></tr></table>
<table id="report">
  <tr><td>
    <table>
      <tr><td><div>Cordnates/ X</div></td><td><div>Y</div></td></tr>
      {body}
    </table>
  </td></tr>
</table>
<a href="{pdf}">Export</a>
</body></html>"#,
        body = body,
        pdf = PDF_LINK.replace('&', "&amp;"),
    )
}

/// The three surveyed reference points as they appear on a certificate.
pub fn reference_rows() -> Vec<(&'static str, &'static str)> {
    vec![
        ("477504.6975", "980922.813"),
        ("482977.07875", "992734.94275"),
        ("487741.8536", "993586.1784"),
    ]
}

pub fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.source.base_url = server.url("/en-us");
    config.source.timeout_seconds = 5;
    config
}

pub fn engine_for(server: &MockServer) -> DeedEngine<BoundaryPipeline<HttpDocumentSource>> {
    let config = config_for(server);
    let source = HttpDocumentSource::new(&config.source.base_url, Duration::from_secs(5)).unwrap();
    DeedEngine::new(build_pipeline(&config, source).unwrap())
}
