use crate::core::html::{decode_entities, parse_tables, HtmlCell};
use crate::domain::model::{ExtractedDeed, RawCoordinate};
use crate::domain::ports::TableLocator;
use crate::utils::error::{PlotError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Header text that identifies the coordinates table on certificate pages.
pub const DEFAULT_TABLE_MARKER: &str = "Cordnates/";

/// The registry's report-viewer export link.
pub const DEFAULT_PDF_LINK_PATTERN: &str =
    r#"https://www\.addisland\.gov\.et/Reserved\.ReportViewerWebControl\.axd\?[^"']*Format=PDF"#;

fn anchor_href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("static anchor regex")
    })
}

/// Case-sensitive substring match on any cell of a row.
#[derive(Debug, Clone)]
pub struct MarkerLocator {
    marker: String,
}

impl MarkerLocator {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for MarkerLocator {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_MARKER)
    }
}

impl TableLocator for MarkerLocator {
    fn matches(&self, cells: &[String]) -> bool {
        cells.iter().any(|text| text.contains(&self.marker))
    }
}

pub struct CoordinateExtractor {
    locator: Box<dyn TableLocator>,
    pdf_link: Option<Regex>,
}

impl CoordinateExtractor {
    pub fn new(locator: impl TableLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            pdf_link: None,
        }
    }

    pub fn with_pdf_link_pattern(mut self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| PlotError::InvalidConfigValueError {
            field: "source.pdf_link_pattern".to_string(),
            value: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pdf_link = Some(re);
        Ok(self)
    }

    /// Coordinates plus provenance for one certificate page.
    pub fn extract(&self, title_deed: &str, source_url: &str, markup: &str) -> Result<ExtractedDeed> {
        let points = self.coordinates(markup)?;
        let pdf_link = self.find_pdf_link(markup);

        if let Some(link) = &pdf_link {
            tracing::debug!("📌 Found PDF export link: {}", link);
        }

        Ok(ExtractedDeed {
            title_deed: title_deed.to_string(),
            points,
            source_url: source_url.to_string(),
            pdf_link,
        })
    }

    /// Ordered (easting, northing) pairs from the coordinates table.
    ///
    /// The table is the first one with a row the locator accepts; its data
    /// rows are the rows below that one, so title rows above the header are
    /// tolerated. Rows whose two cells are not both plain decimals are
    /// skipped silently.
    pub fn coordinates(&self, markup: &str) -> Result<Vec<RawCoordinate>> {
        let tables = parse_tables(markup)?;
        if tables.is_empty() {
            return Err(PlotError::parse("document contains no tables"));
        }
        tracing::debug!("🔍 Found {} tables", tables.len());

        let (table, header) = tables
            .iter()
            .find_map(|t| {
                (0..t.rows.len())
                    .find(|&i| self.locator.matches(&t.row_texts(i)))
                    .map(|i| (t, i))
            })
            .ok_or_else(|| PlotError::no_coordinates("no table matched the coordinates marker"))?;
        tracing::debug!("✅ Found the coordinates table (header row {})", header + 1);

        let data_rows = table.rows_after(header);
        if data_rows.is_empty() {
            return Err(PlotError::no_coordinates("coordinates table has no data rows"));
        }

        let mut points = Vec::new();
        for (index, row) in data_rows.iter().enumerate() {
            match numeric_pair(row)? {
                Some(point) => points.push(point),
                None => tracing::debug!("⚠️ Skipping non-numeric row {}", index + 1),
            }
        }

        if points.is_empty() {
            return Err(PlotError::no_coordinates("no valid coordinate rows"));
        }

        tracing::info!("📍 Extracted {} coordinate pairs", points.len());
        Ok(points)
    }

    pub fn find_pdf_link(&self, markup: &str) -> Option<String> {
        let pattern = self.pdf_link.as_ref()?;
        anchor_href_re()
            .captures_iter(markup)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|href| decode_entities(href.as_str()))
            .find(|href| pattern.is_match(href))
    }
}

impl Default for CoordinateExtractor {
    fn default() -> Self {
        Self::new(MarkerLocator::default())
    }
}

fn numeric_pair(row: &[HtmlCell]) -> Result<Option<RawCoordinate>> {
    let cells: Vec<&str> = row
        .iter()
        .filter(|c| !c.is_header)
        .map(|c| c.text.as_str())
        .collect();

    let &[x, y] = cells.as_slice() else {
        return Ok(None);
    };
    if !is_plain_decimal(x) || !is_plain_decimal(y) {
        return Ok(None);
    }

    let parse = |text: &str| {
        text.parse::<f64>()
            .map_err(|e| PlotError::parse(format!("'{}' is not a number: {}", text, e)))
    };
    Ok(Some(RawCoordinate::new(parse(x)?, parse(y)?)))
}

/// Digits with at most one decimal point: no sign, exponent or separators.
pub fn is_plain_decimal(text: &str) -> bool {
    let digits = text.replacen('.', "", 1);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
