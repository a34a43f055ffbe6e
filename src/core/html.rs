//! Tolerant, tag-level HTML table scanning.
//!
//! Only `table`, `tr`, `td` and `th` tags are tracked. Rows and cells close
//! implicitly when the next row or cell starts, nested tables are kept as
//! separate tables (an enclosing cell's text stops where the nested table
//! starts), and cell text has its inner tags stripped, common
//! entities decoded and surrounding whitespace trimmed. Comments and the
//! bodies of `script`, `style` and `textarea` are dropped before scanning.
//! Tables still open at the end of the document are closed there; only a
//! `</table>` with nothing to close is reported as an error.

use crate::utils::error::{PlotError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn table_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(/?)(table|tr|td|th)\b[^>]*>").expect("static table tag regex")
    })
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("static comment regex"))
}

/// One pattern per raw-text element, since `regex` has no backreferences.
fn raw_text_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        ["script", "style", "textarea"].map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("static raw text regex")
        })
    })
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static tag regex"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlCell {
    pub text: String,
    pub is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlTable {
    pub rows: Vec<Vec<HtmlCell>>,
}

impl HtmlTable {
    /// Text of every cell in row `index`, empty past the last row.
    pub fn row_texts(&self, index: usize) -> Vec<String> {
        self.rows
            .get(index)
            .map(|row| row.iter().map(|c| c.text.clone()).collect())
            .unwrap_or_default()
    }

    /// Rows below row `index`.
    pub fn rows_after(&self, index: usize) -> &[Vec<HtmlCell>] {
        self.rows.get(index + 1..).unwrap_or(&[])
    }
}

#[derive(Default)]
struct TableBuilder {
    slot: usize,
    rows: Vec<Vec<HtmlCell>>,
    row: Option<Vec<HtmlCell>>,
    cell: Option<(usize, bool)>,
}

impl TableBuilder {
    fn close_cell(&mut self, source: &str, end: usize) {
        if let Some((start, is_header)) = self.cell.take() {
            let text = cell_text(&source[start..end]);
            self.row.get_or_insert_with(Vec::new).push(HtmlCell { text, is_header });
        }
    }

    fn close_row(&mut self, source: &str, end: usize) {
        self.close_cell(source, end);
        if let Some(row) = self.row.take() {
            self.rows.push(row);
        }
    }
}

/// Every table in the document, in the order their opening tags appear.
pub fn parse_tables(markup: &str) -> Result<Vec<HtmlTable>> {
    let mut stripped = comment_re().replace_all(markup, "").into_owned();
    for re in raw_text_res() {
        stripped = re.replace_all(&stripped, "").into_owned();
    }
    let source: &str = &stripped;

    let mut finished: Vec<Option<HtmlTable>> = Vec::new();
    let mut stack: Vec<TableBuilder> = Vec::new();

    for caps in table_tag_re().captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();

        match (tag.as_str(), closing) {
            ("table", false) => {
                // 外層儲存格的文字到巢狀表格為止
                if let Some(outer) = stack.last_mut() {
                    outer.close_cell(source, whole.start());
                }
                finished.push(None);
                stack.push(TableBuilder {
                    slot: finished.len() - 1,
                    ..TableBuilder::default()
                });
            }
            ("table", true) => {
                let mut builder = stack.pop().ok_or_else(|| {
                    PlotError::parse(format!("unexpected </table> at byte {}", whole.start()))
                })?;
                builder.close_row(source, whole.start());
                finished[builder.slot] = Some(HtmlTable {
                    rows: builder.rows,
                });
            }
            ("tr", false) => {
                if let Some(table) = stack.last_mut() {
                    table.close_row(source, whole.start());
                    table.row = Some(Vec::new());
                }
            }
            ("tr", true) => {
                if let Some(table) = stack.last_mut() {
                    table.close_row(source, whole.start());
                }
            }
            (_, false) => {
                if let Some(table) = stack.last_mut() {
                    table.close_cell(source, whole.start());
                    table.row.get_or_insert_with(Vec::new);
                    table.cell = Some((whole.end(), tag == "th"));
                }
            }
            (_, true) => {
                if let Some(table) = stack.last_mut() {
                    table.close_cell(source, whole.start());
                }
            }
        }
    }

    if !stack.is_empty() {
        tracing::debug!("Closing {} unterminated <table> element(s) at end of document", stack.len());
    }
    while let Some(mut builder) = stack.pop() {
        builder.close_row(source, source.len());
        finished[builder.slot] = Some(HtmlTable {
            rows: builder.rows,
        });
    }

    Ok(finished.into_iter().flatten().collect())
}

/// Visible text of a markup fragment.
pub fn cell_text(fragment: &str) -> String {
    let stripped = any_tag_re().replace_all(fragment, "");
    decode_entities(stripped.trim()).trim().to_string()
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // &amp; 最後處理，避免重複解碼
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&amp;", "&")
}
