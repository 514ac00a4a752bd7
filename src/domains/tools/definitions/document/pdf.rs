//! PDF download and parsing.
//!
//! Documents are fetched with the shared HTTP client, capped at the
//! configured download size, then parsed with `lopdf` on the blocking pool.
//!
//! Plain text comes from `lopdf`'s extractor. Tables need the page layout,
//! so each page is also rebuilt from its positioned text operators.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domains::tools::definitions::common::checked_url;
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

static CELL_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("valid regex"));

// ============================================================================
// Loading
// ============================================================================

/// A parsed PDF with its pages' text extracted.
#[derive(Debug, Clone)]
pub struct ParsedPdf {
    /// Text of each page, in page order.
    pub pages: Vec<String>,
    /// Each page rebuilt row by row from text positions, cells separated by
    /// at least two spaces.
    pub layouts: Vec<String>,
    /// Document information dictionary.
    pub metadata: PdfInfo,
}

/// Fields of the PDF document information dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
}

/// Download a PDF, enforcing the configured timeout and size cap.
pub async fn download_pdf(ctx: &ToolContext, pdf_url: &str) -> ToolResult<Vec<u8>> {
    let url = checked_url(ctx, pdf_url)?;
    let limits = &ctx.config.http_client;

    let mut response = ctx
        .http
        .get(url)
        .timeout(Duration::from_secs(limits.download_timeout_secs))
        .send()
        .await?
        .error_for_status()?;

    let too_large = || {
        ToolError::fetch(format!(
            "PDF exceeds the download limit of {} bytes",
            limits.max_download_bytes
        ))
    };

    if response
        .content_length()
        .is_some_and(|len| len > limits.max_download_bytes)
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if (bytes.len() + chunk.len()) as u64 > limits.max_download_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    debug!("Downloaded {} byte(s) from {}", bytes.len(), pdf_url);
    Ok(bytes)
}

/// Download and parse a PDF.
pub async fn load_pdf(ctx: &ToolContext, pdf_url: &str) -> ToolResult<ParsedPdf> {
    let bytes = download_pdf(ctx, pdf_url).await?;
    tokio::task::spawn_blocking(move || parse_pdf(&bytes))
        .await
        .map_err(|e| ToolError::internal(format!("PDF parsing task failed: {}", e)))?
}

/// Parse PDF bytes into page texts and metadata.
pub fn parse_pdf(bytes: &[u8]) -> ToolResult<ParsedPdf> {
    let document =
        Document::load_mem(bytes).map_err(|e| ToolError::parse(format!("Invalid PDF: {}", e)))?;

    // Pages whose content cannot be decoded contribute no text.
    let (pages, layouts) = document
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let text = document.extract_text(&[number]).unwrap_or_default();
            let layout = page_runs(&document, page_id)
                .map(layout_text)
                .unwrap_or_default();
            (text, layout)
        })
        .unzip();

    Ok(ParsedPdf {
        pages,
        layouts,
        metadata: read_info(&document),
    })
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn read_info(document: &Document) -> PdfInfo {
    let info = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|object| resolve(document, object))
        .and_then(|object| object.as_dict().ok());

    let Some(info) = info else {
        return PdfInfo::default();
    };

    let field = |key: &[u8]| info_string(document, info, key);
    PdfInfo {
        title: field(b"Title"),
        author: field(b"Author"),
        subject: field(b"Subject"),
        creator: field(b"Creator"),
        producer: field(b"Producer"),
        creation_date: field(b"CreationDate"),
    }
}

fn info_string(document: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let object = resolve(document, info.get(key).ok()?)?;
    match object {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with a byte order mark, else one byte per char.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ============================================================================
// Page layout
// ============================================================================

/// Runs whose baselines differ by at most this many points share a row.
const ROW_TOLERANCE: f32 = 2.0;

/// Estimated glyph advance as a fraction of the font size.
const GLYPH_WIDTH_EM: f32 = 0.5;

/// Horizontal gap, in font sizes, that separates two cells.
const CELL_GAP_EM: f32 = 1.0;

/// Text drawn by one show operator, in page coordinates.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f32,
    y: f32,
    /// Estimated x where the run ends.
    end: f32,
    size: f32,
    text: String,
}

/// Text or line matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values: Vec<f32> = operands
            .iter()
            .map(|o| o.as_float().ok())
            .collect::<Option<_>>()?;
        match values.as_slice() {
            &[a, b, c, d, e, f] => Some(Self { a, b, c, d, e, f }),
            _ => None,
        }
    }

    /// Move by `(tx, ty)` in text space.
    fn translate(self, tx: f32, ty: f32) -> Self {
        Self {
            e: tx * self.a + ty * self.c + self.e,
            f: tx * self.b + ty * self.d + self.f,
            ..self
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

fn float_operand(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(|o| o.as_float().ok())
}

/// Append the strings of a show operator, decoded with the current font.
fn show_text(encoding: Option<&Encoding>, operands: &[Object], out: &mut String) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                match encoding.and_then(|e| Document::decode_text(e, bytes).ok()) {
                    Some(text) => out.push_str(&text),
                    None => out.push_str(&decode_pdf_string(bytes)),
                }
            }
            Object::Array(items) => show_text(encoding, items, out),
            // Large negative kerning in TJ arrays stands for a word gap.
            Object::Integer(adjust) if *adjust < -100 => out.push(' '),
            Object::Real(adjust) if *adjust < -100.0 => out.push(' '),
            _ => {}
        }
    }
}

/// Walk a page's content stream and collect every shown string with its position.
///
/// Positions follow the text and line matrices (`BT`, `Td`, `TD`, `Tm`,
/// `T*`, `'`, `"`). The current transformation matrix is ignored.
fn page_runs(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<TextRun>> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| {
            font.get_font_encoding(document)
                .ok()
                .map(|encoding| (name, encoding))
        })
        .collect();
    let content = document.get_and_decode_page_content(page_id)?;

    let mut runs = Vec::new();
    let mut encoding = None;
    let mut font_size = 12.0_f32;
    let mut leading = 0.0_f32;
    let mut line = Matrix::IDENTITY;
    let mut text = Matrix::IDENTITY;

    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "BT" => {
                line = Matrix::IDENTITY;
                text = line;
            }
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
                if let Some(size) = float_operand(operands, 1) {
                    font_size = size;
                }
            }
            "TL" => {
                if let Some(value) = float_operand(operands, 0) {
                    leading = value;
                }
            }
            "Td" | "TD" => {
                let offset = float_operand(operands, 0).zip(float_operand(operands, 1));
                if let Some((tx, ty)) = offset {
                    if operation.operator == "TD" {
                        leading = -ty;
                    }
                    line = line.translate(tx, ty);
                    text = line;
                }
            }
            "Tm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    line = matrix;
                    text = matrix;
                }
            }
            "T*" => {
                line = line.translate(0.0, -leading);
                text = line;
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if matches!(operation.operator.as_str(), "'" | "\"") {
                    line = line.translate(0.0, -leading);
                    text = line;
                }
                // `"` carries word and character spacing before its string.
                let shown = if operation.operator == "\"" {
                    &operands[operands.len().saturating_sub(1)..]
                } else {
                    operands
                };

                let mut shown_text = String::new();
                show_text(encoding, shown, &mut shown_text);

                let start = text;
                let advance = shown_text.chars().count() as f32 * GLYPH_WIDTH_EM * font_size;
                text = text.translate(advance, 0.0);

                if !shown_text.trim().is_empty() {
                    runs.push(TextRun {
                        x: start.e,
                        y: start.f,
                        end: text.e,
                        size: font_size * start.horizontal_scale(),
                        text: shown_text,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(runs)
}

/// Rebuild page text from positioned runs.
///
/// Runs are grouped into rows by baseline, top to bottom, and ordered left to
/// right. A gap of at least one font size between runs becomes a cell break.
fn layout_text(mut runs: Vec<TextRun>) -> String {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match rows.last_mut() {
            Some(row) if (row[0].y - run.y).abs() <= ROW_TOLERANCE => row.push(run),
            _ => rows.push(vec![run]),
        }
    }

    let mut lines = Vec::with_capacity(rows.len());
    for mut row in rows {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut line = String::new();
        let mut previous: Option<(f32, f32)> = None;
        for run in row {
            if let Some((end, size)) = previous {
                let gap = run.x - end;
                if gap >= CELL_GAP_EM * size {
                    line.push_str("  ");
                } else if gap > 0.1 * size && !line.ends_with(' ') {
                    line.push(' ');
                }
            }
            previous = Some((run.end, run.size));
            line.push_str(&run.text);
        }
        lines.push(line);
    }

    lines.join("\n")
}

// ============================================================================
// Table detection
// ============================================================================

/// A table found in page text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfTable {
    /// 1-indexed page number.
    pub page: usize,
    /// 1-indexed position of the table on its page.
    pub table_index: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR_RE
        .split(line.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Find column-aligned blocks in extracted text.
///
/// Consecutive lines that split into the same number (at least two) of cells
/// form one table whose first line is the header. A block needs a header and
/// at least one row.
pub fn detect_tables(text: &str) -> Vec<(Vec<String>, Vec<Vec<String>>)> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    let mut flush = |block: &mut Vec<Vec<String>>| {
        if block.len() >= 2 {
            let mut lines = std::mem::take(block).into_iter();
            if let Some(headers) = lines.next() {
                tables.push((headers, lines.collect()));
            }
        }
        block.clear();
    };

    for line in text.lines() {
        let cells = split_cells(line);
        let continues = cells.len() >= 2
            && current
                .first()
                .is_some_and(|first| first.len() == cells.len());

        if continues {
            current.push(cells);
        } else {
            flush(&mut current);
            if cells.len() >= 2 {
                current.push(cells);
            }
        }
    }
    flush(&mut current);

    tables
}

// ============================================================================
// Tools
// ============================================================================

/// Parameters shared by tools that only need a PDF location.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PdfUrlParams {
    /// Direct URL to the PDF file.
    #[schemars(description = "Direct URL to the PDF file (must be publicly accessible)")]
    pub pdf_url: String,
}

/// Full-text extraction tool.
pub struct ExtractTextFromPdfTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractTextFromPdfTool {
    type Params = PdfUrlParams;
    type Output = String;

    const NAME: &'static str = "extract_text_from_pdf";
    const DESCRIPTION: &'static str = "Extract all text content from a PDF file. \
         Use this to read text from PDF documents, extract content for analysis, \
         or convert PDFs to plain text. Pages are separated by blank lines.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let pdf = load_pdf(ctx, &params.pdf_url).await?;
        info!("Extracted text from {} page(s)", pdf.pages.len());
        Ok(pdf.pages.join("\n\n").trim().to_string())
    }
}

/// Parameters for table extraction.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractTablesParams {
    /// Direct URL to the PDF file.
    #[schemars(description = "Direct URL to the PDF file")]
    pub pdf_url: String,

    /// Restrict extraction to one page (1-indexed).
    #[serde(default)]
    #[schemars(description = "Specific page number to extract from (optional, 1-indexed)")]
    pub page_number: Option<usize>,
}

/// Table extraction tool.
pub struct ExtractTablesFromPdfTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractTablesFromPdfTool {
    type Params = ExtractTablesParams;
    type Output = Vec<PdfTable>;

    const NAME: &'static str = "extract_tables_from_pdf";
    const DESCRIPTION: &'static str = "Extract tables from a PDF file as structured data. \
         Use this to get tabular data such as financial reports or statistical tables. \
         Returns a list of tables with page, headers, and rows.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let pdf = load_pdf(ctx, &params.pdf_url).await?;
        tables_in(&pdf, params.page_number)
    }
}

/// Collect the tables of one page or of the whole document.
pub fn tables_in(pdf: &ParsedPdf, page_number: Option<usize>) -> ToolResult<Vec<PdfTable>> {
    let selected: Vec<(usize, &String)> = match page_number {
        Some(number) => {
            let layout = number
                .checked_sub(1)
                .and_then(|index| pdf.layouts.get(index))
                .ok_or_else(|| {
                    ToolError::invalid_arguments(format!(
                        "Page {} is out of range (document has {} page(s))",
                        number,
                        pdf.layouts.len()
                    ))
                })?;
            vec![(number, layout)]
        }
        None => pdf.layouts.iter().enumerate().map(|(i, t)| (i + 1, t)).collect(),
    };

    let tables = selected
        .into_iter()
        .flat_map(|(page, text)| {
            detect_tables(text)
                .into_iter()
                .enumerate()
                .map(move |(index, (headers, rows))| PdfTable {
                    page,
                    table_index: index + 1,
                    headers,
                    rows,
                })
        })
        .collect();

    Ok(tables)
}

/// Page counting tool.
pub struct CountPdfPagesTool;

#[async_trait::async_trait]
impl ToolDefinition for CountPdfPagesTool {
    type Params = PdfUrlParams;
    type Output = usize;

    const NAME: &'static str = "count_pdf_pages";
    const DESCRIPTION: &'static str = "Count the number of pages in a PDF file. \
         Use this to determine PDF length before processing or to validate documents.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let bytes = download_pdf(ctx, &params.pdf_url).await?;
        tokio::task::spawn_blocking(move || {
            Document::load_mem(&bytes)
                .map(|document| document.get_pages().len())
                .map_err(|e| ToolError::parse(format!("Invalid PDF: {}", e)))
        })
        .await
        .map_err(|e| ToolError::internal(format!("PDF parsing task failed: {}", e)))?
    }
}

/// PDF metadata report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfMetadata {
    pub num_pages: usize,
    #[serde(flatten)]
    pub info: PdfInfo,
}

/// Metadata extraction tool.
pub struct ExtractPdfMetadataTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractPdfMetadataTool {
    type Params = PdfUrlParams;
    type Output = PdfMetadata;

    const NAME: &'static str = "extract_pdf_metadata";
    const DESCRIPTION: &'static str = "Extract metadata from a PDF file including title, \
         author, subject, creator, producer, and creation date. \
         Use this to learn about a document without reading its full content.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let pdf = load_pdf(ctx, &params.pdf_url).await?;
        Ok(PdfMetadata {
            num_pages: pdf.pages.len(),
            info: pdf.metadata,
        })
    }
}
