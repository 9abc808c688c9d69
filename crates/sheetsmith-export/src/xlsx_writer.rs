use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::collections::HashSet;

use sheetsmith_core::format::Align;
use sheetsmith_core::{CellCoord, GridData, MergeRegion, StyleLookup, StyleRecord};

use crate::ExportError;

pub const XLSX_FILE_NAME: &str = "styled-spreadsheet.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Sheet1";
const DEFAULT_FONT: &str = "Calibri";
const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Excel measures column width in characters, roughly pixels / 7
const PIXELS_PER_CHAR: f64 = 7.0;

/// A finished workbook plus what went into it
#[derive(Debug, Clone)]
pub struct XlsxExport {
    pub bytes: Vec<u8>,
    pub cells_written: usize,
    pub merges_written: usize,
    pub merges_skipped: usize,
}

/// Build a single-sheet workbook from the grid.
///
/// Merged regions are written first with the anchor's value and style,
/// centered and with a thin border. A region the writer rejects is logged and
/// skipped; its cells are then written as ordinary cells. `column_widths` is in
/// pixels and may be empty.
pub fn export_xlsx(
    data: &GridData,
    merges: &[MergeRegion],
    styles: &impl StyleLookup,
    column_widths: &[u32],
) -> Result<XlsxExport, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, width) in column_widths.iter().enumerate() {
        worksheet.set_column_width(to_col(col as u32)?, *width as f64 / PIXELS_PER_CHAR)?;
    }

    let mut covered: HashSet<CellCoord> = HashSet::new();
    let mut merges_written = 0;
    let mut merges_skipped = 0;

    for region in merges {
        match write_merge(worksheet, data, styles, region) {
            Ok(()) => {
                covered.extend(region.to_range().iter());
                merges_written += 1;
            }
            Err(e) => {
                tracing::warn!(?region, error = %e, "Skipping merged region in export");
                merges_skipped += 1;
            }
        }
    }

    let mut cells_written = 0;
    for (r, row) in data.rows().iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let coord = CellCoord::new(r as u32, c as u32);
            if covered.contains(&coord) {
                continue;
            }
            if write_cell(worksheet, coord, value, styles.style_at(coord))? {
                cells_written += 1;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;

    tracing::debug!(
        cells_written,
        merges_written,
        merges_skipped,
        size = bytes.len(),
        "Built XLSX export"
    );

    Ok(XlsxExport {
        bytes,
        cells_written,
        merges_written,
        merges_skipped,
    })
}

/// Returns whether anything was written for the cell
fn write_cell(
    worksheet: &mut Worksheet,
    coord: CellCoord,
    value: &str,
    style: Option<&StyleRecord>,
) -> Result<bool, ExportError> {
    let col = to_col(coord.col)?;

    match (value.is_empty(), style) {
        (true, None) => return Ok(false),
        (true, Some(record)) => {
            worksheet.write_blank(coord.row, col, &convert_style_to_format(record))?;
        }
        (false, Some(record)) => {
            worksheet.write_string_with_format(
                coord.row,
                col,
                value,
                &convert_style_to_format(record),
            )?;
        }
        (false, None) => {
            worksheet.write_string(coord.row, col, value)?;
        }
    }

    Ok(true)
}

fn write_merge(
    worksheet: &mut Worksheet,
    data: &GridData,
    styles: &impl StyleLookup,
    region: &MergeRegion,
) -> Result<(), ExportError> {
    let anchor = region.anchor();
    let value = data.get(anchor).unwrap_or_default();

    let format = styles
        .style_at(anchor)
        .map(convert_style_to_format)
        .unwrap_or_else(default_format)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    worksheet.merge_range(
        region.row,
        to_col(region.col)?,
        region.row_end(),
        to_col(region.col_end())?,
        value,
        &format,
    )?;
    Ok(())
}

fn default_format() -> Format {
    Format::new()
        .set_font_name(DEFAULT_FONT)
        .set_font_size(DEFAULT_FONT_SIZE)
        .set_font_color(Color::Black)
}

fn convert_style_to_format(style: &StyleRecord) -> Format {
    let mut format = Format::new()
        .set_font_name(style.font.as_deref().unwrap_or(DEFAULT_FONT))
        .set_font_size(style.size_points(DEFAULT_FONT_SIZE));

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }

    // Text is black unless a color is given
    let text = style
        .text_color()
        .map(|c| Color::RGB(c.to_rgb_u32()))
        .unwrap_or(Color::Black);
    format = format.set_font_color(text);

    if let Some(fill) = style.fill_color() {
        format = format.set_background_color(Color::RGB(fill.to_rgb_u32()));
    }

    if let Some(align) = style.alignment {
        format = format.set_align(match align {
            Align::Left => FormatAlign::Left,
            Align::Center => FormatAlign::Center,
            Align::Right => FormatAlign::Right,
        });
    }

    format
}

fn to_col(col: u32) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::OutOfBounds(format!("column {}", col)))
}
