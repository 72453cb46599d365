//! Excel workbook output.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::debug;

use findata_core::{BreakdownSection, FinDataError, Result, RowKind};

use crate::assembler::{ExportPlan, HEADER_ROW, SheetPlan, data_row};
use crate::naming::currency_symbol;
use crate::writer::SpreadsheetWriter;

const BREAKDOWN_SHEET: &str = "Revenue Breakdown";

const TITLE_BLUE: Color = Color::RGB(0x2E75B6);
const HEADER_BLUE: Color = Color::RGB(0x4472C4);
const GROUP_FILL: Color = Color::RGB(0xD9E2F3);
const RATIO_FILL: Color = Color::RGB(0xDEEBF7);
const SUBTITLE_GREY: Color = Color::RGB(0x666666);

/// Cell formats of one workbook.
struct Formats {
    title: Format,
    subtitle: Format,
    header: Format,
    group: Format,
    level1: Format,
    currency: Format,
    currency_bold: Format,
    eps: Format,
    eps_bold: Format,
    ratio_header: Format,
    ratio_label: Format,
    ratio_pct: Format,
    section_title: Format,
    item: Format,
    pct: Format,
    total: Format,
    total_pct: Format,
}

impl Formats {
    fn new(symbol: &str) -> Self {
        let money = format!("{symbol}#,##0");
        let bordered = || Format::new().set_border(FormatBorder::Thin);
        let number = |pattern: &str| {
            bordered()
                .set_num_format(pattern)
                .set_align(FormatAlign::Right)
        };
        let bold_number = |pattern: &str| number(pattern).set_bold().set_background_color(GROUP_FILL);

        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(TITLE_BLUE),
            subtitle: Format::new().set_font_size(11).set_font_color(SUBTITLE_GREY),
            header: bordered()
                .set_bold()
                .set_background_color(HEADER_BLUE)
                .set_font_color(Color::White),
            group: bordered().set_bold().set_background_color(GROUP_FILL),
            level1: bordered().set_indent(1),
            currency: number(&money),
            currency_bold: bold_number(&money),
            eps: number("#,##0.00"),
            eps_bold: bold_number("#,##0.00"),
            ratio_header: bordered()
                .set_bold()
                .set_font_size(12)
                .set_background_color(TITLE_BLUE)
                .set_font_color(Color::White),
            ratio_label: bordered().set_background_color(RATIO_FILL).set_indent(1),
            ratio_pct: number("0.0%").set_background_color(RATIO_FILL),
            section_title: bordered()
                .set_bold()
                .set_font_size(14)
                .set_background_color(TITLE_BLUE)
                .set_font_color(Color::White),
            item: bordered().set_indent(1),
            pct: number("0.0%"),
            total: bordered().set_bold().set_background_color(GROUP_FILL),
            total_pct: bold_number("0.0%"),
        }
    }
}

/// Writes `.xlsx` workbooks with live formulas.
#[derive(Clone, Copy, Debug, Default)]
pub struct XlsxWriter;

impl XlsxWriter {
    /// Creates the writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SpreadsheetWriter for XlsxWriter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, plan: &ExportPlan<'_>, path: &Path) -> Result<()> {
        build_workbook(plan, path).map_err(|e| FinDataError::Export(e.to_string()))
    }
}

fn build_workbook(plan: &ExportPlan<'_>, path: &Path) -> std::result::Result<(), XlsxError> {
    let formats = Formats::new(&currency_symbol(&plan.company.currency_code));
    let mut workbook = Workbook::new();

    for sheet in &plan.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_statement(worksheet, plan, sheet, &formats)?;
        debug!(sheet = %sheet.name, rows = sheet.table.rows.len(), "Wrote sheet");
    }

    if !plan.breakdown.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(BREAKDOWN_SHEET)?;
        write_title(worksheet, BREAKDOWN_SHEET, plan, &formats)?;
        let mut row = HEADER_ROW;
        for section in &plan.breakdown.sections {
            row = write_section(worksheet, row, section, &formats)?;
        }
        worksheet.set_column_width(0, 40)?;
        worksheet.set_column_width(1, 15)?;
        worksheet.set_column_width(2, 12)?;
        worksheet.set_freeze_panes(HEADER_ROW + 1, 0)?;
    }

    workbook.save(path)
}

fn write_title(
    worksheet: &mut Worksheet,
    title: &str,
    plan: &ExportPlan<'_>,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    worksheet.write_string_with_format(0, 0, title, &formats.title)?;
    worksheet.write_string_with_format(1, 0, plan.company_display(), &formats.subtitle)?;
    worksheet.write_string_with_format(
        2,
        0,
        format!("Currency: {}", plan.company.currency_code),
        &formats.subtitle,
    )?;
    Ok(())
}

fn write_statement(
    worksheet: &mut Worksheet,
    plan: &ExportPlan<'_>,
    sheet: &SheetPlan<'_>,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    write_title(worksheet, sheet.key.statement.display_name(), plan, formats)?;

    let table = sheet.table;
    let last_col = table.columns.len() as u16;

    worksheet.write_string_with_format(HEADER_ROW, 0, "Field", &formats.header)?;
    for (idx, label) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, idx as u16 + 1, label, &formats.header)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let line = data_row(idx);
        let emphasized = row.row_kind.is_emphasized();

        if emphasized {
            worksheet.write_string_with_format(line, 0, &row.field, &formats.group)?;
        } else if row.row_kind == RowKind::Level1 {
            worksheet.write_string_with_format(line, 0, &row.field, &formats.level1)?;
        } else {
            worksheet.write_string(line, 0, &row.field)?;
        }

        let value_format = match (row.field.contains("EPS"), emphasized) {
            (true, true) => &formats.eps_bold,
            (true, false) => &formats.eps,
            (false, true) => &formats.currency_bold,
            (false, false) => &formats.currency,
        };
        let formula = sheet.formula(idx);
        for (col_idx, value) in row.values.iter().enumerate() {
            let col = col_idx as u16 + 1;
            match formula {
                Some(formula) => {
                    worksheet.write_formula_with_format(line, col, formula.render(col).as_str(), value_format)
                }
                None => worksheet.write_number_with_format(line, col, *value, value_format),
            }?;
        }
    }

    if !sheet.ratios.is_empty() {
        let top = sheet.ratio_header_row();
        worksheet.write_string_with_format(top, 0, "Ratios", &formats.ratio_header)?;
        for col in 1..=last_col {
            worksheet.write_string_with_format(top, col, "", &formats.ratio_header)?;
        }

        for (offset, ratio) in sheet.ratios.iter().enumerate() {
            let line = top + 1 + offset as u32;
            worksheet.write_string_with_format(line, 0, ratio.label(), &formats.ratio_label)?;
            for col in 1..=last_col {
                match ratio.render(col) {
                    Some(text) => {
                        worksheet.write_formula_with_format(line, col, text.as_str(), &formats.ratio_pct)
                    }
                    None => worksheet.write_string_with_format(line, col, "N/A", &formats.ratio_label),
                }?;
            }
        }
    }

    worksheet.set_column_width(0, 35)?;
    for col in 1..=last_col {
        worksheet.set_column_width(col, 15)?;
    }
    worksheet.set_freeze_panes(HEADER_ROW + 1, 1)?;
    Ok(())
}

/// Writes one breakdown section starting at `row` and returns the next free row.
fn write_section(
    worksheet: &mut Worksheet,
    mut row: u32,
    section: &BreakdownSection,
    formats: &Formats,
) -> std::result::Result<u32, XlsxError> {
    worksheet.write_string_with_format(
        row,
        0,
        format!("Breakdown by {}", section.name),
        &formats.section_title,
    )?;
    worksheet.write_string_with_format(row, 1, "", &formats.section_title)?;
    worksheet.write_string_with_format(row, 2, "", &formats.section_title)?;
    row += 1;

    worksheet.write_string_with_format(row, 0, "Segment", &formats.header)?;
    worksheet.write_string_with_format(row, 1, "Revenue (M)", &formats.header)?;
    worksheet.write_string_with_format(row, 2, "% of Total", &formats.header)?;
    row += 1;

    for item in &section.items {
        worksheet.write_string_with_format(row, 0, &item.name, &formats.item)?;
        worksheet.write_number_with_format(row, 1, item.value, &formats.currency)?;
        worksheet.write_number_with_format(row, 2, section.share(item), &formats.pct)?;
        row += 1;
    }

    worksheet.write_string_with_format(row, 0, "Total", &formats.total)?;
    worksheet.write_number_with_format(row, 1, section.total, &formats.currency_bold)?;
    worksheet.write_number_with_format(row, 2, 1.0, &formats.total_pct)?;
    Ok(row + 2)
}
