use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Border, HorizontalAlignmentValues, Style, VerticalAlignmentValues};

use crate::{Align, BorderWeight, CellStyle, CellValue, GridLayout, MergeRange};

/// Persist a layout as a single-sheet `.xlsx` workbook.
///
/// The workbook is written next to `path` first and renamed into place, so readers
/// never observe a half-written file.
pub fn write_xlsx<P: AsRef<Path>>(layout: &GridLayout, path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| anyhow!("new workbook has no default sheet"))?;
    sheet.set_name(layout.sheet_name.as_str());

    for (r_idx, row) in layout.rows.iter().enumerate() {
        for (c_idx, cell) in row.iter().enumerate() {
            let coord = ((c_idx + 1) as u32, (r_idx + 1) as u32);
            match &cell.value {
                CellValue::Text(s) => {
                    sheet.get_cell_mut(coord).set_value_string(s.as_str());
                }
                CellValue::Number(n) => {
                    sheet.get_cell_mut(coord).set_value_number(*n);
                }
                CellValue::Empty => {}
            }
            if cell.style != CellStyle::default() {
                apply_style(sheet.get_style_mut(coord), &cell.style);
            }
        }
    }

    for merge in &layout.merges {
        sheet.add_merge_cells(merge_ref(merge));
    }

    for (c_idx, width) in layout.column_widths.iter().enumerate() {
        sheet
            .get_column_dimension_mut(&column_letter(c_idx))
            .set_width(*width);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory {}", parent.display()))?;
    }

    let partial = partial_path(path);
    umya_spreadsheet::writer::xlsx::write(&book, &partial)
        .map_err(|e| anyhow!("Cannot write workbook {}: {:?}", partial.display(), e))?;
    fs::rename(&partial, path).with_context(|| {
        format!(
            "Cannot move {} into place at {}",
            partial.display(),
            path.display()
        )
    })?;

    tracing::debug!(path = %path.display(), rows = layout.rows.len(), "workbook written");
    Ok(path.to_path_buf())
}

fn apply_style(style: &mut Style, cell: &CellStyle) {
    if cell.bold {
        style.get_font_mut().set_bold(true);
    }
    if let Some(size) = cell.font_size {
        style.get_font_mut().set_size(size);
    }

    match cell.align {
        Align::General => {}
        Align::Center => {
            let alignment = style.get_alignment_mut();
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            alignment.set_wrap_text(true);
        }
        Align::Middle => {
            style
                .get_alignment_mut()
                .set_vertical(VerticalAlignmentValues::Center);
        }
    }

    if let Some(fmt) = cell.number_format {
        style.get_number_format_mut().set_format_code(fmt.code());
    }

    if cell.bordered {
        let borders = style.get_borders_mut();
        borders.get_left_mut().set_border_style(Border::BORDER_THIN);
        borders.get_top_mut().set_border_style(Border::BORDER_THIN);
        borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
    }
    match cell.right_border {
        BorderWeight::None => {}
        BorderWeight::Thin => {
            style
                .get_borders_mut()
                .get_right_mut()
                .set_border_style(Border::BORDER_THIN);
        }
        BorderWeight::Medium => {
            style
                .get_borders_mut()
                .get_right_mut()
                .set_border_style(Border::BORDER_MEDIUM);
        }
    }
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA).
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn merge_ref(m: &MergeRange) -> String {
    format!(
        "{}{}:{}{}",
        column_letter(m.first_col),
        m.row + 1,
        column_letter(m.last_col),
        m.row + 1
    )
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "grid.xlsx".to_string());
    path.with_file_name(format!(".partial.{}", name))
}
