use rust_xlsxwriter::{
    Color, Format, FormatBorder, Table, TableColumn, TableStyle, Workbook, XlsxError,
};

use crate::model::attendance_record::AttendanceRow;
use crate::service::report::DailySummary;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const RECORDS_FILENAME: &str = "registro_asistencia.xlsx";
pub const SUMMARY_FILENAME: &str = "resumen_asistencia.xlsx";

pub const RECORD_HEADERS: [&str; 6] = [
    "Empleado",
    "Tipo de Asistencia",
    "Fecha",
    "Hora",
    "Descripción",
    "ID Dispositivo",
];

pub const SUMMARY_HEADERS: [&str; 6] = [
    "Empleado",
    "Fecha",
    "Tiempo de Almuerzo",
    "Horas por Comisión",
    "Horas por Permiso (Otros)",
    "Horas Trabajadas Totales",
];

const HEADER_FILL: u32 = 0x4F81BD;

/// A single-sheet workbook laid out as an Excel table.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: &'static str,
    pub table_name: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

/// One row per punch, newest first.
pub fn records_sheet(rows: &[AttendanceRow]) -> Sheet {
    let mut ordered: Vec<&AttendanceRow> = rows.iter().collect();
    ordered.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));

    Sheet {
        name: "Asistencia",
        table_name: "RegistroAsistencia",
        headers: &RECORD_HEADERS,
        rows: ordered
            .into_iter()
            .map(|r| {
                vec![
                    r.employee_name(),
                    r.type_label.clone(),
                    r.date.format("%Y-%m-%d").to_string(),
                    r.time.format("%H:%M:%S").to_string(),
                    r.note.clone().unwrap_or_default(),
                    r.fingerprint.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    }
}

/// One row per employee and day.
pub fn summary_sheet(summaries: &[DailySummary]) -> Sheet {
    Sheet {
        name: "Resumen Diario",
        table_name: "ResumenAsistencia",
        headers: &SUMMARY_HEADERS,
        rows: summaries
            .iter()
            .map(|s| {
                vec![
                    s.employee_name.clone(),
                    s.date.format("%Y-%m-%d").to_string(),
                    s.lunch.clone(),
                    s.errand.clone(),
                    s.permission.clone(),
                    s.worked.clone(),
                ]
            })
            .collect(),
    }
}

/// Width of each column: longest cell (header included) plus two.
pub fn column_widths(sheet: &Sheet) -> Vec<usize> {
    sheet
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = sheet
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            longest + 2
        })
        .collect()
}

pub fn write_workbook(sheet: &Sheet) -> Result<Vec<u8>, XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name)?;

    for (r, row) in sheet.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet.write_string(r as u32 + 1, c as u16, cell)?;
        }
    }

    for (c, width) in column_widths(sheet).into_iter().enumerate() {
        worksheet.set_column_width(c as u16, width as f64)?;
    }

    let columns: Vec<TableColumn> = sheet
        .headers
        .iter()
        .map(|h| TableColumn::new().set_header(*h).set_header_format(header_format.clone()))
        .collect();

    let table = Table::new()
        .set_name(sheet.table_name)
        .set_style(TableStyle::Medium9)
        .set_banded_rows(true)
        .set_columns(&columns);

    // a table needs at least one data row, even if empty
    let last_row = sheet.rows.len().max(1) as u32;
    let last_col = sheet.headers.len().saturating_sub(1) as u16;
    worksheet.add_table(0, 0, last_row, last_col, &table)?;

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn punch(id: u64, day: u32, hms: &str, label: &str) -> AttendanceRow {
        AttendanceRow {
            id,
            employee_id: 1,
            first_names: "Iris".into(),
            last_names: "Oblitas La Rosa".into(),
            type_label: label.into(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            time: NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap(),
            note: (id == 2).then(|| "reunión".to_string()),
            fingerprint: None,
        }
    }

    #[test]
    fn records_sheet_has_one_row_per_record_newest_first() {
        let rows = vec![
            punch(1, 10, "08:00:00", "Entrada"),
            punch(2, 11, "08:05:10", "Entrada"),
            punch(3, 10, "17:00:00", "Salida"),
        ];
        let sheet = records_sheet(&rows);

        assert_eq!(sheet.rows.len(), rows.len());
        let order: Vec<(&str, &str)> = sheet
            .rows
            .iter()
            .map(|r| (r[2].as_str(), r[3].as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2025-03-11", "08:05:10"),
                ("2025-03-10", "17:00:00"),
                ("2025-03-10", "08:00:00"),
            ]
        );
        assert_eq!(sheet.rows[0][0], "Iris Oblitas La Rosa");
        assert_eq!(sheet.rows[0][4], "reunión");
        assert_eq!(sheet.rows[1][4], "");
        assert_eq!(sheet.rows[1][5], "");
    }

    #[test]
    fn summary_sheet_uses_fixed_headers() {
        let summary = DailySummary {
            employee_id: 1,
            employee_name: "Iris Oblitas La Rosa".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            lunch: "01:00".into(),
            errand: "00:00".into(),
            permission: "00:00".into(),
            worked: "08:00".into(),
        };
        let sheet = summary_sheet(&[summary]);
        assert_eq!(sheet.headers, &SUMMARY_HEADERS);
        assert_eq!(
            sheet.rows[0],
            vec!["Iris Oblitas La Rosa", "2025-03-10", "01:00", "00:00", "00:00", "08:00"]
        );
    }

    #[test]
    fn widths_fit_longest_cell() {
        let sheet = records_sheet(&[punch(1, 10, "08:00:00", "Entrada")]);
        let widths = column_widths(&sheet);
        assert_eq!(widths[0], "Iris Oblitas La Rosa".len() + 2);
        assert_eq!(widths[1], "Tipo de Asistencia".len() + 2);
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = write_workbook(&records_sheet(&[punch(1, 10, "08:00:00", "Entrada")])).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let empty = write_workbook(&summary_sheet(&[])).unwrap();
        assert!(empty.starts_with(b"PK"));
    }
}
