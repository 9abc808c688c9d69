//! Academic calendar template.
//!
//! Produces a complete grid for one semester: institution and semester titles,
//! a header row, then a title row per month followed by one row per day with
//! weekday, holiday markers, events and remarks.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::format::{Align, StyleRecord};
use crate::grid::GridData;
use crate::merge::MergeRegion;
use crate::range::{CellCoord, CellRange};

pub const MIN_START_YEAR: i32 = 2000;
pub const MAX_START_YEAR: i32 = 2100;

pub const INSTITUTION_TITLE: &str = "Amrita School of Engineering Bengaluru";
pub const HEADER: [&str; 7] = [
    "Date",
    "Days",
    "UG-S3,S5,S7 PG-S3",
    "UG-S1, PG-S1",
    "Events",
    "Remarks",
    "",
];
pub const COLUMN_WIDTHS: [u32; 7] = [80, 70, 120, 120, 250, 100, 50];

const WIDTH: usize = HEADER.len();
/// Titles span every column except the trailing spacer
const TITLE_SPAN: u32 = 6;
const EVENT_COL: usize = 4;
const REMARK_COL: usize = 5;
const HOLIDAY_MARK: &str = "H";
const HOLIDAY: &str = "Holiday";
const HOLIDAY_RED: &str = "#ff0000";
const HEADER_FILL: &str = "#d9e1f2";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A holiday that falls on the same date every year
#[derive(Debug, Clone, Copy)]
struct FixedHoliday {
    month: u32,
    day: u32,
    event: &'static str,
}

const fn holiday(month: u32, day: u32, event: &'static str) -> FixedHoliday {
    FixedHoliday { month, day, event }
}

const ODD_HOLIDAYS: &[FixedHoliday] = &[
    holiday(8, 15, "Independence Day"),
    holiday(8, 26, "Sree Krishna Janmashtami"),
    holiday(10, 2, "Gandhi Jayanti"),
    holiday(10, 11, "Maha Navami / Ayudha Pooja"),
    holiday(11, 1, "Kannada Rajyotsava day"),
    holiday(11, 2, "Balipadyami Deepavali"),
    holiday(12, 25, "Christmas (Holiday)"),
    holiday(9, 27, "Amma's Birthday (Holiday)"),
    holiday(10, 31, "Naraka Chaturdasi (Holiday)"),
];

const EVEN_HOLIDAYS: &[FixedHoliday] = &[
    holiday(1, 1, "New Year Day"),
    holiday(1, 14, "Makara Sankranti"),
    holiday(1, 26, "Republic Day"),
    holiday(3, 13, "Holi Feast"),
    holiday(3, 30, "Chandramana Ugadi"),
    holiday(4, 14, "Dr. Ambedkar Jayanthi"),
    holiday(5, 1, "May Day"),
    holiday(2, 26, "Maha Shivaratri"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semester {
    /// July to December
    #[default]
    Odd,
    /// January to June
    Even,
}

impl Semester {
    /// Calendar months (1-based) covered by the semester
    pub fn months(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            Semester::Odd => 7..=12,
            Semester::Even => 1..=6,
        }
    }

    fn holidays(&self) -> &'static [FixedHoliday] {
        match self {
            Semester::Odd => ODD_HOLIDAYS,
            Semester::Even => EVEN_HOLIDAYS,
        }
    }

    pub fn title(&self, year: i32) -> String {
        match self {
            Semester::Odd => format!("ACADEMIC CALENDAR ({}-{}) ODD SEMESTER", year, year + 1),
            Semester::Even => format!("ACADEMIC CALENDAR ({}-{}) EVEN SEMESTER", year, year),
        }
    }
}

/// Validate the starting year typed by the user
pub fn parse_start_year(text: &str) -> Result<i32, EditorError> {
    text.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| (MIN_START_YEAR..=MAX_START_YEAR).contains(year))
        .ok_or_else(|| EditorError::InvalidTemplateYear(text.to_string()))
}

/// Everything a template replaces in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOutput {
    pub data: GridData,
    pub merges: Vec<MergeRegion>,
    pub styles: Vec<(CellRange, StyleRecord)>,
    pub column_widths: Vec<u32>,
}

pub struct AcademicCalendar;

impl AcademicCalendar {
    pub fn generate(year: i32, semester: Semester) -> Result<TemplateOutput, EditorError> {
        if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&year) {
            return Err(EditorError::InvalidTemplateYear(year.to_string()));
        }

        let mut builder = CalendarBuilder::default();

        builder.title_row(INSTITUTION_TITLE, "16");
        builder.title_row(&semester.title(year), "14");
        builder.header_row();

        for month in semester.months() {
            builder.month(year, month, semester.holidays())?;
        }

        Ok(builder.finish())
    }
}

#[derive(Default)]
struct CalendarBuilder {
    rows: Vec<Vec<String>>,
    merges: Vec<MergeRegion>,
    styles: Vec<(CellRange, StyleRecord)>,
}

impl CalendarBuilder {
    fn next_row(&self) -> u32 {
        self.rows.len() as u32
    }

    fn push_row(&mut self, mut cells: Vec<String>) -> u32 {
        let row = self.next_row();
        cells.resize(WIDTH, String::new());
        self.rows.push(cells);
        row
    }

    fn row_range(row: u32, cols: u32) -> CellRange {
        CellRange::new(CellCoord::new(row, 0), CellCoord::new(row, cols - 1))
    }

    fn title_row(&mut self, text: &str, size: &str) {
        let row = self.push_row(vec![text.to_string()]);
        self.merges.push(MergeRegion::new(row, 0, 1, TITLE_SPAN));
        self.styles.push((
            Self::row_range(row, TITLE_SPAN),
            StyleRecord::new()
                .with_bold(true)
                .with_size(size)
                .with_alignment(Align::Center),
        ));
    }

    fn header_row(&mut self) {
        let row = self.push_row(HEADER.iter().map(|h| h.to_string()).collect());
        self.styles.push((
            Self::row_range(row, TITLE_SPAN),
            StyleRecord::new().with_bold(true).with_background(HEADER_FILL),
        ));
    }

    fn month(
        &mut self,
        year: i32,
        month: u32,
        holidays: &[FixedHoliday],
    ) -> Result<(), EditorError> {
        let name = MONTH_NAMES[(month - 1) as usize];
        let row = self.push_row(vec![format!("{} - {}", name, year)]);
        self.merges.push(MergeRegion::new(row, 0, 1, TITLE_SPAN));
        self.styles.push((
            Self::row_range(row, TITLE_SPAN),
            StyleRecord::new().with_bold(true).with_alignment(Align::Center),
        ));

        let mut saturdays = 0u32;
        for day in 1..=days_in_month(year, month)? {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| EditorError::InvalidTemplateYear(year.to_string()))?;
            let weekday = date.weekday();

            let mut is_holiday = false;
            let mut event = String::new();
            let mut remark = String::new();

            match weekday {
                Weekday::Sun => {
                    is_holiday = true;
                    event = HOLIDAY.to_string();
                }
                Weekday::Sat => {
                    saturdays += 1;
                    remark = format!("{}{} Sat", saturdays, ordinal_suffix(saturdays));
                    if saturdays % 2 == 0 {
                        is_holiday = true;
                        event = HOLIDAY.to_string();
                    }
                }
                _ => {}
            }

            if let Some(fixed) = holidays.iter().find(|h| h.month == month && h.day == day) {
                is_holiday = true;
                event = fixed.event.to_string();
                remark = HOLIDAY.to_string();
            }

            // pooja days keep only the holiday remark
            if event.to_lowercase().contains("pooja") {
                event.clear();
                if remark != HOLIDAY {
                    remark.clear();
                }
            }

            let mark = if is_holiday { HOLIDAY_MARK } else { "" };
            let mut cells = vec![
                format!("{}-{}", day, &name[..3]),
                weekday_abbrev(weekday).to_string(),
                mark.to_string(),
                mark.to_string(),
            ];
            cells.resize(WIDTH, String::new());
            cells[EVENT_COL] = event;
            cells[REMARK_COL] = remark;

            let merge_event = !cells[EVENT_COL].is_empty() && cells[REMARK_COL].is_empty();
            let row = self.push_row(cells);

            if merge_event {
                self.merges.push(MergeRegion::new(row, EVENT_COL as u32, 1, 2));
            }
            if is_holiday {
                self.styles.push((
                    Self::row_range(row, TITLE_SPAN),
                    StyleRecord::new().with_color(HOLIDAY_RED),
                ));
            }
        }

        Ok(())
    }

    fn finish(self) -> TemplateOutput {
        TemplateOutput {
            data: GridData::from_rows(self.rows),
            merges: self.merges,
            styles: self.styles,
            column_widths: COLUMN_WIDTHS.to_vec(),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> Result<u32, EditorError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => Ok((next - first).num_days() as u32),
        _ => Err(EditorError::InvalidTemplateYear(year.to_string())),
    }
}

fn ordinal_suffix(n: u32) -> &'static str {
    match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_row(output: &TemplateOutput, date: &str) -> (u32, Vec<String>) {
        output
            .data
            .rows()
            .iter()
            .enumerate()
            .find(|(_, row)| row[0] == date)
            .map(|(i, row)| (i as u32, row.clone()))
            .unwrap()
    }

    #[test]
    fn test_parse_start_year() {
        assert_eq!(parse_start_year("2024"), Ok(2024));
        assert_eq!(parse_start_year(" 2000 "), Ok(2000));
        assert_eq!(
            parse_start_year("1999"),
            Err(EditorError::InvalidTemplateYear("1999".into()))
        );
        assert!(parse_start_year("2101").is_err());
        assert!(parse_start_year("twenty").is_err());
        assert!(parse_start_year("").is_err());
    }

    #[test]
    fn test_generate_rejects_out_of_range_year() {
        assert!(AcademicCalendar::generate(1999, Semester::Odd).is_err());
    }

    #[test]
    fn test_odd_semester_layout() {
        let output = AcademicCalendar::generate(2024, Semester::Odd).unwrap();
        let rows = output.data.rows();

        assert_eq!(rows[0][0], INSTITUTION_TITLE);
        assert_eq!(rows[1][0], "ACADEMIC CALENDAR (2024-2025) ODD SEMESTER");
        assert_eq!(rows[2], HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>());
        assert_eq!(rows[3][0], "July - 2024");

        // 3 title rows + 6 month titles + 184 days (Jul..Dec)
        assert_eq!(output.data.row_count(), 3 + 6 + 184);
        assert_eq!(output.data.col_count(), 7);
        assert_eq!(output.column_widths, vec![80, 70, 120, 120, 250, 100, 50]);

        assert!(output.merges.contains(&MergeRegion::new(0, 0, 1, 6)));
        assert!(output.merges.contains(&MergeRegion::new(1, 0, 1, 6)));
        assert!(output.merges.contains(&MergeRegion::new(3, 0, 1, 6)));
    }

    #[test]
    fn test_weekdays_and_saturdays() {
        let output = AcademicCalendar::generate(2024, Semester::Odd).unwrap();

        // 1 July 2024 was a Monday
        let (_, monday) = find_row(&output, "1-Jul");
        assert_eq!(monday[1], "Mon");
        assert_eq!(monday[2], "");

        // first Saturday: a working day with a remark
        let (_, first_sat) = find_row(&output, "6-Jul");
        assert_eq!(first_sat[1], "Sat");
        assert_eq!(first_sat[2], "");
        assert_eq!(first_sat[5], "1st Sat");

        // second Saturday: holiday
        let (_, second_sat) = find_row(&output, "13-Jul");
        assert_eq!(second_sat[2], "H");
        assert_eq!(second_sat[3], "H");
        assert_eq!(second_sat[4], "Holiday");
        assert_eq!(second_sat[5], "2nd Sat");

        // Sunday: holiday with events merged over remarks
        let (row, sunday) = find_row(&output, "7-Jul");
        assert_eq!(sunday[1], "Sun");
        assert_eq!(sunday[4], "Holiday");
        assert_eq!(sunday[5], "");
        assert!(output.merges.contains(&MergeRegion::new(row, 4, 1, 2)));
    }

    #[test]
    fn test_fixed_holidays() {
        let output = AcademicCalendar::generate(2024, Semester::Odd).unwrap();

        let (row, independence) = find_row(&output, "15-Aug");
        assert_eq!(independence[2], "H");
        assert_eq!(independence[4], "Independence Day");
        assert_eq!(independence[5], "Holiday");
        assert!(!output.merges.contains(&MergeRegion::new(row, 4, 1, 2)));

        let (_, pooja) = find_row(&output, "11-Oct");
        assert_eq!(pooja[2], "H");
        assert_eq!(pooja[4], "");
        assert_eq!(pooja[5], "Holiday");
    }

    #[test]
    fn test_even_semester_covers_january_to_june() {
        let output = AcademicCalendar::generate(2024, Semester::Even).unwrap();
        let rows = output.data.rows();

        assert_eq!(rows[1][0], "ACADEMIC CALENDAR (2024-2024) EVEN SEMESTER");
        assert_eq!(rows[3][0], "January - 2024");

        let february_days = rows.iter().filter(|r| r[0].ends_with("-Feb")).count();
        assert_eq!(february_days, 29);

        assert!(rows.iter().any(|r| r[0] == "June - 2024"));
        assert!(!rows.iter().any(|r| r[0].starts_with("July")));

        let (_, republic) = find_row(&output, "26-Jan");
        assert_eq!(republic[4], "Republic Day");
    }

    #[test]
    fn test_merges_never_overlap() {
        for semester in [Semester::Odd, Semester::Even] {
            let output = AcademicCalendar::generate(2025, semester).unwrap();
            for (i, a) in output.merges.iter().enumerate() {
                assert!(a.is_valid());
                for b in &output.merges[i + 1..] {
                    assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_holiday_rows_are_red() {
        let output = AcademicCalendar::generate(2024, Semester::Odd).unwrap();
        let (row, _) = find_row(&output, "15-Aug");
        let styled = output
            .styles
            .iter()
            .find(|(range, _)| range.contains(CellCoord::new(row, 0)))
            .map(|(_, record)| record)
            .unwrap();
        assert_eq!(styled.color.as_deref(), Some(HOLIDAY_RED));
    }
}
