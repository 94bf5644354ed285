use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::model::{attendance_record::AttendanceRow, attendance_type::PunchKind};

/// Punches of one employee on one day, earliest time per kind.
#[derive(Debug, Clone)]
pub struct DayPunches {
    pub employee_id: u64,
    pub employee_name: String,
    pub date: NaiveDate,
    times: HashMap<PunchKind, NaiveTime>,
}

impl DayPunches {
    pub fn new(employee_id: u64, employee_name: String, date: NaiveDate) -> Self {
        Self {
            employee_id,
            employee_name,
            date,
            times: HashMap::new(),
        }
    }

    /// Keeps the first time seen for a kind.
    pub fn record(&mut self, kind: PunchKind, time: NaiveTime) {
        self.times
            .entry(kind)
            .and_modify(|t| *t = (*t).min(time))
            .or_insert(time);
    }

    pub fn time_of(&self, kind: PunchKind) -> Option<NaiveTime> {
        self.times.get(&kind).copied()
    }

    fn span(&self, from: PunchKind, to: PunchKind) -> TimeDelta {
        match (self.time_of(from), self.time_of(to)) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        }
    }

    pub fn hours(&self) -> DailyHours {
        let lunch = self.span(PunchKind::InicioAlmuerzo, PunchKind::FinAlmuerzo);
        let errand = self.span(PunchKind::SalidaComision, PunchKind::EntradaComision);
        let permission = self.span(PunchKind::SalidaOtros, PunchKind::EntradaOtros);
        let worked = match (
            self.time_of(PunchKind::Entrada),
            self.time_of(PunchKind::Salida),
        ) {
            (Some(_), Some(_)) => self.span(PunchKind::Entrada, PunchKind::Salida) - lunch - permission,
            _ => TimeDelta::zero(),
        };

        DailyHours {
            lunch,
            errand,
            permission,
            worked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyHours {
    pub lunch: TimeDelta,
    pub errand: TimeDelta,
    pub permission: TimeDelta,
    pub worked: TimeDelta,
}

/// One line of the daily summary, durations already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub employee_id: u64,
    pub employee_name: String,
    pub date: NaiveDate,
    pub lunch: String,
    pub errand: String,
    pub permission: String,
    pub worked: String,
}

/// Groups rows by (employee, date) in that order. Rows whose label is not
/// part of the punch vocabulary are ignored.
pub fn group_by_employee_day(rows: &[AttendanceRow]) -> Vec<DayPunches> {
    let mut days: BTreeMap<(u64, NaiveDate), DayPunches> = BTreeMap::new();

    for row in rows {
        let day = days
            .entry((row.employee_id, row.date))
            .or_insert_with(|| DayPunches::new(row.employee_id, row.employee_name(), row.date));
        if let Some(kind) = PunchKind::from_label(&row.type_label) {
            day.record(kind, row.time);
        }
    }

    days.into_values().collect()
}

pub fn daily_summaries(rows: &[AttendanceRow]) -> Vec<DailySummary> {
    group_by_employee_day(rows)
        .into_iter()
        .map(|day| {
            let hours = day.hours();
            DailySummary {
                employee_id: day.employee_id,
                employee_name: day.employee_name,
                date: day.date,
                lunch: format_hhmm(hours.lunch),
                errand: format_hhmm(hours.errand),
                permission: format_hhmm(hours.permission),
                worked: format_hhmm(hours.worked),
            }
        })
        .collect()
}

/// Zero-padded `HH:MM`; minutes truncate and negative spans clamp to zero.
pub fn format_hhmm(delta: TimeDelta) -> String {
    let total_minutes = delta.num_minutes().max(0);
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}
