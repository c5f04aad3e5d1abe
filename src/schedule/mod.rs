//! Bell schedule resolution and write-time validation.
//!
//! Resolution picks the schedule that applies to a calendar day: an Override
//! listing that day wins over any Standard schedule recurring on its weekday.

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::errors::AppError;
use crate::models::{BellSchedule, ScheduleType, Slot, SlotKind, SlotRequest, Weekday};

/// Pick the schedule that applies on `date`.
///
/// `schedules` must already be narrowed to one school and grade. Ties go to
/// the first match in slice order.
pub fn resolve_schedule(schedules: &[BellSchedule], date: NaiveDate) -> Option<&BellSchedule> {
    let weekday = Weekday::from(date.weekday());

    schedules
        .iter()
        .find(|s| s.schedule_type == ScheduleType::Override && s.dates.contains(&date))
        .or_else(|| {
            schedules
                .iter()
                .find(|s| s.schedule_type == ScheduleType::Standard && s.days.contains(&weekday))
        })
}

/// Validated schedule contents, ready to persist.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub schedule_type: ScheduleType,
    pub days: Vec<Weekday>,
    pub dates: Vec<NaiveDate>,
    pub grades: Vec<String>,
    pub slots: Vec<Slot>,
}

impl ScheduleDraft {
    /// Normalize and validate schedule contents.
    ///
    /// The list that does not belong to `schedule_type` is dropped; the one
    /// that does must be non-empty.
    pub fn new(
        schedule_type: ScheduleType,
        days: Option<Vec<Weekday>>,
        dates: Option<Vec<NaiveDate>>,
        grades: Vec<String>,
        slots: Vec<Slot>,
    ) -> Result<Self, AppError> {
        let (days, dates) = match schedule_type {
            ScheduleType::Standard => {
                let days = days.unwrap_or_default();
                if days.is_empty() {
                    return Err(AppError::Validation(
                        "Standard schedules require at least one day".to_string(),
                    ));
                }
                (dedup(days), Vec::new())
            }
            ScheduleType::Override => {
                let dates = dates.unwrap_or_default();
                if dates.is_empty() {
                    return Err(AppError::Validation(
                        "Override schedules require at least one date".to_string(),
                    ));
                }
                (Vec::new(), dedup(dates))
            }
        };

        let grades: Vec<String> = grades
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        if grades.is_empty() {
            return Err(AppError::Validation(
                "At least one grade is required".to_string(),
            ));
        }

        if slots.is_empty() {
            return Err(AppError::Validation(
                "At least one slot is required".to_string(),
            ));
        }

        Ok(Self {
            schedule_type,
            days,
            dates,
            grades: dedup(grades),
            slots,
        })
    }
}

/// Validate submitted slots and assign them fresh ids.
pub fn build_slots(requests: Vec<SlotRequest>) -> Result<Vec<Slot>, AppError> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| {
            let start = parse_slot_time(&request.start_time, index)?;
            let end = parse_slot_time(&request.end_time, index)?;
            if end <= start {
                return Err(AppError::Validation(format!(
                    "Slot {} ends before it starts",
                    index + 1
                )));
            }
            if request.kind == SlotKind::Period && request.period_number.is_none() {
                return Err(AppError::Validation(format!(
                    "Slot {} is a Period and needs a period number",
                    index + 1
                )));
            }

            Ok(Slot {
                id: uuid::Uuid::new_v4().to_string(),
                start_time: start.format("%H:%M").to_string(),
                end_time: end.format("%H:%M").to_string(),
                kind: request.kind,
                period_number: request.period_number,
            })
        })
        .collect()
}

fn parse_slot_time(raw: &str, index: usize) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
        AppError::Validation(format!(
            "Slot {} has an invalid time '{}', expected HH:MM",
            index + 1,
            raw
        ))
    })
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(id: &str, schedule_type: ScheduleType) -> BellSchedule {
        BellSchedule {
            id: id.to_string(),
            school: "school-1".to_string(),
            schedule_type,
            days: Vec::new(),
            dates: Vec::new(),
            grades: vec!["9".to_string()],
            slots: Vec::new(),
            created_by: "staff-1".to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn standard(id: &str, days: &[Weekday]) -> BellSchedule {
        let mut s = schedule(id, ScheduleType::Standard);
        s.days = days.to_vec();
        s
    }

    fn overriding(id: &str, dates: &[NaiveDate]) -> BellSchedule {
        let mut s = schedule(id, ScheduleType::Override);
        s.dates = dates.to_vec();
        s
    }

    fn period(start: &str, end: &str, n: i32) -> SlotRequest {
        SlotRequest {
            start_time: start.to_string(),
            end_time: end.to_string(),
            kind: SlotKind::Period,
            period_number: Some(n),
        }
    }

    #[test]
    fn test_override_beats_matching_standard() {
        // 2024-01-15 is a Monday
        let schedules = vec![
            standard("weekly", &[Weekday::Monday, Weekday::Tuesday]),
            overriding("assembly", &[date(2024, 1, 15)]),
        ];

        let picked = resolve_schedule(&schedules, date(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, "assembly");
    }

    #[test]
    fn test_standard_used_when_no_override_matches() {
        let schedules = vec![
            overriding("assembly", &[date(2024, 1, 22)]),
            standard("weekly", &[Weekday::Monday]),
        ];

        let picked = resolve_schedule(&schedules, date(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, "weekly");
    }

    #[test]
    fn test_no_match_resolves_to_none() {
        let schedules = vec![
            standard("weekdays", &[Weekday::Monday, Weekday::Friday]),
            overriding("assembly", &[date(2024, 1, 22)]),
        ];

        // Saturday
        assert!(resolve_schedule(&schedules, date(2024, 1, 20)).is_none());
        assert!(resolve_schedule(&[], date(2024, 1, 20)).is_none());
    }

    #[test]
    fn test_first_match_wins_on_ties() {
        let schedules = vec![
            standard("newer", &[Weekday::Wednesday]),
            standard("older", &[Weekday::Wednesday]),
        ];

        let picked = resolve_schedule(&schedules, date(2024, 1, 17)).unwrap();
        assert_eq!(picked.id, "newer");
    }

    #[test]
    fn test_standard_ignores_stray_dates() {
        // Dates on a Standard schedule never count toward override matching.
        let mut s = standard("weekly", &[Weekday::Tuesday]);
        s.dates = vec![date(2024, 1, 15)];
        assert!(resolve_schedule(&[s], date(2024, 1, 15)).is_none());
    }

    #[test]
    fn test_draft_drops_dates_from_standard() {
        let slots = build_slots(vec![period("08:00", "08:50", 1)]).unwrap();
        let draft = ScheduleDraft::new(
            ScheduleType::Standard,
            Some(vec![Weekday::Monday, Weekday::Monday]),
            Some(vec![date(2024, 1, 15)]),
            vec![" 9 ".to_string(), "10".to_string(), "".to_string()],
            slots,
        )
        .unwrap();

        assert_eq!(draft.days, vec![Weekday::Monday]);
        assert!(draft.dates.is_empty());
        assert_eq!(draft.grades, vec!["9".to_string(), "10".to_string()]);
    }

    #[test]
    fn test_draft_requires_dates_for_override() {
        let slots = build_slots(vec![period("08:00", "08:50", 1)]).unwrap();
        let err = ScheduleDraft::new(
            ScheduleType::Override,
            Some(vec![Weekday::Monday]),
            None,
            vec!["9".to_string()],
            slots,
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_draft_requires_grades_and_slots() {
        let err = ScheduleDraft::new(
            ScheduleType::Standard,
            Some(vec![Weekday::Monday]),
            None,
            vec!["9".to_string()],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let slots = build_slots(vec![period("08:00", "08:50", 1)]).unwrap();
        let err = ScheduleDraft::new(
            ScheduleType::Standard,
            Some(vec![Weekday::Monday]),
            None,
            vec!["  ".to_string()],
            slots,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_period_slot_needs_number() {
        let mut slot = period("08:00", "08:50", 1);
        slot.period_number = None;
        assert!(build_slots(vec![slot]).is_err());

        let lunch = SlotRequest {
            start_time: "12:00".to_string(),
            end_time: "12:30".to_string(),
            kind: SlotKind::Lunch,
            period_number: None,
        };
        let slots = build_slots(vec![lunch]).unwrap();
        assert_eq!(slots[0].kind, SlotKind::Lunch);
        assert!(slots[0].period_number.is_none());
    }

    #[test]
    fn test_slot_times_are_checked() {
        assert!(build_slots(vec![period("8am", "08:50", 1)]).is_err());
        assert!(build_slots(vec![period("09:00", "08:50", 1)]).is_err());

        let slots = build_slots(vec![period("8:05", "8:55", 1)]).unwrap();
        assert_eq!(slots[0].start_time, "08:05");
        assert_eq!(slots[0].end_time, "08:55");
    }
}
