//! iCalendar (RFC 5545) export of a plan
//!
//! Each placed course becomes one VEVENT. Courses with a registered section
//! whose meeting times parse get a weekly recurring timed event; everything
//! else falls back to an all-day event spanning the whole semester. Output
//! uses CRLF line endings as the format requires.

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{PlannedCourse, Semester, Term};

/// A scheduled offering of a course, with human-readable meeting times
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    pub id: String,
    pub course_id: String,
    pub section_number: String,
    pub professor: String,
    pub seats_total: u32,
    pub seats_open: u32,
    /// e.g. "MWF 9:00-9:50 AM" or "TR 10:30 AM-11:45 AM"
    pub meeting_times: String,
}

/// One calendar event, ready for serialization
#[derive(Debug, Clone)]
pub struct IcsEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    /// YYYYMMDD for all-day, YYYYMMDDTHHMMSS for timed
    pub dtstart: String,
    pub dtend: String,
    pub rrule: Option<String>,
}

struct MeetingPattern {
    /// Two-letter RFC 5545 day codes, e.g. ["MO", "WE", "FR"]
    days: Vec<&'static str>,
    /// HHMMSS
    start_time: String,
    end_time: String,
}

fn day_code(c: char) -> Option<&'static str> {
    match c.to_ascii_uppercase() {
        'M' => Some("MO"),
        'T' => Some("TU"),
        'W' => Some("WE"),
        'R' => Some("TH"),
        'F' => Some("FR"),
        'S' => Some("SA"),
        'U' => Some("SU"),
        _ => None,
    }
}

fn day_index(code: &str) -> u32 {
    match code {
        "SU" => 0,
        "MO" => 1,
        "TU" => 2,
        "WE" => 3,
        "TH" => 4,
        "FR" => 5,
        _ => 6,
    }
}

fn to_24h(time: &str, period: Option<&str>) -> Option<String> {
    let (h, m) = time.split_once(':')?;
    let mut hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    match period.map(|p| p.to_ascii_uppercase()) {
        Some(p) if p == "PM" && hours != 12 => hours += 12,
        Some(p) if p == "AM" && hours == 12 => hours = 0,
        _ => {}
    }
    Some(format!("{:02}{:02}00", hours, minutes))
}

/// Parse meeting times like "MWF 9:00-9:50 AM" or "TR 10:30 AM-11:45 AM"
///
/// A start time without its own AM/PM marker inherits the end time's.
fn parse_meeting_time(raw: &str) -> Option<MeetingPattern> {
    let re = Regex::new(r"(?i)^([MTWRFSU]+)\s+(\d{1,2}:\d{2})\s*(AM|PM)?-(\d{1,2}:\d{2})\s*(AM|PM)?$").ok()?;
    let caps = re.captures(raw.trim())?;

    let days: Vec<&'static str> = caps[1].chars().filter_map(day_code).collect();
    if days.is_empty() {
        return None;
    }

    let start_period = caps.get(3).or(caps.get(5)).map(|m| m.as_str());
    let end_period = caps.get(5).map(|m| m.as_str());

    Some(MeetingPattern {
        days,
        start_time: to_24h(&caps[2], start_period)?,
        end_time: to_24h(&caps[4], end_period)?,
    })
}

/// Term boundaries for a given calendar year
///
/// Winter has no published range here and reuses the fall window.
fn semester_window(term: Term, year: i32) -> (NaiveDate, NaiveDate) {
    let (sm, sd, em, ed) = match term {
        Term::Spring => (1, 13, 5, 9),
        Term::Summer => (5, 19, 8, 8),
        Term::Fall | Term::Winter => (8, 26, 12, 13),
    };
    let fallback = (
        NaiveDate::from_ymd_opt(year, 8, 26).unwrap_or_default(),
        NaiveDate::from_ymd_opt(year, 12, 13).unwrap_or_default(),
    );
    match (
        NaiveDate::from_ymd_opt(year, sm, sd),
        NaiveDate::from_ymd_opt(year, em, ed),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => fallback,
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn semester_span_event(course: &PlannedCourse, semester: &Semester) -> IcsEvent {
    let (start, end) = semester_window(semester.term, semester.year);
    IcsEvent {
        uid: format!("{}-{}@planner", course.course.id, semester.id),
        summary: format!("{} - {}", course.course.code, course.course.title),
        description: format!(
            "{}\\n{} credits\\n{}",
            course.course.title,
            course.course.credits,
            course.course.description.as_deref().unwrap_or("")
        ),
        location: None,
        dtstart: format_date(start),
        dtend: format_date(end),
        rrule: None,
    }
}

fn recurring_event(course: &PlannedCourse, section: &CourseSection, semester: &Semester) -> Option<IcsEvent> {
    let pattern = parse_meeting_time(&section.meeting_times)?;
    let (window_start, window_end) = semester_window(semester.term, semester.year);

    // First occurrence: earliest meeting day on or after the window start
    let first_day = pattern.days.iter().map(|d| day_index(d)).min()?;
    let mut start = window_start;
    while start.weekday().num_days_from_sunday() != first_day {
        start = start.succ_opt()?;
    }

    Some(IcsEvent {
        uid: format!("{}-{}-{}@planner", course.course.id, section.id, semester.id),
        summary: format!("{} - {}", course.course.code, course.course.title),
        description: format!(
            "Professor: {}\\nSection: {}\\n{} credits",
            section.professor, section.section_number, course.course.credits
        ),
        location: Some("TBD".to_string()),
        dtstart: format!("{}T{}", format_date(start), pattern.start_time),
        dtend: format!("{}T{}", format_date(start), pattern.end_time),
        rrule: Some(format!(
            "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}T235959Z",
            pattern.days.join(","),
            format_date(window_end)
        )),
    })
}

fn render_calendar(events: &[IcsEvent]) -> String {
    let dtstamp = Utc::now().format("%Y%m%dT%H%M%S").to_string();

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//4-Year Planner//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "X-WR-CALNAME:My Academic Plan".to_string(),
        "X-WR-TIMEZONE:America/New_York".to_string(),
    ];

    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", event.uid));
        lines.push(format!("DTSTAMP:{}Z", dtstamp));
        let start_marker = if event.dtstart.contains('T') { "" } else { ";VALUE=DATE" };
        let end_marker = if event.dtend.contains('T') { "" } else { ";VALUE=DATE" };
        lines.push(format!("DTSTART{}:{}", start_marker, event.dtstart));
        lines.push(format!("DTEND{}:{}", end_marker, event.dtend));
        lines.push(format!("SUMMARY:{}", event.summary));
        lines.push(format!("DESCRIPTION:{}", event.description));
        if let Some(location) = &event.location {
            lines.push(format!("LOCATION:{}", location));
        }
        if let Some(rrule) = &event.rrule {
            lines.push(rrule.clone());
        }
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

/// Render semesters as a VCALENDAR document
///
/// `selected` filters exported courses by id when non-empty. A section whose
/// meeting times fail to parse degrades to the all-day fallback rather than
/// dropping the course.
pub fn export_plan(semesters: &[Semester], sections: &[CourseSection], selected: &[String]) -> String {
    let mut events = Vec::new();

    for semester in semesters {
        for course in &semester.courses {
            if !selected.is_empty() && !selected.contains(&course.course.id) {
                continue;
            }

            let section = sections.iter().find(|s| s.course_id == course.course.id);
            let event = match section {
                Some(section) => match recurring_event(course, section, semester) {
                    Some(e) => e,
                    None => {
                        warn!(
                            course = %course.course.code,
                            meeting_times = %section.meeting_times,
                            "Unparseable meeting times, exporting semester-span event"
                        );
                        semester_span_event(course, semester)
                    }
                },
                None => semester_span_event(course, semester),
            };
            events.push(event);
        }
    }

    debug!(event_count = events.len(), "export_plan: rendering calendar");
    render_calendar(&events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, CourseStatus, CourseType};

    fn sample_course(id: &str, code: &str) -> PlannedCourse {
        PlannedCourse {
            course: Course {
                id: id.to_string(),
                code: code.to_string(),
                title: "Data Structures".to_string(),
                credits: 3,
                description: Some("Trees and graphs.".to_string()),
                prerequisites: vec![],
                prereq_expression: None,
                offered_terms: vec![Term::Fall],
                course_type: CourseType::Core,
                requirement_bucket: None,
            },
            status: CourseStatus::Planned,
            grade: None,
            grade_points: None,
            semester_id: "fall-2024".to_string(),
        }
    }

    fn fall_semester() -> Semester {
        let mut sem = Semester::new(Term::Fall, 2024, "Fall Y1", 18);
        sem.courses.push(sample_course("cs-201", "CS-201"));
        sem
    }

    fn section(meeting: &str) -> CourseSection {
        CourseSection {
            id: "cs201-001".to_string(),
            course_id: "cs-201".to_string(),
            section_number: "001".to_string(),
            professor: "Dr. Sarah Chen".to_string(),
            seats_total: 35,
            seats_open: 8,
            meeting_times: meeting.to_string(),
        }
    }

    #[test]
    fn test_parse_mwf_with_trailing_period() {
        let p = parse_meeting_time("MWF 9:00-9:50 AM").unwrap();
        assert_eq!(p.days, vec!["MO", "WE", "FR"]);
        // Start inherits the end's AM marker
        assert_eq!(p.start_time, "090000");
        assert_eq!(p.end_time, "095000");
    }

    #[test]
    fn test_parse_tr_with_both_periods() {
        let p = parse_meeting_time("TR 10:30 AM-11:45 AM").unwrap();
        assert_eq!(p.days, vec!["TU", "TH"]);
        assert_eq!(p.start_time, "103000");
        assert_eq!(p.end_time, "114500");
    }

    #[test]
    fn test_parse_pm_conversion() {
        let p = parse_meeting_time("MWF 2:00-2:50 PM").unwrap();
        assert_eq!(p.start_time, "140000");
        assert_eq!(p.end_time, "145000");
    }

    #[test]
    fn test_parse_noon_and_midnight_edges() {
        let p = parse_meeting_time("M 12:00 PM-1:15 PM").unwrap();
        assert_eq!(p.start_time, "120000");
        let p = parse_meeting_time("M 12:00 AM-1:15 AM").unwrap();
        assert_eq!(p.start_time, "000000");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_meeting_time("whenever").is_none());
        assert!(parse_meeting_time("XYZ 9:00-9:50 AM").is_none());
        assert!(parse_meeting_time("").is_none());
    }

    #[test]
    fn test_semester_windows() {
        assert_eq!(
            semester_window(Term::Fall, 2024),
            (
                NaiveDate::from_ymd_opt(2024, 8, 26).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 13).unwrap()
            )
        );
        assert_eq!(
            semester_window(Term::Spring, 2025),
            (
                NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 9).unwrap()
            )
        );
        assert_eq!(
            semester_window(Term::Summer, 2025),
            (
                NaiveDate::from_ymd_opt(2025, 5, 19).unwrap(),
                NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
            )
        );
    }

    #[test]
    fn test_fallback_event_is_all_day() {
        let sem = fall_semester();
        let ics = export_plan(std::slice::from_ref(&sem), &[], &[]);

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.ends_with("END:VCALENDAR"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20240826"));
        assert!(ics.contains("DTEND;VALUE=DATE:20241213"));
        assert!(ics.contains("SUMMARY:CS-201 - Data Structures"));
        assert!(ics.contains("UID:cs-201-fall-2024@planner"));
        assert!(!ics.contains("RRULE"));
    }

    #[test]
    fn test_recurring_event_with_section() {
        let sem = fall_semester();
        let ics = export_plan(std::slice::from_ref(&sem), &[section("MWF 9:00-9:50 AM")], &[]);

        // Aug 26 2024 is a Monday, the earliest MWF day
        assert!(ics.contains("DTSTART:20240826T090000"));
        assert!(ics.contains("DTEND:20240826T095000"));
        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL=20241213T235959Z"));
        assert!(ics.contains("LOCATION:TBD"));
        assert!(ics.contains("Professor: Dr. Sarah Chen"));
    }

    #[test]
    fn test_unparseable_section_degrades_to_all_day() {
        let sem = fall_semester();
        let ics = export_plan(std::slice::from_ref(&sem), &[section("arranged")], &[]);

        assert!(ics.contains("DTSTART;VALUE=DATE:20240826"));
        assert!(!ics.contains("RRULE"));
    }

    #[test]
    fn test_selected_filter() {
        let mut sem = fall_semester();
        sem.courses.push(sample_course("cs-202", "CS-202"));

        let ics = export_plan(std::slice::from_ref(&sem), &[], &["cs-202".to_string()]);
        assert!(!ics.contains("UID:cs-201-"));
        assert!(ics.contains("UID:cs-202-"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let sem = fall_semester();
        let ics = export_plan(std::slice::from_ref(&sem), &[], &[]);
        assert!(ics.contains("\r\n"));
        // No bare LF anywhere
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }
}
