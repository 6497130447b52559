use chrono::NaiveDate;
use recurrent_rfc::rfc::ical::{parse, serialize};

use super::*;

const CALENDAR: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
DTSTAMP:20240101T080000Z\r\n\
SEQUENCE:2\r\n\
DTSTART;TZID=Europe/Berlin:20240108T093000\r\n\
DTEND;TZID=Europe/Berlin:20240108T094500\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\r\n\
EXDATE;TZID=Europe/Berlin:20240110T093000\r\n\
SUMMARY:Standup\r\n\
LOCATION:Room 4\r\n\
PRIORITY:5\r\n\
CATEGORIES:WORK,DAILY\r\n\
ATTENDEE;CN=Ana;PARTSTAT=ACCEPTED:mailto:ana@example.com\r\n\
URL:https://example.com/standup\r\n\
X-COLOR:teal\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT5M\r\n\
DESCRIPTION:Standup\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
DTSTAMP:20240101T080000Z\r\n\
RECURRENCE-ID;TZID=Europe/Berlin:20240112T093000\r\n\
DTSTART;TZID=Europe/Berlin:20240112T110000\r\n\
DTEND;TZID=Europe/Berlin:20240112T111500\r\n\
SUMMARY:Standup (late)\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
UID:orphan@example.com\r\n\
DTSTAMP:20240101T080000Z\r\n\
RECURRENCE-ID:20240201T090000Z\r\n\
DTSTART:20240201T090000Z\r\n\
DUE:20240201T100000Z\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

fn berlin(day: u32, hour: u32, minute: u32) -> Temporal {
    Temporal::zoned(
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap(),
        "Europe/Berlin",
    )
}

fn floating(day: u32, hour: u32) -> Temporal {
    Temporal::floating(
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap(),
    )
}

fn grouped() -> Vec<RecurringComponent> {
    RecurringComponent::group(&parse(CALENDAR).unwrap()).unwrap()
}

fn simple_event() -> RecurringComponent {
    let mut c = RecurringComponent::new(RecurringKind::Event, "event-1");
    c.dtstart = Some(floating(8, 9));
    c.end = Some(ComponentEnd::At(floating(8, 10)));
    c
}

#[test_log::test]
fn group_reads_typed_fields_and_overrides() {
    let components = grouped();
    assert_eq!(components.len(), 2);

    let master = &components[0];
    assert_eq!(master.kind, RecurringKind::Event);
    assert_eq!(master.uid, "standup@example.com");
    assert_eq!(master.sequence, 2);
    assert_eq!(master.dtstart, Some(berlin(8, 9, 30)));
    assert_eq!(master.duration(), Some(TimeDelta::minutes(15)));
    assert_eq!(master.exdates, vec![berlin(10, 9, 30)]);
    assert_eq!(master.summary.as_deref(), Some("Standup"));
    assert_eq!(master.priority, Some(5));
    assert_eq!(master.categories, vec!["WORK", "DAILY"]);
    assert_eq!(master.attendees.len(), 1);
    assert_eq!(master.url.as_deref(), Some("https://example.com/standup"));
    assert_eq!(master.other.len(), 1);
    assert_eq!(master.other[0].name, "X-COLOR");
    assert_eq!(master.children.len(), 1);

    assert_eq!(master.overrides.len(), 1);
    let child = &master.overrides[&berlin(12, 9, 30)];
    assert_eq!(child.dtstart, Some(berlin(12, 11, 0)));
    assert_eq!(child.key().recurrence_id, Some(berlin(12, 9, 30)));
    assert!(master.validate().is_ok());

    let orphan = &components[1];
    assert_eq!(orphan.kind, RecurringKind::Todo);
    assert!(orphan.recurrence_id.is_some());
}

#[test_log::test]
fn group_keys_overrides_in_master_form() {
    let text = CALENDAR.replace(
        "RECURRENCE-ID;TZID=Europe/Berlin:20240112T093000",
        "RECURRENCE-ID:20240112T083000Z",
    );
    let components = RecurringComponent::group(&parse(&text).unwrap()).unwrap();
    let master = &components[0];
    assert_eq!(
        master.overrides.keys().collect::<Vec<_>>(),
        vec![&berlin(12, 9, 30)]
    );
    assert_eq!(
        master.overrides[&berlin(12, 9, 30)].recurrence_id,
        Some(berlin(12, 9, 30))
    );
}

#[test_log::test]
fn component_text_is_stable() {
    let components = grouped();
    let mut ical = ICalendar::new("-//Example//Example//EN");
    for component in &components {
        for part in component.to_components() {
            ical.add_component(part);
        }
    }
    let text = serialize(&ical);
    let reread = RecurringComponent::group(&parse(&text).unwrap()).unwrap();
    assert_eq!(reread, components);
}

#[test_log::test]
fn validate_reports_first_problem() {
    let mut missing_uid = simple_event();
    missing_uid.uid = " ".to_owned();
    assert!(matches!(missing_uid.validate(), Err(ComponentError::MissingUid)));

    let mut missing_start = simple_event();
    missing_start.dtstart = None;
    assert!(matches!(
        missing_start.validate(),
        Err(ComponentError::MissingStart)
    ));

    let mut backwards = simple_event();
    backwards.end = Some(ComponentEnd::At(floating(8, 8)));
    assert!(matches!(
        backwards.validate(),
        Err(ComponentError::EndBeforeStart("DTEND"))
    ));

    let mut mixed = simple_event();
    mixed.end = Some(ComponentEnd::At(Temporal::date(
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
    )));
    assert!(matches!(
        mixed.validate(),
        Err(ComponentError::MismatchedEnd("DTEND"))
    ));

    let mut journal = simple_event();
    journal.kind = RecurringKind::Journal;
    assert!(matches!(
        journal.validate(),
        Err(ComponentError::JournalWithEnd)
    ));

    let mut bad_rule = simple_event();
    bad_rule.dtstart = Some(Temporal::date(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
    bad_rule.end = None;
    bad_rule.rrule = Some("FREQ=HOURLY".parse().unwrap());
    assert!(matches!(
        bad_rule.validate(),
        Err(ComponentError::InvalidRule(_))
    ));
}

#[test_log::test]
fn validate_checks_overrides() {
    let mut series = simple_event();
    series.rrule = Some("FREQ=DAILY".parse().unwrap());

    let mut child = simple_event();
    child.recurrence_id = Some(floating(9, 9));
    child.dtstart = Some(floating(9, 11));
    child.end = None;

    let mut mismatched = series.clone();
    mismatched.overrides.insert(floating(10, 9), child.clone());
    assert!(matches!(
        mismatched.validate(),
        Err(ComponentError::OverrideKeyMismatch { .. })
    ));

    let mut foreign = series.clone();
    let mut other_uid = child.clone();
    other_uid.uid = "event-2".to_owned();
    foreign.overrides.insert(floating(9, 9), other_uid);
    assert!(matches!(
        foreign.validate(),
        Err(ComponentError::OverrideUidMismatch(_))
    ));

    let mut recurring = series.clone();
    let mut repeating_child = child.clone();
    repeating_child.rrule = series.rrule.clone();
    recurring.overrides.insert(floating(9, 9), repeating_child);
    assert!(matches!(
        recurring.validate(),
        Err(ComponentError::RecurringOverride(_))
    ));

    series.overrides.insert(floating(9, 9), child);
    assert!(series.validate().is_ok());
}

#[test_log::test]
fn changed_properties_compares_fields() {
    let original = simple_event();
    assert!(original.changed_properties(&original).is_empty());

    let mut edited = original.clone();
    edited.summary = Some("Planning".to_owned());
    edited.end = Some(ComponentEnd::At(floating(8, 11)));
    edited.sequence = 7;
    assert_eq!(
        edited.changed_properties(&original),
        BTreeSet::from([PropertyKind::Summary, PropertyKind::End])
    );

    let mut by_duration = original.clone();
    by_duration.end = Some(ComponentEnd::Duration(
        Duration::from_time_delta(TimeDelta::hours(1)).unwrap(),
    ));
    assert_eq!(
        original.changed_properties(&by_duration),
        BTreeSet::from([PropertyKind::Duration])
    );
}

#[test_log::test]
fn set_span_keeps_end_representation() {
    let mut at_end = simple_event();
    at_end.set_span(floating(9, 14), None);
    assert_eq!(at_end.end, Some(ComponentEnd::At(floating(9, 15))));
    at_end.set_span(floating(9, 14), Some(floating(9, 16)));
    assert_eq!(at_end.end, Some(ComponentEnd::At(floating(9, 16))));

    let mut by_duration = simple_event();
    by_duration.end = Some(ComponentEnd::Duration(
        Duration::from_time_delta(TimeDelta::hours(1)).unwrap(),
    ));
    by_duration.set_span(floating(9, 14), Some(floating(9, 17)));
    assert_eq!(by_duration.duration(), Some(TimeDelta::hours(3)));
    assert!(matches!(by_duration.end, Some(ComponentEnd::Duration(_))));
}

#[test_log::test]
fn align_start_moves_to_first_occurrence() {
    // 2024-01-08 is a Monday
    let mut event = simple_event();
    event.rrule = Some("FREQ=WEEKLY;BYDAY=TH".parse().unwrap());
    let adjustment = event.align_start().unwrap().unwrap();
    assert_eq!(adjustment.from, floating(8, 9));
    assert_eq!(adjustment.to, floating(11, 9));
    assert_eq!(event.dtstart, Some(floating(11, 9)));
    assert_eq!(event.end, Some(ComponentEnd::At(floating(11, 10))));

    assert_eq!(event.align_start().unwrap(), None);
    assert_eq!(simple_event().align_start().unwrap(), None);
}

#[test_log::test]
fn non_recurring_kinds_are_rejected() {
    let mut timezone = Component::named("VTIMEZONE");
    timezone.add_property(Property::text("TZID", "Europe/Berlin"));
    assert!(matches!(
        RecurringComponent::from_component(&timezone),
        Err(ServiceError::ParseError(_))
    ));
}
