//! Revisions and deletions on parsed calendars, end to end.

use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::expand::{ExpansionLimits, Window};
use recurrent_rfc::rfc::ical::{parse, serialize};
use recurrent_service::series::{
    ComponentEnd, Deleter, EditScope, Method, RecurringComponent, RecurringKind, Reviser,
    ScopeChoice,
};
use recurrent_test::{fixtures, floating, local, utc};

fn only_series(text: &str) -> RecurringComponent {
    let ical = parse(text).unwrap();
    let mut series = RecurringComponent::group(&ical).unwrap();
    assert_eq!(series.len(), 1);
    series.remove(0)
}

fn ny(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Temporal {
    Temporal::zoned(local(year, month, day, hour, minute), "America/New_York")
}

fn stamp() -> Temporal {
    utc(2026, 1, 1, 12, 0)
}

fn pick(scope: EditScope) -> impl FnMut(&[ScopeChoice]) -> Option<EditScope> {
    move |choices: &[ScopeChoice]| {
        assert!(
            choices.iter().any(|c| c.scope == scope),
            "{scope} was not offered"
        );
        Some(scope)
    }
}

fn first(component: &RecurringComponent, n: usize) -> Vec<Temporal> {
    component.recurrence_set().unwrap().iter().take(n).collect()
}

#[test_log::test]
fn moving_one_standup_creates_a_single_override() {
    let original = only_series(fixtures::DAILY_STANDUP);
    let before = original.clone();

    let revision = Reviser::new()
        .original(&original)
        .edited(original.clone())
        .occurrence(floating(2015, 11, 11, 10, 0))
        .start(floating(2015, 11, 11, 8, 0))
        .end(floating(2015, 11, 11, 9, 0))
        .timestamp(stamp())
        .revise(&mut pick(EditScope::One))
        .unwrap();
    assert_eq!(original, before);

    assert_eq!(revision.messages.len(), 1);
    let message = &revision.messages[0];
    assert_eq!(message.method, Method::Publish);
    assert_eq!(message.components.len(), 1);
    let child = &message.components[0];
    assert_eq!(child.recurrence_id, Some(floating(2015, 11, 11, 10, 0)));
    assert_eq!(child.dtstart, Some(floating(2015, 11, 11, 8, 0)));
    assert_eq!(child.end, Some(ComponentEnd::At(floating(2015, 11, 11, 9, 0))));

    let text = message.to_string();
    assert!(text.contains("METHOD:PUBLISH\r\n"), "{text}");
    assert!(text.contains("RECURRENCE-ID:20151111T100000\r\n"), "{text}");
    assert!(text.contains("DTSTART:20151111T080000\r\n"), "{text}");

    let parent = &revision.components[0];
    assert_eq!(parent.sequence, original.sequence + 1);
    assert_eq!(parent.rrule, original.rrule);
    assert_eq!(parent.dtstart, original.dtstart);

    let window = Window::new(floating(2015, 11, 9, 0, 0), floating(2015, 11, 15, 0, 0)).unwrap();
    assert_eq!(
        parent.recurrence_set().unwrap().between(&window).unwrap(),
        (9..15)
            .map(|day| floating(2015, 11, day, 10, 0))
            .collect::<Vec<_>>()
    );
    let moved: Vec<_> = parent
        .instances(&window, ExpansionLimits::default())
        .unwrap()
        .into_iter()
        .filter(|i| i.overridden)
        .collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].start, floating(2015, 11, 11, 8, 0));
}

#[test_log::test]
fn split_series_neither_loses_nor_repeats_occurrences() {
    let mut original = RecurringComponent::new(RecurringKind::Event, "split@example.com");
    original.dtstart = Some(floating(2015, 11, 9, 10, 0));
    original.end = Some(ComponentEnd::At(floating(2015, 11, 9, 11, 0)));
    original.rrule = Some("FREQ=DAILY;COUNT=10".parse().unwrap());
    original.exdates = vec![floating(2015, 11, 10, 10, 0), floating(2015, 11, 14, 10, 0)];

    let mut edited = original.clone();
    edited.rrule = Some("FREQ=DAILY;INTERVAL=2".parse().unwrap());

    let split = floating(2015, 11, 12, 10, 0);
    let revision = Reviser::new()
        .original(&original)
        .edited(edited)
        .occurrence(split.clone())
        .start(split.clone())
        .timestamp(stamp())
        .revise(&mut pick(EditScope::ThisAndFuture))
        .unwrap();

    let [head, tail] = revision.components.as_slice() else {
        panic!("expected two components, got {}", revision.components.len());
    };

    let before_split: Vec<_> = first(&original, 20)
        .into_iter()
        .filter(|o| *o < split)
        .collect();
    let head_all = first(head, 20);
    assert_eq!(head_all, before_split);
    assert_eq!(head.rrule.as_ref().and_then(RRule::until), Some(&floating(2015, 11, 11, 10, 0)));

    let tail_first = first(tail, 4);
    assert_eq!(
        tail_first,
        vec![
            floating(2015, 11, 12, 10, 0),
            floating(2015, 11, 16, 10, 0),
            floating(2015, 11, 18, 10, 0),
            floating(2015, 11, 20, 10, 0),
        ]
    );
    assert!(head_all.iter().all(|o| *o < split));
    assert!(tail_first.iter().all(|o| !head_all.contains(o)));
    assert_eq!(tail.related_to.as_deref(), Some("split@example.com"));
}

#[test_log::test]
fn cancelled_edit_changes_nothing() {
    let original = only_series(fixtures::WEEKLY_NEW_YORK);
    let mut edited = original.clone();
    edited.summary = Some("Retitled".to_owned());
    let (original_before, edited_before) = (original.clone(), edited.clone());

    let resolvers: [Box<dyn FnMut(&[ScopeChoice]) -> Option<EditScope>>; 2] = [
        Box::new(|_: &[ScopeChoice]| -> Option<EditScope> { Some(EditScope::Cancel) }),
        Box::new(|_: &[ScopeChoice]| -> Option<EditScope> { None }),
    ];
    for mut resolver in resolvers {
        let revision = Reviser::new()
            .original(&original)
            .edited(edited.clone())
            .occurrence(ny(2024, 3, 12, 9, 0))
            .start(ny(2024, 3, 12, 9, 0))
            .timestamp(stamp())
            .revise(&mut resolver)
            .unwrap();
        assert!(revision.is_empty());
        assert!(revision.components.is_empty());
    }
    assert_eq!(original, original_before);
    assert_eq!(edited, edited_before);
}

#[test_log::test]
fn relocating_zoned_series_can_keep_its_override() {
    let original = only_series(fixtures::WEEKLY_NEW_YORK);
    let mut edited = original.clone();
    edited.location = Some("Room 5".to_owned());

    let revision = Reviser::new()
        .original(&original)
        .edited(edited)
        .occurrence(utc(2024, 3, 26, 13, 0))
        .start(utc(2024, 3, 26, 13, 0))
        .timestamp(stamp())
        .revise(&mut pick(EditScope::AllIgnoreRecurrences))
        .unwrap();

    assert_eq!(revision.messages[0].method, Method::Request);
    let series = &revision.components[0];
    assert_eq!(series.sequence, 5);
    assert_eq!(series.location.as_deref(), Some("Room 5"));
    assert_eq!(series.dtstart, original.dtstart);
    assert_eq!(series.exdates, original.exdates);
    assert_eq!(
        series.overrides.keys().collect::<Vec<_>>(),
        vec![&ny(2024, 4, 2, 9, 0)]
    );
}

#[test_log::test]
fn deleting_future_of_zoned_series_ends_it_in_utc() {
    let original = only_series(fixtures::WEEKLY_NEW_YORK);

    let revision = Deleter::new()
        .original(&original)
        .occurrence(utc(2024, 4, 9, 13, 0))
        .timestamp(stamp())
        .delete(EditScope::ThisAndFuture)
        .unwrap();

    assert_eq!(revision.messages.len(), 1);
    assert_eq!(revision.messages[0].method, Method::Request);
    let head = &revision.components[0];
    assert_eq!(head.sequence, 5);
    assert_eq!(
        head.rrule.as_ref().map(ToString::to_string).as_deref(),
        Some("FREQ=WEEKLY;UNTIL=20240402T130000Z;BYDAY=TU")
    );
    assert_eq!(head.overrides.len(), 1);
    assert_eq!(
        first(head, 10),
        vec![
            ny(2024, 3, 5, 9, 0),
            ny(2024, 3, 12, 9, 0),
            ny(2024, 3, 26, 9, 0),
            ny(2024, 4, 2, 9, 0),
        ]
    );
}

#[test_log::test]
fn deleting_overridden_occurrence_survives_a_round_trip() {
    let original = only_series(fixtures::WEEKLY_NEW_YORK);

    let revision = Deleter::new()
        .original(&original)
        .occurrence(ny(2024, 4, 2, 9, 0))
        .timestamp(stamp())
        .delete(EditScope::One)
        .unwrap();

    let text = serialize(&revision.messages[0].to_ical("-//Recurrent//Tests//EN"));
    assert!(text.contains("METHOD:REQUEST\r\n"), "{text}");

    let reparsed = RecurringComponent::group(&parse(&text).unwrap()).unwrap();
    assert_eq!(reparsed.len(), 1);
    let series = &reparsed[0];
    assert!(series.overrides.is_empty());
    assert_eq!(series.exdates.len(), 2);
    assert_eq!(series.sequence, 5);
    assert_eq!(first(series, 10).len(), 6);
}

#[test_log::test]
fn deleting_everything_sends_cancel() {
    let original = only_series(fixtures::DAILY_STANDUP);

    let revision = Deleter::new()
        .original(&original)
        .timestamp(stamp())
        .delete(EditScope::All)
        .unwrap();

    assert_eq!(revision.messages.len(), 1);
    assert_eq!(revision.messages[0].method, Method::Cancel);
    assert_eq!(revision.messages[0].components, vec![original]);
    assert!(revision.components.is_empty());
}
