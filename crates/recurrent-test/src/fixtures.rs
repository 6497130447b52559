//! Calendar documents used across the integration tests.

/// Daily stand-up with a start that matches its rule, an EXDATE and one
/// moved occurrence.
pub const DAILY_STANDUP: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Recurrent//Tests//EN\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
DTSTAMP:20151101T000000Z\r\n\
SEQUENCE:0\r\n\
DTSTART:20151109T100000\r\n\
DTEND:20151109T110000\r\n\
RRULE:FREQ=DAILY\r\n\
SUMMARY:Stand-up\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// Weekly series in New York with a COUNT, an EXDATE and an override.
pub const WEEKLY_NEW_YORK: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Recurrent//Tests//EN\r\n\
BEGIN:VEVENT\r\n\
UID:weekly@example.com\r\n\
DTSTAMP:20240101T000000Z\r\n\
SEQUENCE:4\r\n\
DTSTART;TZID=America/New_York:20240305T090000\r\n\
DTEND;TZID=America/New_York:20240305T093000\r\n\
RRULE:FREQ=WEEKLY;COUNT=8;BYDAY=TU\r\n\
EXDATE;TZID=America/New_York:20240319T090000\r\n\
SUMMARY:Planning\r\n\
LOCATION:Room 2\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:weekly@example.com\r\n\
DTSTAMP:20240101T000000Z\r\n\
SEQUENCE:5\r\n\
RECURRENCE-ID;TZID=America/New_York:20240402T090000\r\n\
DTSTART;TZID=America/New_York:20240402T130000\r\n\
DTEND;TZID=America/New_York:20240402T133000\r\n\
SUMMARY:Planning (afternoon)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// Daily series in New York whose override names its occurrence in UTC.
pub const DAILY_UTC_OVERRIDE: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Recurrent//Tests//EN\r\n\
BEGIN:VEVENT\r\n\
UID:utc-override@example.com\r\n\
DTSTAMP:20240101T000000Z\r\n\
DTSTART;TZID=America/New_York:20240102T090000\r\n\
DTEND;TZID=America/New_York:20240102T100000\r\n\
RRULE:FREQ=DAILY;COUNT=3\r\n\
SUMMARY:Review\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:utc-override@example.com\r\n\
DTSTAMP:20240101T000000Z\r\n\
RECURRENCE-ID:20240103T140000Z\r\n\
DTSTART;TZID=America/New_York:20240103T150000\r\n\
DTEND;TZID=America/New_York:20240103T160000\r\n\
SUMMARY:Review (late)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
