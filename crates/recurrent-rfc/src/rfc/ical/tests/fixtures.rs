//! iCalendar fixtures for recurring components.
//!
//! Examples adapted from RFC 5545 §3.8.5 and §3.6.

/// Weekly meeting with an EXDATE and one moved occurrence.
pub const WEEKLY_WITH_OVERRIDE: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:weekly-1@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART;TZID=America/New_York:19970905T090000\r\n\
DTEND;TZID=America/New_York:19970905T100000\r\n\
SUMMARY:Weekly Team Meeting\r\n\
RRULE:FREQ=WEEKLY;COUNT=10;BYDAY=FR\r\n\
EXDATE;TZID=America/New_York:19970912T090000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:weekly-1@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
RECURRENCE-ID;TZID=America/New_York:19970919T090000\r\n\
DTSTART;TZID=America/New_York:19970919T140000\r\n\
DTEND;TZID=America/New_York:19970919T150000\r\n\
SUMMARY:Weekly Team Meeting (moved)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// All-day yearly event with an RDATE.
pub const YEARLY_ALL_DAY: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:anniversary@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART;VALUE=DATE:19971102\r\n\
DURATION:P1D\r\n\
SUMMARY:Our Blissful Anniversary\r\n\
CATEGORIES:ANNIVERSARY,PERSONAL,SPECIAL OCCASION\r\n\
RRULE:FREQ=YEARLY\r\n\
RDATE;VALUE=DATE:19971105\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// Recurring to-do due every other month.
pub const VTODO_RECURRING: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VTODO\r\n\
UID:todo-1@example.com\r\n\
DTSTAMP:19980130T134500Z\r\n\
DTSTART:19980415T090000Z\r\n\
DUE:19980415T170000Z\r\n\
SUMMARY:Submit Quarterly Report\r\n\
RRULE:FREQ=MONTHLY;INTERVAL=2;BYMONTHDAY=15\r\n\
STATUS:NEEDS-ACTION\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

/// Long, escaped text that must fold when serialized.
pub const VJOURNAL_LONG_TEXT: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VJOURNAL\r\n\
UID:journal-1@example.com\r\n\
DTSTAMP:19970324T120000Z\r\n\
DTSTART;VALUE=DATE:19970317\r\n\
SUMMARY:Staff meeting minutes\r\n\
DESCRIPTION:1. Staff meeting: Participants include Joe\\, Lisa\\, and Bob. \r\n\
\x20Aurora project plans were reviewed. There is currently no budget reserves \r\n\
\x20for this project.\\n2. Telephone Conference: ABC Corp. sales representative\r\n\
\x20 called to discuss new printers.\r\n\
END:VJOURNAL\r\n\
END:VCALENDAR\r\n";
