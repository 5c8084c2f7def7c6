use ics::{
    parameters::TzIDParam,
    properties::{DtEnd, DtStart, Location, Summary, TzName},
    ICalendar, Standard, TimeZone,
};

use crate::event::Event;

pub const TIMEZONE: &str = "Asia/Tokyo";

impl Event {
    #[must_use]
    pub fn to_ics(&self, index: usize) -> ics::Event<'_> {
        let start = format!(
            "{}T{}00",
            self.date.format("%Y%m%d"),
            self.start.format("%H%M")
        );

        let end = format!(
            "{}T{}00",
            self.date.format("%Y%m%d"),
            self.end.format("%H%M")
        );

        let id = format!("{}_{}_{}", start, index, self.name.replace(' ', "-"));

        let mut ics_event = ics::Event::new(id, start.clone());

        let mut dtstart = DtStart::new(start);
        dtstart.add(TzIDParam::new(TIMEZONE));
        ics_event.push(dtstart);

        let mut dtend = DtEnd::new(end);
        dtend.add(TzIDParam::new(TIMEZONE));
        ics_event.push(dtend);
        ics_event.push(Summary::new(ics::escape_text(self.name.as_str())));

        if !self.venue.is_empty() {
            ics_event.push(Location::new(ics::escape_text(self.venue.as_str())));
        }

        ics_event
    }
}

#[must_use]
pub fn to_ics<'a>(name: &'a str, events: &'a [Event]) -> ICalendar<'a> {
    let mut jst_standard = Standard::new("19700101T000000", "+0900", "+0900");
    jst_standard.push(TzName::new("JST"));

    let mut icalendar = ICalendar::new("2.0", name);
    icalendar.add_timezone(TimeZone::standard(TIMEZONE, jst_standard));

    for (index, event) in events.iter().enumerate() {
        icalendar.add_event(event.to_ics(index));
    }

    icalendar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_vevent_per_row() {
        let events = Event::samples();
        let ics = to_ics("eventboard", &events).to_string();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), events.len());
        assert!(ics.contains("TZID:Asia/Tokyo"));
        assert!(ics.contains("DTSTART;TZID=Asia/Tokyo:20251229T100000"));
        assert!(ics.contains("DTEND;TZID=Asia/Tokyo:20260307T160000"));
        assert!(!ics.lines().any(|line| line.starts_with("DTSTART:")));
        assert!(ics.contains("LOCATION:アンフォーレ"));
    }

    #[test]
    fn duplicate_rows_get_distinct_uids() {
        let event = Event::samples().remove(3);
        let events = vec![event.clone(), event];
        let ics = to_ics("eventboard", &events).to_string();

        let uids: Vec<&str> = ics.lines().filter(|line| line.starts_with("UID:")).collect();
        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
    }
}
