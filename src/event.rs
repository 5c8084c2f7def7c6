use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y/%m/%d";
pub const TIME_FORMAT: &str = "%H:%M";

const SAMPLE_EVENTS: [(&str, (i32, u32, u32), (u32, u32), (u32, u32), &str); 5] = [
    (
        "ウーリー安城マジックショー＆見学会",
        (2025, 12, 29),
        (10, 0),
        (15, 0),
        "ウーリー安城",
    ),
    (
        "ウーリー安城作業体験会",
        (2026, 1, 10),
        (13, 0),
        (15, 0),
        "ウーリー安城",
    ),
    (
        "ららぽーと安城販売会",
        (2026, 1, 31),
        (10, 0),
        (16, 0),
        "三井ショッピングモールららぽーと安城",
    ),
    (
        "桜井公民館まつり販売会",
        (2026, 2, 14),
        (10, 0),
        (15, 0),
        "桜井公民館",
    ),
    (
        "あんぷくフェスティバル販売会",
        (2026, 3, 7),
        (10, 0),
        (16, 0),
        "アンフォーレ",
    ),
];

fn serialize_naive_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

fn serialize_naive_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
    serializer.serialize_str(&formatted_time)
}

/// One row of the managed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    #[serde(serialize_with = "serialize_naive_date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_naive_time")]
    pub start: NaiveTime,
    #[serde(serialize_with = "serialize_naive_time")]
    pub end: NaiveTime,
    pub venue: String,
}

impl Event {
    /// Line breaks in `name` and `venue` are replaced with spaces, every
    /// record has to stay on a single CSV line.
    pub fn new(
        name: impl AsRef<str>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        venue: impl AsRef<str>,
    ) -> Self {
        Self {
            name: single_line(name.as_ref()),
            date,
            start,
            end,
            venue: single_line(venue.as_ref()),
        }
    }

    /// The built-in rows every session starts with.
    pub fn samples() -> Vec<Event> {
        SAMPLE_EVENTS
            .iter()
            .filter_map(|&(name, (y, m, d), (sh, sm), (eh, em), venue)| {
                Some(Event::new(
                    name,
                    NaiveDate::from_ymd_opt(y, m, d)?,
                    NaiveTime::from_hms_opt(sh, sm, 0)?,
                    NaiveTime::from_hms_opt(eh, em, 0)?,
                    venue,
                ))
            })
            .collect()
    }

    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn start_text(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }

    pub fn end_text(&self) -> String {
        self.end.format(TIME_FORMAT).to_string()
    }

    /// Fields in export order: name, date, start, end, venue.
    pub fn fields(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.date_text(),
            self.start_text(),
            self.end_text(),
            self.venue.clone(),
        ]
    }
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_keep_their_order() {
        let samples = Event::samples();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].name, "ウーリー安城マジックショー＆見学会");
        assert_eq!(samples[4].venue, "アンフォーレ");
        assert_eq!(samples[2].fields()[1], "2026/01/31");
        assert_eq!(samples[1].fields()[2], "13:00");
    }

    #[test]
    fn fields_use_fixed_width_formats() {
        let event = Event::new(
            "Test Sale",
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            "Hall A",
        );

        assert_eq!(
            event.fields(),
            ["Test Sale", "2026/04/01", "09:00", "12:00", "Hall A"].map(String::from)
        );
    }

    #[test]
    fn line_breaks_become_spaces() {
        let event = Event::new(
            "two\r\nlines",
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            "a\nb",
        );

        assert_eq!(event.name, "two lines");
        assert_eq!(event.venue, "a b");
    }

    #[test]
    fn json_uses_display_formats() {
        let json = serde_json::to_value(&Event::samples()[1]).unwrap();
        assert_eq!(json["date"], "2026/01/10");
        assert_eq!(json["start"], "13:00");
        assert_eq!(json["end"], "15:00");
    }
}
