use chrono::{NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Minute-of-day, rendered as "HH:MM" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(pub u16);

impl TimeOfDay {
    pub fn from_hm(hours: u16, minutes: u16) -> TimeOfDay {
        TimeOfDay(hours * 60 + minutes)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid time of day: {s}"))?;
        let hours: u16 = hours
            .parse()
            .map_err(|_| format!("Invalid time of day: {s}"))?;
        let minutes: u16 = minutes
            .parse()
            .map_err(|_| format!("Invalid time of day: {s}"))?;
        if hours > 23 || minutes > 59 {
            return Err(format!("Invalid time of day: {s}"));
        }
        Ok(TimeOfDay::from_hm(hours, minutes))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Working hours for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// Weekly opening hours, keyed by lowercase weekday name ("monday" ..
/// "sunday"). A missing entry counts as closed on that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule(pub HashMap<String, DayHours>);

impl WeeklySchedule {
    /// The open hours for `weekday`, or `None` when closed or missing.
    pub fn open_hours(&self, weekday: Weekday) -> Option<DayHours> {
        self.0
            .get(weekday_key(weekday))
            .copied()
            .filter(|hours| hours.open)
    }
}

pub fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub name: String,
    pub weekly_schedule: WeeklySchedule,
    pub holidays: Vec<NaiveDate>,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salon {
    pub id: Uuid,
    pub name: String,
    pub weekly_schedule: WeeklySchedule,
    pub holidays: Vec<NaiveDate>,
    pub staff: Vec<StaffMember>,
}

impl Salon {
    pub fn staff_member(&self, name: &str) -> Option<&StaffMember> {
        self.staff.iter().find(|staff| staff.name == name)
    }
}

/// One service picked by a buyer, together with the staff member who is to
/// perform it. The staff assignment happens in the cart flow and may still
/// be missing when the request reaches us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub service: String,
    pub staff_name: Option<String>,
    pub duration_minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub staff_name: String,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    /// Summed over the services this staff member performs in the booking;
    /// wider than a single selection's duration so the sum cannot wrap.
    pub duration_minutes: u32,
    pub client_name: String,
    pub services: Vec<String>,
}

impl Booking {
    pub fn end(&self) -> u32 {
        u32::from(self.start.minutes()) + self.duration_minutes
    }
}

/// A buyer's request to turn a computed slot into persisted bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub salon_id: Uuid,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub client_name: String,
    pub selections: Vec<Selection>,
}
