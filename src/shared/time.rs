use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

/// Seconds since midnight of the transit snapshot's reference date.
///
/// Negative values belong to the previous service day and values past 24h to
/// the following ones, so a search can span midnight without any wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Time(i32);

pub const MIN: Time = Time::MIN;
pub const MAX: Time = Time::MAX;

impl From<i32> for Time {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl Sub<Duration> for Time {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign<Duration> for Time {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 = self.0.saturating_sub(rhs.0)
    }
}

impl Time {
    pub const MIN: Time = Time(i32::MIN);
    pub const MAX: Time = Time(i32::MAX);

    pub const fn from_seconds(secs: i32) -> Self {
        Self(secs)
    }

    pub const fn from_hm(hours: i32, minutes: i32) -> Self {
        Self(hours.saturating_mul(3600).saturating_add(minutes.saturating_mul(60)))
    }

    pub const fn as_seconds(&self) -> i32 {
        self.0
    }

    /// True for the `MIN`/`MAX` sentinels used as "not reached" markers.
    pub const fn is_sentinel(&self) -> bool {
        self.0 == i32::MIN || self.0 == i32::MAX
    }

    pub fn to_hms_string(&self) -> String {
        let day = self.0.div_euclid(SECONDS_PER_DAY);
        let secs = self.0.rem_euclid(SECONDS_PER_DAY);
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        let s = secs % 60;
        match day {
            0 => format!("{:02}:{:02}:{:02}", h, m, s),
            _ => format!("{:02}:{:02}:{:02}{:+}d", h, m, s, day),
        }
    }

    /// Parses a strict `HH:MM:SS` string. Hours may exceed 23.
    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: i32 = 60 * 60;
        const MINUTE_TO_SEC: i32 = 60;
        let mut split = time.split(':');
        let hours: i32 = split.next()?.parse().ok()?;
        let hours = hours.checked_mul(HOUR_TO_SEC)?;
        let minutes: i32 = split.next()?.parse().ok()?;
        let minutes = minutes.checked_mul(MINUTE_TO_SEC)?;
        let seconds: i32 = split.next()?.parse().ok()?;
        if split.next().is_some() {
            return None;
        }
        let seconds = hours.checked_add(minutes)?.checked_add(seconds)?;
        Some(Self(seconds))
    }

    /// Parses either `HH:MM` or `HH:MM:SS`.
    pub fn parse(time: &str) -> Option<Self> {
        match time.matches(':').count() {
            1 => {
                let (hours, minutes) = time.split_once(':')?;
                let hours: i32 = hours.parse().ok()?;
                let minutes: i32 = minutes.parse().ok()?;
                Some(Self::from_hm(hours, minutes))
            }
            2 => Self::from_hms(time),
            _ => None,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Time::MIN => write!(f, "-inf"),
            Time::MAX => write!(f, "+inf"),
            _ => f.write_str(&self.to_hms_string()),
        }
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_next_day() {
    let time = Time::from_hms("25:10:00").unwrap();
    assert_eq!("01:10:00+1d", time.to_hms_string())
}

#[test]
fn parse_unparse_previous_day() {
    let time = Time::from_seconds(-60);
    assert_eq!("23:59:00-1d", time.to_hms_string())
}

#[test]
fn valid_time_test() {
    assert_eq!(Time::from_hms("01:01:30").unwrap().as_seconds(), 3690);
    assert_eq!(Time::parse("11:30").unwrap().as_seconds(), 41400);
    assert_eq!(Time::parse("00:01:30").unwrap().as_seconds(), 90);
}

#[test]
fn invalid_time_test() {
    assert!(Time::from_hms("00:00:0a").is_none());
    assert!(Time::from_hms("00:00").is_none());
    assert!(Time::parse("11").is_none());
    assert!(Time::parse("1:2:3:4").is_none());
}

#[test]
fn sentinels_saturate() {
    assert_eq!(Time::MAX + Duration::from_minutes(5), Time::MAX);
    assert_eq!(Time::MIN - Duration::from_minutes(5), Time::MIN);
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration(i32);

impl From<i32> for Duration {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: i32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: i32) -> Self {
        Self(minutes.saturating_mul(60))
    }

    pub const fn from_hours(hours: i32) -> Self {
        Self(hours.saturating_mul(60 * 60))
    }

    pub const fn from_days(days: i32) -> Self {
        Self(days.saturating_mul(SECONDS_PER_DAY))
    }

    pub const fn as_seconds(&self) -> i32 {
        self.0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Rounds up to the next multiple of `step`. A non-positive step is a no-op.
    pub const fn round_up_to(&self, step: Duration) -> Self {
        if step.0 <= 0 {
            return *self;
        }
        let rem = self.0.rem_euclid(step.0);
        if rem == 0 {
            *self
        } else {
            Self(self.0.saturating_add(step.0 - rem))
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        match (secs / 3600, (secs % 3600) / 60, secs % 60) {
            (0, m, 0) => write!(f, "{sign}{m}m"),
            (0, m, s) => write!(f, "{sign}{m}m{s}s"),
            (h, m, 0) => write!(f, "{sign}{h}h{m}m"),
            (h, m, s) => write!(f, "{sign}{h}h{m}m{s}s"),
        }
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0)
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

#[test]
fn duration_round_up() {
    let step = Duration::from_minutes(10);
    assert_eq!(
        Duration::from_minutes(41).round_up_to(step),
        Duration::from_minutes(50)
    );
    assert_eq!(
        Duration::from_minutes(40).round_up_to(step),
        Duration::from_minutes(40)
    );
    assert_eq!(Duration::from_minutes(7).round_up_to(Duration::ZERO), Duration::from_minutes(7));
}

#[test]
fn duration_arithmetic_saturates() {
    let max = Duration::from_seconds(i32::MAX);
    let min = Duration::from_seconds(i32::MIN);
    assert_eq!(max + Duration::from_seconds(1), max);
    assert_eq!(min - Duration::from_seconds(1), min);
    assert_eq!(-min, max);
    assert_eq!(min.abs(), max);
    assert_eq!(Duration::from_days(i32::MAX), max);
    assert_eq!(Duration::from_minutes(i32::MIN), min);
    let mut total = max;
    total += Duration::from_hours(1);
    assert_eq!(total, max);
}

#[test]
fn extreme_clock_strings() {
    assert!(Time::from_hms("999999:00:00").is_none());
    assert!(Time::parse("596523:14:08").is_none());
    assert_eq!(Time::from_hm(i32::MAX, 0), Time::MAX);
}

#[test]
fn duration_display() {
    assert_eq!(Duration::from_minutes(10).to_string(), "10m");
    assert_eq!(Duration::from_seconds(3725).to_string(), "1h2m5s");
}
