//! Calendar values: dates, times, date-times and durations.
//!
//! Parsed values are normalised to a UTC `NaiveDateTime`; a value without a
//! timezone is taken to be UTC.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::{Captures, Regex};

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").expect("Invalid date regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.(\d+))?(Z|[+-]\d{2}:\d{2})?$")
        .expect("Invalid time regex")
});

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(?:\.(\d+))?(Z|[+-]\d{2}:\d{2})?$",
    )
    .expect("Invalid dateTime regex")
});

static TIMEZONE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Z|[+-]\d{2}:\d{2})$").expect("Invalid timezone regex"));

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d+))?S)?)?$",
    )
    .expect("Invalid duration regex")
});

/// Reference date-time used to order durations, the first of the four in
/// XML Schema Part 2, 3.2.6.2.
const REFERENCE_POINT: (i32, u32, u32) = (1696, 9, 1);

/// True when the value ends with `Z` or a `±hh:mm` offset.
pub fn has_timezone(value: &str) -> bool {
    TIMEZONE_SUFFIX.is_match(value)
}

/// `xs:date`, as the UTC instant of its midnight.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let caps = DATE.captures(value)?;
    let date = calendar_date(&caps)?;
    to_utc(date.and_time(NaiveTime::MIN), caps.get(4).map(|m| m.as_str()))
}

/// `xs:time`, anchored on 1972-12-31.
pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    let caps = TIME.captures(value)?;
    let anchor = NaiveDate::from_ymd_opt(1972, 12, 31)?;
    let local = clock(anchor, &caps, 1)?;
    to_utc(local, caps.get(5).map(|m| m.as_str()))
}

/// `xs:dateTime`.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let caps = DATE_TIME.captures(value)?;
    let date = calendar_date(&caps)?;
    let local = clock(date, &caps, 4)?;
    to_utc(local, caps.get(8).map(|m| m.as_str()))
}

fn calendar_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Hour, minute, second and fraction starting at capture group `first`.
/// `24:00:00` rolls over to the next midnight.
fn clock(date: NaiveDate, caps: &Captures<'_>, first: usize) -> Option<NaiveDateTime> {
    let hour: u32 = caps[first].parse().ok()?;
    let minute: u32 = caps[first + 1].parse().ok()?;
    let second: u32 = caps[first + 2].parse().ok()?;
    let nanos = fraction_nanos(caps.get(first + 3).map(|m| m.as_str()));
    if hour == 24 {
        if minute != 0 || second != 0 || nanos != 0 {
            return None;
        }
        return date.succ_opt().map(|next| next.and_time(NaiveTime::MIN));
    }
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    Some(date.and_time(time))
}

fn fraction_nanos(fraction: Option<&str>) -> u32 {
    let Some(fraction) = fraction else {
        return 0;
    };
    let digits: String = fraction.chars().take(9).collect();
    format!("{digits:0<9}").parse().unwrap_or(0)
}

fn to_utc(local: NaiveDateTime, timezone: Option<&str>) -> Option<NaiveDateTime> {
    let minutes = offset_minutes(timezone)?;
    local.checked_sub_signed(TimeDelta::try_minutes(minutes)?)
}

fn offset_minutes(timezone: Option<&str>) -> Option<i64> {
    let Some(timezone) = timezone.filter(|tz| *tz != "Z") else {
        return Some(0);
    };
    let sign = if timezone.starts_with('-') { -1 } else { 1 };
    let hours: i64 = timezone.get(1..3)?.parse().ok()?;
    let minutes: i64 = timezone.get(4..6)?.parse().ok()?;
    if minutes > 59 || hours > 14 || (hours == 14 && minutes != 0) {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// A parsed `xs:duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XsdDuration {
    negative: bool,
    years: u64,
    months: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
    nanos: u32,
    has_year_month: bool,
    has_day_time: bool,
}

impl XsdDuration {
    pub fn parse(value: &str) -> Result<Self, String> {
        if let Some((_, time)) = value.split_once('T')
            && !time.contains(['H', 'M', 'S'])
        {
            return Err(format!(
                "Invalid duration '{value}': T designator must be followed by time components (H, M, or S)"
            ));
        }
        let invalid = || format!("'{value}' is not a valid duration");
        let caps = DURATION.captures(value).ok_or_else(invalid)?;
        let number = |index: usize| -> Result<Option<u64>, String> {
            caps.get(index)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        let years = number(2)?;
        let months = number(3)?;
        let days = number(4)?;
        let hours = number(5)?;
        let minutes = number(6)?;
        let seconds = number(7)?;
        let has_year_month = years.is_some() || months.is_some();
        let has_day_time =
            days.is_some() || hours.is_some() || minutes.is_some() || seconds.is_some();
        if !has_year_month && !has_day_time {
            return Err(invalid());
        }

        Ok(Self {
            negative: caps.get(1).is_some(),
            years: years.unwrap_or(0),
            months: months.unwrap_or(0),
            days: days.unwrap_or(0),
            hours: hours.unwrap_or(0),
            minutes: minutes.unwrap_or(0),
            seconds: seconds.unwrap_or(0),
            nanos: fraction_nanos(caps.get(8).map(|m| m.as_str())),
            has_year_month,
            has_day_time,
        })
    }

    /// Only year and month components are present.
    pub fn is_day_time_free(&self) -> bool {
        !self.has_day_time
    }

    /// Only day, hour, minute and second components are present.
    pub fn is_year_month_free(&self) -> bool {
        !self.has_year_month
    }

    /// One is purely year-month and the other purely day-time.
    pub fn kinds_conflict(&self, other: &Self) -> bool {
        (self.is_day_time_free() && other.is_year_month_free())
            || (self.is_year_month_free() && other.is_day_time_free())
    }

    fn add_to(&self, base: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let months = Months::new(u32::try_from(months).ok()?);
        let delta = TimeDelta::try_days(i64::try_from(self.days).ok()?)?
            .checked_add(&TimeDelta::try_hours(i64::try_from(self.hours).ok()?)?)?
            .checked_add(&TimeDelta::try_minutes(i64::try_from(self.minutes).ok()?)?)?
            .checked_add(&TimeDelta::try_seconds(i64::try_from(self.seconds).ok()?)?)?
            .checked_add(&TimeDelta::nanoseconds(i64::from(self.nanos)))?;
        if self.negative {
            base.checked_sub_months(months)?.checked_sub_signed(delta)
        } else {
            base.checked_add_months(months)?.checked_add_signed(delta)
        }
    }

    /// Order by adding both durations to the reference date-time. Mixed
    /// durations such as `P1M1D` and `P31D` always get an order. `None` when
    /// a sum overflows.
    pub fn order(&self, other: &Self) -> Option<Ordering> {
        let (year, month, day) = REFERENCE_POINT;
        let base = NaiveDate::from_ymd_opt(year, month, day)?.and_time(NaiveTime::MIN);
        Some(self.add_to(base)?.cmp(&other.add_to(base)?))
    }
}
