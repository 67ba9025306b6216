//! Jalali (Solar Hijri) calendar conversion.
//!
//! The upstream API timestamps orders in the Gregorian calendar; the
//! ledger displays and buckets them by Jalali month. Conversion uses the
//! arithmetic break-year algorithm over Julian day numbers, valid for
//! years 1178..1633 AP and far beyond, with no astronomical tables.
//! All math is date-only; times ride along untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

/// Errors converting between calendars or parsing upstream timestamps.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The upstream paid timestamp could not be parsed as ISO-8601.
    #[error("unparseable timestamp: {0}")]
    BadTimestamp(String),

    /// The date falls outside the algorithm's supported year range.
    #[error("year {0} is outside the supported Jalali range")]
    OutOfRange(i32),
}

/// A Jalali calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// The month bucket this date belongs to.
    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = CalendarError;

    /// Parses the ledger's `YYYY/MM/DD` date-cell form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '/');
        let bad = || CalendarError::BadTimestamp(s.to_string());
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(bad());
        }
        Ok(JalaliDate { year, month, day })
    }
}

/// One calendar-month bucket key; ordered chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Converts a Gregorian date to Jalali.
pub fn jalali_from_gregorian(date: NaiveDate) -> Result<JalaliDate, CalendarError> {
    d2j(g2d(date.year() as i64, date.month() as i64, date.day() as i64))
}

/// Converts a Jalali date to Gregorian.
pub fn gregorian_from_jalali(date: JalaliDate) -> Result<NaiveDate, CalendarError> {
    let jdn = j2d(date)?;
    let (gy, gm, gd) = d2g(jdn);
    NaiveDate::from_ymd_opt(gy as i32, gm as u32, gd as u32)
        .ok_or(CalendarError::OutOfRange(date.year))
}

/// Parses an upstream ISO-8601 paid timestamp (e.g.
/// `2024-05-01T10:20:30`) and converts its date part to Jalali.
pub fn paid_date(iso: &str) -> Result<JalaliDate, CalendarError> {
    let date_part = iso.split('T').next().unwrap_or(iso);
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CalendarError::BadTimestamp(iso.to_string()))?;
    jalali_from_gregorian(date)
}

/// Lower bound of the fetch window: go `days_back` days into the past,
/// then snap to the first day of that Jalali month.
pub fn history_window_start(today: NaiveDate, days_back: u64) -> Result<NaiveDate, CalendarError> {
    let anchor = today
        .checked_sub_days(Days::new(days_back))
        .ok_or(CalendarError::OutOfRange(today.year()))?;
    let jalali = jalali_from_gregorian(anchor)?;
    gregorian_from_jalali(JalaliDate {
        year: jalali.year,
        month: jalali.month,
        day: 1,
    })
}

// ----- break-year internals (Julian day number based) -----

const BREAKS: [i64; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

struct JalCal {
    /// Years since the last leap year (0 means `jy` itself is leap).
    leap: i64,
    gy: i64,
    /// Gregorian March day-of-month of 1 Farvardin of `jy`.
    march: i64,
}

fn jal_cal(jy: i64) -> Result<JalCal, CalendarError> {
    if jy <= BREAKS[0] || jy >= BREAKS[BREAKS.len() - 1] {
        return Err(CalendarError::OutOfRange(jy as i32));
    }

    let gy = jy + 621;
    let mut leap_j: i64 = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + jump % 33 / 4;
        jp = jm;
    }
    let mut n = jy - jp;

    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    // Truncated (not floor) division throughout; (n + 1) % 33 - 1 can
    // legitimately land on -1, which denotes the fourth post-leap year.
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Ok(JalCal { leap, gy, march })
}

fn g2d(gy: i64, gm: i64, gd: i64) -> i64 {
    let d = (gy + (gm - 8) / 6 + 100100) * 1461 / 4 + (153 * ((gm + 9) % 12) + 2) / 5 + gd
        - 34840408;
    d - (gy + 100100 + (gm - 8) / 6) / 100 * 3 / 4 + 752
}

fn d2g(jdn: i64) -> (i64, i64, i64) {
    let mut j = 4 * jdn + 139361631;
    j += (4 * jdn + 183187720) / 146097 * 3 / 4 * 4 - 3908;
    let i = j % 1461 / 4 * 5 + 308;
    let gd = i % 153 / 5 + 1;
    let gm = i / 153 % 12 + 1;
    let gy = j / 1461 - 100100 + (8 - gm) / 6;
    (gy, gm, gd)
}

fn j2d(date: JalaliDate) -> Result<i64, CalendarError> {
    let jy = date.year as i64;
    let (jm, jd) = (date.month as i64, date.day as i64);
    let r = jal_cal(jy)?;
    Ok(g2d(r.gy, 3, r.march) + (jm - 1) * 31 - jm / 7 * (jm - 7) + jd - 1)
}

fn d2j(jdn: i64) -> Result<JalaliDate, CalendarError> {
    let (gy, _, _) = d2g(jdn);
    let mut jy = gy - 621;
    let r = jal_cal(jy)?;
    let jdn1f = g2d(gy, 3, r.march);

    let mut k = jdn - jdn1f;
    if k >= 0 {
        if k <= 185 {
            return Ok(JalaliDate {
                year: jy as i32,
                month: (1 + k / 31) as u32,
                day: (k % 31 + 1) as u32,
            });
        }
        k -= 186;
    } else {
        jy -= 1;
        k += 179;
        if r.leap == 1 {
            k += 1;
        }
    }
    Ok(JalaliDate {
        year: jy as i32,
        month: (7 + k / 30) as u32,
        day: (k % 30 + 1) as u32,
    })
}
