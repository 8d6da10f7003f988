//! Date constructor and Date.prototype
//!
//! Dates are milliseconds since the epoch. There is no local time zone: local
//! time is UTC, so the plain and `UTC` accessors are the same functions.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::{PreferredType, Realm};
use crate::value::{JsValue, ObjectKind};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
/// Largest representable distance from the epoch
const MAX_TIME: f64 = 8.64e15;

/// Index of each component in a `[f64; 7]` date breakdown
const YEAR: usize = 0;
const MONTH: usize = 1;
const DAY: usize = 2;
const HOURS: usize = 3;
const MINUTES: usize = 4;
const SECONDS: usize = 5;
const MILLISECONDS: usize = 6;

pub fn init_date(realm: &mut Realm) {
    let ctor = realm.create_native_function("Date", date_constructor, 7);
    realm.intrinsics.date = ctor;
    define_global(realm, "Date", JsValue::Object(ctor), false);

    realm.register_method(ctor, "now", date_now, 0);
    realm.register_method(ctor, "parse", date_parse, 1);
    realm.register_method(ctor, "UTC", date_utc, 7);

    let Some(p) = realm.prototype_object(ctor) else {
        return;
    };

    // Getter methods (local time = UTC)
    realm.register_method(p, "getTime", date_get_time, 0);
    realm.register_method(p, "valueOf", date_get_time, 0);
    realm.register_method(p, "getTimezoneOffset", date_get_timezone_offset, 0);
    for (local, utc, getter) in [
        ("getFullYear", "getUTCFullYear", date_get_full_year as NativeMethod),
        ("getMonth", "getUTCMonth", date_get_month),
        ("getDate", "getUTCDate", date_get_date),
        ("getDay", "getUTCDay", date_get_day),
        ("getHours", "getUTCHours", date_get_hours),
        ("getMinutes", "getUTCMinutes", date_get_minutes),
        ("getSeconds", "getUTCSeconds", date_get_seconds),
        ("getMilliseconds", "getUTCMilliseconds", date_get_milliseconds),
    ] {
        realm.register_method(p, local, getter, 0);
        realm.register_method(p, utc, getter, 0);
    }
    realm.register_method(p, "getYear", date_get_year, 0);

    // Setter methods
    realm.register_method(p, "setTime", date_set_time, 1);
    for (local, utc, setter, arity) in [
        ("setFullYear", "setUTCFullYear", date_set_full_year as NativeMethod, 3),
        ("setMonth", "setUTCMonth", date_set_month, 2),
        ("setDate", "setUTCDate", date_set_date, 1),
        ("setHours", "setUTCHours", date_set_hours, 4),
        ("setMinutes", "setUTCMinutes", date_set_minutes, 3),
        ("setSeconds", "setUTCSeconds", date_set_seconds, 2),
        ("setMilliseconds", "setUTCMilliseconds", date_set_milliseconds, 1),
    ] {
        realm.register_method(p, local, setter, arity);
        realm.register_method(p, utc, setter, arity);
    }

    // Conversion methods
    realm.register_method(p, "toString", date_to_string, 0);
    realm.register_method(p, "toDateString", date_to_date_string, 0);
    realm.register_method(p, "toTimeString", date_to_time_string, 0);
    realm.register_method(p, "toISOString", date_to_iso_string, 0);
    realm.register_method(p, "toUTCString", date_to_utc_string, 0);
    realm.register_method(p, "toGMTString", date_to_utc_string, 0);
    realm.register_method(p, "toLocaleString", date_to_locale_string, 0);
    realm.register_method(p, "toLocaleDateString", date_to_locale_date_string, 0);
    realm.register_method(p, "toLocaleTimeString", date_to_locale_time_string, 0);
}

type NativeMethod = fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

// ═══════════════════════════════════════════════════════════════════════════
// Time arithmetic
// ═══════════════════════════════════════════════════════════════════════════

/// Round to whole milliseconds, NaN outside the representable range
fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        f64::NAN
    } else {
        t.trunc() + 0.0
    }
}

/// Compose a timestamp from components, handling JavaScript-style overflow
/// (month 12 is January of the next year, day 0 the last day of the previous
/// month, 25 hours is one day and one hour later)
fn make_time(fields: [f64; 7]) -> f64 {
    if fields.iter().any(|f| !f.is_finite()) {
        return f64::NAN;
    }
    let [year, month, day, hours, minutes, seconds, ms] = fields.map(f64::trunc);
    let year = year + (month / 12.0).floor();
    let month = month.rem_euclid(12.0);
    if year.abs() > 300_000.0 {
        return f64::NAN;
    }
    let Some(month_start) = NaiveDate::from_ymd_opt(year as i32, month as u32 + 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    else {
        return f64::NAN;
    };
    let base = month_start.and_utc().timestamp_millis() as f64;
    time_clip(
        base + (day - 1.0) * MS_PER_DAY
            + hours * MS_PER_HOUR
            + minutes * MS_PER_MINUTE
            + seconds * MS_PER_SECOND
            + ms,
    )
}

fn to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
    if timestamp.is_nan() {
        return None;
    }
    DateTime::from_timestamp_millis(timestamp as i64)
}

/// Break a timestamp into `[year, month, day, hours, minutes, seconds, ms]`
fn components(timestamp: f64) -> Option<[f64; 7]> {
    let dt = to_datetime(timestamp)?;
    Some([
        dt.year() as f64,
        dt.month0() as f64,
        dt.day() as f64,
        dt.hour() as f64,
        dt.minute() as f64,
        dt.second() as f64,
        dt.timestamp_subsec_millis() as f64,
    ])
}

/// Components from constructor/`Date.UTC` arguments. Years 0..=99 mean
/// 1900..=1999.
fn components_from_args(realm: &Realm, args: &[JsValue]) -> [f64; 7] {
    let mut fields = [f64::NAN, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    for (slot, value) in fields.iter_mut().zip(args) {
        *slot = realm.to_number(value);
    }
    if let Some(year) = fields.get_mut(YEAR) {
        let y = year.trunc();
        if (0.0..=99.0).contains(&y) {
            *year = 1900.0 + y;
        }
    }
    fields
}

/// Parse a date string in the formats this module prints and the common
/// ISO 8601 shapes, returning milliseconds or NaN
fn parse_date_string(s: &str) -> f64 {
    let s = s.trim();

    // Try RFC3339 format (with timezone, e.g., "2024-12-25T10:30:00Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis() as f64;
    }

    // ISO 8601 without timezone is treated as UTC
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return dt.and_utc().timestamp_millis() as f64;
        }
    }

    // Date-only format (e.g., "2024-12-25") is midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map_or(f64::NAN, |d| d.and_utc().timestamp_millis() as f64);
    }

    // toUTCString output, e.g. "Wed, 25 Dec 2024 10:30:00 GMT"
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.timestamp_millis() as f64;
    }

    // toString output, with or without the zone name in parentheses
    let without_zone_name = s.split(" (").next().unwrap_or(s);
    if let Ok(dt) = DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z") {
        return dt.timestamp_millis() as f64;
    }

    f64::NAN
}

// ═══════════════════════════════════════════════════════════════════════════
// Formatting
// ═══════════════════════════════════════════════════════════════════════════

fn format_with(timestamp: f64, format: &str) -> String {
    match to_datetime(timestamp) {
        Some(dt) => dt.format(format).to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// The `toString` form, also used when a date is coerced to a string
pub(crate) fn format_date(timestamp: f64) -> String {
    format_with(timestamp, "%a %b %d %Y %H:%M:%S GMT+0000 (UTC)")
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructor and statics
// ═══════════════════════════════════════════════════════════════════════════

fn now() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// `Date()` answers the current time as a string; `new Date(..)` builds a
/// date from nothing, a timestamp, a string or components
pub fn date_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let Some(id) = this
        .as_object()
        .filter(|_| is_construct_call(realm, &this, realm.intrinsics.date))
    else {
        return Ok(JsValue::from(format_date(now())));
    };

    let timestamp = match args {
        [] => now(),
        [value] => match value {
            JsValue::Object(other) => match realm.object(*other).map(|obj| &obj.kind) {
                Some(ObjectKind::Date { timestamp }) => *timestamp,
                _ => primitive_time(realm, value),
            },
            _ => primitive_time(realm, value),
        },
        _ => make_time(components_from_args(realm, args)),
    };

    if let Some(obj) = realm.object_mut(id) {
        obj.kind = ObjectKind::Date {
            timestamp: time_clip(timestamp),
        };
    }
    Ok(this)
}

/// A single constructor argument: strings are parsed, anything else is a
/// timestamp
fn primitive_time(realm: &Realm, value: &JsValue) -> f64 {
    match realm.to_primitive(value, PreferredType::Default) {
        JsValue::String(s) => parse_date_string(s.as_str()),
        other => realm.to_number(&other),
    }
}

pub fn date_now(_realm: &mut Realm, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(now()))
}

pub fn date_parse(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let s = realm.to_string(&arg(args, 0));
    Ok(JsValue::Number(parse_date_string(s.as_str())))
}

pub fn date_utc(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(make_time(components_from_args(realm, args))))
}

// ═══════════════════════════════════════════════════════════════════════════
// Getters
// ═══════════════════════════════════════════════════════════════════════════

fn this_timestamp(realm: &Realm, this: &JsValue) -> Result<f64, JsError> {
    this.as_object()
        .and_then(|id| realm.object(id))
        .and_then(|obj| match obj.kind {
            ObjectKind::Date { timestamp } => Some(timestamp),
            _ => None,
        })
        .ok_or_else(|| JsError::type_error("this is not a Date object."))
}

/// Read one field of a valid date; NaN for an invalid one
fn date_field(
    realm: &Realm,
    this: &JsValue,
    field: impl Fn(&DateTime<Utc>) -> f64,
) -> Result<JsValue, JsError> {
    let timestamp = this_timestamp(realm, this)?;
    Ok(JsValue::Number(
        to_datetime(timestamp).map_or(f64::NAN, |dt| field(&dt)),
    ))
}

pub fn date_get_time(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(this_timestamp(realm, &this)?))
}

pub fn date_get_timezone_offset(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    date_field(realm, &this, |_| 0.0)
}

pub fn date_get_full_year(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.year() as f64)
}

pub fn date_get_year(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.year() as f64 - 1900.0)
}

pub fn date_get_month(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.month0() as f64)
}

pub fn date_get_date(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.day() as f64)
}

/// Day of the week, Sunday = 0
pub fn date_get_day(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.weekday().num_days_from_sunday() as f64)
}

pub fn date_get_hours(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.hour() as f64)
}

pub fn date_get_minutes(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.minute() as f64)
}

pub fn date_get_seconds(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.second() as f64)
}

pub fn date_get_milliseconds(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    date_field(realm, &this, |dt| dt.timestamp_subsec_millis() as f64)
}

// ═══════════════════════════════════════════════════════════════════════════
// Setters
// ═══════════════════════════════════════════════════════════════════════════

fn set_timestamp(realm: &mut Realm, this: &JsValue, timestamp: f64) -> Result<JsValue, JsError> {
    let timestamp = time_clip(timestamp);
    if let Some(obj) = this.as_object().and_then(|id| realm.object_mut(id)) {
        obj.kind = ObjectKind::Date { timestamp };
    }
    Ok(JsValue::Number(timestamp))
}

/// Replace up to `max` components starting at `first` with the arguments and
/// recompose. An invalid date stays invalid, except that setting the year
/// starts over from the epoch.
fn set_components(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    first: usize,
    max: usize,
) -> Result<JsValue, JsError> {
    let timestamp = this_timestamp(realm, this)?;
    let base = if timestamp.is_nan() && first == YEAR {
        0.0
    } else {
        timestamp
    };
    let Some(mut fields) = components(base) else {
        return Ok(JsValue::Number(f64::NAN));
    };
    // A missing first argument sets NaN, like an explicit undefined would
    let values: Vec<f64> = if args.is_empty() {
        vec![f64::NAN]
    } else {
        args.iter().take(max).map(|value| realm.to_number(value)).collect()
    };
    for (slot, value) in fields.iter_mut().skip(first).zip(values) {
        *slot = value;
    }
    set_timestamp(realm, this, make_time(fields))
}

pub fn date_set_time(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    this_timestamp(realm, &this)?;
    let timestamp = realm.to_number(&arg(args, 0));
    set_timestamp(realm, &this, timestamp)
}

pub fn date_set_full_year(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, YEAR, 3)
}

pub fn date_set_month(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, MONTH, 2)
}

pub fn date_set_date(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, DAY, 1)
}

pub fn date_set_hours(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, HOURS, 4)
}

pub fn date_set_minutes(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, MINUTES, 3)
}

pub fn date_set_seconds(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, SECONDS, 2)
}

pub fn date_set_milliseconds(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    set_components(realm, &this, args, MILLISECONDS, 1)
}

// ═══════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════

fn formatted(realm: &Realm, this: &JsValue, format: &str) -> Result<JsValue, JsError> {
    let timestamp = this_timestamp(realm, this)?;
    Ok(JsValue::from(format_with(timestamp, format)))
}

pub fn date_to_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let timestamp = this_timestamp(realm, &this)?;
    Ok(JsValue::from(format_date(timestamp)))
}

pub fn date_to_date_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%a %b %d %Y")
}

pub fn date_to_time_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%H:%M:%S GMT+0000 (UTC)")
}

pub fn date_to_utc_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%a, %d %b %Y %H:%M:%S GMT")
}

pub fn date_to_locale_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%-m/%-d/%Y, %-I:%M:%S %p")
}

pub fn date_to_locale_date_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%-m/%-d/%Y")
}

pub fn date_to_locale_time_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    formatted(realm, &this, "%-I:%M:%S %p")
}

/// RangeError for an invalid date, unlike the other conversions
pub fn date_to_iso_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let timestamp = this_timestamp(realm, &this)?;
    let dt = to_datetime(timestamp).ok_or_else(|| JsError::range_error("Invalid time value"))?;
    Ok(JsValue::from(
        dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
    ))
}
