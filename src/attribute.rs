//! Typed attribute values, as stored in ".dbf" columns.

use std::fmt;
use chrono::{Datelike, NaiveDate};
use regex::Regex;

lazy_static! {
    static ref YYYYMMDD: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
}

/// The type of a non-null AttributeValue.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AttributeKind {
    Integer,
    Double,
    Boolean,
    Date,
    String,
}

impl AttributeKind {
    /// Returns the kind a column must have to hold values of both kinds.
    ///
    /// Integer and Double make Double; any other mix makes String.
    pub fn promote(self, other: AttributeKind) -> AttributeKind {
        match (self, other) {
            (a, b) if a == b => a,
            (AttributeKind::Integer, AttributeKind::Double) | (AttributeKind::Double, AttributeKind::Integer) => AttributeKind::Double,
            _ => AttributeKind::String,
        }
    }

    pub fn is_numeric(self) -> bool {
        self == AttributeKind::Integer || self == AttributeKind::Double
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum AttributeValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    String(String),
    Null,
}

impl AttributeValue {
    /// Returns None for Null.
    pub fn kind(&self) -> Option<AttributeKind> {
        match self {
            &AttributeValue::Integer(_) => Some(AttributeKind::Integer),
            &AttributeValue::Double(_) => Some(AttributeKind::Double),
            &AttributeValue::Boolean(_) => Some(AttributeKind::Boolean),
            &AttributeValue::Date(_) => Some(AttributeKind::Date),
            &AttributeValue::String(_) => Some(AttributeKind::String),
            &AttributeValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == AttributeValue::Null
    }

    pub fn date(year: i32, month: u32, day: u32) -> Option<AttributeValue> {
        NaiveDate::from_ymd_opt(year, month, day).map(AttributeValue::Date)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            &AttributeValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Integers convert to f64, too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            &AttributeValue::Integer(i) => Some(i as f64),
            &AttributeValue::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            &AttributeValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            &AttributeValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            &AttributeValue::String(ref s) => Some(s),
            _ => None,
        }
    }
}

/// Formats values the way ".dbf" columns store them: dates as YYYYMMDD,
/// booleans as "T"/"F", numbers in their shortest exact form and Null as "".
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &AttributeValue::Integer(i) => write!(f, "{}", i),
            &AttributeValue::Double(d) => write!(f, "{}", d),
            &AttributeValue::Boolean(b) => f.write_str(if b { "T" } else { "F" }),
            &AttributeValue::Date(d) => write!(f, "{}", format_date(&d)),
            &AttributeValue::String(ref s) => f.write_str(s),
            &AttributeValue::Null => Ok(()),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> AttributeValue { AttributeValue::Integer(i) }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> AttributeValue { AttributeValue::Integer(i as i64) }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> AttributeValue { AttributeValue::Double(d) }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> AttributeValue { AttributeValue::Boolean(b) }
}

impl From<NaiveDate> for AttributeValue {
    fn from(d: NaiveDate) -> AttributeValue { AttributeValue::Date(d) }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> AttributeValue { AttributeValue::String(s) }
}

impl<'a> From<&'a str> for AttributeValue {
    fn from(s: &'a str) -> AttributeValue { AttributeValue::String(s.to_string()) }
}

pub fn format_date(d: &NaiveDate) -> String {
    format!("{:04}{:02}{:02}", d.year(), d.month(), d.day())
}

/// Parses exactly eight digits, YYYYMMDD. Anything else (including
/// impossible dates such as 20230230) is None.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    YYYYMMDD.captures(s).and_then(|caps| {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let day = caps[3].parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}
