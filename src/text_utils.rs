use std::ops::Index;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

const MAX_FILE_NAME_BYTES: usize = 255;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses the SQL style timestamps of the export: `2020-05-01`,
/// `2020-05-01 10:00` or `2020-05-01 10:00:00` with optional fraction.
/// Missing time parts are 0.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d{0,9})?)?)?$"
        ).unwrap();
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf.trim()) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let time_part = |i: usize| caps.get(i).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = time_part(4)?;
    let mn: u32 = time_part(5)?;
    let s: u32 = time_part(6)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date(date_time: &NaiveDateTime) -> String {
    date_time.format("%Y-%m-%d").to_string()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Decodes HTML entities in a single pass, so `&amp;lt;` becomes `&lt;`
/// and not `<`. Unknown entities are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    lazy_static! {
        static ref ENTITY_REGEX: Regex = Regex::new(
            r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z]+));"
        ).unwrap();
    }

    let decoded = ENTITY_REGEX.replace_all(text, |caps: &Captures| {
        let ch = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
        } else {
            caps.get(3).and_then(|name| named_entity(name.as_str()))
        };

        match ch {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    });

    decoded.into_owned()
}

fn is_reserved_name(name: &str) -> bool {
    lazy_static! {
        static ref RESERVED_REGEX: Regex = Regex::new(
            r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$"
        ).unwrap();
    }
    name == "." || name == ".." || RESERVED_REGEX.is_match(name)
}

/// Turns an arbitrary title into something usable as a single directory name.
/// Returns an empty string when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name.chars()
        .filter(|&c| !c.is_control())
        .filter(|c| !matches!(*c, '/' | '?' | '<' | '>' | '\\' | ':' | '*' | '|' | '"'))
        .collect();

    let cleaned = cleaned.trim_end_matches(|c: char| c == '.' || c == ' ');
    if is_reserved_name(cleaned) {
        return String::new();
    }

    let mut res = String::new();
    for c in cleaned.chars() {
        if res.len() + c.len_utf8() > MAX_FILE_NAME_BYTES {
            break;
        }
        res.push(c);
    }
    res
}
