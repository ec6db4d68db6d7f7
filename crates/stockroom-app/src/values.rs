// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const INPUT_DATE_LAYOUT: &str = "YYYY-MM-DD";
pub const DISPLAY_DATE_LAYOUT: &str = "MM/DD/YYYY";

const INPUT_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month]/[day]/[year]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    InvalidPrice,
    InvalidInteger,
    InvalidDate,
}

impl std::fmt::Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrice => f.write_str("invalid price value"),
            Self::InvalidInteger => f.write_str("invalid whole number"),
            Self::InvalidDate => f.write_str("invalid date value"),
        }
    }
}

impl std::error::Error for ValueError {}

pub type ValueResult<T> = std::result::Result<T, ValueError>;

/// Parses a user-entered price such as `"1,234.5"` or `"$3"` into cents.
/// A leading minus is accepted so range checks can report it.
pub fn parse_price_cents(input: &str) -> ValueResult<i64> {
    let clean = input.trim().replace(',', "");
    let (negative, clean) = match clean.strip_prefix('-') {
        Some(rest) => (true, rest.to_owned()),
        None => (false, clean),
    };
    let clean = clean.strip_prefix('$').unwrap_or(&clean);
    if clean.is_empty() {
        return Err(ValueError::InvalidPrice);
    }

    let parts = clean.split('.').collect::<Vec<_>>();
    if parts.len() > 2 {
        return Err(ValueError::InvalidPrice);
    }

    let whole = parse_digits(parts[0], parts.len() == 2)?;
    if whole > i64::MAX / 100 {
        return Err(ValueError::InvalidPrice);
    }

    let mut frac = 0i64;
    if parts.len() == 2 {
        if parts[1].len() > 2 {
            return Err(ValueError::InvalidPrice);
        }
        frac = parse_digits(parts[1], false)?;
        if parts[1].len() == 1 {
            frac *= 10;
        }
    }

    let cents = whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(frac))
        .ok_or(ValueError::InvalidPrice)?;
    Ok(if negative { -cents } else { cents })
}

pub fn format_price_cents(cents: i64) -> String {
    let (sign, cents) = normalize_sign(cents);
    format!("{sign}{}.{:02}", comma_format(cents / 100), cents % 100)
}

/// Plain `whole.fraction` rendering used to seed editable inputs.
pub fn format_price_input(cents: i64) -> String {
    let (sign, cents) = normalize_sign(cents);
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

pub fn parse_whole_number(input: &str) -> ValueResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValueError::InvalidInteger)
}

pub fn parse_input_date(input: &str) -> ValueResult<Date> {
    Date::parse(input.trim(), INPUT_DATE).map_err(|_| ValueError::InvalidDate)
}

pub fn format_input_date(date: Date) -> String {
    date.format(INPUT_DATE).unwrap_or_default()
}

pub fn format_display_date(date: Date) -> String {
    date.format(DISPLAY_DATE).unwrap_or_default()
}

/// Accepts `YYYY-MM-DD` or any ISO-8601 timestamp and keeps the calendar part.
pub fn parse_wire_date(input: &str) -> Option<Date> {
    let trimmed = input.trim();
    let head = trimmed.get(..10)?;
    let rest = &trimmed[10..];
    if !rest.is_empty() && !rest.starts_with(['T', 't', ' ']) {
        return None;
    }
    Date::parse(head, INPUT_DATE).ok()
}

fn parse_digits(input: &str, allow_empty: bool) -> ValueResult<i64> {
    if input.is_empty() {
        if allow_empty {
            return Ok(0);
        }
        return Err(ValueError::InvalidPrice);
    }
    if !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValueError::InvalidPrice);
    }
    input.parse::<i64>().map_err(|_| ValueError::InvalidPrice)
}

fn comma_format(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut chars = digits.chars().collect::<Vec<_>>();
    let mut count = 0usize;
    while let Some(ch) = chars.pop() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}

fn normalize_sign(cents: i64) -> (&'static str, i64) {
    if cents >= 0 {
        return ("", cents);
    }
    if cents == i64::MIN {
        ("-", i64::MAX)
    } else {
        ("-", -cents)
    }
}
