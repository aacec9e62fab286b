//! Decoding of raw traffic-log fields into numeric features

use crate::error::{NetclassError, Result};
use std::net::Ipv4Addr;
use tracing::warn;

/// Number of numeric features produced per IP address column
pub const IP_FEATURES: usize = 5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Split an address into its four IPv4 octets followed by an IPv6 flag.
///
/// IPv6 addresses (anything containing ':') become `[0, 0, 0, 0, 1]`; values
/// without a '.' become all zeros.
pub fn split_ip(addr: &str) -> Result<[f64; IP_FEATURES]> {
    let addr = addr.trim();
    if addr.contains(':') {
        return Ok([0.0, 0.0, 0.0, 0.0, 1.0]);
    }
    if !addr.contains('.') {
        return Ok([0.0; IP_FEATURES]);
    }

    let ip: Ipv4Addr = addr
        .parse()
        .map_err(|_| NetclassError::InvalidInput(format!("malformed IPv4 address '{}'", addr)))?;
    let [a, b, c, d] = ip.octets();
    Ok([a as f64, b as f64, c as f64, d as f64, 0.0])
}

/// Names of the columns `split_ip` produces for `column`
pub fn ip_feature_names(column: &str) -> [String; IP_FEATURES] {
    [
        format!("{}_0", column),
        format!("{}_1", column),
        format!("{}_2", column),
        format!("{}_3", column),
        format!("{}_ipv6", column),
    ]
}

/// Parse a pandas-style duration (`"D days HH:MM:SS[.ffffff]"`) into seconds.
///
/// A missing day component is an error; an unreadable clock part logs a warning
/// and yields 0.
pub fn parse_flow_duration(value: &str) -> Result<f64> {
    let (days, clock) = value.trim().split_once(" days ").ok_or_else(|| {
        NetclassError::InvalidInput(format!("duration '{}' has no day component", value))
    })?;
    let days: u64 = days.trim().parse().map_err(|_| {
        NetclassError::InvalidInput(format!("invalid day count in duration '{}'", value))
    })?;

    match parse_clock(clock.trim()) {
        Some(seconds) => Ok(days as f64 * SECONDS_PER_DAY + seconds),
        None => {
            warn!(duration = value, "Unreadable clock component, using 0");
            Ok(0.0)
        }
    }
}

fn parse_clock(clock: &str) -> Option<f64> {
    let mut parts = clock.splitn(3, ':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let rest = parts.next()?;
    let (seconds, fraction) = match rest.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (rest, None),
    };
    let seconds: u32 = seconds.parse().ok()?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let fraction = match fraction {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            format!("0.{}", digits).parse::<f64>().ok()?
        }
        Some(_) => return None,
        None => 0.0,
    };

    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds) + fraction)
}
