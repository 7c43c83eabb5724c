//! Content-shape matchers for individual variable values.
//!
//! Every matcher tests a whole, already-trimmed token. The sample parser and
//! the value classifier share these so a value accepted at ingest time is
//! judged by the same rules at scoring time.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap()
});

static RE_IPV6: Lazy<Regex> = Lazy::new(|| {
    // Loose: two to seven groups, shorthand (`::`) allowed
    Regex::new(r"^([0-9a-fA-F]{0,4}:){2,7}[0-9a-fA-F]{0,4}$").unwrap()
});

static RE_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:\-]){5}[0-9A-Fa-f]{2}$").unwrap()
});

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?|ftp)://\S+$").unwrap()
});

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    // Versions 1-5, RFC 4122 variant
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$").unwrap()
});

static RE_HEX_LONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{16,}$").unwrap()
});

static RE_FILEPATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:/|[A-Za-z]:\\).+").unwrap()
});

static RE_HTTP_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{3}$").unwrap()
});

static RE_PORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,5}$").unwrap()
});

static RE_TIMES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{1,2}:\d{2}:\d{2}$").unwrap(),
        Regex::new(r"^\d{1,2}:\d{2}$").unwrap(),
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(),
        Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap(),
    ]
});

static RE_USERNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap()
});

static RE_HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-.]*[a-zA-Z0-9]$|^[a-zA-Z0-9]$").unwrap()
});

pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

pub fn is_ipv4(s: &str) -> bool {
    RE_IPV4.is_match(s)
}

pub fn is_ipv6(s: &str) -> bool {
    RE_IPV6.is_match(s)
}

pub fn is_mac(s: &str) -> bool {
    RE_MAC.is_match(s)
}

pub fn is_email(s: &str) -> bool {
    RE_EMAIL.is_match(s)
}

pub fn is_url(s: &str) -> bool {
    RE_URL.is_match(s)
}

pub fn is_uuid(s: &str) -> bool {
    RE_UUID.is_match(s)
}

pub fn is_long_hex(s: &str) -> bool {
    RE_HEX_LONG.is_match(s)
}

pub fn is_http_method(s: &str) -> bool {
    HTTP_METHODS.contains(&s)
}

pub fn is_http_status(s: &str) -> bool {
    RE_HTTP_STATUS.is_match(s) && in_range(s, 100, 599)
}

/// Absolute POSIX or `C:\` path, or anything with a slash that is not a URL.
pub fn is_path(s: &str) -> bool {
    RE_FILEPATH.is_match(s) || (s.contains('/') && !is_url(s))
}

/// One to five digits, no range check. Dictionary headers accept values on
/// this shape alone.
pub fn is_port_shaped(s: &str) -> bool {
    RE_PORT.is_match(s)
}

pub fn is_port(s: &str) -> bool {
    is_port_shaped(s) && in_range(s, 1, 65535)
}

pub fn is_time(s: &str) -> bool {
    RE_TIMES.iter().any(|re| re.is_match(s))
}

pub fn is_username_shaped(s: &str) -> bool {
    RE_USERNAME.is_match(s)
}

/// Username-shaped and not purely numeric.
pub fn is_username(s: &str) -> bool {
    is_username_shaped(s) && !is_all_digits(s)
}

pub fn is_hostname_shaped(s: &str) -> bool {
    RE_HOSTNAME.is_match(s)
}

/// Hostname-shaped, dotted, and not an IPv4 literal.
pub fn is_hostname(s: &str) -> bool {
    is_hostname_shaped(s) && s.contains('.') && !is_ipv4(s)
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_numeric())
}

fn in_range(s: &str, lo: u32, hi: u32) -> bool {
    s.parse::<u32>().map(|n| (lo..=hi).contains(&n)).unwrap_or(false)
}
