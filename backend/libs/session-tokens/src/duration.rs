//! Token lifetime strings.
//!
//! Lifetimes are configured as `<integer><unit>` with unit one of `s`, `m`, `h`, `d`, up to
//! [`MAX_LIFETIME_SECS`].
//! Anything else falls back to [`DEFAULT_LIFETIME_SECS`] instead of failing, so a typo
//! in configuration yields short-lived tokens rather than a dead service.

/// Fallback lifetime for unparseable strings (15 minutes)
pub const DEFAULT_LIFETIME_SECS: i64 = 900;

/// Longest accepted lifetime (100 years); larger values are treated as unparseable
pub const MAX_LIFETIME_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Parse a lifetime string into seconds, falling back to the default.
pub fn parse_lifetime_secs(value: &str) -> i64 {
    match try_parse_lifetime_secs(value) {
        Some(secs) => secs,
        None => {
            tracing::warn!(
                value = %value,
                default_secs = DEFAULT_LIFETIME_SECS,
                "Unparseable token lifetime, using default"
            );
            DEFAULT_LIFETIME_SECS
        }
    }
}

fn try_parse_lifetime_secs(value: &str) -> Option<i64> {
    let value = value.trim();
    let unit = value.chars().last()?;
    let amount = &value[..value.len() - unit.len_utf8()];

    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return None,
    };

    amount
        .parse::<i64>()
        .ok()?
        .checked_mul(multiplier)
        .filter(|secs| *secs <= MAX_LIFETIME_SECS)
}
