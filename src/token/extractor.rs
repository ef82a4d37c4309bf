// src/token/extractor.rs

//! Pulls token parameters out of a free-text chat request.
//!
//! Each field has an ordered list of patterns. Patterns are tried in order,
//! and inside a matching pattern the capture groups are tried left to right;
//! the first non-empty capture wins. Numeric fields fall back to fixed
//! defaults whenever they are absent or do not parse.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TOTAL_SUPPLY: f64 = 1_000_000.0;
pub const DEFAULT_DECIMALS: u8 = 18;
pub const DEFAULT_CREATOR_SHARE: u8 = 40;
pub const DEFAULT_STAKING_SHARE: u8 = 40;

/// Token description recovered from a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenParameters {
    pub name: String,
    pub symbol: String,
    pub total_supply: f64,
    pub decimals: u8,
    /// Percentage (0-100) of the supply kept by the creator.
    pub creator_share: u8,
    /// Percentage (0-100) of the supply routed to staking.
    pub staking_share: u8,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid extractor pattern {p}: {e}")))
        .collect()
}

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"called ['"](.*?)['"]|name ['"](.*?)['"]|named ['"](.*?)['"]"#,
        r#"name:?\s+['"](.*?)['"]"#,
        r#"token\s+['"](.*?)['"]"#,
        r"called\s+(\w+)",
        r"name:?\s+(\w+)",
    ])
});

static SYMBOL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"symbol ['"](.*?)['"]|symbol:?\s+['"](.*?)['"]"#,
        r"symbol:?\s+(\w+)",
        r"ticker:?\s+(\w+)",
        r#"ticker ['"](.*?)['"]|ticker:?\s+['"](.*?)['"]"#,
        r#"with\s+symbol\s+['"](.*?)['"]"#,
        r"with\s+symbol\s+(\w+)",
    ])
});

static SUPPLY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"supply\s+of\s+([0-9,.]+)",
        r"supply:?\s+([0-9,.]+)",
        r"([0-9,.]+)\s+total\s+supply",
        r"([0-9,.]+)\s+tokens",
    ])
});

static DECIMALS_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"([0-9]+)\s+decimals", r"decimals:?\s+([0-9]+)"]));

static CREATOR_SHARE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"creator\s+share\s+(\d+)%",
        r"creator\s+share:?\s+(\d+)",
        r"creator:?\s+(\d+)%",
    ])
});

static STAKING_SHARE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"staking\s+share\s+(\d+)%",
        r"staking\s+share:?\s+(\d+)",
        r"staking:?\s+(\d+)%",
    ])
});

/// Returns the first non-blank capture, scanning patterns in order and the
/// groups of each matching pattern left to right.
pub fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        caps.iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First three characters of the name, upper-cased.
pub fn derive_symbol(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

// Leading decimal number; trailing punctuation after it is ignored.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?|\.\d+)")
        .unwrap_or_else(|e| panic!("invalid numeric prefix pattern: {e}"))
});

/// Supply from its captured text: commas are dropped and the longest leading
/// number is read, so `"2.5."` at the end of a sentence is `2.5`.
pub fn parse_supply(raw: Option<&str>) -> f64 {
    raw.map(|s| s.replace(',', ""))
        .and_then(|s| NUMERIC_PREFIX.find(&s)?.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_TOTAL_SUPPLY)
}

pub fn parse_decimals(raw: Option<&str>) -> u8 {
    raw.and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(DEFAULT_DECIMALS)
}

pub fn parse_percentage(raw: Option<&str>, default: u8) -> u8 {
    raw.and_then(|s| s.trim().parse::<u8>().ok())
        .filter(|v| *v <= 100)
        .unwrap_or(default)
}

/// Extracts token parameters from `text`. Returns `None` when no token name
/// can be found; every other field has a default.
pub fn extract(text: &str) -> Option<TokenParameters> {
    if text.trim().is_empty() {
        debug!("Token parameter extraction skipped: empty input");
        return None;
    }

    let Some(name) = first_capture(&NAME_PATTERNS, text) else {
        debug!("Token parameter extraction failed: no token name in request");
        return None;
    };

    let symbol = first_capture(&SYMBOL_PATTERNS, text).unwrap_or_else(|| derive_symbol(&name));

    let supply = first_capture(&SUPPLY_PATTERNS, text);
    let decimals = first_capture(&DECIMALS_PATTERNS, text);
    let creator = first_capture(&CREATOR_SHARE_PATTERNS, text);
    let staking = first_capture(&STAKING_SHARE_PATTERNS, text);

    Some(TokenParameters {
        name,
        symbol,
        total_supply: parse_supply(supply.as_deref()),
        decimals: parse_decimals(decimals.as_deref()),
        creator_share: parse_percentage(creator.as_deref(), DEFAULT_CREATOR_SHARE),
        staking_share: parse_percentage(staking.as_deref(), DEFAULT_STAKING_SHARE),
    })
}

/// Human-readable summary of the parameters, used in previews.
pub fn format_token_details(params: &TokenParameters) -> String {
    format!(
        "📋 Token Details:\n\
         - Name: {}\n\
         - Symbol: {}\n\
         - Total Supply: {}\n\
         - Decimals: {}\n\
         - Creator Share: {}%\n\
         - Staking Share: {}%",
        params.name,
        params.symbol,
        params.total_supply,
        params.decimals,
        params.creator_share,
        params.staking_share
    )
}
