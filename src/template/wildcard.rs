//! `__name__` wildcard tokens.
//!
//! Full token grammar:
//!
//! ```text
//! [COUNT$$]__[MOD]NAME[|FILTER]*__
//! ```
//!
//! - `COUNT` lines are taken (default 1) and joined with `,`
//! - `MOD` picks the start line when the same name repeats in one pass:
//!   `!` the seed, `+` seed + 1, `-` seed - 1, `*` or nothing a random line
//! - `FILTER` words restrict the pick to lines that contain one of them as
//!   a whole word, case-insensitively
//!
//! Lines are chosen by a running offset that starts at the seed and
//! advances by `COUNT` after every token, so consecutive wildcards walk
//! through their files together.

use crate::template::source::WildcardSource;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

static WILDCARD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(\d+)\$\$)?__([!+\-*])?((?:[^|_]+_)*[^|_]+)((?:\|[^|]+?)*)__")
        .expect("valid wildcard pattern")
});

const RANDOM_OFFSET_MAX: i128 = 1_000_000;

/// Start-line rule for a repeated wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetModifier {
    /// `!`: start at the seed.
    Lock,
    /// `+`: start one past the seed.
    Increment,
    /// `-`: start one before the seed.
    Decrement,
    /// `*`: random start.
    Random,
    /// No modifier; same as `*`.
    #[default]
    Unset,
}

impl OffsetModifier {
    fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "!" => OffsetModifier::Lock,
            "+" => OffsetModifier::Increment,
            "-" => OffsetModifier::Decrement,
            "*" => OffsetModifier::Random,
            _ => OffsetModifier::Unset,
        }
    }

    /// Offset used for a repeat of an already resolved name.
    pub fn repeat_offset<R: Rng + ?Sized>(self, seed: i128, rng: &mut R) -> i128 {
        match self {
            OffsetModifier::Lock => seed,
            OffsetModifier::Increment => seed + 1,
            OffsetModifier::Decrement => seed - 1,
            OffsetModifier::Random | OffsetModifier::Unset => rng.gen_range(0..=RANDOM_OFFSET_MAX),
        }
    }
}

/// One parsed wildcard occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardToken<'a> {
    pub count: usize,
    pub modifier: OffsetModifier,
    pub name: &'a str,
    pub filters: Vec<&'a str>,
    /// Byte range of the whole token in the source text.
    pub span: Range<usize>,
}

/// Find every wildcard token in `text`, left to right.
pub fn parse_wildcards(text: &str) -> Vec<WildcardToken<'_>> {
    WILDCARD_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let count = match caps.get(1) {
                Some(digits) => digits.as_str().parse().unwrap_or(1),
                None => 1,
            };
            let modifier = caps
                .get(2)
                .map(|m| OffsetModifier::from_symbol(m.as_str()))
                .unwrap_or_default();
            let filters = caps
                .get(4)
                .map(|m| m.as_str().split('|').skip(1).collect())
                .unwrap_or_default();

            Some(WildcardToken {
                count,
                modifier,
                name: caps.get(3)?.as_str(),
                filters,
                span: whole.range(),
            })
        })
        .collect()
}

/// Case-insensitive whole-word matcher for a token's filters.
fn filter_matcher(filters: &[&str]) -> Option<Regex> {
    if filters.is_empty() {
        return None;
    }
    let words: Vec<String> = filters.iter().map(|f| regex::escape(f)).collect();
    let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("Ignoring wildcard filters {:?}: {}", filters, err);
            None
        }
    }
}

/// Pick `count` lines starting at `offset`.
///
/// Without a filter the lines are consecutive (wrapping). With a filter
/// each repetition scans forward from `offset + i` for the first matching
/// line; a repetition with no match adds nothing.
pub fn select_lines(
    lines: &[String],
    offset: i128,
    count: usize,
    filter: Option<&Regex>,
) -> Vec<String> {
    let n = lines.len();
    if n == 0 {
        return Vec::new();
    }
    let at = |i: i128| lines[i.rem_euclid(n as i128) as usize].trim().to_string();

    match filter {
        None => (0..count as i128).map(|i| at(offset + i)).collect(),
        Some(re) => (0..count as i128)
            .filter_map(|i| {
                (0..n as i128)
                    .map(|j| at(offset + i + j))
                    .find(|line| re.is_match(line))
            })
            .collect(),
    }
}

/// Resolve every wildcard in `text` once.
///
/// Missing or empty wildcard files leave their token in the text.
pub fn resolve_wildcards<R: Rng + ?Sized>(
    text: &str,
    seed: u64,
    source: &dyn WildcardSource,
    rng: &mut R,
) -> String {
    let seed = i128::from(seed);
    let mut offset = seed;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for token in parse_wildcards(text) {
        out.push_str(&text[last..token.span.start]);
        last = token.span.end;

        let lines = match source.lines(token.name) {
            Some(lines) if !lines.is_empty() => lines,
            Some(_) => {
                log::warn!("Wildcard '{}' is empty", token.name);
                out.push_str(&text[token.span.clone()]);
                continue;
            }
            None => {
                log::warn!("Wildcard '{}' not found", token.name);
                out.push_str(&text[token.span.clone()]);
                continue;
            }
        };

        let saved = if seen.contains(token.name) {
            let saved = offset;
            offset = token.modifier.repeat_offset(seed, rng);
            Some(saved)
        } else {
            None
        };

        let filter = filter_matcher(&token.filters);
        let selected = select_lines(&lines, offset, token.count, filter.as_ref());
        out.push_str(&selected.join(","));

        seen.insert(token.name);
        if let Some(saved) = saved {
            offset = saved;
        }
        offset += token.count as i128;
    }

    out.push_str(&text[last..]);
    out
}
