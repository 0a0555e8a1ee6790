//! Bullet normalization and header filtering for summary sections.
//!
//! The backend's bullet lists arrive with inconsistent decoration: some lines
//! carry their own bullet marker, and the model occasionally echoes the
//! instructional placeholder "gạch đầu dòng" or a short "Heading:" line as if
//! it were content. This module strips one leading marker per line and drops
//! header-like lines:
//!
//! - any line containing the placeholder phrase (case-insensitive, whitespace
//!   between the words optional), or
//! - a line that ends with `:` and has four or fewer words.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{BulletField, Section};

static MARKER_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

/// One optional leading marker (hyphen, en-dash, bullet dot, asterisk) plus
/// at most one following whitespace character.
fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"^[-–•*]\s?").expect("static regex"))
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"(?i)gạch\s*đầu\s*dòng").expect("static regex"))
}

/// Extract the renderable bullets of a section, in original order.
pub fn section_bullets(section: &Section) -> Vec<String> {
    normalize(section.bullets.as_ref())
        .iter()
        .filter_map(|line| clean_line(line))
        .collect()
}

/// Normalize the polymorphic bullets field to one line per candidate bullet.
fn normalize(field: Option<&BulletField>) -> Vec<String> {
    match field {
        Some(BulletField::List(items)) => items.clone(),
        Some(BulletField::Text(block)) => block
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Strip the optional leading marker, then drop empty and header-like lines.
pub fn clean_line(line: &str) -> Option<String> {
    let stripped = marker_re().replace(line, "").trim().to_string();
    if stripped.is_empty() || is_header_like(&stripped) {
        None
    } else {
        Some(stripped)
    }
}

fn is_header_like(line: &str) -> bool {
    if placeholder_re().is_match(line) {
        return true;
    }
    line.ends_with(':') && line.split_whitespace().count() <= 4
}
