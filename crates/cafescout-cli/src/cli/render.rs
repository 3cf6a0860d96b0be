//! Output for command results.
//!
//! Text mode prints colored tables and messages; JSON mode prints the whole
//! [`CmdResult`] as one pretty-printed document so scripts get the same data
//! the table was drawn from.

use super::setup::OutputFormat;
use cafescout::commands::{CmdMessage, CmdResult, MessageLevel};
use cafescout::config::CafeConfig;
use cafescout::model::{Cafe, CafeId, CafeReviews, UserProfile, UserSummary};
use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use std::collections::BTreeMap;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 32;
const TAGS_WIDTH: usize = 40;
const TIME_WIDTH: usize = 14;

pub fn render(result: &CmdResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Text => render_text(result),
    }
    Ok(())
}

fn render_text(result: &CmdResult) {
    if let Some(cafe) = &result.cafe {
        print_cafe_detail(cafe);
    }
    if let Some(reviews) = &result.reviews {
        print_reviews(reviews);
    }
    if !result.listed_cafes.is_empty() {
        print_cafes(&result.listed_cafes, &result.review_counts);
    }
    if !result.users.is_empty() {
        print_users(&result.users);
    }
    if let Some(profile) = &result.profile {
        print_profile(profile);
    }
    if let Some(config) = &result.config {
        print_config(config);
    }
    if let Some(path) = &result.config_path {
        println!("{}", path.display());
    }
    print_messages(&result.messages);
}

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// One table row, already padded to column width.
#[derive(Debug, PartialEq)]
pub(super) struct CafeRow {
    pub id: String,
    pub name: String,
    pub price: String,
    pub rating: String,
    pub tags: String,
}

pub(super) fn cafe_row(cafe: &Cafe) -> CafeRow {
    let tag_list = cafe.tag_set().iter().collect::<Vec<_>>().join(", ");
    CafeRow {
        id: format!("{:>4}", cafe.cafe_id),
        name: pad_to_width(&truncate_to_width(&cafe.name, NAME_WIDTH), NAME_WIDTH),
        price: format!("{:<3}", cafe.price_label()),
        rating: format!("{:>4}", rating_label(cafe.overall_rating)),
        tags: truncate_to_width(&tag_list, TAGS_WIDTH),
    }
}

/// "(1 review)" / "(3 reviews)".
pub(super) fn review_count_label(count: u64) -> String {
    if count == 1 {
        "(1 review)".to_string()
    } else {
        format!("({} reviews)", count)
    }
}

pub(super) fn print_cafes(cafes: &[Cafe], review_counts: &BTreeMap<CafeId, u64>) {
    for cafe in cafes {
        let row = cafe_row(cafe);
        let rating = if cafe.overall_rating.is_some() {
            row.rating.green()
        } else {
            row.rating.dimmed()
        };
        match review_counts.get(&cafe.cafe_id) {
            Some(&count) => println!(
                "{}  {}  {}  {} {}  {}",
                row.id.yellow(),
                row.name,
                row.price,
                rating,
                review_count_label(count).dimmed(),
                row.tags.dimmed()
            ),
            None => println!(
                "{}  {}  {}  {}  {}",
                row.id.yellow(),
                row.name,
                row.price,
                rating,
                row.tags.dimmed()
            ),
        }
    }
}

fn print_cafe_detail(cafe: &Cafe) {
    println!(
        "{} {}  {}  {}",
        cafe.cafe_id.to_string().yellow(),
        cafe.name.bold(),
        cafe.price_label(),
        rating_label(cafe.overall_rating).green()
    );
    if !cafe.address.is_empty() {
        println!("{}", cafe.address);
    }
    let tags = cafe.tag_set();
    if !tags.is_empty() {
        println!("{}", tags.iter().collect::<Vec<_>>().join(", ").dimmed());
    }
    if let Some(summary) = cafe.ai_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        println!();
        println!("{}", summary.trim());
    }
    println!("--------------------------------");
}

fn print_reviews(reviews: &CafeReviews) {
    if reviews.review_count > 0 {
        println!(
            "{} average from {} review{}",
            format!("{:.1}", reviews.average_rating).green(),
            reviews.review_count,
            if reviews.review_count == 1 { "" } else { "s" }
        );
    }
    let now = Local::now().naive_local();
    for review in &reviews.reviews {
        let when = review
            .created_at
            .map(|t| format_time_ago(t, now))
            .unwrap_or_default();
        println!(
            "{}  {}  {}  {}",
            format!("#{}", review.id).dimmed(),
            format!("{:.1}", review.rating).green(),
            review.username.bold(),
            when.dimmed()
        );
        if let Some(comment) = review.comment.as_deref().filter(|c| !c.is_empty()) {
            println!("    {}", comment);
        }
    }
}

fn print_users(users: &[UserSummary]) {
    for user in users {
        let count = user
            .review_count
            .map(|n| format!("{} review{}", n, if n == 1 { "" } else { "s" }))
            .unwrap_or_default();
        println!(
            "{}  {}  {}",
            format!("{:>4}", user.id).yellow(),
            pad_to_width(&truncate_to_width(&user.username, NAME_WIDTH), NAME_WIDTH),
            count.dimmed()
        );
    }
}

fn print_profile(profile: &UserProfile) {
    println!(
        "{} {}",
        profile.user.username.bold(),
        format!("(id {})", profile.user.id).dimmed()
    );
    let now = Local::now().naive_local();
    for review in &profile.reviews {
        let when = review
            .created_at
            .map(|t| format_time_ago(t, now))
            .unwrap_or_default();
        println!(
            "{}  {}  {}",
            format!("{:.1}", review.rating).green(),
            pad_to_width(
                &truncate_to_width(&review.cafe_name, NAME_WIDTH),
                NAME_WIDTH
            ),
            when.dimmed()
        );
        if let Some(comment) = review.comment.as_deref().filter(|c| !c.is_empty()) {
            println!("    {}", comment);
        }
    }
}

fn print_config(config: &CafeConfig) {
    for (key, value) in config.entries() {
        println!("{} = {}", key.bold(), value);
    }
}

/// "4.5" for rated cafés, "–" otherwise.
pub(super) fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{:.1}", r),
        None => "–".to_string(),
    }
}

/// Cuts `s` to at most `max_width` display columns, ending in '…' when cut.
pub(super) fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if current + w > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current += w;
    }
    result.push('…');
    result
}

/// Right-pads with spaces to `width` display columns. `format!` pads by
/// chars, which misaligns wide characters.
pub(super) fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

pub(super) fn format_time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let duration = now.signed_duration_since(then);
    let formatter = Formatter::new();
    let text = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", text, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_to_width("Java House", 32), "Java House");
        assert_eq!(truncate_to_width("abcd", 4), "abcd");
    }

    #[test]
    fn truncate_marks_cut_strings() {
        let cut = truncate_to_width("Downtown Coffee Roasters", 10);
        assert_eq!(cut, "Downtown …");
        assert_eq!(cut.width(), 10);
    }

    #[test]
    fn pad_counts_display_columns() {
        let padded = pad_to_width("Café", 6);
        assert_eq!(padded, "Café  ");
        assert_eq!(padded.width(), 6);
    }

    #[test]
    fn rating_label_for_unrated() {
        assert_eq!(rating_label(Some(4.0)), "4.0");
        assert_eq!(rating_label(None), "–");
    }

    #[test]
    fn cafe_row_columns() {
        let mut cafe = Cafe::new(7, "Bluebird Café");
        cafe.price = 2;
        cafe.overall_rating = Some(4.5);
        cafe.tags = Some("wifi, Bathrooms".to_string());

        let row = cafe_row(&cafe);
        assert_eq!(row.id, "   7");
        assert_eq!(row.name.width(), NAME_WIDTH);
        assert!(row.name.starts_with("Bluebird Café"));
        assert_eq!(row.price, "$$ ");
        assert_eq!(row.rating, " 4.5");
        assert_eq!(row.tags, "bathrooms, wifi");
    }

    #[test]
    fn review_counts_are_pluralized() {
        assert_eq!(review_count_label(0), "(0 reviews)");
        assert_eq!(review_count_label(1), "(1 review)");
        assert_eq!(review_count_label(12), "(12 reviews)");
    }

    #[test]
    fn time_ago_is_right_aligned() {
        let text = format_time_ago(at(10, 0), at(13, 0));
        assert_eq!(text.len(), TIME_WIDTH);
        assert!(text.trim_start().starts_with("3 hours"));
    }

    #[test]
    fn future_timestamps_do_not_panic() {
        let text = format_time_ago(at(13, 0), at(10, 0));
        assert_eq!(text.len(), TIME_WIDTH);
    }
}
