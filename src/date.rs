use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const TWITTER_CREATED_AT: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar date (UTC) of a tweet timestamp.
/// Accepts Twitter's `Wed Oct 10 20:19:24 +0000 2018` or anything starting with `YYYY-MM-DD`.
pub fn tweet_date(created_at: &str) -> Option<Date> {
    let s = created_at.trim();
    if let Ok(dt) = OffsetDateTime::parse(s, TWITTER_CREATED_AT) {
        return Some(dt.to_offset(UtcOffset::UTC).date());
    }
    s.get(..10).and_then(|head| Date::parse(head, ISO_DATE).ok())
}

/// Format as `YYYY-MM-DD`.
pub fn format_date(d: Date) -> String {
    d.format(ISO_DATE).unwrap_or_else(|_| d.to_string())
}

/// Strict `YYYY-MM-DD` parser for CLI date bounds.
pub fn parse_date_arg(s: &str) -> Result<Date, String> {
    Date::parse(s.trim(), ISO_DATE).map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
