//! Formatting helpers shared across front ends.

use chrono::{DateTime, Utc};

use crate::types::{Message, Sender};

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_to(ts, Utc::now())
}

fn format_relative_to(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 5 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        ts.format("%b %d %H:%M").to_string()
    }
}

/// Speaker label used when printing a transcript line.
pub fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Assistant => "assistant",
    }
}

/// One transcript line: `[assistant · 2m ago] text`.
pub fn transcript_line(msg: &Message) -> String {
    format!(
        "[{} · {}] {}",
        sender_label(msg.sender),
        format_relative_time(msg.created_at),
        msg.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_to(now, now), "just now");
        assert_eq!(
            format_relative_to(now - Duration::seconds(42), now),
            "42s ago"
        );
        assert_eq!(
            format_relative_to(now - Duration::minutes(3), now),
            "3m ago"
        );
        assert_eq!(format_relative_to(now - Duration::hours(5), now), "5h ago");
        // Clock skew never renders a negative duration
        assert_eq!(
            format_relative_to(now + Duration::minutes(1), now),
            "just now"
        );
    }

    #[test]
    fn test_transcript_line() {
        let msg = Message::user("How are my vitals?");
        let line = transcript_line(&msg);
        assert!(line.starts_with("[you · just now]"));
        assert!(line.ends_with("How are my vitals?"));
    }
}
