//! Chat session timing summary.

use std::time::Duration;

use fitfusion_core::TurnTiming;

/// Format a Duration as human-readable elapsed time (e.g., "1m 5s").
pub fn format_elapsed_time(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    match (minutes, seconds) {
        (m, s) if m > 0 => format!("{}m {}s", m, s),
        (_, s) if s > 0 => format!("{:.1}s", duration.as_secs_f64()),
        _ => format!("{}ms", duration.as_millis()),
    }
}

/// Render a per-turn summary of the chat session for display on exit.
pub fn summarize_turns(timings: &[TurnTiming]) -> String {
    if timings.is_empty() {
        return "No chat turns this session".to_string();
    }

    let mut summary = String::new();
    summary.push_str("Session summary:\n");
    for (i, timing) in timings.iter().enumerate() {
        let first = timing
            .time_to_first_snapshot
            .map(format_elapsed_time)
            .unwrap_or_else(|| "-".to_string());
        summary.push_str(&format!(
            "  turn {:2}: first text {:>7}, total {:>7}, {} chars\n",
            i + 1,
            first,
            format_elapsed_time(timing.total),
            timing.answer_chars
        ));
    }

    let total: Duration = timings.iter().map(|t| t.total).sum();
    let total_chars: usize = timings.iter().map(|t| t.answer_chars).sum();
    summary.push_str(&format!(
        "  {} turns, {} chars, {} waiting on the coach\n",
        timings.len(),
        total_chars,
        format_elapsed_time(total)
    ));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_time() {
        assert_eq!(format_elapsed_time(Duration::from_millis(420)), "420ms");
        assert_eq!(format_elapsed_time(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed_time(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn empty_session_summary() {
        assert!(summarize_turns(&[]).contains("No chat turns"));
    }

    #[test]
    fn summary_lists_each_turn() {
        let timings = vec![
            TurnTiming {
                time_to_first_snapshot: Some(Duration::from_millis(300)),
                total: Duration::from_secs(2),
                answer_chars: 120,
            },
            TurnTiming {
                time_to_first_snapshot: None,
                total: Duration::from_secs(1),
                answer_chars: 0,
            },
        ];
        let summary = summarize_turns(&timings);
        assert!(summary.contains("turn  1"));
        assert!(summary.contains("turn  2"));
        assert!(summary.contains("2 turns"));
        assert!(summary.contains("120 chars"));
    }
}
