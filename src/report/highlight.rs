//! Report cell highlighting.
//!
//! Highlight rules are decided independently of whether colour output is
//! enabled; [`Highlight::paint`] degrades to the plain text when it is not.

use crate::measurement::DnsAnswer;
use crossterm::style::{Color, Stylize};

/// Highlight applied to a report cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// No highlight.
    #[default]
    None,
    /// Latency grew beyond the diff threshold.
    Increase,
    /// Latency shrank beyond the diff threshold.
    Decrease,
    /// Zero latency difference (identical, or not comparable).
    Tie,
    /// Response slower than the slow threshold.
    Slow,
    /// No response in this set.
    Absent,
    /// DNS answers differ between the sets.
    Differ,
    /// Probe unknown in both sets.
    Unknown,
    /// No reply in both sets.
    NoReply,
}

impl Highlight {
    /// Wrap `text` in this highlight's terminal styling.
    #[must_use]
    pub fn paint(self, text: &str, color: bool) -> String {
        if !color {
            return text.to_string();
        }
        match self {
            Self::None => text.to_string(),
            Self::Increase | Self::Differ => text.with(Color::Red).bold().to_string(),
            Self::Decrease => text.with(Color::Green).bold().to_string(),
            Self::Tie | Self::Absent | Self::Unknown => text.with(Color::Magenta).to_string(),
            Self::Slow | Self::NoReply => text.with(Color::Yellow).to_string(),
        }
    }

    /// Highlight for a latency difference.
    #[must_use]
    pub fn for_diff(rt_diff: f64, threshold: f64) -> Self {
        if rt_diff > threshold {
            Self::Increase
        } else if rt_diff < -threshold {
            Self::Decrease
        } else if rt_diff == 0.0 {
            Self::Tie
        } else {
            Self::None
        }
    }

    /// Highlight for one response time.
    #[must_use]
    pub fn for_response_time(rt: Option<f64>, slow_threshold: f64) -> Self {
        match rt {
            Some(rt) if rt > slow_threshold => Self::Slow,
            Some(rt) if rt < 0.0 => Self::Absent,
            Some(_) => Self::None,
            None => Self::Absent,
        }
    }

    /// Highlight for the DNS answers of both sets.
    #[must_use]
    pub fn for_answers(a: &DnsAnswer, b: &DnsAnswer) -> Self {
        if a != b {
            return Self::Differ;
        }
        match a {
            DnsAnswer::Unknown => Self::Unknown,
            DnsAnswer::NoReply => Self::NoReply,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_rules() {
        assert_eq!(Highlight::for_diff(12.0, 5.0), Highlight::Increase);
        assert_eq!(Highlight::for_diff(-12.0, 5.0), Highlight::Decrease);
        assert_eq!(Highlight::for_diff(0.0, 5.0), Highlight::Tie);
        assert_eq!(Highlight::for_diff(5.0, 5.0), Highlight::None);
        assert_eq!(Highlight::for_diff(-3.0, 5.0), Highlight::None);
    }

    #[test]
    fn test_response_time_rules() {
        assert_eq!(Highlight::for_response_time(Some(80.0), 50.0), Highlight::Slow);
        assert_eq!(Highlight::for_response_time(Some(20.0), 50.0), Highlight::None);
        assert_eq!(Highlight::for_response_time(None, 50.0), Highlight::Absent);
    }

    #[test]
    fn test_answer_rules() {
        let ams = DnsAnswer::Substring("ams".into());
        let lhr = DnsAnswer::Substring("lhr".into());
        assert_eq!(Highlight::for_answers(&ams, &lhr), Highlight::Differ);
        assert_eq!(Highlight::for_answers(&ams, &ams), Highlight::None);
        assert_eq!(
            Highlight::for_answers(&DnsAnswer::Unknown, &DnsAnswer::Unknown),
            Highlight::Unknown
        );
        assert_eq!(
            Highlight::for_answers(&DnsAnswer::NoReply, &DnsAnswer::NoReply),
            Highlight::NoReply
        );
        assert_eq!(Highlight::for_answers(&ams, &DnsAnswer::Unknown), Highlight::Differ);
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        for h in [Highlight::Increase, Highlight::Slow, Highlight::Tie, Highlight::None] {
            assert_eq!(h.paint("  12.00", false), "  12.00");
        }
        assert_eq!(Highlight::None.paint("x", true), "x");
    }

    #[test]
    fn test_paint_keeps_text() {
        assert!(Highlight::Differ.paint("ams:lhr", true).contains("ams:lhr"));
    }
}
