use crate::{
    analysis::AnalysisOutcome,
    types::{ContentStats, SentimentResult, SummaryResult, Transcript},
};

pub const WORDS_PER_MINUTE: u64 = 200;

/// Fraction in [0, 1] as a whole percentage.
pub fn percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Reading time in minutes, never less than one.
pub fn reading_minutes(words: u64) -> u64 {
    ((words as f64 / WORDS_PER_MINUTE as f64).round() as u64).max(1)
}

/// Transcript paragraphs with their timestamps, one per line.
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .paragraphs
        .iter()
        .map(|p| format!("[{}] {}", p.timestamp, p.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_sentiment_readable(sentiment: &SentimentResult) -> String {
    let mut output = String::new();
    output.push_str("## Sentiment\n\n");
    output.push_str(&format!(
        "**{}** ({}% confidence)\n\n",
        sentiment.label.display_name(),
        percent(sentiment.confidence)
    ));
    output.push_str(&format!("• Positive: {}%\n", percent(sentiment.scores.positive)));
    output.push_str(&format!("• Neutral: {}%\n", percent(sentiment.scores.neutral)));
    output.push_str(&format!("• Negative: {}%\n", percent(sentiment.scores.negative)));
    output.push('\n');
    output
}

pub fn format_summary_readable(summary: &SummaryResult) -> String {
    let mut output = String::new();
    output.push_str("## Summary\n\n");
    output.push_str(summary.summary.trim());
    output.push_str("\n\n");
    output.push_str(&format!(
        "**Original:** {} words | **Summary:** {} words | **Compression:** {}% | **Reading time:** {} min\n\n",
        summary.original_length,
        summary.summary_length,
        percent(summary.compression_ratio),
        reading_minutes(summary.summary_length)
    ));
    output
}

/// Text report of a finished run, used where the web client offered a PDF.
pub fn format_outcome_readable(outcome: &AnalysisOutcome) -> String {
    let mut output = String::new();
    output.push_str("# SentimentScope Analysis Summary\n\n");
    output.push_str(&format!(
        "**Target:** {} | **Status:** {}\n\n",
        outcome.target,
        outcome.state.status_text()
    ));

    if let Some(sentiment) = &outcome.sentiment {
        output.push_str(&format_sentiment_readable(sentiment));
    }
    if let Some(summary) = &outcome.summary {
        output.push_str(&format_summary_readable(summary));
    }
    if let Some(error) = &outcome.error {
        output.push_str(&format!("**Error:** {}\n\n", error.user_message()));
    }

    output
}

pub fn format_stats(stats: &ContentStats) -> String {
    format!(
        "{} articles, {} transcripts, {} words",
        stats.article_count, stats.transcript_count, stats.total_words
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SentimentLabel, SentimentScores};

    #[test]
    fn reading_time_rounds_with_a_floor_of_one() {
        assert_eq!(reading_minutes(0), 1);
        assert_eq!(reading_minutes(299), 1);
        assert_eq!(reading_minutes(300), 2);
        assert_eq!(reading_minutes(1000), 5);
    }

    #[test]
    fn sentiment_renders_percentages() {
        let text = format_sentiment_readable(&SentimentResult {
            label: SentimentLabel::Positive,
            confidence: 0.92,
            scores: SentimentScores {
                positive: 0.8,
                neutral: 0.15,
                negative: 0.05,
            },
        });
        assert!(text.contains("**Positive** (92% confidence)"));
        assert!(text.contains("Neutral: 15%"));
        assert!(text.contains("Negative: 5%"));
    }

    #[test]
    fn summary_renders_compression() {
        let text = format_summary_readable(&SummaryResult {
            summary: "Short.".into(),
            original_length: 400,
            summary_length: 100,
            compression_ratio: 0.25,
        });
        assert!(text.contains("**Compression:** 25%"));
        assert!(text.contains("**Reading time:** 1 min"));
    }
}
