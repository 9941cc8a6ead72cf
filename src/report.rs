//! Console rendering of query results.
//!
//! Each function returns the text for one item, newline-terminated, so the
//! caller decides where it goes.

use std::fmt::Write;

use crate::hotels::HotelSummary;
use crate::types::{AnswerResult, SearchResult};

/// Header printed above a counted listing
pub fn total_count_line(count: Option<u64>) -> String {
    match count {
        Some(count) => format!("Total Documents Matching Query: {count}\n"),
        None => "Total Documents Matching Query: unknown\n".to_string(),
    }
}

/// Score, hotel name and description of a keyword or wildcard result
pub fn keyword_result(result: &SearchResult<HotelSummary>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format_score(result.score));
    push_summary(&mut out, &result.document);
    out
}

/// Reranker score, name, description and caption of a semantic result.
///
/// The score line is empty when the service did not rerank the result. The
/// caption line is followed by a blank line and is omitted when the result
/// has no caption.
pub fn semantic_result(result: &SearchResult<HotelSummary>) -> String {
    let mut out = String::new();
    let score = result.reranker_score.map(format_score).unwrap_or_default();
    let _ = writeln!(out, "{score}");
    push_summary(&mut out, &result.document);

    if let Some(caption) = result.caption() {
        let _ = writeln!(out, "Caption: {}\n", caption.preferred_text().unwrap_or(""));
    }
    out
}

/// Answer text (highlighted when available) and its confidence
pub fn semantic_answer(answer: &AnswerResult) -> String {
    let score = answer.score.map(format_score).unwrap_or_default();
    format!(
        "Semantic Answer: {}\nSemantic Answer Score: {}\n\n",
        answer.preferred_text().unwrap_or(""),
        score
    )
}

fn push_summary(out: &mut String, hotel: &HotelSummary) {
    let _ = writeln!(out, "{}", hotel.hotel_name.as_deref().unwrap_or(""));
    let _ = writeln!(
        out,
        "Description: {}",
        hotel.description.as_deref().unwrap_or("")
    );
}

/// Scores always keep a fractional part: `1.0`, not `1`
pub fn format_score(score: f64) -> String {
    format!("{score:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaptionResult;

    fn hotel_result(score: f64, reranker: Option<f64>) -> SearchResult<HotelSummary> {
        SearchResult {
            score,
            reranker_score: reranker,
            highlights: None,
            captions: None,
            document: HotelSummary {
                hotel_id: Some("1".to_string()),
                hotel_name: Some("Stay-Kay City Hotel".to_string()),
                description: Some("Ideally located on a main commercial artery.".to_string()),
                category: Some("Boutique".to_string()),
            },
        }
    }

    #[test]
    fn test_total_count_line() {
        assert_eq!(total_count_line(Some(50)), "Total Documents Matching Query: 50\n");
        assert_eq!(
            total_count_line(None),
            "Total Documents Matching Query: unknown\n"
        );
    }

    #[test]
    fn test_keyword_result() {
        assert_eq!(
            keyword_result(&hotel_result(1.0, None)),
            "1.0\nStay-Kay City Hotel\nDescription: Ideally located on a main commercial artery.\n"
        );
    }

    #[test]
    fn test_semantic_result_prefers_highlights() {
        let mut result = hotel_result(6.2, Some(2.6132));
        result.captions = Some(vec![CaptionResult {
            text: Some("Ideally located on a main commercial artery.".to_string()),
            highlights: Some("Ideally located on a <em>main commercial</em> artery.".to_string()),
        }]);

        assert_eq!(
            semantic_result(&result),
            "2.6132\nStay-Kay City Hotel\nDescription: Ideally located on a main commercial artery.\n\
             Caption: Ideally located on a <em>main commercial</em> artery.\n\n"
        );
    }

    #[test]
    fn test_semantic_result_falls_back_to_text() {
        let mut result = hotel_result(6.2, Some(2.5));
        result.captions = Some(vec![CaptionResult {
            text: Some("plain caption".to_string()),
            highlights: Some(String::new()),
        }]);
        assert!(semantic_result(&result).ends_with("Caption: plain caption\n\n"));

        result.captions = None;
        assert!(!semantic_result(&result).contains("Caption:"));
    }

    #[test]
    fn test_semantic_result_without_reranker_score() {
        let result = hotel_result(6.2, None);
        assert_eq!(
            semantic_result(&result),
            "\nStay-Kay City Hotel\nDescription: Ideally located on a main commercial artery.\n"
        );
    }

    #[test]
    fn test_semantic_answer() {
        let answer = AnswerResult {
            key: Some("24".to_string()),
            text: Some("Library hotel.".to_string()),
            highlights: None,
            score: Some(0.9),
        };
        assert_eq!(
            semantic_answer(&answer),
            "Semantic Answer: Library hotel.\nSemantic Answer Score: 0.9\n\n"
        );
    }
}
