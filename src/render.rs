//! Presentation of search state for the terminal.
//!
//! Supports both human-readable output and JSON for scripting.

use crate::models::SearchResult;
use crate::search_clients::http::resolve_url;
use crate::view::UiState;
use serde::Serialize;

pub const LOADING: &str = "Searching...";
pub const NO_RESULTS: &str = "No results found";

pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.4}", s),
        None => "N/A".to_string(),
    }
}

/// Hidden when the backend reports no latency at all.
pub fn format_query_time(query_time_ms: Option<f64>) -> Option<String> {
    query_time_ms
        .filter(|t| *t != 0.0)
        .map(|t| format!("Query time: {:.2}ms", t))
}

pub fn image_src(base_url: &str, result: &SearchResult) -> Option<String> {
    result.image_url.as_deref().map(|u| resolve_url(base_url, u))
}

/// Caption, or a positional label for uncaptioned hits. `rank` is 1-based to
/// match the numbered list, so the first uncaptioned hit reads `Result 1`.
pub fn alt_text(result: &SearchResult, rank: usize) -> String {
    match result.caption.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => format!("Result {}", rank),
    }
}

pub fn format_results(base_url: &str, results: &[SearchResult], query_time_ms: Option<f64>) -> String {
    let mut output = String::from("Results\n");
    if let Some(line) = format_query_time(query_time_ms) {
        output.push_str(&line);
        output.push('\n');
    }

    if results.is_empty() {
        output.push_str(NO_RESULTS);
        output.push('\n');
        return output;
    }

    for (i, result) in results.iter().enumerate() {
        let rank = i + 1;
        output.push_str(&format!("{}. {}\n", rank, alt_text(result, rank)));
        if let Some(src) = image_src(base_url, result) {
            output.push_str(&format!("   Image: {}\n", src));
        }
        output.push_str(&format!("   Score: {}\n", format_score(result.score)));
    }
    output
}

/// What the view shows right now: spinner, error, results, or nothing.
pub fn format_state(base_url: &str, state: &UiState) -> String {
    if state.loading {
        return format!("{}\n", LOADING);
    }
    if let Some(err) = &state.error {
        return format!("Error: {}\n", err);
    }
    match &state.results {
        Some(results) => format_results(base_url, results, state.query_time_ms),
        None => String::new(),
    }
}

#[derive(Serialize)]
pub struct JsonOutput {
    pub query_time: Option<f64>,
    pub results: Vec<JsonResult>,
}

#[derive(Serialize)]
pub struct JsonResult {
    pub rank: usize,
    pub image_url: Option<String>,
    /// `image_url` resolved against the base URL.
    pub image_src: Option<String>,
    pub caption: Option<String>,
    pub score: Option<f64>,
}

pub fn format_json(base_url: &str, results: &[SearchResult], query_time_ms: Option<f64>) -> String {
    let output = JsonOutput {
        query_time: query_time_ms,
        results: results
            .iter()
            .enumerate()
            .map(|(i, r)| JsonResult {
                rank: i + 1,
                image_url: r.image_url.clone(),
                image_src: image_src(base_url, r),
                caption: r.caption.clone(),
                score: r.score,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::cat_response;

    const BASE: &str = "http://localhost:8000";

    #[test]
    fn renders_mocked_response() {
        let response = cat_response();
        let text = format_results(BASE, &response.results, Some(response.query_time));

        assert_eq!(response.results.len(), 1);
        assert!(text.contains("Query time: 12.30ms"));
        assert!(text.contains("1. cat"));
        assert!(text.contains("Image: http://localhost:8000/img/1.png"));
        assert!(text.contains("Score: 0.9800"));
    }

    #[test]
    fn scores_format_to_four_places() {
        assert_eq!(format_score(Some(0.98)), "0.9800");
        assert_eq!(format_score(Some(0.0)), "0.0000");
        assert_eq!(format_score(None), "N/A");
    }

    #[test]
    fn zero_query_time_is_hidden() {
        assert_eq!(format_query_time(Some(0.0)), None);
        assert_eq!(format_query_time(None), None);
        assert_eq!(format_query_time(Some(7.256)).as_deref(), Some("Query time: 7.26ms"));
    }

    #[test]
    fn uncaptioned_results_get_positional_label() {
        let results = vec![SearchResult::default()];
        let text = format_results(BASE, &results, None);
        assert!(text.contains("1. Result 1"));
        assert!(text.contains("Score: N/A"));
        assert!(!text.contains("Image:"));
    }

    #[test]
    fn empty_results_say_so() {
        assert!(format_results(BASE, &[], Some(1.0)).contains(NO_RESULTS));
    }

    #[test]
    fn state_prefers_loading_then_error() {
        let mut state = UiState {
            loading: true,
            error: Some("boom".into()),
            ..UiState::default()
        };
        assert_eq!(format_state(BASE, &state), "Searching...\n");

        state.loading = false;
        assert_eq!(format_state(BASE, &state), "Error: boom\n");

        state.error = None;
        assert_eq!(format_state(BASE, &state), "");
    }

    #[test]
    fn json_carries_resolved_image_source() {
        let response = cat_response();
        let json = format_json(BASE, &response.results, Some(response.query_time));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["query_time"], 12.3);
        assert_eq!(value["results"][0]["rank"], 1);
        assert_eq!(value["results"][0]["image_src"], "http://localhost:8000/img/1.png");
        assert_eq!(value["results"][0]["score"], 0.98);
    }
}
