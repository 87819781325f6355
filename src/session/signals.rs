// ABOUTME: Assistant-output signal scanning — reward token and wisdom/task markers.
// ABOUTME: Exact literal matching; these strings are the soft contract with the persona.

/// Literal substring that awards one star. Case-sensitive, matched anywhere.
pub const REWARD_TOKEN: &str = "YULDUZ+1";
/// Line marker carrying the wisdom of the day.
pub const WISDOM_MARKER: &str = "Hikmat:";
/// Line marker carrying the current task.
pub const TASK_MARKER: &str = "Topshiriq:";

/// Whether a reply contains the exact reward token.
pub fn contains_reward_token(text: &str) -> bool {
    text.contains(REWARD_TOKEN)
}

/// Scan a reply line by line for a marker and return the text following the
/// marker's colon, trimmed. The first matching line wins; the marker may sit
/// anywhere in the line.
pub fn extract_marker(text: &str, marker: &str) -> Option<String> {
    for line in text.lines() {
        if let Some(pos) = line.find(marker) {
            let rest = &line[pos + marker.len()..];
            return Some(rest.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_token_is_case_sensitive() {
        assert!(contains_reward_token("Ajoyib! YULDUZ+1 sizga."));
        assert!(!contains_reward_token("yulduz+1"));
        assert!(!contains_reward_token("YULDUZ +1"));
    }

    #[test]
    fn wisdom_marker_extracted_from_middle_of_reply() {
        let text = "Juda yaxshi javob!\nHikmat: Sabr tagi oltin.\nDavom etamiz.";
        assert_eq!(
            extract_marker(text, WISDOM_MARKER),
            Some("Sabr tagi oltin.".to_string())
        );
    }

    #[test]
    fn marker_may_sit_inside_a_line() {
        let text = "Bugungi Topshiriq: bitta g'azal yod oling";
        assert_eq!(
            extract_marker(text, TASK_MARKER),
            Some("bitta g'azal yod oling".to_string())
        );
    }

    #[test]
    fn first_matching_line_wins() {
        let text = "Hikmat: birinchi\nHikmat: ikkinchi";
        assert_eq!(
            extract_marker(text, WISDOM_MARKER),
            Some("birinchi".to_string())
        );
    }

    #[test]
    fn marker_text_runs_to_end_of_line() {
        let text = "Hikmat: ilm: baxt kaliti";
        assert_eq!(
            extract_marker(text, WISDOM_MARKER),
            Some("ilm: baxt kaliti".to_string())
        );
    }

    #[test]
    fn absent_marker_returns_none() {
        assert_eq!(extract_marker("oddiy javob", WISDOM_MARKER), None);
        assert_eq!(extract_marker("", TASK_MARKER), None);
    }
}
