use std::path::{Path, PathBuf};

use poll_tally::{PollOption, Response};
use serde_json::Value as JSValue;

/// Resolves a path given in a config file against the directory of that file.
pub fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = [root, Path::new(file_path)].iter().collect();
    p.as_path().display().to_string()
}

/// Text of a JSON identifier, which may be written as a string or a number.
pub fn js_text(v: &JSValue) -> Option<String> {
    match v {
        JSValue::String(s) => Some(s.clone()),
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The options mentioned in the responses, in order of first appearance.
/// The id of each option is also its text.
pub fn options_from_responses(responses: &[Response]) -> Vec<PollOption> {
    let mut res: Vec<PollOption> = Vec::new();
    for r in responses.iter() {
        if !res.iter().any(|o| o.id == r.option) {
            res.push(PollOption::new(&r.option.0, &r.option.0));
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_in_first_seen_order() {
        let responses = vec![
            Response::new("a", "Mirror", 1),
            Response::new("b", "Lava", 1),
            Response::new("c", "Mirror", 1),
        ];
        assert_eq!(
            options_from_responses(&responses),
            vec![
                PollOption::new("Mirror", "Mirror"),
                PollOption::new("Lava", "Lava")
            ]
        );
    }

    #[test]
    fn identifiers() {
        assert_eq!(js_text(&json!(12)), Some("12".to_string()));
        assert_eq!(js_text(&json!("x")), Some("x".to_string()));
        assert_eq!(js_text(&json!([1])), None);
    }
}
