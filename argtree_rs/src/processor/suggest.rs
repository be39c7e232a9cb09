//! Command suggestion via Levenshtein distance.

use strsim::levenshtein;

/// Suggest a similar command using Levenshtein distance.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
pub fn suggest_similar_command(input: &str, commands: &[String]) -> Option<String> {
    let input_lower = input.to_lowercase();
    let mut best_match: Option<(&str, usize)> = None;

    for cmd in commands {
        let distance = levenshtein(&input_lower, cmd);
        // Only suggest if distance is small (max 2 for reasonable similarity)
        if distance <= 2 {
            match best_match {
                Some((_, best_dist)) if distance >= best_dist => {}
                _ => best_match = Some((cmd.as_str(), distance)),
            }
        }
    }

    best_match.map(|(cmd, _)| cmd.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands() -> Vec<String> {
        ["build", "help", "server", "start"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_suggests_close_match() {
        assert_eq!(
            suggest_similar_command("biuld", &commands()).as_deref(),
            Some("build")
        );
        assert_eq!(
            suggest_similar_command("SERVR", &commands()).as_deref(),
            Some("server")
        );
    }

    #[test]
    fn test_no_suggestion_when_far() {
        assert_eq!(suggest_similar_command("deploy", &commands()), None);
        assert_eq!(suggest_similar_command("x", &[]), None);
    }

    #[test]
    fn test_first_best_match_wins_ties() {
        // "stat" is 1 away from "start" and 2 from others.
        assert_eq!(
            suggest_similar_command("stat", &commands()).as_deref(),
            Some("start")
        );
    }
}
