use crate::{page::Location, record::ConfirmedRegistration};

pub const FALLBACK_TEAM_NAME: &str = "Your Team";

/// Team name for the thank-you page: the `team` query parameter, then the stored
/// registration, then a placeholder. Empty values are skipped.
pub fn resolve_team_name(location: &Location, stored: Option<&ConfirmedRegistration>) -> String {
    location
        .param("team")
        .filter(|team| !team.is_empty())
        .or_else(|| {
            stored
                .map(|registration| registration.team_name.as_str())
                .filter(|team| !team.is_empty())
        })
        .unwrap_or(FALLBACK_TEAM_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> ConfirmedRegistration {
        ConfirmedRegistration {
            team_name: "Stored Eagles".to_string(),
            code: "PLFC-07".to_string(),
            at: 0,
        }
    }

    #[test]
    fn query_parameter_wins() {
        let location = Location::parse("thanks.html?team=Eagles&code=PLFC-07");
        assert_eq!(resolve_team_name(&location, Some(&stored())), "Eagles");
    }

    #[test]
    fn falls_back_to_stored_registration() {
        let location = Location::parse("thanks.html");
        assert_eq!(resolve_team_name(&location, Some(&stored())), "Stored Eagles");

        let location = Location::parse("thanks.html?team=");
        assert_eq!(resolve_team_name(&location, Some(&stored())), "Stored Eagles");
    }

    #[test]
    fn falls_back_to_placeholder() {
        let location = Location::parse("thanks.html");
        assert_eq!(resolve_team_name(&location, None), FALLBACK_TEAM_NAME);
    }
}
