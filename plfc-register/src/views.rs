//! The two read-only pages: thank-you confirmation and the teams listing.

use plfc::{
    record::load_registration, thanks::resolve_team_name, KeyValueStore, Location, RosterView,
};

use crate::services::backend::Backend;

/// Team name shown on the thank-you page. Reads the store, never the network.
pub fn thanks_team_name(store: &dyn KeyValueStore, location: &Location) -> String {
    let stored = load_registration(store).unwrap_or_else(|e| {
        tracing::error!("Failed to read stored registration: {}", e);
        None
    });
    resolve_team_name(location, stored.as_ref())
}

/// Fetch the roster once. Failures degrade to the unavailable notice.
pub async fn roster_view(backend: &dyn Backend) -> RosterView {
    match backend.list_teams().await {
        Ok(teams) => {
            tracing::info!("Fetched {} registered teams", teams.len());
            RosterView::from_teams(teams)
        }
        Err(e) => {
            tracing::error!("Failed to fetch teams: {}", e);
            RosterView::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::backend::BackendError, testutils::MockBackend};
    use plfc::{record::save_registration, ConfirmedRegistration, MemoryStore, TeamSummary};

    #[test]
    fn thanks_prefers_query_then_store() {
        let store = MemoryStore::new();
        assert_eq!(
            thanks_team_name(&store, &Location::parse("thanks.html")),
            "Your Team"
        );

        save_registration(
            &store,
            &ConfirmedRegistration::new("Eagles".to_string(), "PLFC-07".to_string()),
        )
        .unwrap();
        assert_eq!(
            thanks_team_name(&store, &Location::parse("thanks.html")),
            "Eagles"
        );
        assert_eq!(
            thanks_team_name(&store, &Location::parse("thanks.html?team=Lions")),
            "Lions"
        );
    }

    #[tokio::test]
    async fn empty_roster_makes_a_single_request() {
        let backend = MockBackend::new();
        backend.set_teams(Ok(vec![]));
        let view = roster_view(&backend).await;
        assert_eq!(view, RosterView::Empty);
        assert_eq!(backend.teams_calls(), 1);
        assert_eq!(backend.order_calls(), 0);
        assert_eq!(backend.verify_calls(), 0);
    }

    #[tokio::test]
    async fn roster_lists_teams() {
        let backend = MockBackend::new();
        let teams = vec![TeamSummary {
            team_name: "<script>x</script>".to_string(),
            captain_name: None,
            code: Some("PLFC-01".to_string()),
        }];
        backend.set_teams(Ok(teams.clone()));
        let view = roster_view(&backend).await;
        assert_eq!(view, RosterView::Teams(teams));
        let html = view.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn roster_failure_degrades() {
        let backend = MockBackend::new();
        backend.set_teams(Err(BackendError::Http(Some(503), "down".to_string())));
        assert_eq!(roster_view(&backend).await, RosterView::Unavailable);
    }
}
