//! Registered teams listing and its markup.

use askama::Template;
use serde::{Deserialize, Serialize};

pub const EMPTY_ROSTER_MESSAGE: &str = "No teams yet, be the first to register!";
pub const ROSTER_UNAVAILABLE_MESSAGE: &str = "Couldn’t load teams. Try again later.";
/// Shown in place of a missing captain name or code.
pub const PLACEHOLDER: &str = "-";

/// Markup used when even the templates fail to render.
pub const ROSTER_UNAVAILABLE_HTML: &str =
    "<p class=\"muted\">Couldn’t load teams. Try again later.</p>";

/// One team as listed by the backend roster endpoint. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub captain_name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub teams: Option<Vec<TeamSummary>>,
}

impl RosterResponse {
    pub fn into_teams(self) -> Vec<TeamSummary> {
        self.teams.unwrap_or_default()
    }
}

struct TeamCard<'a> {
    name: &'a str,
    captain: &'a str,
    code: &'a str,
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER)
}

impl<'a> From<&'a TeamSummary> for TeamCard<'a> {
    fn from(team: &'a TeamSummary) -> Self {
        Self {
            name: &team.team_name,
            captain: or_placeholder(team.captain_name.as_deref()),
            code: or_placeholder(team.code.as_deref()),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"{% for team in teams %}
<div class="team-card lift">
  <div class="team-title">⚽ {{ team.name }}</div>
  <div class="team-meta">Captain: {{ team.captain }} • Code: {{ team.code }}</div>
</div>
{%- endfor %}"#,
    ext = "html"
)]
struct RosterTemplate<'a> {
    teams: Vec<TeamCard<'a>>,
}

#[derive(Template)]
#[template(source = r#"<p class="muted">{{ message }}</p>"#, ext = "html")]
struct NoticeTemplate<'a> {
    message: &'a str,
}

/// What the teams page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterView {
    Empty,
    Teams(Vec<TeamSummary>),
    Unavailable,
}

impl RosterView {
    pub fn from_teams(teams: Vec<TeamSummary>) -> Self {
        if teams.is_empty() {
            RosterView::Empty
        } else {
            RosterView::Teams(teams)
        }
    }

    /// Render the view as HTML. All team-supplied text is escaped.
    pub fn render(&self) -> Result<String, askama::Error> {
        match self {
            RosterView::Empty => NoticeTemplate {
                message: EMPTY_ROSTER_MESSAGE,
            }
            .render(),
            RosterView::Unavailable => NoticeTemplate {
                message: ROSTER_UNAVAILABLE_MESSAGE,
            }
            .render(),
            RosterView::Teams(teams) => RosterTemplate {
                teams: teams.iter().map(TeamCard::from).collect(),
            }
            .render(),
        }
    }

    /// Like [`RosterView::render`], degrading to the unavailable notice on error.
    pub fn to_html(&self) -> String {
        self.render().unwrap_or_else(|e| {
            tracing::error!("Failed to render roster: {}", e);
            ROSTER_UNAVAILABLE_HTML.to_string()
        })
    }
}
