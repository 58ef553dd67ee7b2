//! Page identity and location handling.

use std::fmt;

use url::form_urlencoded;

pub const REGISTER_PAGE: &str = "register.html";
pub const THANKS_PAGE: &str = "thanks.html";
pub const TEAMS_PAGE: &str = "teams.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Register,
    Thanks,
    Teams,
}

impl Page {
    /// Select the page behavior from the path's filename suffix.
    pub fn from_path(path: &str) -> Option<Page> {
        if path.ends_with(REGISTER_PAGE) {
            Some(Page::Register)
        } else if path.ends_with(THANKS_PAGE) {
            Some(Page::Thanks)
        } else if path.ends_with(TEAMS_PAGE) {
            Some(Page::Teams)
        } else {
            None
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Page::Register => REGISTER_PAGE,
            Page::Thanks => THANKS_PAGE,
            Page::Teams => TEAMS_PAGE,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// A page path along with its decoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    /// Parse `path[?query][#fragment]`. The fragment is dropped.
    pub fn parse(s: &str) -> Self {
        let s = s.split_once('#').map(|(before, _)| before).unwrap_or(s);
        let (path, query) = match s.split_once('?') {
            Some((path, query)) => (path, query),
            None => (s, ""),
        };
        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page(&self) -> Option<Page> {
        Page::from_path(&self.path)
    }

    /// First value of the given query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            return write!(f, "{}", self.path);
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        write!(f, "{}?{}", self.path, query)
    }
}

/// Where a confirmed registration lands: `thanks.html?team=<name>&code=<code>`.
pub fn thanks_url(team_name: &str, code: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("team", team_name)
        .append_pair("code", code)
        .finish();
    format!("{}?{}", THANKS_PAGE, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_on_filename_suffix() {
        assert_eq!(Page::from_path("/register.html"), Some(Page::Register));
        assert_eq!(Page::from_path("/league/thanks.html"), Some(Page::Thanks));
        assert_eq!(Page::from_path("teams.html"), Some(Page::Teams));
        assert_eq!(Page::from_path("/index.html"), None);
        assert_eq!(Page::from_path("/register.html/"), None);
        assert_eq!(Page::from_path("/teams.htm"), None);
        assert_eq!(Page::from_path(""), None);
    }

    #[test]
    fn parse_location_with_query() {
        let location = Location::parse("/thanks.html?team=Red%20Lions&code=PLFC-07#top");
        assert_eq!(location.path(), "/thanks.html");
        assert_eq!(location.page(), Some(Page::Thanks));
        assert_eq!(location.param("team"), Some("Red Lions"));
        assert_eq!(location.param("code"), Some("PLFC-07"));
        assert_eq!(location.param("missing"), None);
        assert!(location.has_query());
    }

    #[test]
    fn parse_location_without_query() {
        let location = Location::parse("register.html");
        assert_eq!(location.page(), Some(Page::Register));
        assert!(!location.has_query());
        assert_eq!(location.to_string(), "register.html");
    }

    #[test]
    fn thanks_url_encodes_parameters() {
        assert_eq!(thanks_url("Eagles", "PLFC-07"), "thanks.html?team=Eagles&code=PLFC-07");

        let url = thanks_url("Tigers & Co", "A/B");
        let location = Location::parse(&url);
        assert_eq!(location.page(), Some(Page::Thanks));
        assert_eq!(location.param("team"), Some("Tigers & Co"));
        assert_eq!(location.param("code"), Some("A/B"));
    }
}
