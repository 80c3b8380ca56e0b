//! Regex rules applied to newly managed clients.
use crate::{
    pure::{client::ClientState, geometry::Gravity},
    Result,
};
use regex::Regex;

/// A compiled matcher retaining its source pattern so rules can be compared,
/// listed and removed by the text the user supplied.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// The pattern as given on the command line
    pub pattern: String,
    re: Regex,
}

impl Matcher {
    /// Compile `pattern`, reporting bad regexes as command errors.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: pattern.to_string(),
            re: Regex::new(pattern)?,
        })
    }

    /// Whether this matcher accepts `s`.
    pub fn matches(&self, s: &str) -> bool {
        self.re.is_match(s)
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// The client strings a rule is matched against.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchSubject<'a> {
    /// WM_CLASS class
    pub class: &'a str,
    /// WM_CLASS instance
    pub instance: &'a str,
    /// Window title
    pub title: &'a str,
    /// `_NET_WM_WINDOW_TYPE` atom names
    pub win_types: &'a [String],
}

/// A matcher-action record applied to new clients in insertion order.
///
/// A rule matches iff every present matcher accepts the corresponding client
/// string and the window-type atom (if any) is among the client's types. On
/// match, the action fields seed the client's initial state.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Rule {
    /// Class matcher
    pub class: Option<Matcher>,
    /// Instance matcher
    pub instance: Option<Matcher>,
    /// Title matcher
    pub title: Option<Matcher>,
    /// Window type atom name to require
    pub win_type: Option<String>,
    /// Target workspace number (0-based)
    pub ws: Option<usize>,
    /// Target monitor by name or 1-based number
    pub mon: Option<String>,
    /// Initial x position
    pub x: Option<i32>,
    /// Initial y position
    pub y: Option<i32>,
    /// Initial width
    pub w: Option<i32>,
    /// Initial height
    pub h: Option<i32>,
    /// Border width override
    pub bw: Option<i32>,
    /// Horizontal gravity applied when no absolute x is given
    pub xgrav: Gravity,
    /// Vertical gravity applied when no absolute y is given
    pub ygrav: Gravity,
    /// State bits to set on the client
    pub state: ClientState,
    /// Focus the client when it opens
    pub focus: bool,
    /// Lifecycle callback to bind
    pub cb: Option<String>,
}

impl Rule {
    /// Whether this rule matches the given client strings.
    pub fn matches(&self, s: MatchSubject<'_>) -> bool {
        if let Some(m) = &self.class {
            if !m.matches(s.class) {
                return false;
            }
        }
        if let Some(m) = &self.instance {
            if !m.matches(s.instance) {
                return false;
            }
        }
        if let Some(m) = &self.title {
            if !m.matches(s.title) {
                return false;
            }
        }
        if let Some(t) = &self.win_type {
            if !s.win_types.iter().any(|wt| wt == t) {
                return false;
            }
        }

        self.class.is_some()
            || self.instance.is_some()
            || self.title.is_some()
            || self.win_type.is_some()
    }

    /// Whether `other` targets the same windows (same matchers), in which
    /// case inserting it replaces this rule.
    pub fn same_target(&self, other: &Rule) -> bool {
        self.class == other.class
            && self.instance == other.instance
            && self.title == other.title
            && self.win_type == other.win_type
    }
}

/// The ordered rule list.
#[derive(Debug, Default, Clone)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Insert a rule, replacing any existing rule with the same matchers.
    pub fn insert(&mut self, rule: Rule) {
        self.rules.retain(|r| !r.same_target(&rule));
        self.rules.push(rule);
    }

    /// Remove the first rule with the same matchers as `rule`. Returns
    /// whether anything was removed.
    pub fn remove(&mut self, rule: &Rule) -> bool {
        let before = self.rules.len();
        if let Some(i) = self.rules.iter().position(|r| r.same_target(rule)) {
            self.rules.remove(i);
        }

        self.rules.len() != before
    }

    /// Drop every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// The first rule matching the given client strings.
    pub fn first_match(&self, s: MatchSubject<'_>) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(s))
    }

    /// All rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn rule(class: Option<&str>, title: Option<&str>) -> Rule {
        Rule {
            class: class.map(|p| Matcher::new(p).expect("valid pattern")),
            title: title.map(|p| Matcher::new(p).expect("valid pattern")),
            ..Default::default()
        }
    }

    #[test_case(Some("^gimp$"), None, "gimp", "", true; "class only match")]
    #[test_case(Some("^gimp$"), None, "gimp-2.10", "", false; "class anchored")]
    #[test_case(Some("^gimp$"), Some("splash"), "gimp", "splash screen", true; "both match")]
    #[test_case(Some("^gimp$"), Some("splash"), "gimp", "main window", false; "title mismatch")]
    #[test_case(None, None, "anything", "anything", false; "empty rule never matches")]
    #[test]
    fn matching(class: Option<&str>, title: Option<&str>, c: &str, t: &str, expected: bool) {
        let r = rule(class, title);
        let subject = MatchSubject {
            class: c,
            title: t,
            ..Default::default()
        };

        assert_eq!(r.matches(subject), expected);
    }

    #[test]
    fn window_type_must_match_when_set() {
        let r = Rule {
            class: Some(Matcher::new(".*").unwrap()),
            win_type: Some("_NET_WM_WINDOW_TYPE_DIALOG".to_string()),
            ..Default::default()
        };
        let types = vec!["_NET_WM_WINDOW_TYPE_DIALOG".to_string()];

        assert!(r.matches(MatchSubject { class: "x", win_types: &types, ..Default::default() }));
        assert!(!r.matches(MatchSubject { class: "x", ..Default::default() }));
    }

    #[test]
    fn first_match_wins() {
        let mut rules = Rules::default();
        let mut r1 = rule(Some("^term$"), None);
        r1.ws = Some(1);
        let mut r2 = rule(Some("^t.*$"), None);
        r2.ws = Some(2);
        rules.insert(r1);
        rules.insert(r2);

        let m = rules
            .first_match(MatchSubject { class: "term", ..Default::default() })
            .expect("a match");

        assert_eq!(m.ws, Some(1));
    }

    #[test]
    fn inserting_same_target_replaces() {
        let mut rules = Rules::default();
        let mut r1 = rule(Some("^term$"), None);
        r1.ws = Some(1);
        let mut r2 = rule(Some("^term$"), None);
        r2.ws = Some(4);
        rules.insert(r1);
        rules.insert(r2);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.iter().next().unwrap().ws, Some(4));
    }

    #[test]
    fn remove_by_target() {
        let mut rules = Rules::default();
        rules.insert(rule(Some("^term$"), None));

        assert!(rules.remove(&rule(Some("^term$"), None)));
        assert!(rules.is_empty());
        assert!(!rules.remove(&rule(Some("^term$"), None)));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(Matcher::new("*bad").is_err());
    }
}
