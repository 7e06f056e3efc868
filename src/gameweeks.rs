use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::Plan;

/// Default planning window when the live current-week lookup is unavailable.
pub const DEFAULT_WEEKS: [u32; 7] = [24, 25, 26, 27, 28, 29, 30];

/// Reference fixture for display in the planner columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub week: u32,
    pub home: &'static str,
    pub away: &'static str,
    pub is_double: bool,
}

const fn fx(week: u32, home: &'static str, away: &'static str) -> Fixture {
    Fixture {
        week,
        home,
        away,
        is_double: false,
    }
}

const fn fx2(week: u32, home: &'static str, away: &'static str) -> Fixture {
    Fixture {
        week,
        home,
        away,
        is_double: true,
    }
}

/// Bundled reference fixtures covering the default window. Live data
/// supersedes these; they keep the planner usable offline.
pub static FIXTURES: &[Fixture] = &[
    fx(24, "ARS", "MCI"),
    fx(24, "LIV", "CHE"),
    fx(24, "MUN", "TOT"),
    fx(24, "NEW", "AVL"),
    fx(24, "BHA", "BRE"),
    fx(24, "FUL", "BOU"),
    fx(24, "WHU", "EVE"),
    fx(24, "WOL", "CRY"),
    fx(24, "NFO", "IPS"),
    fx(24, "LEI", "SOU"),
    fx(25, "MCI", "LIV"),
    fx(25, "CHE", "ARS"),
    fx(25, "TOT", "NEW"),
    fx(25, "AVL", "MUN"),
    fx(25, "BRE", "WHU"),
    fx(25, "BOU", "WOL"),
    fx(25, "EVE", "BHA"),
    fx(25, "CRY", "FUL"),
    fx(25, "SOU", "NFO"),
    fx(25, "IPS", "LEI"),
    fx2(25, "LIV", "EVE"),
    fx2(25, "ARS", "TOT"),
    fx(26, "LIV", "MUN"),
    fx(26, "ARS", "NEW"),
    fx(26, "MCI", "TOT"),
    fx(26, "CHE", "AVL"),
    fx(26, "BHA", "WHU"),
    fx(26, "BRE", "EVE"),
    fx(26, "FUL", "WOL"),
    fx(26, "NFO", "BOU"),
    fx(26, "LEI", "CRY"),
    fx(26, "IPS", "SOU"),
    fx(27, "MUN", "MCI"),
    fx(27, "TOT", "LIV"),
    fx(27, "NEW", "CHE"),
    fx(27, "AVL", "ARS"),
    fx(27, "WHU", "BRE"),
    fx(27, "WOL", "BHA"),
    fx(27, "EVE", "FUL"),
    fx(27, "CRY", "NFO"),
    fx(27, "BOU", "LEI"),
    fx(27, "SOU", "IPS"),
    fx(28, "ARS", "LIV"),
    fx(28, "MCI", "CHE"),
    fx(28, "MUN", "NEW"),
    fx(28, "TOT", "AVL"),
    fx(28, "BHA", "BOU"),
    fx(28, "BRE", "WOL"),
    fx(28, "FUL", "WHU"),
    fx(28, "NFO", "EVE"),
    fx(28, "LEI", "CRY"),
    fx(28, "IPS", "SOU"),
    fx(29, "LIV", "ARS"),
    fx(29, "CHE", "MCI"),
    fx(29, "NEW", "MUN"),
    fx(29, "AVL", "TOT"),
    fx(29, "BOU", "BHA"),
    fx(29, "WOL", "BRE"),
    fx(29, "WHU", "FUL"),
    fx(29, "EVE", "NFO"),
    fx(29, "CRY", "LEI"),
    fx(29, "SOU", "IPS"),
    fx(30, "MCI", "ARS"),
    fx(30, "LIV", "CHE"),
    fx(30, "MUN", "TOT"),
    fx(30, "NEW", "AVL"),
    fx(30, "BHA", "BRE"),
    fx(30, "FUL", "BOU"),
    fx(30, "WHU", "EVE"),
    fx(30, "WOL", "CRY"),
    fx(30, "NFO", "IPS"),
    fx(30, "LEI", "SOU"),
];

/// Fallback doubling teams per week, used when no live fixture-count signal
/// is available.
static FALLBACK_DOUBLING: Lazy<HashMap<u32, Vec<&'static str>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(25, vec!["LIV", "ARS", "EVE", "TOT"]);
    map
});

/// Fallback blanking teams per week. Empty in the bundled window.
static FALLBACK_BLANKING: Lazy<HashMap<u32, Vec<&'static str>>> = Lazy::new(HashMap::new);

pub fn fixtures_for_week(week: u32) -> Vec<&'static Fixture> {
    FIXTURES.iter().filter(|f| f.week == week).collect()
}

/// Does `team` have two or more fixtures in `week`?
///
/// Precedence, first match wins: manual blanking override (answers false,
/// a blank marked by hand beats every doubling signal), then manual
/// doubling override, then the detected list from fixture-count analysis,
/// then bundled fallback data.
pub fn is_team_doubling(
    team: &str,
    week: u32,
    plan: Option<&Plan>,
    detected: Option<&[String]>,
) -> bool {
    let team = team.trim().to_uppercase();

    if let Some(plan) = plan {
        if list_contains(plan.manual_blanking.get(&week), &team) {
            return false;
        }
        if list_contains(plan.manual_doubling.get(&week), &team) {
            return true;
        }
    }

    if detected.is_some_and(|teams| teams.iter().any(|t| t.eq_ignore_ascii_case(&team))) {
        return true;
    }

    FALLBACK_DOUBLING
        .get(&week)
        .is_some_and(|teams| teams.contains(&team.as_str()))
}

/// Does `team` have zero fixtures in `week`? Mirrored precedence: manual
/// blanking first, manual doubling overriding it, then detected/fallback
/// blanking lists.
pub fn is_team_blanking(
    team: &str,
    week: u32,
    plan: Option<&Plan>,
    detected: Option<&[String]>,
) -> bool {
    let team = team.trim().to_uppercase();

    if let Some(plan) = plan {
        if list_contains(plan.manual_blanking.get(&week), &team) {
            return true;
        }
        if list_contains(plan.manual_doubling.get(&week), &team) {
            return false;
        }
    }

    if detected.is_some_and(|teams| teams.iter().any(|t| t.eq_ignore_ascii_case(&team))) {
        return true;
    }

    FALLBACK_BLANKING
        .get(&week)
        .is_some_and(|teams| teams.contains(&team.as_str()))
}

/// Every team considered doubling in `week`, after overrides. Sorted and
/// deduplicated.
pub fn doubling_teams(week: u32, plan: Option<&Plan>, detected: Option<&[String]>) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    if let Some(plan) = plan {
        if let Some(list) = plan.manual_doubling.get(&week) {
            teams.extend(list.iter().cloned());
        }
    }
    if let Some(detected) = detected {
        teams.extend(detected.iter().map(|t| t.to_uppercase()));
    }
    if let Some(fallback) = FALLBACK_DOUBLING.get(&week) {
        teams.extend(fallback.iter().map(|t| (*t).to_string()));
    }
    teams.sort_unstable();
    teams.dedup();
    teams.retain(|t| is_team_doubling(t, week, plan, detected));
    teams
}

fn list_contains(list: Option<&Vec<String>>, team_upper: &str) -> bool {
    list.is_some_and(|teams| teams.iter().any(|t| t == team_upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_table_marks_bundled_double_week() {
        assert!(is_team_doubling("LIV", 25, None, None));
        assert!(is_team_doubling("liv", 25, None, None));
        assert!(!is_team_doubling("LIV", 24, None, None));
        assert!(!is_team_doubling("MCI", 25, None, None));
    }

    #[test]
    fn detected_list_beats_fallback_absence() {
        let detected = vec!["MCI".to_string()];
        assert!(is_team_doubling("MCI", 24, None, Some(&detected)));
        assert!(!is_team_doubling("MCI", 24, None, Some(&[])));
    }

    #[test]
    fn manual_doubling_override_wins() {
        let mut plan = Plan::empty("p", "P", 1, "L", 24, 30);
        plan.manual_doubling.insert(27, vec!["WOL".to_string()]);
        assert!(is_team_doubling("WOL", 27, Some(&plan), None));
        assert!(is_team_doubling("wol", 27, Some(&plan), None));
        assert!(!is_team_doubling("WOL", 28, Some(&plan), None));
    }

    #[test]
    fn manual_blanking_suppresses_detected_doubling() {
        let mut plan = Plan::empty("p", "P", 1, "L", 24, 30);
        plan.manual_blanking.insert(25, vec!["LIV".to_string()]);
        let detected = vec!["LIV".to_string()];
        assert!(!is_team_doubling("LIV", 25, Some(&plan), Some(&detected)));
        assert!(is_team_blanking("LIV", 25, Some(&plan), None));
    }

    #[test]
    fn conflicting_overrides_resolve_blanking_first() {
        // A team listed in both override maps for the same week: the
        // blanking override wins, so the pair is never both true.
        let mut plan = Plan::empty("p", "P", 1, "L", 24, 30);
        plan.manual_doubling.insert(26, vec!["BHA".to_string()]);
        plan.manual_blanking.insert(26, vec!["BHA".to_string()]);
        assert!(!is_team_doubling("BHA", 26, Some(&plan), None));
        assert!(is_team_blanking("BHA", 26, Some(&plan), None));
    }

    #[test]
    fn blanking_has_no_bundled_fallback() {
        assert!(!is_team_blanking("SOU", 27, None, None));
        let detected = vec!["SOU".to_string()];
        assert!(is_team_blanking("SOU", 27, None, Some(&detected)));
    }

    #[test]
    fn doubling_teams_merges_sources_and_honors_blank_override() {
        let mut plan = Plan::empty("p", "P", 1, "L", 24, 30);
        plan.manual_doubling.insert(25, vec!["MCI".to_string()]);
        plan.manual_blanking.insert(25, vec!["EVE".to_string()]);
        let detected = vec!["CHE".to_string()];
        let teams = doubling_teams(25, Some(&plan), Some(&detected));
        assert_eq!(teams, vec!["ARS", "CHE", "LIV", "MCI", "TOT"]);
    }

    #[test]
    fn fixtures_lookup_filters_by_week() {
        let gw25 = fixtures_for_week(25);
        assert_eq!(gw25.len(), 12);
        assert_eq!(gw25.iter().filter(|f| f.is_double).count(), 2);
        assert!(fixtures_for_week(99).is_empty());
    }
}
