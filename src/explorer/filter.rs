use crate::azure::{Release, ReleaseEnvironment};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Search value that switches the releases tab to the compliance filter
pub const PRODUCTION_WITHOUT_APPROVERS: &str = "production-no-approvers";

/// A production-like stage that can deploy without any sign-off
pub fn is_unguarded_production(env: &ReleaseEnvironment) -> bool {
    env.name.to_lowercase().contains("production") && env.pre_deploy_approvals.is_empty()
}

/// True if at least one environment is unguarded production. Other
/// production environments of the same release may still have approvers.
pub fn lacks_production_approvers(release: &Release) -> bool {
    release.environments.iter().any(is_unguarded_production)
}

/// What the search box currently asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter<'a> {
    None,
    ProductionWithoutApprovers,
    Name(&'a str),
}

impl<'a> SearchFilter<'a> {
    pub fn parse(search_text: &'a str) -> Self {
        if search_text == PRODUCTION_WITHOUT_APPROVERS {
            SearchFilter::ProductionWithoutApprovers
        } else if search_text.trim().is_empty() {
            SearchFilter::None
        } else {
            SearchFilter::Name(search_text.trim())
        }
    }
}

/// Name matching for free-text search
pub struct NameMatcher {
    fuzzy: Option<SkimMatcherV2>,
}

impl NameMatcher {
    pub fn substring() -> Self {
        Self { fuzzy: None }
    }

    pub fn fuzzy() -> Self {
        Self { fuzzy: Some(SkimMatcherV2::default()) }
    }

    pub fn matches(&self, name: &str, query: &str) -> bool {
        match &self.fuzzy {
            Some(matcher) => matcher.fuzzy_match(name, query).is_some(),
            None => name.to_lowercase().contains(&query.to_lowercase()),
        }
    }
}

impl std::fmt::Debug for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.fuzzy.is_some() { "fuzzy" } else { "substring" };
        f.debug_struct("NameMatcher").field("mode", &mode).finish()
    }
}

/// Releases visible under `filter`, in fetch order.
///
/// The compliance filter only applies to releases; a name query matches the
/// release name.
pub fn filter_releases<'r>(releases: &'r [Release], filter: &SearchFilter, matcher: &NameMatcher) -> Vec<&'r Release> {
    match filter {
        SearchFilter::None => releases.iter().collect(),
        SearchFilter::ProductionWithoutApprovers => {
            releases.iter().filter(|r| lacks_production_approvers(r)).collect()
        }
        SearchFilter::Name(query) => releases.iter().filter(|r| matcher.matches(&r.name, query)).collect(),
    }
}

/// Generic name filter for projects and pipelines. The compliance sentinel
/// is not a name query and leaves these lists untouched.
pub fn filter_by_name<'t, T>(
    items: &'t [T],
    name: impl Fn(&T) -> &str,
    filter: &SearchFilter,
    matcher: &NameMatcher,
) -> Vec<&'t T> {
    match filter {
        SearchFilter::Name(query) => items.iter().filter(|item| matcher.matches(name(*item), query)).collect(),
        SearchFilter::None | SearchFilter::ProductionWithoutApprovers => items.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{Approval, IdentityRef};

    fn approval(id: i32) -> Approval {
        Approval {
            id,
            approver: Some(IdentityRef {
                display_name: "Ada Lovelace".into(),
                unique_name: "ada@contoso.com".into(),
            }),
        }
    }

    fn env(name: &str, approvals: Vec<Approval>) -> ReleaseEnvironment {
        ReleaseEnvironment {
            id: 0,
            name: name.to_string(),
            status: None,
            pre_deploy_approvals: approvals,
        }
    }

    fn release(id: i32, envs: Vec<ReleaseEnvironment>) -> Release {
        Release {
            id,
            name: format!("Release-{id}"),
            environments: envs,
            ..Default::default()
        }
    }

    fn compliance(releases: &[Release]) -> Vec<Release> {
        filter_releases(releases, &SearchFilter::ProductionWithoutApprovers, &NameMatcher::substring())
            .into_iter()
            .cloned()
            .collect()
    }

    fn ids(releases: &[Release]) -> Vec<i32> {
        releases.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_production_without_approvers_is_flagged() {
        let flagged = release(1, vec![env("Production", vec![])]);
        let guarded = release(2, vec![env("Production", vec![approval(1)])]);

        assert!(lacks_production_approvers(&flagged));
        assert!(!lacks_production_approvers(&guarded));
    }

    #[test]
    fn test_unapproved_non_production_does_not_count() {
        let r = release(1, vec![env("Staging", vec![]), env("Production", vec![approval(1)])]);
        assert!(!lacks_production_approvers(&r));
    }

    #[test]
    fn test_one_unguarded_production_is_enough() {
        let r = release(1, vec![
            env("Production-EU", vec![approval(1)]),
            env("Production-US", vec![]),
        ]);
        assert!(lacks_production_approvers(&r));
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        assert!(is_unguarded_production(&env("PRODUCTION-EU", vec![])));
        assert!(is_unguarded_production(&env("pre-production", vec![])));
        assert!(!is_unguarded_production(&env("Prod", vec![])));
    }

    #[test]
    fn test_release_without_environments_is_not_flagged() {
        assert!(!lacks_production_approvers(&release(1, vec![])));
    }

    #[test]
    fn test_filter_preserves_order() {
        let releases = vec![
            release(1, vec![env("Production", vec![])]),
            release(2, vec![env("Production", vec![approval(1)])]),
            release(3, vec![env("Dev", vec![]), env("production", vec![])]),
        ];

        assert_eq!(ids(&compliance(&releases)), vec![1, 3]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let releases = vec![
            release(1, vec![env("PRODUCTION", vec![])]),
            release(2, vec![env("Staging", vec![])]),
            release(3, vec![env("Production", vec![approval(4)])]),
            release(4, vec![env("production-west", vec![])]),
        ];

        let once = compliance(&releases);
        let twice = compliance(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_filter_returns_everything_in_order() {
        let releases = vec![release(3, vec![]), release(1, vec![]), release(2, vec![])];
        let all = filter_releases(&releases, &SearchFilter::None, &NameMatcher::substring());
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_parse_search_text() {
        assert_eq!(SearchFilter::parse(""), SearchFilter::None);
        assert_eq!(SearchFilter::parse("   "), SearchFilter::None);
        assert_eq!(SearchFilter::parse(PRODUCTION_WITHOUT_APPROVERS), SearchFilter::ProductionWithoutApprovers);
        assert_eq!(SearchFilter::parse(" web "), SearchFilter::Name("web"));
    }

    #[test]
    fn test_name_search_over_releases() {
        let mut a = release(1, vec![]);
        a.name = "Web-Release-1".into();
        let mut b = release(2, vec![]);
        b.name = "Api-Release-2".into();
        let releases = vec![a, b];

        let found = filter_releases(&releases, &SearchFilter::Name("web"), &NameMatcher::substring());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn test_sentinel_does_not_filter_names() {
        let names = vec!["alpha".to_string(), "beta".to_string()];
        let all = filter_by_name(&names, |n| n.as_str(), &SearchFilter::ProductionWithoutApprovers, &NameMatcher::substring());
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_fuzzy_matcher_matches_scattered_letters() {
        let matcher = NameMatcher::fuzzy();
        assert!(matcher.matches("Fabrikam-Fiber", "ffb"));
        assert!(!NameMatcher::substring().matches("Fabrikam-Fiber", "ffb"));
    }
}
