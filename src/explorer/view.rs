//! Pure `render(&Explorer) -> ExplorerView`. The ratatui layer only draws
//! what this produces, so everything visible can be tested without a
//! terminal.

use super::filter::is_unguarded_production;
use super::query::{QueryKind, QueryStatus};
use super::{Explorer, Tab};
use crate::azure::{Pipeline, Project, Release, ReleaseEnvironment};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Neutral,
}

impl Tone {
    pub fn of(status: Option<&str>) -> Self {
        match status {
            Some("succeeded") => Tone::Success,
            Some("failed") => Tone::Failure,
            _ => Tone::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub tab: Tab,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Loading,
    Failed(String),
    Rows { rows: Vec<T>, total: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRow {
    pub id: i32,
    pub name: String,
    pub revision: i32,
    pub status: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentRow {
    pub name: String,
    pub status: String,
    pub tone: Tone,
    pub approvers: Vec<String>,
    /// Production stage with no pre-deployment approvers
    pub unguarded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseRow {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub age: Option<String>,
    pub environments: Vec<EnvironmentRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Projects(Panel<ProjectRow>),
    Pipelines(Panel<PipelineRow>),
    Releases(Panel<ReleaseRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerView {
    pub tabs: Vec<TabLabel>,
    pub project_name: Option<String>,
    pub search_text: String,
    /// `Some(active)` only where the "Production without approvers" toggle
    /// is offered
    pub production_filter: Option<bool>,
    pub cursor: usize,
    pub body: Body,
}

pub fn render(explorer: &Explorer, now: DateTime<Utc>) -> ExplorerView {
    let active = explorer.active_tab();
    let tabs = explorer
        .reachable_tabs()
        .into_iter()
        .map(|tab| TabLabel {
            tab,
            title: format!("[{}] {}", tab_number(tab), tab.label()),
            active: tab == active,
        })
        .collect();

    let body = match active {
        Tab::Projects => Body::Projects(panel(explorer, QueryKind::Projects, || {
            let selected = explorer.selected_project_id();
            let rows = explorer
                .visible_projects()
                .into_iter()
                .map(|p| project_row(p, selected))
                .collect();
            (rows, explorer.projects().map_or(0, |p| p.len()))
        })),
        Tab::Pipelines => Body::Pipelines(panel(explorer, QueryKind::Pipelines, || {
            let rows = explorer.visible_pipelines().into_iter().map(pipeline_row).collect();
            (rows, explorer.pipelines().map_or(0, |p| p.len()))
        })),
        Tab::Releases => Body::Releases(panel(explorer, QueryKind::Releases, || {
            let rows = explorer
                .visible_releases()
                .into_iter()
                .map(|r| release_row(r, now))
                .collect();
            (rows, explorer.releases().map_or(0, |r| r.len()))
        })),
    };

    ExplorerView {
        tabs,
        project_name: explorer.selected_project().map(|p| p.name.clone()),
        // The sentinel is shown by the filter toggle, never as search text
        search_text: if explorer.production_filter_active() {
            String::new()
        } else {
            explorer.search_text().to_string()
        },
        production_filter: (active == Tab::Releases).then(|| explorer.production_filter_active()),
        cursor: explorer.cursor(),
        body,
    }
}

fn tab_number(tab: Tab) -> usize {
    match tab {
        Tab::Projects => 1,
        Tab::Pipelines => 2,
        Tab::Releases => 3,
    }
}

fn panel<T>(explorer: &Explorer, kind: QueryKind, rows: impl FnOnce() -> (Vec<T>, usize)) -> Panel<T> {
    match explorer.status(kind) {
        Some(QueryStatus::Ready(_)) => {
            let (rows, total) = rows();
            Panel::Rows { rows, total }
        }
        Some(QueryStatus::Failed(message)) => Panel::Failed(format!("Failed to load {}: {message}", kind.label())),
        Some(QueryStatus::Pending) | None => Panel::Loading,
    }
}

fn project_row(project: &Project, selected: Option<&str>) -> ProjectRow {
    ProjectRow {
        id: project.id.clone(),
        name: project.name.clone(),
        description: project.description.clone().filter(|d| !d.trim().is_empty()),
        selected: selected == Some(project.id.as_str()),
    }
}

fn pipeline_row(pipeline: &Pipeline) -> PipelineRow {
    PipelineRow {
        id: pipeline.id,
        name: pipeline.name.clone(),
        revision: pipeline.revision,
        status: pipeline.status.clone().unwrap_or_else(|| "unknown".into()),
        tone: Tone::of(pipeline.status.as_deref()),
    }
}

fn environment_row(env: &ReleaseEnvironment) -> EnvironmentRow {
    EnvironmentRow {
        name: env.name.clone(),
        status: env.status.clone().unwrap_or_else(|| "unknown".into()),
        tone: Tone::of(env.status.as_deref()),
        approvers: env
            .pre_deploy_approvals
            .iter()
            .filter_map(|a| a.approver.as_ref())
            .map(|a| a.display_name.clone())
            .collect(),
        unguarded: is_unguarded_production(env),
    }
}

fn release_row(release: &Release, now: DateTime<Utc>) -> ReleaseRow {
    ReleaseRow {
        id: release.id,
        name: release.name.clone(),
        status: release.status.clone().unwrap_or_else(|| "unknown".into()),
        age: release.created_on.map(|created| format_age(created, now)),
        environments: release.environments.iter().map(environment_row).collect(),
    }
}

/// Short relative age such as `5m`, `3h` or `12d`
pub fn format_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created);
    if elapsed.num_days() > 0 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}m", elapsed.num_minutes().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::query::FetchTicket;
    use crate::explorer::tests::{explorer, loaded_explorer, ok, release};
    use crate::explorer::{FetchOutcome, Payload};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_explorer_shows_only_projects_tab_loading() {
        let mut ex = explorer();
        ex.start();
        let view = render(&ex, now());

        assert_eq!(view.tabs.len(), 1);
        assert_eq!(view.tabs[0].title, "[1] Projects");
        assert!(view.tabs[0].active);
        assert_eq!(view.body, Body::Projects(Panel::Loading));
        assert_eq!(view.production_filter, None);
        assert_eq!(view.project_name, None);
    }

    #[test]
    fn test_failed_fetch_renders_error_state() {
        let mut ex = explorer();
        let ticket: FetchTicket = ex.start().remove(0);
        ex.apply(FetchOutcome { ticket, result: Err("HTTP 401 Unauthorized".into()) });

        let view = render(&ex, now());
        assert_eq!(
            view.body,
            Body::Projects(Panel::Failed("Failed to load projects: HTTP 401 Unauthorized".into()))
        );
    }

    #[test]
    fn test_selected_project_is_marked() {
        let ex = loaded_explorer(vec![]);
        let view = render(&ex, now());

        assert_eq!(view.tabs.len(), 3);
        assert_eq!(view.project_name.as_deref(), Some("Fabrikam"));
        match view.body {
            Body::Projects(Panel::Rows { rows, total }) => {
                assert_eq!(total, 2);
                assert!(rows[0].selected);
                assert!(!rows[1].selected);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_release_rows_flag_unguarded_production() {
        let mut ex = loaded_explorer(vec![release(1, "Production", 0), release(2, "Production", 2)]);
        ex.select_tab(Tab::Releases);

        let view = render(&ex, now());
        assert_eq!(view.production_filter, Some(false));
        match view.body {
            Body::Releases(Panel::Rows { rows, total }) => {
                assert_eq!(total, 2);
                assert!(rows[0].environments[0].unguarded);
                assert!(!rows[1].environments[0].unguarded);
                assert_eq!(rows[0].environments[0].tone, Tone::Success);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_filtered_release_rows_keep_total() {
        let mut ex = loaded_explorer(vec![release(1, "Production", 0), release(2, "Production", 2)]);
        ex.select_tab(Tab::Releases);
        ex.toggle_production_filter();

        let view = render(&ex, now());
        assert_eq!(view.production_filter, Some(true));
        match view.body {
            Body::Releases(Panel::Rows { rows, total }) => {
                assert_eq!(total, 2);
                assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_production_filter_never_shown_as_search_text() {
        let mut ex = loaded_explorer(vec![release(1, "Production", 0)]);
        ex.select_tab(Tab::Releases);
        ex.toggle_production_filter();
        assert_eq!(render(&ex, now()).search_text, "");

        ex.select_tab(Tab::Projects);
        let view = render(&ex, now());
        assert_eq!(view.search_text, "");
        assert_eq!(view.production_filter, None);
    }

    #[test]
    fn test_pipeline_tone_follows_status() {
        let mut ex = loaded_explorer(vec![]);
        ex.select_tab(Tab::Pipelines);
        let tickets = ex.refresh();
        ex.apply(ok(&tickets[0], Payload::Pipelines(vec![
            Pipeline { id: 1, name: "a".into(), revision: 1, status: Some("failed".into()) },
            Pipeline { id: 2, name: "b".into(), revision: 4, status: None },
        ])));

        match render(&ex, now()).body {
            Body::Pipelines(Panel::Rows { rows, .. }) => {
                assert_eq!(rows[0].tone, Tone::Failure);
                assert_eq!(rows[1].tone, Tone::Neutral);
                assert_eq!(rows[1].status, "unknown");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_format_age() {
        let now = now();
        assert_eq!(format_age(now - chrono::Duration::minutes(5), now), "5m");
        assert_eq!(format_age(now - chrono::Duration::hours(3), now), "3h");
        assert_eq!(format_age(now - chrono::Duration::days(12), now), "12d");
        assert_eq!(format_age(now + chrono::Duration::minutes(1), now), "0m");
    }
}
