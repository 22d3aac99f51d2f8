//! Explorer state: project selection, tabs, search and the fetch policy
//! that keeps the query table in step with them.

pub mod filter;
pub mod query;
pub mod view;

use crate::azure::{Pipeline, Project, Release};
use crate::connect::ConnectionDescriptor;
use filter::{NameMatcher, SearchFilter, PRODUCTION_WITHOUT_APPROVERS};
use query::{FetchTicket, QueryKey, QueryKind, QueryStatus, QueryTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Projects,
    Pipelines,
    Releases,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Projects, Tab::Pipelines, Tab::Releases];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Projects => "Projects",
            Tab::Pipelines => "Pipelines",
            Tab::Releases => "Releases",
        }
    }

    /// Pipelines and releases only exist in the scope of a project
    pub fn needs_project(self) -> bool {
        !matches!(self, Tab::Projects)
    }

    pub fn kind(self) -> QueryKind {
        match self {
            Tab::Projects => QueryKind::Projects,
            Tab::Pipelines => QueryKind::Pipelines,
            Tab::Releases => QueryKind::Releases,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Projects => 0,
            Tab::Pipelines => 1,
            Tab::Releases => 2,
        }
    }
}

/// Data a finished fetch delivers
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Projects(Vec<Project>),
    Pipelines(Vec<Pipeline>),
    Releases(Vec<Release>),
}

/// A fetch result on its way back from a background task
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: Result<Payload, String>,
}

/// Row under the cursor in the active tab
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Project(&'a Project),
    Pipeline(&'a Pipeline),
    Release(&'a Release),
}

#[derive(Debug)]
pub struct Explorer {
    connection: ConnectionDescriptor,
    selected_project_id: Option<String>,
    active_tab: Tab,
    search_text: String,
    queries: QueryTable<Payload>,
    cursors: [usize; 3],
    matcher: NameMatcher,
}

impl Explorer {
    pub fn new(connection: ConnectionDescriptor, matcher: NameMatcher) -> Self {
        Self {
            connection,
            selected_project_id: None,
            active_tab: Tab::default(),
            search_text: String::new(),
            queries: QueryTable::default(),
            cursors: [0; 3],
            matcher,
        }
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn selected_project_id(&self) -> Option<&str> {
        self.selected_project_id.as_deref()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.selected_project_id.as_deref()?;
        self.projects()?.iter().find(|p| p.id == id)
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn is_loading(&self) -> bool {
        self.queries.is_loading()
    }

    // -- Fetch policy --------------------------------------------------------

    /// Issue the session's projects fetch. Later calls issue nothing.
    pub fn start(&mut self) -> Vec<FetchTicket> {
        let key = QueryKey::projects();
        if self.queries.status(&key).is_some() {
            return Vec::new();
        }
        vec![self.queries.begin(key)]
    }

    /// Re-fetch whatever the active tab shows
    pub fn refresh(&mut self) -> Vec<FetchTicket> {
        match self.key_for(self.active_tab.kind()) {
            Some(key) => vec![self.queries.begin(key)],
            None => Vec::new(),
        }
    }

    /// Select a project. A change drops the previous project's results and
    /// issues pipelines and releases fetches for the new one.
    pub fn select_project(&mut self, project_id: &str) -> Vec<FetchTicket> {
        if self.selected_project_id.as_deref() == Some(project_id) {
            return Vec::new();
        }

        log::info!("selected project {project_id}");
        self.selected_project_id = Some(project_id.to_string());
        self.queries
            .invalidate_where(|key| key.project_id.as_deref().is_some_and(|id| id != project_id));
        self.cursors[Tab::Pipelines.index()] = 0;
        self.cursors[Tab::Releases.index()] = 0;

        vec![
            self.queries.begin(QueryKey::for_project(QueryKind::Pipelines, project_id)),
            self.queries.begin(QueryKey::for_project(QueryKind::Releases, project_id)),
        ]
    }

    /// Store a finished fetch. Results for a key that is no longer current
    /// are dropped and `false` is returned.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome { ticket, result } = outcome;
        let current = match &ticket.key.project_id {
            Some(id) => self.selected_project_id.as_deref() == Some(id.as_str()),
            None => true,
        };
        if !current {
            log::debug!(
                "discarding {} for {:?}: project no longer selected",
                ticket.key.kind.label(),
                ticket.key.project_id
            );
            return false;
        }

        if let Err(message) = &result {
            log::warn!("failed to load {}: {message}", ticket.key.kind.label());
        }
        let applied = self.queries.resolve(&ticket, result);
        if applied {
            self.clamp_cursors();
        } else {
            log::debug!("discarding superseded {} result (generation {})", ticket.key.kind.label(), ticket.generation);
        }
        applied
    }

    fn key_for(&self, kind: QueryKind) -> Option<QueryKey> {
        match kind {
            QueryKind::Projects => Some(QueryKey::projects()),
            _ => self.selected_project_id.as_deref().map(|id| QueryKey::for_project(kind, id)),
        }
    }

    pub fn status(&self, kind: QueryKind) -> Option<&QueryStatus<Payload>> {
        self.queries.status(&self.key_for(kind)?)
    }

    pub fn projects(&self) -> Option<&[Project]> {
        match self.queries.data(&self.key_for(QueryKind::Projects)?) {
            Some(Payload::Projects(projects)) => Some(projects),
            _ => None,
        }
    }

    pub fn pipelines(&self) -> Option<&[Pipeline]> {
        match self.queries.data(&self.key_for(QueryKind::Pipelines)?) {
            Some(Payload::Pipelines(pipelines)) => Some(pipelines),
            _ => None,
        }
    }

    pub fn releases(&self) -> Option<&[Release]> {
        match self.queries.data(&self.key_for(QueryKind::Releases)?) {
            Some(Payload::Releases(releases)) => Some(releases),
            _ => None,
        }
    }

    // -- Tabs ---------------------------------------------------------------

    pub fn is_reachable(&self, tab: Tab) -> bool {
        !tab.needs_project() || self.selected_project_id.is_some()
    }

    pub fn reachable_tabs(&self) -> Vec<Tab> {
        Tab::ALL.into_iter().filter(|t| self.is_reachable(*t)).collect()
    }

    /// Switch tabs. Never touches selection or fetched data. Returns false if
    /// the tab is not reachable yet.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if !self.is_reachable(tab) {
            return false;
        }
        self.active_tab = tab;
        true
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.step_tab(-1);
    }

    fn step_tab(&mut self, step: isize) {
        let tabs = self.reachable_tabs();
        let pos = tabs.iter().position(|t| *t == self.active_tab).unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        self.active_tab = tabs[(pos + step).rem_euclid(len) as usize];
    }

    // -- Search -------------------------------------------------------------

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.cursors = [0; 3];
    }

    /// Typing replaces the filter sentinel instead of extending it
    pub fn push_search_char(&mut self, c: char) {
        let mut text = self.editable_search_text();
        text.push(c);
        self.set_search_text(text);
    }

    pub fn pop_search_char(&mut self) {
        let mut text = self.editable_search_text();
        text.pop();
        self.set_search_text(text);
    }

    fn editable_search_text(&mut self) -> String {
        let text = std::mem::take(&mut self.search_text);
        if text == PRODUCTION_WITHOUT_APPROVERS {
            String::new()
        } else {
            text
        }
    }

    pub fn search_filter(&self) -> SearchFilter<'_> {
        SearchFilter::parse(&self.search_text)
    }

    pub fn production_filter_active(&self) -> bool {
        self.search_filter() == SearchFilter::ProductionWithoutApprovers
    }

    /// "Production without approvers": set the sentinel, or clear it when it
    /// is already set. Only available on the releases tab; returns whether
    /// the filter is active afterwards.
    pub fn toggle_production_filter(&mut self) -> bool {
        if self.active_tab != Tab::Releases {
            return self.production_filter_active();
        }
        if self.production_filter_active() {
            self.set_search_text(String::new());
        } else {
            self.set_search_text(PRODUCTION_WITHOUT_APPROVERS);
        }
        self.production_filter_active()
    }

    pub fn visible_projects(&self) -> Vec<&Project> {
        let projects = self.projects().unwrap_or_default();
        filter::filter_by_name(projects, |p| p.name.as_str(), &self.search_filter(), &self.matcher)
    }

    pub fn visible_pipelines(&self) -> Vec<&Pipeline> {
        let pipelines = self.pipelines().unwrap_or_default();
        filter::filter_by_name(pipelines, |p| p.name.as_str(), &self.search_filter(), &self.matcher)
    }

    pub fn visible_releases(&self) -> Vec<&Release> {
        let releases = self.releases().unwrap_or_default();
        filter::filter_releases(releases, &self.search_filter(), &self.matcher)
    }

    // -- Cursor -------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursors[self.active_tab.index()]
    }

    fn visible_len(&self) -> usize {
        match self.active_tab {
            Tab::Projects => self.visible_projects().len(),
            Tab::Pipelines => self.visible_pipelines().len(),
            Tab::Releases => self.visible_releases().len(),
        }
    }

    pub fn cursor_down(&mut self, by: usize) {
        let len = self.visible_len();
        let cursor = &mut self.cursors[self.active_tab.index()];
        if len > 0 {
            *cursor = (*cursor + by).min(len - 1);
        }
    }

    pub fn cursor_up(&mut self, by: usize) {
        let cursor = &mut self.cursors[self.active_tab.index()];
        *cursor = cursor.saturating_sub(by);
    }

    pub fn cursor_top(&mut self) {
        self.cursors[self.active_tab.index()] = 0;
    }

    pub fn cursor_bottom(&mut self) {
        let len = self.visible_len();
        self.cursors[self.active_tab.index()] = len.saturating_sub(1);
    }

    fn clamp_cursors(&mut self) {
        let lens = [
            self.visible_projects().len(),
            self.visible_pipelines().len(),
            self.visible_releases().len(),
        ];
        for (cursor, len) in self.cursors.iter_mut().zip(lens) {
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }

    pub fn current_row(&self) -> Option<Row<'_>> {
        let idx = self.cursor();
        match self.active_tab {
            Tab::Projects => self.visible_projects().get(idx).copied().map(Row::Project),
            Tab::Pipelines => self.visible_pipelines().get(idx).copied().map(Row::Pipeline),
            Tab::Releases => self.visible_releases().get(idx).copied().map(Row::Release),
        }
    }

    /// Enter on the projects tab selects the project under the cursor
    pub fn activate(&mut self) -> Vec<FetchTicket> {
        let project_id = match self.current_row() {
            Some(Row::Project(project)) => project.id.clone(),
            _ => return Vec::new(),
        };
        self.select_project(&project_id)
    }

    /// Web portal link for the row under the cursor
    pub fn current_row_url(&self) -> Option<String> {
        let root = self.connection.api_root();
        let project = || self.selected_project_id.as_deref().map(|id| urlencoding::encode(id).into_owned());
        match self.current_row()? {
            Row::Project(p) => Some(format!("{root}/{}", urlencoding::encode(&p.name))),
            Row::Pipeline(p) => Some(format!("{root}/{}/_build?definitionId={}", project()?, p.id)),
            Row::Release(r) => Some(format!(
                "{root}/{}/_releaseProgress?_a=release-pipeline-progress&releaseId={}",
                project()?,
                r.id
            )),
        }
    }

    pub fn current_row_id(&self) -> Option<String> {
        Some(match self.current_row()? {
            Row::Project(p) => p.id.clone(),
            Row::Pipeline(p) => p.id.to_string(),
            Row::Release(r) => r.id.to_string(),
        })
    }
}
