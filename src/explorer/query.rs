use std::collections::HashMap;

/// Which collection a query fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Projects,
    Pipelines,
    Releases,
}

impl QueryKind {
    pub fn label(self) -> &'static str {
        match self {
            QueryKind::Projects => "projects",
            QueryKind::Pipelines => "pipelines",
            QueryKind::Releases => "releases",
        }
    }
}

/// `(kind, project)` pair a result is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub project_id: Option<String>,
}

impl QueryKey {
    pub fn projects() -> Self {
        Self { kind: QueryKind::Projects, project_id: None }
    }

    pub fn for_project(kind: QueryKind, project_id: &str) -> Self {
        Self { kind, project_id: Some(project_id.to_string()) }
    }
}

/// Handed out when a fetch starts; the result must come back with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus<T> {
    Pending,
    Ready(T),
    Failed(String),
}

#[derive(Debug)]
struct Entry<T> {
    generation: u64,
    status: QueryStatus<T>,
}

/// Query results keyed by `(kind, project)`.
///
/// Each `begin` bumps a table-wide generation counter. Only the result
/// carrying the latest ticket of a live key is stored; everything else is
/// dropped, so a slow response for an old project or an old refresh can
/// never overwrite newer state.
#[derive(Debug)]
pub struct QueryTable<T> {
    entries: HashMap<QueryKey, Entry<T>>,
    next_generation: u64,
}

impl<T> Default for QueryTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 1,
        }
    }
}

impl<T> QueryTable<T> {
    /// Mark `key` pending and return the ticket for the new fetch.
    /// Any data previously stored for the key is replaced.
    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.entries.insert(key.clone(), Entry { generation, status: QueryStatus::Pending });
        FetchTicket { key, generation }
    }

    /// Store a result. Returns false if the ticket is stale and the result
    /// was discarded.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<T, String>) -> bool {
        match self.entries.get_mut(&ticket.key) {
            Some(entry) if entry.generation == ticket.generation => {
                entry.status = match result {
                    Ok(data) => QueryStatus::Ready(data),
                    Err(message) => QueryStatus::Failed(message),
                };
                true
            }
            _ => false,
        }
    }

    pub fn status(&self, key: &QueryKey) -> Option<&QueryStatus<T>> {
        self.entries.get(key).map(|e| &e.status)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&T> {
        match self.status(key) {
            Some(QueryStatus::Ready(data)) => Some(data),
            _ => None,
        }
    }

    /// Forget every entry whose key matches; late results for it are dropped
    pub fn invalidate_where(&mut self, mut matches: impl FnMut(&QueryKey) -> bool) {
        self.entries.retain(|key, _| !matches(key));
    }

    pub fn is_loading(&self) -> bool {
        self.entries.values().any(|e| matches!(e.status, QueryStatus::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipelines(project: &str) -> QueryKey {
        QueryKey::for_project(QueryKind::Pipelines, project)
    }

    #[test]
    fn test_begin_marks_pending() {
        let mut table: QueryTable<Vec<i32>> = QueryTable::default();
        let ticket = table.begin(QueryKey::projects());

        assert_eq!(table.status(&ticket.key), Some(&QueryStatus::Pending));
        assert!(table.is_loading());
        assert_eq!(table.data(&ticket.key), None);
    }

    #[test]
    fn test_resolve_stores_data_and_errors() {
        let mut table: QueryTable<Vec<i32>> = QueryTable::default();
        let ok = table.begin(pipelines("p1"));
        let failed = table.begin(pipelines("p2"));

        assert!(table.resolve(&ok, Ok(vec![1, 2])));
        assert!(table.resolve(&failed, Err("HTTP 401".into())));

        assert_eq!(table.data(&ok.key), Some(&vec![1, 2]));
        assert_eq!(table.status(&failed.key), Some(&QueryStatus::Failed("HTTP 401".into())));
        assert!(!table.is_loading());
    }

    #[test]
    fn test_older_generation_for_same_key_is_discarded() {
        let mut table: QueryTable<Vec<i32>> = QueryTable::default();
        let first = table.begin(pipelines("p1"));
        let second = table.begin(pipelines("p1"));

        // Newer refresh lands first, then the slow original response
        assert!(table.resolve(&second, Ok(vec![2])));
        assert!(!table.resolve(&first, Ok(vec![1])));

        assert_eq!(table.data(&second.key), Some(&vec![2]));
    }

    #[test]
    fn test_results_for_invalidated_keys_are_discarded() {
        let mut table: QueryTable<Vec<i32>> = QueryTable::default();
        let old = table.begin(pipelines("p1"));
        table.invalidate_where(|key| key.project_id.as_deref() == Some("p1"));

        assert!(!table.resolve(&old, Ok(vec![1])));
        assert_eq!(table.status(&old.key), None);
    }

    #[test]
    fn test_successful_fetch_replaces_previous_data() {
        let mut table: QueryTable<Vec<i32>> = QueryTable::default();
        let first = table.begin(QueryKey::projects());
        table.resolve(&first, Ok(vec![1, 2, 3]));

        let again = table.begin(QueryKey::projects());
        assert_eq!(table.status(&again.key), Some(&QueryStatus::Pending));
        table.resolve(&again, Ok(vec![4]));

        assert_eq!(table.data(&again.key), Some(&vec![4]));
    }
}
