use crate::azure::DevOpsClient;
use crate::config::Config;
use crate::connect::ConnectForm;
use crate::explorer::filter::NameMatcher;
use crate::explorer::query::{FetchTicket, QueryKind};
use crate::explorer::{Explorer, FetchOutcome, Payload, Tab};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum Screen {
    Connect(ConnectForm),
    Explore(Explorer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Help,
}

/// Fetch result tagged with the session that asked for it
type SessionOutcome = (u64, FetchOutcome);

pub struct App {
    // Config
    pub config: Config,

    // UI state
    pub screen: Screen,
    pub input_mode: InputMode,

    // Connection for the current session; absent on the connect screen
    client: Option<DevOpsClient>,
    session: u64,
    fetch_tx: mpsc::Sender<SessionOutcome>,
    fetch_rx: mpsc::Receiver<SessionOutcome>,

    // Status
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub status_set_at: Option<Instant>,

    // Loading spinner state (used by ui::draw)
    pub spinner_frame: usize,
}

impl App {
    pub fn new(config: Config, base_url: Option<String>) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel(32);
        Self {
            config,
            screen: Screen::Connect(ConnectForm::new(base_url)),
            input_mode: InputMode::Normal,
            client: None,
            session: 0,
            fetch_tx,
            fetch_rx,
            status_message: None,
            status_is_error: false,
            status_set_at: None,
            spinner_frame: 0,
        }
    }

    pub fn explorer(&self) -> Option<&Explorer> {
        match &self.screen {
            Screen::Explore(explorer) => Some(explorer),
            Screen::Connect(_) => None,
        }
    }

    pub fn explorer_mut(&mut self) -> Option<&mut Explorer> {
        match &mut self.screen {
            Screen::Explore(explorer) => Some(explorer),
            Screen::Connect(_) => None,
        }
    }

    pub fn connect_form_mut(&mut self) -> Option<&mut ConnectForm> {
        match &mut self.screen {
            Screen::Connect(form) => Some(form),
            Screen::Explore(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.explorer().is_some_and(|e| e.is_loading())
    }

    fn name_matcher(&self) -> NameMatcher {
        if self.config.settings.fuzzy_search {
            NameMatcher::fuzzy()
        } else {
            NameMatcher::substring()
        }
    }

    /// Validate the connect form and, on success, open the explorer
    pub fn submit_connect(&mut self) {
        let matcher = self.name_matcher();
        let timeout = self.config.settings.request_timeout();
        let Some(form) = self.connect_form_mut() else {
            return;
        };
        let Some(connection) = form.submit() else {
            return;
        };

        let client = match DevOpsClient::new(&connection, timeout) {
            Ok(client) => client,
            Err(e) => {
                self.set_error(format!("Cannot connect: {e}"));
                return;
            }
        };

        log::info!("connected to {}", connection.api_root());
        self.session += 1;
        self.client = Some(client);
        let mut explorer = Explorer::new(connection, matcher);
        let tickets = explorer.start();
        self.screen = Screen::Explore(explorer);
        self.input_mode = InputMode::Normal;
        self.dispatch(tickets);
    }

    /// Drop the connection and go back to the form, keeping the URL
    pub fn disconnect(&mut self) {
        let base_url = self.explorer().map(|e| e.connection().base_url().to_string());
        if base_url.is_none() {
            return;
        }
        log::info!("disconnected");
        self.client = None;
        // Anything still in flight belongs to the old session
        self.session += 1;
        self.screen = Screen::Connect(ConnectForm::new(base_url));
        self.input_mode = InputMode::Normal;
        self.set_status("Disconnected");
    }

    /// Spawn one background request per ticket
    fn dispatch(&self, tickets: Vec<FetchTicket>) {
        let Some(client) = &self.client else {
            return;
        };

        for ticket in tickets {
            let client = client.clone();
            let tx = self.fetch_tx.clone();
            let session = self.session;
            tokio::spawn(async move {
                let result = fetch(&client, &ticket).await;
                let _ = tx.send((session, FetchOutcome { ticket, result })).await;
            });
        }
    }

    /// Poll for fetch results from background tasks (non-blocking)
    pub fn poll_fetches(&mut self) {
        let mut results = Vec::new();
        loop {
            match self.fetch_rx.try_recv() {
                Ok(item) => results.push(item),
                Err(mpsc::error::TryRecvError::Empty) => break,
                // Never happens while App holds a sender
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }

        for (session, outcome) in results {
            if session != self.session {
                log::debug!("dropping {} result from a closed session", outcome.ticket.key.kind.label());
                continue;
            }
            let kind = outcome.ticket.key.kind;
            let failed = outcome.result.is_err();
            let applied = match self.explorer_mut() {
                Some(explorer) => explorer.apply(outcome),
                None => false,
            };
            if applied && failed {
                self.set_error(format!("Failed to load {}", kind.label()));
            }
        }
    }

    // -- Explorer actions ---------------------------------------------------

    /// Enter: select the project under the cursor
    pub fn activate(&mut self) {
        let tickets = match self.explorer_mut() {
            Some(explorer) => explorer.activate(),
            None => return,
        };
        if !tickets.is_empty() {
            if let Some(name) = self.explorer().and_then(|e| e.selected_project()).map(|p| p.name.clone()) {
                self.set_status(format!("Project: {name}"));
            }
        }
        self.dispatch(tickets);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        let Some(explorer) = self.explorer_mut() else {
            return;
        };
        if !explorer.select_tab(tab) {
            self.set_error("Select a project first");
        }
    }

    pub fn refresh(&mut self) {
        let tickets = match self.explorer_mut() {
            Some(explorer) => explorer.refresh(),
            None => return,
        };
        if let Some(ticket) = tickets.first() {
            self.set_status(format!("Refreshing {}...", ticket.key.kind.label()));
        }
        self.dispatch(tickets);
    }

    pub fn toggle_production_filter(&mut self) {
        let Some(explorer) = self.explorer_mut() else {
            return;
        };
        if explorer.active_tab() != Tab::Releases {
            self.set_error("Filter is available on the Releases tab");
            return;
        }
        if explorer.toggle_production_filter() {
            self.set_status("Showing releases with production stages lacking approvers");
        } else {
            self.set_status("Showing all releases");
        }
    }

    pub fn open_current_row(&mut self) {
        let Some(url) = self.explorer().and_then(|e| e.current_row_url()) else {
            return;
        };
        match open::that(&url) {
            Ok(()) => self.set_status(format!("Opened {url}")),
            Err(e) => self.set_error(format!("Failed to open browser: {e}")),
        }
    }

    pub fn copy_current_id(&mut self) {
        let Some(id) = self.explorer().and_then(|e| e.current_row_id()) else {
            return;
        };
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(id.clone()));
        match copied {
            Ok(()) => self.set_status(format!("Copied {id}")),
            Err(e) => self.set_error(format!("Clipboard unavailable: {e}")),
        }
    }

    // -- Status -------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = false;
        self.status_set_at = Some(Instant::now());
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = true;
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
        self.status_set_at = None;
    }

    /// Clear status message once it is older than the configured timeout
    pub fn clear_expired_status(&mut self) {
        let timeout = Duration::from_secs(self.config.settings.status_timeout);
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() > timeout {
                self.clear_status();
            }
        }
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
        FRAMES[self.spinner_frame % FRAMES.len()]
    }
}

async fn fetch(client: &DevOpsClient, ticket: &FetchTicket) -> Result<Payload, String> {
    let key = &ticket.key;
    let result = match (key.kind, key.project_id.as_deref()) {
        (QueryKind::Projects, _) => client.get_projects().await.map(Payload::Projects),
        (QueryKind::Pipelines, Some(project)) => client.get_pipelines(project).await.map(Payload::Pipelines),
        (QueryKind::Releases, Some(project)) => client.get_releases(project).await.map(Payload::Releases),
        (kind, None) => return Err(format!("{} need a project", kind.label())),
    };
    result.map_err(|e| e.to_string())
}
