mod state;

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use engine::{AuthError, EngineError, Expense, Screen, Tracker, views};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub use state::{
    AppState, DashboardState, FormField, FormState, LoginState, RangeField, ReportsState,
    ToastState, WindowKind,
};

/// Which top-level surface is showing. Derived from the tracker on every
/// frame, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Loading,
    Login,
    Signed(Screen),
}

pub struct App {
    config: AppConfig,
    tracker: Tracker,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, tracker: Tracker) -> Self {
        let state = AppState {
            login: LoginState {
                email: config.email.clone(),
                ..LoginState::default()
            },
            ..AppState::default()
        };

        Self {
            config,
            tracker,
            state,
            should_quit: false,
        }
    }

    pub fn into_tracker(self) -> Tracker {
        self.tracker
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.tracker.pump().await;
            self.sync_with_tracker();

            let today = self.config.today();
            terminal
                .draw(|frame| ui::render(frame, &self.tracker, &self.state, today))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    pub fn surface(&self) -> Surface {
        surface_of(&self.tracker)
    }

    /// Reconcile screen-local state with whatever the tracker decided since
    /// the last frame.
    fn sync_with_tracker(&mut self) {
        if let Some(notice) = self.tracker.take_notice() {
            self.state.toast = Some(ToastState::new(notice));
        }
        if self.state.toast.as_ref().is_some_and(ToastState::expired) {
            self.state.toast = None;
        }

        match self.surface() {
            Surface::Signed(Screen::Add | Screen::Edit) => {}
            // The form closes on save, cancel, delete, or when the record
            // under edit disappeared remotely.
            _ => self.state.form = None,
        }
        if self.tracker.session().current_user().is_none() {
            self.state.dashboard = DashboardState::default();
            self.state.confirm_logout = false;
        }

        let visible = self.visible_records().len();
        self.state.dashboard.clamp(visible);
    }

    fn visible_records(&self) -> Vec<&Expense> {
        views::search(self.tracker.dataset().records(), &self.state.dashboard.search)
    }

    fn selected_record(&self) -> Option<&Expense> {
        self.visible_records()
            .get(self.state.dashboard.selected)
            .copied()
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.tracker.pending_delete().is_some() {
            self.handle_delete_confirm(action).await;
            return;
        }
        if self.state.confirm_logout {
            self.handle_logout_confirm(action).await;
            return;
        }

        match self.surface() {
            Surface::Loading => {
                if action == AppAction::Cancel {
                    self.should_quit = true;
                }
            }
            Surface::Login => self.handle_login_key(action).await,
            Surface::Signed(Screen::Dashboard) => self.handle_dashboard_key(action).await,
            Surface::Signed(Screen::Add | Screen::Edit) => self.handle_form_key(action).await,
            Surface::Signed(Screen::Reports) => self.handle_reports_key(action),
        }
    }

    async fn handle_login_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => self.state.login.email.push(ch),
            AppAction::Backspace => {
                self.state.login.email.pop();
            }
            AppAction::Cancel => self.should_quit = true,
            AppAction::Submit => self.attempt_login().await,
            _ => {}
        }
    }

    async fn attempt_login(&mut self) {
        let email = self.state.login.email.trim().to_string();
        if email.is_empty() {
            self.state.login.message = Some("Enter your e-mail address.".to_string());
            return;
        }

        match self.tracker.sign_in(&email).await {
            Ok(()) => {
                self.state.login.message = None;
                self.state.login.domain_hint = None;
            }
            Err(EngineError::Auth(AuthError::DomainNotPermitted { domain })) => {
                self.state.login.message = Some(format!("Sign-ins from {domain} are not allowed."));
                self.state.login.domain_hint = Some(domain_guidance(
                    &domain,
                    &self.config.allowed_domains,
                ));
            }
            Err(err) => {
                self.state.login.message = Some(err.to_string());
                self.state.login.domain_hint = None;
            }
        }
    }

    async fn handle_dashboard_key(&mut self, action: AppAction) {
        if self.state.dashboard.renaming.is_some() {
            self.handle_rename_key(action).await;
            return;
        }
        if self.state.dashboard.searching {
            self.handle_search_key(action);
            return;
        }

        let visible = self.visible_records().len();
        match action {
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Cancel => self.state.dashboard.search.clear(),
            AppAction::Up | AppAction::Input('k') => self.state.dashboard.select_prev(),
            AppAction::Down | AppAction::Input('j') => {
                self.state.dashboard.select_next(visible);
            }
            AppAction::Input('a' | 'n') => {
                if self.tracker.new_entry() {
                    self.state.form = Some(FormState::new(self.config.today()));
                }
            }
            AppAction::Submit | AppAction::Input('e') => self.open_selected(),
            AppAction::Input('d') | AppAction::Delete => {
                if let Some(id) = self.selected_record().map(|expense| expense.id.clone()) {
                    let _ = self.tracker.request_delete(&id);
                }
            }
            AppAction::Input('/') => self.state.dashboard.searching = true,
            AppAction::Input('r') | AppAction::Right => {
                self.tracker.show_reports();
            }
            AppAction::Input('m') => {
                self.state.dashboard.renaming =
                    Some(self.tracker.dataset().display_name().to_string());
            }
            AppAction::Input('l') => self.state.confirm_logout = true,
            _ => {}
        }
    }

    fn open_selected(&mut self) {
        let Some(expense) = self.selected_record().cloned() else {
            return;
        };
        if self.tracker.edit(&expense.id).is_ok() {
            self.state.form = Some(FormState::editing(&expense));
        }
    }

    fn handle_search_key(&mut self, action: AppAction) {
        let dashboard = &mut self.state.dashboard;
        match action {
            AppAction::Input(ch) => {
                dashboard.search.push(ch);
                dashboard.selected = 0;
            }
            AppAction::Backspace => {
                dashboard.search.pop();
                dashboard.selected = 0;
            }
            AppAction::Submit | AppAction::Down => dashboard.searching = false,
            AppAction::Cancel => {
                dashboard.search.clear();
                dashboard.searching = false;
            }
            _ => {}
        }
    }

    async fn handle_rename_key(&mut self, action: AppAction) {
        let Some(name) = self.state.dashboard.renaming.as_mut() else {
            return;
        };
        match action {
            AppAction::Input(ch) => name.push(ch),
            AppAction::Backspace => {
                name.pop();
            }
            AppAction::Cancel => self.state.dashboard.renaming = None,
            AppAction::Submit => {
                let name = self.state.dashboard.renaming.take().unwrap_or_default();
                // A blank name reverts to the current one without writing.
                if !name.trim().is_empty() {
                    let _ = self.tracker.rename(&name).await;
                }
            }
            _ => {}
        }
    }

    async fn handle_form_key(&mut self, action: AppAction) {
        let known = views::known_categories(self.tracker.dataset().records());
        let Some(form) = self.state.form.as_mut() else {
            // The view moved to a form without us opening one.
            self.tracker.cancel();
            return;
        };

        match action {
            AppAction::Cancel => {
                self.tracker.cancel();
                self.state.form = None;
            }
            AppAction::NextField | AppAction::Down => form.focus = form.focus.next(),
            AppAction::PrevField | AppAction::Up => form.focus = form.focus.prev(),
            AppAction::Right if form.focus == FormField::Category => {
                form.accept_suggestion(&known);
            }
            AppAction::Input(ch) => form.push(ch),
            AppAction::Backspace => form.backspace(),
            AppAction::Submit => {
                let submitted = form.form.clone();
                if self.tracker.submit(&submitted).await.is_ok() {
                    self.state.form = None;
                }
            }
            AppAction::Delete => {
                if let Some(id) = self.tracker.view_state().editing_id().cloned() {
                    let _ = self.tracker.request_delete(&id);
                }
            }
            _ => {}
        }
    }

    fn handle_reports_key(&mut self, action: AppAction) {
        let reports = &mut self.state.reports;
        if let Some(input) = reports.focused_mut() {
            match action {
                AppAction::Input(ch) if ch.is_ascii_digit() || ch == '-' => {
                    input.push(ch);
                    return;
                }
                AppAction::Backspace => {
                    input.pop();
                    return;
                }
                _ => {}
            }
        }

        match action {
            AppAction::Left => reports.cycle(false),
            AppAction::Right => reports.cycle(true),
            AppAction::NextField | AppAction::PrevField => reports.toggle_focus(),
            AppAction::Cancel | AppAction::Input('b' | 'r') => {
                self.tracker.show_dashboard();
            }
            AppAction::Input('q') => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_delete_confirm(&mut self, action: AppAction) {
        match action {
            AppAction::Input('y' | 'Y') | AppAction::Submit => {
                // Failures are reported through the tracker's notice.
                let _ = self.tracker.confirm_delete().await;
            }
            AppAction::Input('n' | 'N') | AppAction::Cancel => self.tracker.cancel_delete(),
            _ => {}
        }
    }

    async fn handle_logout_confirm(&mut self, action: AppAction) {
        match action {
            AppAction::Input('y' | 'Y') | AppAction::Submit => {
                self.state.confirm_logout = false;
                let _ = self.tracker.sign_out().await;
            }
            AppAction::Input('n' | 'N') | AppAction::Cancel => self.state.confirm_logout = false,
            _ => {}
        }
    }
}

pub fn surface_of(tracker: &Tracker) -> Surface {
    if tracker.session().is_loading() {
        Surface::Loading
    } else if tracker.session().current_user().is_none() {
        Surface::Login
    } else {
        Surface::Signed(tracker.view_state().screen())
    }
}

fn domain_guidance(domain: &str, allowed: &[String]) -> String {
    if allowed.is_empty() {
        return format!("Add \"{domain}\" to allowed_domains in the config file.");
    }
    format!(
        "Use an address from {} or add \"{domain}\" to allowed_domains.",
        allowed.join(", ")
    )
}
