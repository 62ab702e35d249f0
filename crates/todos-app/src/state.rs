// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{
    FilterCriteria, LoadFailure, LoadPhase, Notification, StatusFilter, Todo, TodoId, evaluate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    Shown,
}

/// One viewing session: the fetched collection, the criteria, and the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    todos: Vec<Todo>,
    load: LoadPhase,
    loaded_at: Option<OffsetDateTime>,
    selection: Option<Todo>,
    notification: Option<Notification>,
    pub criteria: FilterCriteria,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            load: LoadPhase::Pending,
            loaded_at: None,
            selection: None,
            notification: None,
            criteria: FilterCriteria::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SetQuery(String),
    PushQueryChar(char),
    PopQueryChar,
    ClearQuery,
    SetStatusFilter(StatusFilter),
    CycleStatusFilter,
    Select(Todo),
    ClearSelection,
    DismissNotification,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Loaded { count: usize },
    LoadFailed(LoadFailure),
    QueryChanged(String),
    StatusFilterChanged(StatusFilter),
    OverlayChanged(Overlay),
    NotificationRaised(Notification),
    NotificationDismissed,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_status_filter(status: StatusFilter) -> Self {
        Self {
            criteria: FilterCriteria::new("", status),
            ..Self::default()
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn visible_todos(&self) -> Vec<&Todo> {
        evaluate(&self.todos, &self.criteria)
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadPhase::Pending
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.load
    }

    pub fn loaded_at(&self) -> Option<OffsetDateTime> {
        self.loaded_at
    }

    pub fn selection(&self) -> Option<&Todo> {
        self.selection.as_ref()
    }

    pub fn selected_id(&self) -> Option<TodoId> {
        self.selection.as_ref().map(|todo| todo.id)
    }

    pub fn overlay(&self) -> Overlay {
        if self.selection.is_some() {
            Overlay::Shown
        } else {
            Overlay::Hidden
        }
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Applies the outcome of the collection fetch. Only the first settle is
    /// honored; the collection is never touched on failure.
    pub fn settle_load(
        &mut self,
        result: Result<Vec<Todo>, LoadFailure>,
        at: OffsetDateTime,
    ) -> Vec<AppEvent> {
        if self.load == LoadPhase::Settled {
            return Vec::new();
        }
        self.load = LoadPhase::Settled;

        match result {
            Ok(todos) => {
                self.todos = todos;
                self.loaded_at = Some(at);
                vec![AppEvent::Loaded {
                    count: self.todos.len(),
                }]
            }
            Err(failure) => {
                let notification = Notification::load_failed();
                self.notification = Some(notification.clone());
                vec![
                    AppEvent::LoadFailed(failure),
                    AppEvent::NotificationRaised(notification),
                ]
            }
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SetQuery(query) => self.set_query(query),
            AppCommand::PushQueryChar(ch) => {
                let mut query = self.criteria.query.clone();
                query.push(ch);
                self.set_query(query)
            }
            AppCommand::PopQueryChar => {
                let mut query = self.criteria.query.clone();
                if query.pop().is_none() {
                    return Vec::new();
                }
                self.set_query(query)
            }
            AppCommand::ClearQuery => self.set_query(String::new()),
            AppCommand::SetStatusFilter(status) => self.set_status_filter(status),
            AppCommand::CycleStatusFilter => self.set_status_filter(self.criteria.status.next()),
            AppCommand::Select(todo) => {
                self.selection = Some(todo);
                vec![AppEvent::OverlayChanged(Overlay::Shown)]
            }
            AppCommand::ClearSelection => {
                if self.selection.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::OverlayChanged(Overlay::Hidden)]
            }
            AppCommand::DismissNotification => {
                if self.notification.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::NotificationDismissed]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_query(&mut self, query: String) -> Vec<AppEvent> {
        if self.criteria.query == query {
            return Vec::new();
        }
        self.criteria.query = query;
        vec![AppEvent::QueryChanged(self.criteria.query.clone())]
    }

    fn set_status_filter(&mut self, status: StatusFilter) -> Vec<AppEvent> {
        if self.criteria.status == status {
            return Vec::new();
        }
        self.criteria.status = status;
        vec![
            AppEvent::StatusFilterChanged(status),
            self.set_status(format!("showing {}", status.as_str())),
        ]
    }

    fn set_status(&mut self, message: String) -> AppEvent {
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, Overlay};
    use crate::{LoadFailure, LoadPhase, Notification, StatusFilter, Todo, TodoId};
    use time::OffsetDateTime;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: title.to_owned(),
            completed,
            user_id: None,
        }
    }

    fn three_todos() -> Vec<Todo> {
        vec![
            todo(1, "Buy milk", true),
            todo(2, "Walk the dog", false),
            todo(3, "File taxes", true),
        ]
    }

    fn visible_ids(state: &AppState) -> Vec<i64> {
        state
            .visible_todos()
            .iter()
            .map(|todo| todo.id.get())
            .collect()
    }

    #[test]
    fn new_session_is_loading_with_defaults() {
        let state = AppState::default();
        assert!(state.is_loading());
        assert!(state.todos().is_empty());
        assert!(state.criteria.is_default());
        assert_eq!(state.overlay(), Overlay::Hidden);
        assert!(state.notification().is_none());
    }

    #[test]
    fn successful_load_shows_all_records_in_order() {
        let mut state = AppState::default();
        let events = state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);

        assert_eq!(events, vec![AppEvent::Loaded { count: 3 }]);
        assert!(!state.is_loading());
        assert_eq!(state.loaded_at(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(visible_ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn active_filter_shows_the_single_active_record() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);

        let events = state.dispatch(AppCommand::SetStatusFilter(StatusFilter::Active));
        assert_eq!(
            events,
            vec![
                AppEvent::StatusFilterChanged(StatusFilter::Active),
                AppEvent::StatusUpdated("showing active".to_owned()),
            ]
        );
        assert_eq!(visible_ids(&state), vec![2]);
    }

    #[test]
    fn unmatched_query_hides_everything_for_every_status() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);
        state.dispatch(AppCommand::SetQuery("xyz".to_owned()));

        for status in StatusFilter::ALL {
            state.dispatch(AppCommand::SetStatusFilter(status));
            assert!(state.visible_todos().is_empty());
        }
    }

    #[test]
    fn failed_load_raises_one_notification_and_keeps_collection_empty() {
        let mut state = AppState::default();
        let events = state.settle_load(
            Err(LoadFailure::new("connection refused")),
            OffsetDateTime::UNIX_EPOCH,
        );

        assert!(!state.is_loading());
        assert!(state.todos().is_empty());
        assert_eq!(state.loaded_at(), None);
        let raised = events
            .iter()
            .filter(|event| matches!(event, AppEvent::NotificationRaised(_)))
            .count();
        assert_eq!(raised, 1);
        assert_eq!(state.notification(), Some(&Notification::load_failed()));

        let dismissed = state.dispatch(AppCommand::DismissNotification);
        assert_eq!(dismissed, vec![AppEvent::NotificationDismissed]);
        assert!(state.notification().is_none());
        assert!(state.dispatch(AppCommand::DismissNotification).is_empty());
    }

    #[test]
    fn second_settle_is_ignored() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);

        let events = state.settle_load(Ok(Vec::new()), OffsetDateTime::now_utc());
        assert!(events.is_empty());
        assert_eq!(state.todos().len(), 3);
        assert_eq!(state.load_phase(), LoadPhase::Settled);

        let failed = state.settle_load(
            Err(LoadFailure::new("late failure")),
            OffsetDateTime::now_utc(),
        );
        assert!(failed.is_empty());
        assert!(state.notification().is_none());
    }

    #[test]
    fn select_then_clear_walks_the_overlay_states() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(state.overlay(), Overlay::Hidden);

        let picked = state.visible_todos()[1].clone();
        let shown = state.dispatch(AppCommand::Select(picked));
        assert_eq!(shown, vec![AppEvent::OverlayChanged(Overlay::Shown)]);
        assert_eq!(state.overlay(), Overlay::Shown);
        assert_eq!(state.selected_id(), Some(TodoId::new(2)));

        let hidden = state.dispatch(AppCommand::ClearSelection);
        assert_eq!(hidden, vec![AppEvent::OverlayChanged(Overlay::Hidden)]);
        assert_eq!(state.overlay(), Overlay::Hidden);
        assert!(state.selection().is_none());
    }

    #[test]
    fn selecting_while_shown_replaces_the_record() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);

        let first = state.visible_todos()[0].clone();
        let second = state.visible_todos()[2].clone();
        state.dispatch(AppCommand::Select(first));
        let events = state.dispatch(AppCommand::Select(second));

        assert_eq!(events, vec![AppEvent::OverlayChanged(Overlay::Shown)]);
        assert_eq!(state.overlay(), Overlay::Shown);
        assert_eq!(state.selected_id(), Some(TodoId::new(3)));
    }

    #[test]
    fn selection_survives_being_filtered_out() {
        let mut state = AppState::default();
        state.settle_load(Ok(three_todos()), OffsetDateTime::UNIX_EPOCH);
        state.dispatch(AppCommand::Select(todo(2, "Walk the dog", false)));

        state.dispatch(AppCommand::SetStatusFilter(StatusFilter::Completed));
        assert_eq!(visible_ids(&state), vec![1, 3]);
        assert_eq!(state.selected_id(), Some(TodoId::new(2)));
        assert_eq!(state.overlay(), Overlay::Shown);
    }

    #[test]
    fn query_editing_commands_update_criteria() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::PushQueryChar('m'));
        let events = state.dispatch(AppCommand::PushQueryChar('i'));
        assert_eq!(events, vec![AppEvent::QueryChanged("mi".to_owned())]);

        state.dispatch(AppCommand::PopQueryChar);
        assert_eq!(state.criteria.query, "m");

        state.dispatch(AppCommand::ClearQuery);
        assert_eq!(state.criteria.query, "");
        assert!(state.dispatch(AppCommand::PopQueryChar).is_empty());
    }

    #[test]
    fn cycling_status_filter_wraps_and_updates_status_line() {
        let mut state = AppState::with_status_filter(StatusFilter::Completed);

        state.dispatch(AppCommand::CycleStatusFilter);
        assert_eq!(state.criteria.status, StatusFilter::All);
        assert_eq!(state.status_line.as_deref(), Some("showing all"));

        assert!(
            state
                .dispatch(AppCommand::SetStatusFilter(StatusFilter::All))
                .is_empty()
        );
    }
}
