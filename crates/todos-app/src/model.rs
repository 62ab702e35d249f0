// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Todo {
    pub const fn progress_label(&self) -> &'static str {
        if self.completed { "Done" } else { "Planned" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|status| *status == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub const fn keeps(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusFilter, Todo};
    use crate::{TodoId, UserId};
    use anyhow::Result;

    #[test]
    fn todo_decodes_camel_case_payload() -> Result<()> {
        let todo: Todo = serde_json::from_str(
            r#"{"id":4,"title":"et porro tempora","completed":true,"userId":1}"#,
        )?;
        assert_eq!(todo.id, TodoId::new(4));
        assert_eq!(todo.title, "et porro tempora");
        assert!(todo.completed);
        assert_eq!(todo.user_id, Some(UserId::new(1)));
        Ok(())
    }

    #[test]
    fn todo_owner_is_optional() -> Result<()> {
        let todo: Todo = serde_json::from_str(r#"{"id":1,"title":"x","completed":false}"#)?;
        assert_eq!(todo.user_id, None);
        assert_eq!(todo.progress_label(), "Planned");
        Ok(())
    }

    #[test]
    fn todo_rejects_missing_completion_flag() {
        let decoded = serde_json::from_str::<Todo>(r#"{"id":1,"title":"x"}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn status_filter_parse_round_trips_labels() {
        for status in StatusFilter::ALL {
            assert_eq!(StatusFilter::parse(status.as_str()), Some(status));
        }
        assert_eq!(StatusFilter::parse("done"), None);
    }

    #[test]
    fn status_filter_next_wraps() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Active);
        assert_eq!(StatusFilter::Active.next(), StatusFilter::Completed);
        assert_eq!(StatusFilter::Completed.next(), StatusFilter::All);
    }
}
