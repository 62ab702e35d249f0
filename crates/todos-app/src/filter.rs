// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{StatusFilter, Todo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub query: String,
    pub status: StatusFilter,
}

impl FilterCriteria {
    pub fn new(query: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            query: query.into(),
            status,
        }
    }

    pub fn normalized_query(&self) -> String {
        normalize(&self.query)
    }

    pub fn is_default(&self) -> bool {
        self.status == StatusFilter::All && self.normalized_query().is_empty()
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        matches_normalized(todo, &self.normalized_query(), self.status)
    }
}

/// Computes the visible subset of `todos`, keeping the input order.
pub fn evaluate<'a>(todos: &'a [Todo], criteria: &FilterCriteria) -> Vec<&'a Todo> {
    let query = criteria.normalized_query();
    todos
        .iter()
        .filter(|todo| matches_normalized(todo, &query, criteria.status))
        .collect()
}

fn matches_normalized(todo: &Todo, query: &str, status: StatusFilter) -> bool {
    if !status.keeps(todo.completed) {
        return false;
    }
    query.is_empty() || normalize(&todo.title).contains(query)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{FilterCriteria, evaluate};
    use crate::{StatusFilter, Todo, TodoId};
    use std::collections::BTreeSet;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: title.to_owned(),
            completed,
            user_id: None,
        }
    }

    fn sample() -> Vec<Todo> {
        vec![
            todo(1, "delectus aut autem", false),
            todo(2, "quis ut nam facilis", true),
            todo(3, "fugiat veniam minus", false),
            todo(4, "et porro tempora", true),
            todo(5, "laboriosam mollitia et enim", true),
            todo(6, "Qui ullam ratione", false),
        ]
    }

    fn ids(todos: &[&Todo]) -> Vec<i64> {
        todos.iter().map(|todo| todo.id.get()).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let todos = sample();
        let visible = evaluate(&todos, &FilterCriteria::default());
        assert_eq!(ids(&visible), vec![1, 2, 3, 4, 5, 6]);
        assert!(FilterCriteria::default().is_default());
    }

    #[test]
    fn query_is_case_and_whitespace_insensitive() {
        let todos = vec![todo(1, "  Buy Milk ", false)];
        let visible = evaluate(&todos, &FilterCriteria::new("BUY", StatusFilter::All));
        assert_eq!(ids(&visible), vec![1]);

        let padded = evaluate(&todos, &FilterCriteria::new("  milk  ", StatusFilter::All));
        assert_eq!(ids(&padded), vec![1]);
    }

    #[test]
    fn whitespace_query_keeps_everything() {
        let todos = sample();
        let criteria = FilterCriteria::new("   ", StatusFilter::All);
        assert_eq!(evaluate(&todos, &criteria).len(), todos.len());
        assert!(criteria.is_default());
    }

    #[test]
    fn query_matches_substrings_in_order() {
        let todos = sample();
        let visible = evaluate(&todos, &FilterCriteria::new("ET", StatusFilter::All));
        assert_eq!(ids(&visible), vec![4, 5]);
    }

    #[test]
    fn status_filters_partition_the_collection() {
        let todos = sample();
        let completed = evaluate(&todos, &FilterCriteria::new("", StatusFilter::Completed));
        let active = evaluate(&todos, &FilterCriteria::new("", StatusFilter::Active));

        assert!(completed.iter().all(|todo| todo.completed));
        assert!(active.iter().all(|todo| !todo.completed));

        let completed_ids = ids(&completed).into_iter().collect::<BTreeSet<_>>();
        let active_ids = ids(&active).into_iter().collect::<BTreeSet<_>>();
        assert!(completed_ids.is_disjoint(&active_ids));

        let union = completed_ids
            .union(&active_ids)
            .copied()
            .collect::<BTreeSet<_>>();
        let all = todos
            .iter()
            .map(|todo| todo.id.get())
            .collect::<BTreeSet<_>>();
        assert_eq!(union, all);
    }

    #[test]
    fn query_and_status_compose_with_and() {
        let todos = sample();
        let visible = evaluate(&todos, &FilterCriteria::new("qui", StatusFilter::Active));
        assert_eq!(ids(&visible), vec![6]);

        let completed = evaluate(&todos, &FilterCriteria::new("qui", StatusFilter::Completed));
        assert_eq!(ids(&completed), vec![2]);
    }

    #[test]
    fn unmatched_query_is_empty_for_every_status() {
        let todos = sample();
        for status in StatusFilter::ALL {
            assert!(evaluate(&todos, &FilterCriteria::new("xyz", status)).is_empty());
        }
    }

    #[test]
    fn output_is_an_ordered_subsequence_and_idempotent() {
        let todos = sample();
        for status in StatusFilter::ALL {
            for query in ["", "e", "am", "zzz"] {
                let criteria = FilterCriteria::new(query, status);
                let first = evaluate(&todos, &criteria);
                let second = evaluate(&todos, &criteria);
                assert_eq!(first, second);

                let positions = first
                    .iter()
                    .map(|todo| {
                        todos
                            .iter()
                            .position(|candidate| candidate.id == todo.id)
                            .expect("visible todo comes from the collection")
                    })
                    .collect::<Vec<_>>();
                assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(first.iter().all(|todo| criteria.matches(todo)));
            }
        }
    }

    #[test]
    fn empty_collection_stays_empty() {
        let visible = evaluate(&[], &FilterCriteria::new("milk", StatusFilter::Active));
        assert!(visible.is_empty());
    }
}
