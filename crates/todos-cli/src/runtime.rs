// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::sync::mpsc::Sender;
use std::thread;
use todos_app::{LoadFailure, Todo, TodoId, User, UserId};
use todos_testkit::TodoFaker;
use todos_tui::InternalEvent;
use tracing::{info, warn};

const DEMO_SEED: u64 = 2026;
const DEMO_TODO_COUNT: usize = 40;

/// Fetches from the remote list on worker threads so the interface keeps
/// drawing while a request is in flight.
pub struct HttpRuntime {
    client: todos_api::Client,
}

impl HttpRuntime {
    pub fn new(client: todos_api::Client) -> Self {
        Self { client }
    }
}

impl todos_tui::AppRuntime for HttpRuntime {
    fn load_todos(&mut self) -> Result<Vec<Todo>, LoadFailure> {
        self.client.fetch_todos()
    }

    fn load_user(&mut self, id: UserId) -> Result<User> {
        self.client.fetch_user(id)
    }

    fn spawn_load_todos(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("todos-load".to_owned())
            .spawn(move || {
                let result = client.fetch_todos();
                if tx.send(InternalEvent::TodosLoaded(result)).is_err() {
                    warn!(event = "runtime.load.receiver_gone");
                }
            })
            .map_err(|error| anyhow!("spawn todo loader: {error}"))?;
        Ok(())
    }

    fn spawn_load_user(
        &mut self,
        todo_id: TodoId,
        user_id: UserId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("todos-owner".to_owned())
            .spawn(move || {
                let result = client
                    .fetch_user(user_id)
                    .map_err(|error| format!("{error:#}"));
                if tx
                    .send(InternalEvent::OwnerLoaded { todo_id, result })
                    .is_err()
                {
                    warn!(event = "runtime.owner.receiver_gone", todo_id = todo_id.get());
                }
            })
            .map_err(|error| anyhow!("spawn owner loader: {error}"))?;
        Ok(())
    }
}

/// Serves generated records without touching the network.
pub struct DemoRuntime {
    faker: TodoFaker,
}

impl DemoRuntime {
    pub fn new() -> Self {
        Self {
            faker: TodoFaker::new(DEMO_SEED),
        }
    }
}

impl Default for DemoRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl todos_tui::AppRuntime for DemoRuntime {
    fn load_todos(&mut self) -> Result<Vec<Todo>, LoadFailure> {
        let todos = self.faker.todos(DEMO_TODO_COUNT);
        info!(event = "runtime.demo.seeded", count = todos.len());
        Ok(todos)
    }

    fn load_user(&mut self, id: UserId) -> Result<User> {
        Ok(self.faker.user(id))
    }
}
