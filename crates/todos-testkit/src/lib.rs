// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use todos_app::{Todo, TodoId, User, UserId};

const VERBS: [&str; 16] = [
    "buy", "call", "clean", "email", "file", "fix", "pay", "plan", "read", "renew", "review",
    "schedule", "send", "sort", "update", "water",
];

const OBJECTS: [&str; 18] = [
    "milk",
    "the plants",
    "taxes",
    "the dentist",
    "passport",
    "the garage",
    "invoices",
    "the bike",
    "insurance",
    "groceries",
    "the report",
    "library books",
    "the landlord",
    "photos",
    "the budget",
    "gift cards",
    "the car",
    "backups",
];

const QUALIFIERS: [&str; 8] = [
    "",
    "",
    "",
    " today",
    " before friday",
    " this weekend",
    " again",
    " asap",
];

const FIRST_NAMES: [&str; 10] = [
    "Leanne", "Ervin", "Clementine", "Patricia", "Chelsey", "Dennis", "Kurtis", "Nicholas",
    "Glenna", "Clementina",
];
const LAST_NAMES: [&str; 10] = [
    "Graham", "Howell", "Bauch", "Lebsack", "Dietrich", "Schulist", "Weissnat", "Runolfsdottir",
    "Reichert", "DuBuque",
];

/// Nothing listens on port 1, so requests fail fast with a connect error.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/api";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct TodoFaker {
    seed: u64,
    rng: DeterministicRng,
    next_id: i64,
}

impl TodoFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            seed: normalized,
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn todo(&mut self) -> Todo {
        let id = TodoId::new(self.next_id);
        self.next_id += 1;
        let owner = self.rng.int_n(FIRST_NAMES.len()) as i64 + 1;
        Todo {
            id,
            title: self.title(),
            completed: self.rng.bool(),
            user_id: Some(UserId::new(owner)),
        }
    }

    pub fn todos(&mut self, count: usize) -> Vec<Todo> {
        (0..count).map(|_| self.todo()).collect()
    }

    /// The same `id` always yields the same user for a given seed.
    pub fn user(&self, id: UserId) -> User {
        let mut rng = DeterministicRng::new(self.seed ^ (id.get() as u64).rotate_left(32));
        let first = FIRST_NAMES[rng.int_n(FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.int_n(LAST_NAMES.len())];
        User {
            id,
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@example.com",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            phone: Some(format!(
                "1-{:03}-{:03}-{:04}",
                200 + rng.int_n(800),
                200 + rng.int_n(800),
                rng.int_n(10_000),
            )),
        }
    }

    fn title(&mut self) -> String {
        let verb = self.pick(&VERBS);
        let object = self.pick(&OBJECTS);
        let qualifier = self.pick(&QUALIFIERS);
        let mut title = format!("{verb} {object}{qualifier}");
        if self.rng.bool()
            && let Some(first) = title.get_mut(0..1)
        {
            first.make_ascii_uppercase();
        }
        title
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// Three records, two completed and one active, in a fixed order.
pub fn sample_todos() -> Vec<Todo> {
    vec![
        Todo {
            id: TodoId::new(1),
            title: "  Buy Milk ".to_owned(),
            completed: true,
            user_id: Some(UserId::new(1)),
        },
        Todo {
            id: TodoId::new(2),
            title: "Walk the dog".to_owned(),
            completed: false,
            user_id: Some(UserId::new(2)),
        },
        Todo {
            id: TodoId::new(3),
            title: "File taxes".to_owned(),
            completed: true,
            user_id: None,
        },
    ]
}

pub fn sample_user() -> User {
    User {
        id: UserId::new(1),
        name: "Leanne Graham".to_owned(),
        email: "Sincere@april.biz".to_owned(),
        phone: None,
    }
}

pub fn todos_json(todos: &[Todo]) -> Result<String> {
    serde_json::to_string(todos).context("encode todos fixture")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
        }
    }
}

/// A local HTTP endpoint answering a fixed script of responses in order and
/// recording the requested URLs.
pub struct MockEndpoint {
    base_url: String,
    handle: JoinHandle<Result<Vec<String>>>,
}

impl MockEndpoint {
    pub fn serve(responses: Vec<MockResponse>) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}/api", server.server_addr());

        let handle = thread::spawn(move || {
            let mut seen = Vec::with_capacity(responses.len());
            for scripted in responses {
                let request = server
                    .recv_timeout(Duration::from_secs(5))
                    .context("receive mock request")?
                    .ok_or_else(|| anyhow!("mock server timed out waiting for a request"))?;
                seen.push(request.url().to_owned());

                let header = Header::from_bytes("Content-Type", scripted.content_type)
                    .map_err(|()| anyhow!("invalid content type {:?}", scripted.content_type))?;
                let response = Response::from_string(scripted.body)
                    .with_status_code(scripted.status)
                    .with_header(header);
                request.respond(response).context("send mock response")?;
            }
            Ok(seen)
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for every scripted response to be served and returns the
    /// requested URLs in arrival order.
    pub fn finish(self) -> Result<Vec<String>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))?
    }
}
