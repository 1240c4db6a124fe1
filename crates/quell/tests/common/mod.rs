#![allow(dead_code)]

use asupersync::runtime::RuntimeBuilder;
use quell::{Connection, Cx, Error, Outcome, Payload, Row, Value};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

/// In-process connection double: hands back scripted payloads in order and
/// records every statement it was asked to run.
pub struct FakeConnection {
    responses: Mutex<VecDeque<Payload>>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn push_rows(&self, rows: Vec<Row>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Payload::Rows(rows));
    }

    pub fn push(&self, payload: Payload) {
        self.responses.lock().unwrap().push_back(payload);
    }

    /// Every (sql, params) pair issued so far, in order.
    pub fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }
}

impl Connection for FakeConnection {
    async fn query(&self, _cx: &Cx, sql: &str, params: &[Value]) -> Outcome<Payload, Error> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        let payload = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Payload::Rows(Vec::new()));
        Outcome::Ok(payload)
    }

    async fn execute(&self, _cx: &Cx, sql: &str, params: &[Value]) -> Outcome<u64, Error> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Outcome::Ok(1)
    }
}

pub fn unwrap_outcome<T>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        Outcome::Err(e) => panic!("unexpected error: {e}"),
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

pub fn run<T>(f: impl Future<Output = T>) -> T {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    rt.block_on(f)
}

pub fn row(columns: &[&str], values: Vec<Value>) -> Row {
    Row::new(columns.iter().map(|c| (*c).to_string()).collect(), values)
}
