#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use anyorm::{ExecResult, Executor, OrmError, OrmResult, ResultSet, Value};

/// Executor that replays queued result sets and records every statement.
#[derive(Default)]
pub struct Recorder {
    responses: Mutex<VecDeque<OrmResult<ResultSet>>>,
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(self, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let set = ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        self.responses.lock().unwrap().push_back(Ok(set));
        self
    }

    pub fn scalar(self, value: impl Into<Value>) -> Self {
        self.rows(&["value"], vec![vec![value.into()]])
    }

    pub fn error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(OrmError::query(message)));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Vec<Value> {
        self.calls.lock().unwrap()[index].1.clone()
    }
}

impl Executor for Recorder {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        self.query_rows(sql, params).await?;
        Ok(ExecResult::default())
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::default()))
    }
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}
