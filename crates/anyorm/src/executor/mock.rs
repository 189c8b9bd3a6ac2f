//! In-memory executor that records statements and replays canned results.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ExecResult, Executor, ResultSet};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct MockExecutor {
    responses: Mutex<VecDeque<Result<ResultSet, String>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, set: ResultSet) -> Self {
        self.responses.lock().unwrap().push_back(Ok(set));
        self
    }

    pub(crate) fn respond_scalar(self, value: impl Into<Value>) -> Self {
        self.respond(ResultSet::new(vec!["value".into()], vec![vec![value.into()]]))
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(set)) => Ok(set),
            Some(Err(message)) => Err(OrmError::query(message)),
            None => Ok(ResultSet::default()),
        }
    }
}

impl Executor for MockExecutor {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        self.next(sql, params)?;
        Ok(ExecResult::default())
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
        self.next(sql, params)
    }
}
