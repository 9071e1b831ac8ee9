//! An in-memory [OntapApi] serving JSON fixtures.

use std::collections::HashMap;

use serde_json::Value;

use crate::cli::Cli;
use crate::ontap::OntapApi;
use crate::{Error, Result};

enum Response {
    Body(Value),
    Error(u16, String),
}

/// Responses are keyed by path. Requests carrying a `name` query parameter are looked up as
/// `path?name=<name>` so lookups of single items can be told apart.
#[derive(Default)]
pub struct FakeApi {
    responses: HashMap<String, Response>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi::default()
    }

    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_owned(), Response::Body(body));
        self
    }

    pub fn with_error(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(path.to_owned(), Response::Error(status, body.to_owned()));
        self
    }
}

impl OntapApi for FakeApi {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let key = match query.iter().find(|(k, _)| *k == "name") {
            Some((_, name)) => format!("{}?name={}", path, name),
            None => path.to_owned(),
        };

        match self.responses.get(&key) {
            Some(Response::Body(body)) => Ok(body.clone()),
            Some(Response::Error(status, body)) => Err(Error::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Err(Error::Api {
                status: 404,
                body: format!("no fixture for {}", key),
            }),
        }
    }
}

/// Parses a command line the way the binary does, connection flags included.
pub fn parse_args(args: &[&str]) -> Cli {
    let mut argv = vec!["check_ontap"];
    argv.extend_from_slice(&args[..1]);
    argv.extend_from_slice(&["-H", "cluster1", "-u", "monitor", "-p", "secret"]);
    argv.extend_from_slice(&args[1..]);
    <Cli as clap::Parser>::try_parse_from(argv).unwrap()
}
