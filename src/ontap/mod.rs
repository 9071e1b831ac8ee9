//! A small blocking client for the parts of the ONTAP REST API the checks read.
//!
//! Everything goes through the single [OntapApi::get] primitive. [collection], [count] and
//! [record] add the ONTAP conventions on top: `fields` selection, `num_records` counts and
//! `_links.next` pagination.

use std::fmt::Debug;
use std::time::Duration;

use log::{debug, trace};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

pub mod models;

/// Read access to an ONTAP cluster.
pub trait OntapApi {
    /// GETs `path` (e.g. `/api/storage/disks`, or a `_links.next` href) and returns the JSON body.
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value>;
}

#[derive(Clone, Debug)]
pub struct OntapConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Accept invalid or self signed certificates.
    pub insecure: bool,
    /// `None` lets requests wait as long as the server takes.
    pub timeout: Option<Duration>,
}

pub struct HttpClient {
    client: reqwest::blocking::Client,
    config: OntapConfig,
}

impl HttpClient {
    pub fn new(config: OntapConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .build()?;

        Ok(HttpClient { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "https://{}:{}/{}",
            self.config.host,
            self.config.port,
            path.trim_start_matches('/')
        )
    }
}

impl OntapApi for HttpClient {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let res = self
            .client
            .get(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header(ACCEPT, "application/json")
            .query(query)
            .send()?;

        let status = res.status();
        let body = res.text()?;
        trace!("server returned: {}", body);

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Deserialize, Debug)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
    num_records: Option<u64>,
    #[serde(rename = "_links", default)]
    links: Option<Links>,
}

#[derive(Deserialize, Debug)]
struct Links {
    next: Option<Href>,
}

#[derive(Deserialize, Debug)]
struct Href {
    href: String,
}

/// Fetches all records of a collection, following `_links.next` until the last page.
pub fn collection<T, A>(api: &A, path: &str, fields: &str, query: &[(&str, &str)]) -> Result<Vec<T>>
where
    T: DeserializeOwned + Debug,
    A: OntapApi + ?Sized,
{
    let mut params: Vec<(&str, &str)> = query.to_vec();
    if !fields.is_empty() {
        params.push(("fields", fields));
    }

    let mut page: Page<T> = serde_json::from_value(api.get(path, &params)?)?;
    let mut records = std::mem::take(&mut page.records);

    while let Some(next) = page.links.and_then(|l| l.next) {
        debug!("following {}", next.href);
        page = serde_json::from_value(api.get(&next.href, &[])?)?;
        records.append(&mut page.records);
    }

    trace!("{} records from {}: {:?}", records.len(), path, records);
    Ok(records)
}

/// Returns the number of records of a collection without transferring them.
pub fn count<A>(api: &A, path: &str) -> Result<u64>
where
    A: OntapApi + ?Sized,
{
    let page: Page<Value> =
        serde_json::from_value(api.get(path, &[("return_records", "false")])?)?;
    Ok(page.num_records.unwrap_or(page.records.len() as u64))
}

/// Fetches a single resource like `/api/cluster`.
pub fn record<T, A>(api: &A, path: &str, fields: &str) -> Result<T>
where
    T: DeserializeOwned + Debug,
    A: OntapApi + ?Sized,
{
    let mut query = Vec::new();
    if !fields.is_empty() {
        query.push(("fields", fields));
    }
    let res = serde_json::from_value(api.get(path, &query)?)?;
    trace!("{}: {:?}", path, res);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testutil::FakeApi;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_collection_follows_next_links() {
        let api = FakeApi::new()
            .with(
                "/api/storage/disks",
                json!({
                    "records": [{"name": "1.0.0"}, {"name": "1.0.1"}],
                    "num_records": 2,
                    "_links": {"next": {"href": "/api/storage/disks?start.name=1.0.2"}}
                }),
            )
            .with(
                "/api/storage/disks?start.name=1.0.2",
                json!({"records": [{"name": "1.0.2"}], "num_records": 1}),
            );

        let disks: Vec<Named> = collection(&api, "/api/storage/disks", "name", &[]).unwrap();
        let names: Vec<_> = disks.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["1.0.0", "1.0.1", "1.0.2"]);
    }

    #[test]
    fn test_count() {
        let api = FakeApi::new()
            .with("/api/storage/luns", json!({"num_records": 7}))
            .with("/api/storage/disks", json!({"records": [{}, {}]}));

        assert_eq!(count(&api, "/api/storage/luns").unwrap(), 7);
        assert_eq!(count(&api, "/api/storage/disks").unwrap(), 2);
    }

    #[test]
    fn test_api_error_is_passed_on() {
        let api = FakeApi::new().with_error("/api/cluster", 401, "not authorized");

        let err = record::<Named, _>(&api, "/api/cluster", "name").unwrap_err();
        assert_eq!(err.to_string(), "Error => not authorized");
    }

    #[test]
    fn test_unexpected_body() {
        let api = FakeApi::new().with("/api/cluster", json!({"records": "nope"}));
        let err = collection::<Named, _>(&api, "/api/cluster", "", &[]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_url() {
        let client = HttpClient::new(OntapConfig {
            host: "cluster1".to_owned(),
            port: 8443,
            user: "monitor".to_owned(),
            password: "secret".to_owned(),
            insecure: true,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();

        assert_eq!(
            client.url("/api/storage/volumes?start.uuid=1"),
            "https://cluster1:8443/api/storage/volumes?start.uuid=1"
        );
    }
}
