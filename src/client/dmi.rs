//! The DMI metObs client: station listing and observation retrieval.

use crate::client::error::ClientError;
use crate::client::query::ObservationQuery;
use crate::types::observation::{observations_to_frame, Observation};
use crate::types::station::{stations_to_frame, Station};
use crate::utils::default_key_path;
use bon::bon;
use log::{info, warn};
use polars::prelude::DataFrame;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Base URL of the DMI meteorological observation API (v1).
pub const DEFAULT_BASE_URL: &str = "https://dmigw.govcloud.dk/metObs/v1";

/// Row cap for the station listing.
pub const STATION_LIMIT: u64 = 10_000;

/// Client for the DMI meteorological observation API.
///
/// Every operation issues exactly one GET request and returns the response as a
/// Polars `DataFrame`. Nothing is cached and failed requests are not retried.
///
/// # Examples
///
/// ```no_run
/// # use metobs::{DmiClient, ClientError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), ClientError> {
/// let client = DmiClient::from_key_file("dmi-api-key.txt").await?;
///
/// let temperatures = client
///     .get_observations()
///     .start_date("20210101")
///     .end_date("20210201")
///     .station_id("06180")
///     .field("temp_dry")
///     .call()
///     .await?;
/// println!("{}", temperatures.head(Some(5)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DmiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for DmiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[bon]
impl DmiClient {
    /// Creates a client from an API key.
    ///
    /// * `.api_key(String)`: **Required.**
    /// * `.base_url(String)`: Optional. Defaults to [`DEFAULT_BASE_URL`]. A trailing `/` is ignored.
    /// * `.http_client(reqwest::Client)`: Optional. Reuse an existing connection pool.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into)] base_url: Option<String>,
        http_client: Option<Client>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client.unwrap_or_default(),
        }
    }

    /// Reads the API key from `path` and creates a client for the public endpoint.
    ///
    /// The file must contain the key as its only content; surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::KeyRead`] if the file cannot be read and
    /// [`ClientError::EmptyKey`] if it holds no key.
    pub async fn from_key_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let key = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::KeyRead(path.to_path_buf(), e))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ClientError::EmptyKey(path.to_path_buf()));
        }
        Ok(Self::builder().api_key(key).build())
    }

    /// Like [`DmiClient::from_key_file`], reading the key from the default location
    /// (`<config dir>/metobs/api-key`, e.g. `~/.config/metobs/api-key` on Linux).
    pub async fn from_default_key_file() -> Result<Self, ClientError> {
        let path = default_key_path()?;
        Self::from_key_file(path).await
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches all stations with their flattened coordinates.
    ///
    /// Returns a `DataFrame` with columns `stationId`, `country`, `name`, `type`,
    /// `lat`, `lon` and one row per station id.
    ///
    /// # Errors
    ///
    /// [`ClientError::Request`] on transport failure, [`ClientError::Response`] on a
    /// status other than 200, [`ClientError::Decode`] if the body is not a station list.
    pub async fn list_stations(&self) -> Result<DataFrame, ClientError> {
        let url = format!("{}/station", self.base_url);
        let params = [
            ("limit", STATION_LIMIT.to_string()),
            ("api-key", self.api_key.clone()),
        ];
        let stations: Vec<Station> = self.get_json(&url, &params).await?;
        info!("Received {} station records", stations.len());
        Ok(stations_to_frame(stations)?)
    }

    /// Fetches observations for a date range, optionally narrowed to one station
    /// and one field.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.start_date(&str)`: **Required.** 8-digit `YYYYMMDD` date, inclusive lower bound (midnight UTC).
    /// * `.end_date(&str)`: **Required.** 8-digit `YYYYMMDD` date, upper bound (midnight UTC).
    /// * `.station_id(&str)`: Optional. A DMI station id such as `"06188"`.
    /// * `.field(&str)`: Optional. One of the [`crate::Parameter`] identifiers, e.g. `"temp_dry"`.
    /// * `.limit(u64)`: Optional. Maximum number of rows. Defaults to 100000.
    ///
    /// # Returns
    ///
    /// A `DataFrame` with `parameterId`, `stationId`, `value` and a `time` column
    /// derived from the microsecond `timeObserved` field, in the order returned.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidDate`] or [`ClientError::UnknownField`] before any
    /// request is made; otherwise as for [`DmiClient::list_stations`].
    #[builder]
    pub async fn get_observations(
        &self,
        start_date: &str,
        end_date: &str,
        station_id: Option<&str>,
        field: Option<&str>,
        limit: Option<u64>,
    ) -> Result<DataFrame, ClientError> {
        let query = ObservationQuery::new(start_date, end_date, station_id, field, limit)?;
        let url = format!("{}/observation", self.base_url);
        info!(
            "Requesting observations {}..{} (station: {:?}, parameter: {:?}, limit: {})",
            start_date, end_date, query.station_id, query.parameter, query.limit
        );
        let observations: Vec<Observation> =
            self.get_json(&url, &query.to_params(&self.api_key)).await?;
        info!("Received {} observations", observations.len());
        Ok(observations_to_frame(observations)?)
    }

    /// Issues one GET and decodes a JSON body. `url` is used in errors and logs and
    /// never contains the query string, so the API key stays out of both.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.to_string(),
                source: e.without_url(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("HTTP error for {}: {}", url, status);
            return Err(ClientError::Response {
                url: url.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(|e| ClientError::Decode {
            url: url.to_string(),
            source: e.without_url(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one HTTP response on a local port and hands back the raw
    /// request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{}/metObs/v1/", addr), handle)
    }

    fn test_client(base_url: String) -> DmiClient {
        DmiClient::builder()
            .api_key("test-key")
            .base_url(base_url)
            .build()
    }

    const STATIONS: &str = r#"[
        {"stationId": "06180", "country": "DNK", "name": "Københavns Lufthavn", "type": "Synop",
         "location": {"latitude": 55.6145, "longitude": 12.6459}},
        {"stationId": "06180", "country": "DNK", "name": "Københavns Lufthavn", "type": "Pluvio",
         "location": {"latitude": 55.6145, "longitude": 12.6459}},
        {"stationId": "06188", "country": "DNK", "name": "Sjælsmark", "type": "Synop",
         "location": {"latitude": 55.8764, "longitude": 12.4121}}
    ]"#;

    const OBSERVATIONS: &str = r#"[
        {"_id": "x2", "parameterId": "temp_dry", "stationId": "06188",
         "timeCreated": 1609466460000000, "timeObserved": 1609466400000000, "value": 1.2},
        {"_id": "x1", "parameterId": "temp_dry", "stationId": "06188",
         "timeCreated": 1609462860000000, "timeObserved": 1609462800000000, "value": 0.8}
    ]"#;

    #[test]
    fn test_builder_defaults() {
        let client = DmiClient::builder().api_key("k").build();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(!format!("{:?}", client).contains("\"k\""));
    }

    #[tokio::test]
    async fn test_list_stations() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once("200 OK", STATIONS).await;
        let df = test_client(base_url).list_stations().await?;
        let request = server.await?;

        assert!(request.starts_with("GET /metObs/v1/station?"), "{}", request);
        assert!(request.contains("limit=10000"));
        assert!(request.contains("api-key=test-key"));

        assert_eq!(df.height(), 2);
        let lon = df.column("lon")?.f64()?.get(1);
        assert_eq!(lon, Some(12.4121));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_observations() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once("200 OK", OBSERVATIONS).await;
        let df = test_client(base_url)
            .get_observations()
            .start_date("20210101")
            .end_date("20210102")
            .station_id("06188")
            .field("temp_dry")
            .call()
            .await?;
        let request = server.await?;

        let request_line = request.lines().next().unwrap_or_default();
        assert!(request_line.starts_with("GET /metObs/v1/observation?"));
        for expected in [
            "api-key=test-key",
            "from=1609459200000000",
            "to=1609545600000000",
            "limit=100000",
            "parameterId=temp_dry",
            "stationId=06188",
        ] {
            assert!(request_line.contains(expected), "missing {} in {}", expected, request_line);
        }

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("time")?.dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        let values: Vec<Option<f64>> = df.column("value")?.f64()?.into_iter().collect();
        assert_eq!(values, [Some(1.2), Some(0.8)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_200_is_response_error() {
        let (base_url, server) = serve_once("403 Forbidden", r#"{"message":"bad key"}"#).await;
        let err = test_client(base_url).list_stations().await.unwrap_err();
        server.await.unwrap();
        match err {
            ClientError::Response { status, url } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(!url.contains("test-key"));
            }
            other => panic!("expected Response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let (base_url, server) = serve_once("200 OK", r#"{"not": "a list"}"#).await;
        let err = test_client(base_url).list_stations().await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        // Bind and drop a listener so the port is known to be closed.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let err = test_client(format!("http://{}", addr))
            .list_stations()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Request { .. }));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_validation_happens_before_request() {
        // Nothing listens here; a validation error must come back before any connect attempt.
        let client = test_client("http://127.0.0.1:9".to_string());
        let err = client
            .get_observations()
            .start_date("2021-01-01")
            .end_date("20210102")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidDate(_)));

        let err = client
            .get_observations()
            .start_date("20210101")
            .end_date("20210102")
            .field("made_up_field")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownField(_)));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_from_key_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "  abc-123  ")?;
        let client = DmiClient::from_key_file(file.path()).await?;
        assert_eq!(client.api_key, "abc-123");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_key_file_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let file = tempfile::NamedTempFile::new()?;
        let err = DmiClient::from_key_file(file.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyKey(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_file_rejected() {
        let err = DmiClient::from_key_file("/definitely/not/here/api-key")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::KeyRead(..)));
    }
}
