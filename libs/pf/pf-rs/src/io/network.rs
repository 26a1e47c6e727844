use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::io::DriveStore;
use crate::model::core_config::Config;
use crate::model::errors::{PfErrKind, PfResult};
use crate::model::image::ImageObject;

/// Drive storage reached over http: tree blobs at `<base_url>/<file_path>`, images at their
/// thumbnail link.
#[derive(Debug, Clone)]
pub struct HttpStore {
    pub client: Client,
    pub base_url: String,
    pub retries: u64,
    pub thumbnail_width: u32,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, config: &Config) -> Self {
        Self {
            client: Client::default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries: config.fetch_retries,
            thumbnail_width: config.thumbnail_width,
        }
    }

    pub fn blob_url(&self, file_path: &str) -> String {
        format!("{}/{}", self.base_url, file_path.trim_start_matches('/'))
    }

    /// GET with a bounded, linearly backed off retry on send failures and server errors. Client
    /// errors are final.
    #[instrument(level = "debug", skip(self), err(Debug))]
    pub async fn get(&self, url: &str) -> PfResult<Vec<u8>> {
        let mut retries = 0;
        let start = Instant::now();
        let response = loop {
            let failure = match self.client.get(url).send().await {
                Ok(response) if response.status().is_server_error() => {
                    format!("server responded {}", response.status())
                }
                Ok(response) => {
                    if start.elapsed() > Duration::from_millis(1000) {
                        warn!("network request took {:?}", start.elapsed());
                    }
                    break response;
                }
                Err(e) => e.to_string(),
            };

            if retries < self.retries {
                warn!(
                    "network request failed; retrying after {}ms; error = {:?}",
                    retries * 100,
                    failure
                );
                sleep(Duration::from_millis(retries * 100)).await;
                retries += 1;
            } else {
                return Err(PfErrKind::FetchFailed(failure).into());
            }
        };

        match response.status() {
            StatusCode::OK => Ok(response.bytes().await?.to_vec()),
            status => Err(PfErrKind::FetchFailed(format!("{url} responded {status}")).into()),
        }
    }
}

impl DriveStore for HttpStore {
    fn fetch_blob<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        async move { self.get(&self.blob_url(file_path)).await }.boxed()
    }

    fn fetch_image<'a>(&'a self, image: &'a ImageObject) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        async move {
            let url = match &image.thumbnail_link {
                Some(link) => link.clone(),
                None => image.display_src(self.thumbnail_width),
            };
            self.get(&url).await
        }
        .boxed()
    }
}

#[test]
fn blob_urls_join_cleanly() {
    let store = HttpStore::new("https://storage.example/bucket/", &Config::ui_config("test"));
    assert_eq!(
        store.blob_url("/drive/p1/root.json.z"),
        "https://storage.example/bucket/drive/p1/root.json.z"
    );
    assert_eq!(store.blob_url("root.json.z"), "https://storage.example/bucket/root.json.z");
}
