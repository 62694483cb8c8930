// src/driver/webdriver.rs
//
// W3C WebDriver backend (chromedriver / geckodriver) via fantoccini.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};

use super::{DriverError, EXTRACT_SCRIPT, PageSurface, SCROLL_SCRIPT, SurfaceLauncher};
use crate::config::options::{BrowserKind, BrowserOptions};

pub struct WebDriverLauncher {
    opts: BrowserOptions,
}

impl WebDriverLauncher {
    pub fn new(opts: BrowserOptions) -> Self {
        Self { opts }
    }

    fn capabilities(&self, user_agent: &str) -> Map<String, Value> {
        let mut caps = Map::new();
        match self.opts.browser {
            BrowserKind::Chrome => {
                let mut args = vec![
                    s!("--no-sandbox"),
                    s!("--disable-setuid-sandbox"),
                    s!("--disable-dev-shm-usage"),
                    join!("--user-agent=", user_agent),
                ];
                if self.opts.headless {
                    args.push(s!("--headless=new"));
                }
                caps.insert(s!("browserName"), json!("chrome"));
                caps.insert(s!("goog:chromeOptions"), json!({ "args": args }));
            }
            BrowserKind::Firefox => {
                let args: Vec<&str> = if self.opts.headless { vec!["-headless"] } else { Vec::new() };
                caps.insert(s!("browserName"), json!("firefox"));
                caps.insert(
                    s!("moz:firefoxOptions"),
                    json!({
                        "args": args,
                        "prefs": { "general.useragent.override": user_agent },
                    }),
                );
            }
        }
        caps
    }
}

#[async_trait]
impl SurfaceLauncher for WebDriverLauncher {
    async fn open(&self, user_agent: &str) -> Result<Box<dyn PageSurface>, DriverError> {
        let client = ClientBuilder::rustls()
            .map_err(|e| DriverError::Launch(e.to_string()))?
            .capabilities(self.capabilities(user_agent))
            .connect(&self.opts.webdriver_url)
            .await
            .map_err(|e| DriverError::Launch(format!("{} ({e})", self.opts.webdriver_url)))?;
        logd!("Driver: Session opened at {}", self.opts.webdriver_url);
        Ok(Box::new(WebDriverSurface { client }))
    }
}

struct WebDriverSurface {
    client: Client,
}

#[async_trait]
impl PageSurface for WebDriverSurface {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(|e| DriverError::Navigate {
            url: s!(url),
            reason: e.to_string(),
        })
    }

    async fn extract(&mut self) -> Result<Vec<String>, DriverError> {
        let value = self
            .client
            .execute(EXTRACT_SCRIPT, Vec::new())
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| DriverError::Decode(e.to_string()))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        self.client
            .execute(SCROLL_SCRIPT, Vec::new())
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.client.clone().close().await.map_err(|e| DriverError::Close(e.to_string()))
    }
}
