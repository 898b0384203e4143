use crate::waypoint_browser::behavioral::{BehavioralEngine, DelayProfile};
use crate::waypoint_browser::stealth::{build_session_arguments, webdriver_evasions, FINGERPRINT};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use waypoint_common::WaypointConfig;
use webdriver::capabilities::Capabilities;

/// Upper bound on a navigation, including slow first paints.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(40);
/// How long to wait for an element to appear before giving up on a step.
const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(15);
/// Upper bound on the click itself once the target is visible.
const CLICK_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECT_ATTEMPTS: u32 = 20;
const CONNECT_BACKOFF: Duration = Duration::from_millis(250);

/// Lifecycle of a [`StealthSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Active,
    Closed,
}

/// Connection settings for one browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    /// Attach to an already-running WebDriver service instead of spawning
    /// chromedriver.
    pub webdriver_url: Option<String>,
    pub chromedriver_path: String,
    pub port: u16,
    pub delays: DelayProfile,
}

impl SessionConfig {
    pub fn from_config(cfg: &WaypointConfig) -> Self {
        Self {
            headless: cfg.browser.headless,
            webdriver_url: cfg.browser.webdriver_url.clone(),
            chromedriver_path: cfg.browser.chromedriver_path.clone(),
            port: cfg.browser.port,
            delays: DelayProfile::from(&cfg.delays),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&WaypointConfig::default())
    }
}

/// The five browser primitives the plan interpreter dispatches to.
///
/// Every action is a terminal outcome for its step: failures are logged
/// and reported through the return value, never raised past this boundary.
#[async_trait]
pub trait BrowserSession {
    async fn start(&mut self);
    async fn close(&mut self);
    async fn navigate(&mut self, url: &str) -> bool;
    async fn click_element(&mut self, selector: &str) -> bool;
    async fn fill_form(&mut self, selector: &str, text: &str) -> bool;
    async fn extract_data(
        &mut self,
        selector: &str,
        attribute: &str,
        limit: Option<usize>,
    ) -> Vec<String>;
    async fn scroll_page(&mut self, y_pixels: i64) -> bool;
}

/// One exclusively-owned browser: an optional chromedriver child plus a
/// WebDriver session, with humanized pacing on every primitive.
pub struct StealthSession {
    config: SessionConfig,
    behavioral: BehavioralEngine,
    state: SessionState,
    client: Option<Client>,
    driver: Option<Child>,
}

impl StealthSession {
    pub fn new(config: SessionConfig) -> Self {
        let behavioral = BehavioralEngine::new(config.delays.clone());
        Self {
            config,
            behavioral,
            state: SessionState::Unstarted,
            client: None,
            driver: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    async fn allocate(&mut self) -> Result<Client> {
        let endpoint = match &self.config.webdriver_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                self.driver = Some(self.spawn_chromedriver()?);
                format!("http://127.0.0.1:{}", self.config.port)
            }
        };

        let mut caps = Capabilities::new();
        // Eager strategy resolves goto() at DOMContentLoaded rather than
        // full load.
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": build_session_arguments(&FINGERPRINT, self.config.headless) }),
        );

        connect_with_retry(&endpoint, &caps).await
    }

    fn spawn_chromedriver(&self) -> Result<Child> {
        Command::new(&self.config.chromedriver_path)
            .arg(format!("--port={}", self.config.port))
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "failed to launch webdriver process '{}'",
                    self.config.chromedriver_path
                )
            })
    }

    /// Wait up to `limit` for a visible element matching `selector`.
    async fn await_visible(&self, selector: &str, limit: Duration) -> Option<Element> {
        let client = self.client.as_ref()?;
        let element = match client
            .wait()
            .at_most(limit)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(element) => element,
            Err(e) => {
                warn!(%selector, error = %e, "element did not appear in time");
                return None;
            }
        };
        match element.is_displayed().await {
            Ok(true) => Some(element),
            Ok(false) => {
                warn!(%selector, "element present but not visible");
                None
            }
            Err(e) => {
                warn!(%selector, error = %e, "visibility check failed");
                None
            }
        }
    }
}

async fn connect_with_retry(endpoint: &str, caps: &Capabilities) -> Result<Client> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(endpoint)
            .await
        {
            Ok(client) => return Ok(client),
            Err(e) if attempt >= CONNECT_ATTEMPTS => {
                return Err(anyhow::Error::from(e)
                    .context(format!("could not reach webdriver at {endpoint}")));
            }
            Err(e) => {
                debug!(%endpoint, attempt, error = %e, "webdriver not ready yet");
                sleep(CONNECT_BACKOFF).await;
            }
        }
    }
}

#[async_trait]
impl BrowserSession for StealthSession {
    /// Allocate the driver process and WebDriver session.
    ///
    /// A session that cannot be allocated cannot make progress, so failure
    /// here tears the process down after releasing whatever was acquired.
    async fn start(&mut self) {
        if self.state == SessionState::Active {
            return;
        }
        info!("starting stealth browser session");
        match self.allocate().await {
            Ok(client) => {
                self.client = Some(client);
                self.state = SessionState::Active;
                info!(
                    headless = self.config.headless,
                    viewport = ?FINGERPRINT.viewport,
                    "browser session ready"
                );
            }
            Err(e) => {
                error!(error = %e, "could not allocate a browser session");
                self.close().await;
                std::process::exit(1);
            }
        }
    }

    /// Release the WebDriver session, then the driver process. Each release
    /// is guarded on its own so a missing piece never blocks the rest; safe
    /// to call from any state, any number of times.
    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!(error = %e, "webdriver session did not close cleanly");
            }
        }
        if let Some(mut driver) = self.driver.take() {
            match driver.start_kill() {
                Ok(()) => {
                    let _ = driver.wait().await;
                }
                Err(e) => warn!(error = %e, "webdriver process did not stop cleanly"),
            }
        }
        self.state = SessionState::Closed;
        debug!("browser session closed");
    }

    async fn navigate(&mut self, url: &str) -> bool {
        let Some(client) = self.client.as_ref() else {
            warn!(%url, "navigate requested without an active session");
            return false;
        };
        info!(%url, "navigating");
        self.behavioral.pause_thinking().await;
        match timeout(NAVIGATION_TIMEOUT, client.goto(url)).await {
            Ok(Ok(())) => {
                if let Err(e) = client.execute(webdriver_evasions(), vec![]).await {
                    debug!(error = %e, "evasion script was rejected by the page");
                }
                true
            }
            Ok(Err(e)) => {
                warn!(%url, error = %e, "navigation failed");
                false
            }
            Err(_) => {
                warn!(%url, timeout = ?NAVIGATION_TIMEOUT, "navigation timed out");
                false
            }
        }
    }

    async fn click_element(&mut self, selector: &str) -> bool {
        if self.client.is_none() {
            warn!(%selector, "click requested without an active session");
            return false;
        }
        info!(%selector, "clicking element");
        let Some(element) = self.await_visible(selector, VISIBILITY_TIMEOUT).await else {
            return false;
        };
        match timeout(CLICK_TIMEOUT, element.click()).await {
            Ok(Ok(_)) => {
                self.behavioral.pause_settle().await;
                true
            }
            Ok(Err(e)) => {
                warn!(%selector, error = %e, "click failed");
                false
            }
            Err(_) => {
                warn!(%selector, "click timed out");
                false
            }
        }
    }

    async fn fill_form(&mut self, selector: &str, text: &str) -> bool {
        if self.client.is_none() {
            warn!(%selector, "fill requested without an active session");
            return false;
        }
        info!(%selector, chars = text.chars().count(), "filling field");
        let Some(element) = self.await_visible(selector, VISIBILITY_TIMEOUT).await else {
            return false;
        };
        match self.behavioral.type_text_human_like(&element, text).await {
            Ok(()) => {
                self.behavioral.pause_settle().await;
                true
            }
            Err(e) => {
                warn!(%selector, error = %e, "typing failed");
                false
            }
        }
    }

    async fn extract_data(
        &mut self,
        selector: &str,
        attribute: &str,
        limit: Option<usize>,
    ) -> Vec<String> {
        let Some(client) = self.client.as_ref() else {
            warn!(%selector, "extract requested without an active session");
            return Vec::new();
        };
        info!(%selector, %attribute, "extracting data");

        // At least one match must be attached before collection starts.
        if client
            .wait()
            .at_most(VISIBILITY_TIMEOUT)
            .for_element(Locator::Css(selector))
            .await
            .is_err()
        {
            warn!(%selector, "no elements matched within the timeout");
            return Vec::new();
        }

        let elements = match client.find_all(Locator::Css(selector)).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!(%selector, error = %e, "element lookup failed");
                return Vec::new();
            }
        };

        let mut results = Vec::new();
        for element in elements {
            if limit.is_some_and(|cap| results.len() >= cap) {
                break;
            }
            let content = if attribute == "text" {
                element.text().await.ok().map(|t| t.trim().to_string())
            } else {
                element.attr(attribute).await.ok().flatten()
            };
            match content {
                Some(value) if !value.is_empty() => results.push(value),
                _ => {}
            }
        }
        info!(%selector, items = results.len(), "extraction complete");
        results
    }

    async fn scroll_page(&mut self, y_pixels: i64) -> bool {
        if self.state != SessionState::Active {
            warn!("scroll requested without an active session");
            return false;
        }
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        debug!(y_pixels, "scrolling page");
        match client
            .execute("window.scrollBy(0, arguments[0]);", vec![json!(y_pixels)])
            .await
        {
            Ok(_) => {
                self.behavioral.pause_scroll().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "scroll failed");
                false
            }
        }
    }
}
