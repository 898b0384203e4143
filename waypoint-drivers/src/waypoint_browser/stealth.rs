/// Fixed fingerprint presented for the lifetime of a session.
///
/// One consistent, common desktop identity draws less attention than a
/// rotating one; the values match a stock Windows Chrome install.
#[derive(Debug, Clone, Copy)]
pub struct SessionFingerprint {
    pub user_agent: &'static str,
    pub viewport: (u32, u32),
    pub locale: &'static str,
}

pub const FINGERPRINT: SessionFingerprint = SessionFingerprint {
    user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    viewport: (1920, 1080),
    locale: "en-US",
};

/// Chrome command-line arguments for a stealth session.
pub fn build_session_arguments(fingerprint: &SessionFingerprint, headless: bool) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        "--disable-plugins-discovery".to_string(),
        format!("--user-agent={}", fingerprint.user_agent),
        format!(
            "--window-size={},{}",
            fingerprint.viewport.0, fingerprint.viewport.1
        ),
        format!("--lang={}", fingerprint.locale),
    ];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// JavaScript evasions applied after navigation to reduce automation
/// signals.
pub fn webdriver_evasions() -> &'static str {
    r#"
        Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
        Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
        Object.defineProperty(navigator, 'languages', {
            get: () => ['en-US', 'en']
        });
        if (!window.chrome) window.chrome = { runtime: {} };
    "#
}
