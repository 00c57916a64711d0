//! Evasion scripts applied after each navigation.
//!
//! These only mask the most common automation markers. They do not defeat
//! fingerprinting services.

pub const STEALTH_SCRIPTS: &[&str] = &[
    // Remove webdriver property
    r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    "#,
    // Brazilian Portuguese locale, matching the portal's audience
    r#"
    Object.defineProperty(navigator, 'languages', {
        get: () => ['pt-BR', 'pt', 'en-US', 'en'],
        configurable: true
    });
    "#,
    // Minimal chrome object present in real Chrome
    r#"
    if (!window.chrome) {
        window.chrome = { runtime: {} };
    }
    "#,
];
