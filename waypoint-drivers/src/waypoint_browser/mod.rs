pub mod behavioral;
pub mod session;
pub mod stealth;

pub use behavioral::{BehavioralEngine, DelayProfile};
pub use session::{BrowserSession, SessionConfig, SessionState, StealthSession};
