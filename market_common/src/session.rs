//! Quote-vendor session trait and the scoped login guard.
//!
//! A session follows a strict lifecycle: `start`, one or more blocking
//! queries, `stop`. The vendor counts live sessions per account, so the
//! slot must be released on every exit path; `ScopedSession` ties `stop`
//! to `Drop` to make that automatic.
use crate::config::QuoteCredentials;
use crate::payload::QuotePayload;
use crate::result::Result;

/// Login options rendered into the vendor's option string.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Vendor account name.
    pub username: String,
    /// Vendor account password.
    pub password: String,
    /// Force a new session even if one is already active vendor-side.
    pub force_login: bool,
}

impl SessionOptions {
    /// Options for the given credentials.
    pub fn new(credentials: &QuoteCredentials, force_login: bool) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            force_login,
        }
    }

    /// Render the vendor login-option string.
    pub fn render(&self) -> String {
        format!(
            "UserName={},PassWord={},TestLatency=1,ForceLogin={}",
            self.username,
            self.password,
            if self.force_login { 1 } else { 0 }
        )
    }
}

/// Blocking session with the terminal-style quote vendor.
///
/// Implementations treat every call as one blocking request; timeout
/// behavior is the transport's concern, not the session's.
pub trait QuoteSession {
    /// Log in. A vendor rejection is `FetchError::Login`.
    fn start(&mut self, options: &SessionOptions) -> Result<()>;

    /// Cross-sectional snapshot query over a comma-joined code list.
    fn snapshot(&mut self, codes: &str, fields: &str, options: &str) -> Result<QuotePayload>;

    /// Daily-series query for one code over a date span.
    fn daily_series(
        &mut self,
        code: &str,
        field: &str,
        start: &str,
        end: &str,
        options: &str,
    ) -> Result<QuotePayload>;

    /// Log out. Must be safe to call when the session is already gone.
    fn stop(&mut self);
}

/// Session guard: logs in on construction, logs out on drop.
pub struct ScopedSession<S: QuoteSession> {
    inner: S,
}

impl<S: QuoteSession> ScopedSession<S> {
    /// Log in and wrap the session.
    pub fn login(mut session: S, options: &SessionOptions) -> Result<Self> {
        session.start(options)?;
        Ok(Self { inner: session })
    }
}

impl<S: QuoteSession> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl<S: QuoteSession> std::ops::Deref for ScopedSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S: QuoteSession> std::ops::DerefMut for ScopedSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeSession {
        accept_login: bool,
        stopped: Rc<Cell<u32>>,
    }

    impl QuoteSession for FakeSession {
        fn start(&mut self, _options: &SessionOptions) -> Result<()> {
            if self.accept_login {
                Ok(())
            } else {
                Err(FetchError::Login {
                    code: 10002,
                    msg: "bad password".to_string(),
                })
            }
        }

        fn snapshot(&mut self, _c: &str, _f: &str, _o: &str) -> Result<QuotePayload> {
            Ok(QuotePayload::default())
        }

        fn daily_series(
            &mut self,
            _c: &str,
            _f: &str,
            _s: &str,
            _e: &str,
            _o: &str,
        ) -> Result<QuotePayload> {
            Ok(QuotePayload::default())
        }

        fn stop(&mut self) {
            self.stopped.set(self.stopped.get() + 1);
        }
    }

    #[test]
    fn options_render_the_vendor_login_string() {
        let credentials = QuoteCredentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let options = SessionOptions::new(&credentials, true);
        assert_eq!(
            options.render(),
            "UserName=user,PassWord=pass,TestLatency=1,ForceLogin=1"
        );
        assert!(SessionOptions::new(&credentials, false)
            .render()
            .ends_with("ForceLogin=0"));
    }

    #[test]
    fn the_guard_stops_the_session_on_drop() {
        let stopped = Rc::new(Cell::new(0));
        let session = FakeSession {
            accept_login: true,
            stopped: Rc::clone(&stopped),
        };
        let credentials = QuoteCredentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        {
            let mut guard =
                ScopedSession::login(session, &SessionOptions::new(&credentials, false)).unwrap();
            let _ = guard.snapshot("C0.DCE", "CLOSE", "");
            assert_eq!(stopped.get(), 0);
        }
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn a_rejected_login_never_wraps_the_session() {
        let stopped = Rc::new(Cell::new(0));
        let session = FakeSession {
            accept_login: false,
            stopped: Rc::clone(&stopped),
        };
        let credentials = QuoteCredentials {
            username: "user".to_string(),
            password: "wrong".to_string(),
        };
        let err = ScopedSession::login(session, &SessionOptions::new(&credentials, false))
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 3);
    }
}
