mod cookie;

pub use cookie::{safe_get_cookie, session_cookie, SESSION_COOKIE_NAME};
