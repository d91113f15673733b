pub mod auth;
pub mod notify;
pub mod password;
pub mod reset_token;
pub mod secret;
pub mod session;

pub use auth::AuthService;
pub use notify::{NotificationChannel, NotificationDispatcher, NotificationMessage};
pub use password::PasswordService;
pub use reset_token::ResetTokenStore;
pub use secret::SecretCodec;
pub use session::SessionIssuer;
