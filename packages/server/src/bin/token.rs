//! Issue a bearer token for a user.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-token -- --user-id <uuid> --token-secret change-me
//! ```

use chrono::{Duration, Utc};
use clap::Parser;
use tsudoi_server::{
    domain::{Role, UserId},
    infrastructure::identity::{TokenClaims, issue_token},
};

#[derive(Parser, Debug)]
#[command(name = "tsudoi-token")]
#[command(about = "Issue an HS256 bearer token for a Tsudoi user", long_about = None)]
struct Args {
    /// User id (UUID) the token is issued for
    #[arg(long)]
    user_id: UserId,

    /// Role claimed by the token (app_user or admin_user)
    #[arg(long, default_value = "app_user")]
    role: Role,

    /// Token lifetime in seconds
    #[arg(long, default_value = "86400")]
    ttl_secs: i64,

    /// Secret shared with the server
    #[arg(long, env = "TSUDOI_TOKEN_SECRET", hide_env_values = true)]
    token_secret: String,
}

fn main() {
    let args = Args::parse();

    let claims = TokenClaims {
        sub: args.user_id.as_uuid(),
        role: args.role,
        exp: (Utc::now() + Duration::seconds(args.ttl_secs)).timestamp(),
    };
    match issue_token(&claims, args.token_secret.as_bytes()) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("Failed to issue token: {e}");
            std::process::exit(1);
        }
    }
}
