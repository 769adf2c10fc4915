mod facade;
mod import;
mod ipc;
mod model;
mod store;

use std::io::{self, BufRead, Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::model::InsertUser;

fn seed_admin_from_env() -> InsertUser {
    let username = std::env::var("CLUBD_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("CLUBD_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    InsertUser {
        display_name: username.clone(),
        username,
        password,
        is_admin: true,
    }
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only protocol lines.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut state = ipc::AppState::new(seed_admin_from_env());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply with the request id if the line never parsed.
                writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                )?;
                stdout.flush()?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        )?;
        stdout.flush()?;
    }

    Ok(())
}
