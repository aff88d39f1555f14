use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use http::StatusCode;
use serde::Deserialize;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use reactor_http::server::Server;
use reactor_web::extract::{Form, Json};
use reactor_web::{handler_fn, Config, Router, StaticFiles, ViewEngine};

#[derive(Deserialize, Debug)]
struct Login {
    username: String,
    password: String,
}

fn main() -> ExitCode {
    let config = Config::parse();

    let level = config.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let view = match ViewEngine::load(&config.pages_dir) {
        Ok(view) => Arc::new(view),
        Err(e) => {
            error!(cause = %e, "failed to load views");
            return ExitCode::FAILURE;
        }
    };

    let home = Arc::clone(&view);
    let about = Arc::clone(&view);

    let router = Router::builder()
        .get("/", handler_fn(move |_req, _params, resp| {
            resp.set_html(home.render("<h1>reactor</h1>\n<p>an event-driven http/1.1 server</p>"));
        }))
        .get("/about", handler_fn(move |_req, _params, resp| {
            resp.set_html(about.render("<h1>about</h1>\n<p>one reactor thread, eight workers, one ring.</p>"));
        }))
        .post("/login", handler_fn(|req, _params, resp| match Form::<Login>::from_request(req) {
            Ok(Form(login)) if login.username.is_empty() || login.password.is_empty() => {
                resp.set_status(StatusCode::BAD_REQUEST);
            }
            Ok(Form(login)) => {
                info!(user = %login.username, "login attempt");
                resp.set_html(format!("<h1>welcome, {}</h1>", login.username));
            }
            Err(e) => resp.set_status(e.status()),
        }))
        .post("/echo", handler_fn(|req, _params, resp| match Json::<serde_json::Value>::from_request(req) {
            Ok(Json(value)) => {
                let body = serde_json::to_vec(&value).unwrap_or_default();
                resp.set_content(body, "application/json");
            }
            Err(e) => resp.set_status(e.status()),
        }))
        .get("/public/{*path}", StaticFiles::new(config.public_dir.clone()))
        .build(view);

    info!("load routes... OK");

    let server = match Server::bind(&config.server_config(), Arc::new(router)) {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %server.local_addr(), "server has been created");

    if let Err(e) = server.run() {
        error!(cause = %e, "server stopped");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
