mod config;
mod error;
mod negotiate;
mod normalize;
mod out;
mod pipeline;
mod scripts;

use anyhow::Context;
use axum::{extract::Extension, routing::get, Router};
use clap::{Parser, Subcommand};
use config::Config;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Parser, Debug)]
#[command(
    name = "plainscripts",
    version,
    about = "Serve shell scripts with box-drawing characters flattened to ASCII"
)]
struct Cli {
    /// Directory holding the scripts
    #[arg(long, env = "SCRIPTS_DIR", default_value = "scripts", global = true)]
    scripts_dir: PathBuf,

    /// Directory with the landing page and other static assets
    #[arg(long, env = "PUBLIC_DIR", default_value = "public", global = true)]
    public_dir: PathBuf,

    /// Address to bind to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0", global = true)]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = config::DEFAULT_PORT, global = true)]
    port: u16,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Write normalized scripts and the landing page to a static output directory
    Build {
        /// Output directory
        #[arg(long = "out", env = "DIST_DIR", default_value = "dist")]
        out_dir: PathBuf,
    },
    /// Normalize `.sh` files into a separate directory
    Normalize {
        /// Output directory
        #[arg(long = "out", default_value = "scripts-normalized")]
        out_dir: PathBuf,
    },
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::new(&cli.scripts_dir, &cli.public_dir);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, SocketAddr::new(cli.bind, cli.port)).await,
        Command::Build { out_dir } => {
            out::info("build", &format!("Scripts: {}", config.scripts_dir.display()));
            pipeline::build(&config, &config::resolve(&out_dir)).await?;
            Ok(())
        }
        Command::Normalize { out_dir } => {
            pipeline::normalize_only(&config.scripts_dir, &config::resolve(&out_dir)).await?;
            Ok(())
        }
    }
}

async fn serve(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    if !config.scripts_dir.is_dir() {
        out::warning(
            "main",
            &format!("Scripts directory {} does not exist", config.scripts_dir.display()),
        );
    }

    let app = app(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    out::info("main", &format!("Server running on port {}", addr.port()));
    out::info(
        "main",
        &format!("Access your scripts at: http://localhost:{}/[script-name]", addr.port()),
    );
    out::info(
        "main",
        &format!("View script content: http://localhost:{}/raw/[script-name]", addr.port()),
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Public assets win; anything they do not cover falls through to the script routes.
pub fn app(config: Config) -> Router {
    let public = ServeDir::new(&config.public_dir);
    let app_state = Arc::new(AppState { config });

    let scripts = Router::new()
        .route("/", get(scripts::index_handler))
        .route("/raw/:name", get(scripts::raw_handler))
        .route("/:name", get(scripts::direct_handler))
        .fallback(scripts::not_found_handler)
        .layer(Extension(app_state));

    Router::new().fallback_service(public.fallback(scripts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::fs;
    use tower::ServiceExt;

    const LANDING: &str = "<html><body>curl -fsSL host/setup.sh | sh</body></html>";

    struct Site {
        root: tempfile::TempDir,
        app: Router,
    }

    fn site() -> Site {
        let root = tempfile::tempdir().unwrap();
        let scripts = root.path().join("scripts");
        let public = root.path().join("public");
        fs::create_dir_all(&scripts).unwrap();
        fs::create_dir_all(&public).unwrap();

        fs::write(scripts.join("setup.sh"), "echo \"├── done → ok…\"\n").unwrap();
        fs::write(scripts.join("notes.txt"), "• plain notes\n").unwrap();
        fs::write(scripts.join("data.json"), "{\"tree\": \"└─\"}").unwrap();
        fs::write(public.join("index.html"), LANDING).unwrap();
        fs::write(public.join("style.css"), "body { margin: 0 }").unwrap();

        let app = app(Config::new(&scripts, &public));
        Site { root, app }
    }

    async fn send(app: &Router, uri: &str, user_agent: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(agent) = user_agent {
            request = request.header(header::USER_AGENT, agent);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn curl_gets_normalized_attachment() {
        let site = site();
        let response = send(&site.app, "/setup.sh", Some("curl/8.0.1")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"setup.sh\""
        );
        assert_eq!(body_text(response).await, "echo \"+-- done -> ok...\"\n");
    }

    #[tokio::test]
    async fn browser_gets_inline() {
        let site = site();
        let response = send(&site.app, "/notes.txt", Some("Mozilla/5.0 (Macintosh)")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"notes.txt\""
        );
        assert_eq!(body_text(response).await, "* plain notes\n");
    }

    #[tokio::test]
    async fn raw_route_is_inline_for_curl() {
        let site = site();
        let response = send(&site.app, "/raw/setup.sh", Some("curl/8.0.1")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"setup.sh\""
        );
        assert_eq!(body_text(response).await, "echo \"+-- done -> ok...\"\n");
    }

    #[tokio::test]
    async fn binary_files_are_served_as_is() {
        let site = site();
        for uri in ["/data.json", "/raw/data.json"] {
            let response = send(&site.app, uri, Some("curl/8.0.1")).await;

            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
            assert_eq!(body_text(response).await, "{\"tree\": \"└─\"}");
        }
    }

    #[tokio::test]
    async fn missing_script_is_404() {
        let site = site();
        for uri in ["/nope.sh", "/raw/nope.sh", "/nope.png"] {
            let response = send(&site.app, uri, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(body_text(response).await, "File not found");
        }
    }

    #[tokio::test]
    async fn root_and_index_serve_landing_page() {
        let site = site();
        for uri in ["/", "/index.html"] {
            let response = send(&site.app, uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, LANDING);
        }
    }

    #[tokio::test]
    async fn public_assets_are_served() {
        let site = site();
        let response = send(&site.app, "/style.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn index_html_falls_back_to_landing_page_without_public_copy() {
        // Bypass ServeDir so only the script handler can answer
        let site = site();
        let public = site.root.path().join("public");
        let scripts = site.root.path().join("scripts");
        let state = Arc::new(AppState { config: Config::new(&scripts, &public) });
        let app = Router::new()
            .route("/:name", get(scripts::direct_handler))
            .layer(Extension(state));

        let response = send(&app, "/index.html", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, LANDING);
    }

    #[tokio::test]
    async fn missing_landing_page_is_404() {
        let site = site();
        fs::remove_file(site.root.path().join("public").join("index.html")).unwrap();

        let response = send(&site.app, "/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "File not found");
    }

    #[tokio::test]
    async fn unreadable_script_is_500() {
        let site = site();
        fs::write(site.root.path().join("scripts").join("bad.sh"), [0xff, 0xfe]).unwrap();

        let response = send(&site.app, "/bad.sh", Some("curl/8.0.1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error reading script file");
    }

    #[tokio::test]
    async fn directory_in_scripts_is_500() {
        let site = site();
        let scripts = site.root.path().join("scripts");
        fs::create_dir(scripts.join("nested")).unwrap();
        fs::create_dir(scripts.join("tools.sh")).unwrap();

        for uri in ["/nested", "/raw/nested", "/tools.sh", "/raw/tools.sh"] {
            let response = send(&site.app, uri, Some("curl/8.0.1")).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
            assert_eq!(body_text(response).await, "Error reading script file");
        }
    }
}
