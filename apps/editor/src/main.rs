use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use editor::client::CvServiceClient;
use editor::config::Config;

/// Command-line smoke tool over the Remote CV Service. The editing core
/// itself is the library; this binary covers the document lifecycle that
/// happens outside an open editor session.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = CvServiceClient::new(&config.api_base_url, &config.session_token);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["list"] => {
            for cv in client.list().await? {
                println!("{}  {}  (updated {})", cv.cv_id, cv.title, cv.updated_at);
            }
        }
        ["show", cv_id] => {
            let cv = client.fetch(cv_id).await?;
            println!("{}", serde_json::to_string_pretty(&cv)?);
        }
        ["create", title] => {
            let cv = client.create(title).await?;
            info!("Created CV {}", cv.cv_id);
            println!("{}", cv.cv_id);
        }
        ["delete", cv_id] => {
            client.delete(cv_id).await?;
            info!("Deleted CV {cv_id}");
        }
        ["pdf", cv_id, out] => {
            let pdf = client.export_pdf(cv_id).await?;
            std::fs::write(out, &pdf)?;
            info!("Wrote {} bytes to {out}", pdf.len());
        }
        ["share", cv_id] => {
            let link = client.create_share_link(cv_id).await?;
            match link.share_token {
                Some(token) => println!("{token}"),
                None => bail!("No share token returned"),
            }
        }
        ["unshare", cv_id] => {
            client.revoke_share_link(cv_id).await?;
            info!("Share link revoked for CV {cv_id}");
        }
        _ => bail!(
            "usage: editor <list | show <id> | create <title> | delete <id> | \
             pdf <id> <out.pdf> | share <id> | unshare <id>>"
        ),
    }

    Ok(())
}
