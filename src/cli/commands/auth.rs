use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::cli::{ApiClient, OutputFormat};
use crate::middleware::COMPANY_CODE_HEADER;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in to a tenant and print the bearer token")]
    Login {
        #[arg(help = "Company code of the tenant")]
        company_code: String,

        #[arg(help = "Username")]
        username: String,

        #[arg(long, help = "Password")]
        password: String,
    },
}

pub async fn handle(
    cmd: AuthCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login {
            company_code,
            username,
            password,
        } => {
            let payload = json!({
                "companyCode": company_code,
                "username": username,
                "password": password,
            });

            let response = client
                .http
                .post(client.url("/auth/login"))
                .header(COMPANY_CODE_HEADER, company_code.as_str())
                .json(&payload)
                .send()
                .await
                .context("server unreachable")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.json::<serde_json::Value>().await.unwrap_or_default();
                bail!(
                    "login failed ({}): {}",
                    status,
                    body["message"].as_str().unwrap_or("unknown error")
                );
            }

            let body = response.json::<serde_json::Value>().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    println!(
                        "Logged in as {} ({} @ {})",
                        body["username"].as_str().unwrap_or("?"),
                        body["role"].as_str().unwrap_or("?"),
                        body["companyCode"].as_str().unwrap_or("?")
                    );
                    println!("{}", body["token"].as_str().unwrap_or(""));
                }
            }
            Ok(())
        }
    }
}
