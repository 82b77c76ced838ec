use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::cli::{ApiClient, OutputFormat};

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Register a new tenant and provision its database")]
    Register {
        #[arg(help = "Company code (becomes part of the tenant database name)")]
        company_code: String,

        #[arg(long, help = "Company display name")]
        name: String,

        #[arg(long, help = "Company contact email")]
        email: String,

        #[arg(long, help = "Administrator email")]
        admin_email: String,

        #[arg(long, help = "Administrator username")]
        admin_username: String,

        #[arg(long, help = "Administrator password")]
        admin_password: String,
    },

    #[command(about = "List registered tenants")]
    List,
}

pub async fn handle(
    cmd: TenantCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Register {
            company_code,
            name,
            email,
            admin_email,
            admin_username,
            admin_password,
        } => {
            let payload = json!({
                "companyCode": company_code,
                "companyName": name,
                "companyEmail": email,
                "adminEmail": admin_email,
                "adminUsername": admin_username,
                "adminPassword": admin_password,
            });

            let response = client
                .http
                .post(client.url("/tenants/register"))
                .json(&payload)
                .send()
                .await
                .context("server unreachable")?;

            if response.status().is_success() {
                match format {
                    OutputFormat::Json => {
                        println!("{}", json!({"created": company_code}))
                    }
                    OutputFormat::Text => println!("Tenant '{}' registered", company_code),
                }
                Ok(())
            } else {
                let status = response.status();
                let body = response.json::<serde_json::Value>().await.unwrap_or_default();
                bail!(
                    "registration failed ({}): {}",
                    status,
                    body["message"].as_str().unwrap_or("unknown error")
                );
            }
        }
        TenantCommands::List => {
            let response = client
                .http
                .get(client.url("/tenants"))
                .send()
                .await
                .context("server unreachable")?;

            if !response.status().is_success() {
                bail!("listing failed ({})", response.status());
            }
            let tenants = response.json::<serde_json::Value>().await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tenants)?),
                OutputFormat::Text => {
                    let rows = tenants.as_array().cloned().unwrap_or_default();
                    if rows.is_empty() {
                        println!("No tenants registered");
                        return Ok(());
                    }
                    println!("{:<20} {:<30} {:<14} {}", "CODE", "NAME", "STATUS", "CREATED");
                    for tenant in rows {
                        println!(
                            "{:<20} {:<30} {:<14} {}",
                            tenant["companyCode"].as_str().unwrap_or("?"),
                            tenant["companyName"].as_str().unwrap_or("?"),
                            tenant["status"].as_str().unwrap_or("?"),
                            tenant["createdAt"].as_str().unwrap_or("")
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
