use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::auth::password;
use crate::authz::PERMISSION_CATALOG;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "cqams")]
#[command(about = "CQAMS CLI - database migration and seed tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run pending database migrations")]
    Migrate,

    #[command(about = "Seed the permission catalog and system roles")]
    Seed {
        #[arg(long, help = "Bootstrap a super_admin account with this email")]
        admin_email: Option<String>,

        #[arg(long, help = "Password for the bootstrap account")]
        admin_password: Option<String>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Migrate => {
            DatabaseManager::migrate().await.context("migration failed")?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Seed {
            admin_email,
            admin_password,
        } => seed(admin_email, admin_password).await,
    }
}

/// System roles created at seed time. super_admin gets the full catalog;
/// hr_admin gets employee and onboarding management; employee gets nothing.
const SYSTEM_ROLES: &[(&str, &str)] = &[
    ("super_admin", "Full access to every module"),
    ("hr_admin", "Employee and onboarding management"),
    ("employee", "Self-service only"),
];

async fn seed(admin_email: Option<String>, admin_password: Option<String>) -> Result<()> {
    DatabaseManager::migrate().await.context("migration failed")?;
    let pool = DatabaseManager::pool().await?;

    // Permission catalog: immutable reference data, idempotent insert
    for (module, resource, action) in PERMISSION_CATALOG {
        sqlx::query(
            "INSERT INTO permissions (module, resource, action) VALUES ($1, $2, $3)
             ON CONFLICT (module, resource, action) DO NOTHING",
        )
        .bind(module)
        .bind(resource)
        .bind(action)
        .execute(&pool)
        .await?;
    }
    println!("Seeded {} permissions", PERMISSION_CATALOG.len());

    for (name, description) in SYSTEM_ROLES {
        sqlx::query(
            "INSERT INTO roles (name, description, is_system) VALUES ($1, $2, TRUE)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&pool)
        .await?;
    }

    // super_admin: everything
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT r.id, p.id FROM roles r, permissions p WHERE r.name = 'super_admin'
        ON CONFLICT DO NOTHING
        "#,
    )
    .execute(&pool)
    .await?;

    // hr_admin: employee CRUD plus onboarding, read-only on roles/permissions
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT r.id, p.id FROM roles r, permissions p
        WHERE r.name = 'hr_admin'
          AND (p.resource = 'employee'
               OR p.module = 'onboarding'
               OR (p.resource IN ('role', 'permission') AND p.action = 'read'))
        ON CONFLICT DO NOTHING
        "#,
    )
    .execute(&pool)
    .await?;
    println!("Seeded {} system roles", SYSTEM_ROLES.len());

    match (admin_email, admin_password) {
        (Some(email), Some(pw)) => {
            if pw.len() < 8 {
                bail!("admin password must be at least 8 characters");
            }
            let hash = password::hash_password(&pw)
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;

            let inserted = sqlx::query(
                r#"
                INSERT INTO users (email, password_hash, first_name, last_name, user_type, role_id)
                SELECT $1, $2, 'System', 'Administrator', 'admin', r.id
                FROM roles r WHERE r.name = 'super_admin'
                ON CONFLICT (email) DO NOTHING
                "#,
            )
            .bind(email.trim().to_lowercase())
            .bind(&hash)
            .execute(&pool)
            .await?;

            if inserted.rows_affected() == 1 {
                println!("Bootstrap admin created: {}", email);
            } else {
                println!("Bootstrap admin already exists: {}", email);
            }
        }
        (None, None) => {}
        _ => bail!("--admin-email and --admin-password must be given together"),
    }

    Ok(())
}
