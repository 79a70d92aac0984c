mod config;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use config::{BotConfig, StreamStatus};
use warden_core::{Data, Error};
use warden_database::{Database, MIGRATOR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        if *metadata.level() > tracing::Level::INFO {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    info!(
        database_url = %config.database_url,
        max_connections = config.database_max_connections,
        "SQLite ledger opened."
    );

    if config.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let guild_id = serenity::GuildId::new(config.guild_id);
    let stream_status = config.stream_status.clone();
    let framework_db = db.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: warden_commands::commands(),
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(warden_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let db = framework_db.clone();
            let stream_status = stream_status.clone();
            Box::pin(async move {
                info!(user = %ready.user.name, "Warden is online.");

                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;

                if let Some(status) = stream_status {
                    apply_stream_status(ctx, &status);
                }

                Ok(Data { db })
            })
        })
        .build();

    info!("Warden is connecting...");

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(?err, "failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown requested; disconnecting shards.");
        shard_manager.shutdown_all().await;
    });

    let run = client.start().await;
    db.close().await;
    info!("Ledger closed.");

    run?;
    Ok(())
}

fn apply_stream_status(ctx: &serenity::Context, status: &StreamStatus) {
    match serenity::ActivityData::streaming(status.name.as_str(), status.url.as_str()) {
        Ok(activity) => {
            ctx.set_activity(Some(activity));
            info!(name = %status.name, "Streaming presence set.");
        }
        Err(err) => {
            warn!(?err, url = %status.url, "STATUS_STREAM_URL is not a valid URL; presence left unset.");
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("Command Error")
                .description("Something went wrong while running this command.")
                .color(warden_utils::embed::DEFAULT_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = warden_commands::command_usage(&ctx.command().qualified_name)
                .map(str::to_owned)
                .unwrap_or_else(|| {
                    format!(
                        "{}{}",
                        warden_utils::COMMAND_PREFIX,
                        ctx.command().qualified_name
                    )
                });
            let description = match input {
                Some(input) => format!("Invalid argument: `{}`\nUsage: `{}`", input, usage),
                None => format!("Missing required argument.\nUsage: `{}`", usage),
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}
