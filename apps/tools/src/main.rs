use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailer::{MailSender, SmtpConfig, SmtpMailer};
use scroll_reveal::{ParallaxMarquee, RevealConfig, ScrollRevealController};
use serde_json::json;

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feeds scroll samples through the hero controller, one JSON line per frame.
    Trace {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "0,0.05,0.1,0.2,0.05")]
        samples: Vec<f64>,
        /// Frames spent on each sample before moving to the next.
        #[arg(long, default_value_t = 1)]
        frames_per_sample: u32,
        /// Skip spring smoothing and jump straight to each sample.
        #[arg(long)]
        instant: bool,
    },
    /// Runs the marquee at a constant scroll velocity and prints its offset.
    Marquee {
        #[arg(long, default_value_t = 15.0, allow_hyphen_values = true)]
        base_velocity: f64,
        #[arg(long, default_value_t = 60)]
        frames: u32,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        scroll_velocity: f64,
    },
    /// Opens a connection to the SMTP relay and reports whether it accepts mail.
    CheckSmtp {
        #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
        host: String,
        #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
        port: u16,
        #[arg(long, env = "SMTP_SECURE")]
        secure: bool,
        #[arg(long, env = "SMTP_USER", default_value = "")]
        user: String,
        #[arg(long, env = "SMTP_PASS", default_value = "", hide_env_values = true)]
        pass: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match cli.command {
        Command::Trace {
            samples,
            frames_per_sample,
            instant,
        } => {
            let mut controller = ScrollRevealController::new(RevealConfig::default())?;
            for (frame, raw) in samples
                .iter()
                .flat_map(|raw| std::iter::repeat(*raw).take(frames_per_sample.max(1) as usize))
                .enumerate()
            {
                let state = if instant {
                    controller.jump_to(raw)
                } else {
                    controller.on_progress_sample_after(raw, FRAME)
                };
                let line = json!({
                    "frame": frame,
                    "state": state,
                    "typed_text": controller.typed_text(),
                    "offsets": controller.visual_offsets(),
                });
                println!("{line}");
            }
        }
        Command::Marquee {
            base_velocity,
            frames,
            scroll_velocity,
        } => {
            let mut marquee = ParallaxMarquee::new(base_velocity);
            for frame in 0..frames {
                let offset = marquee.on_frame(FRAME, scroll_velocity);
                println!(
                    "{}",
                    json!({ "frame": frame, "offset_percent": offset, "direction": marquee.direction() })
                );
            }
        }
        Command::CheckSmtp {
            host,
            port,
            secure,
            user,
            pass,
        } => {
            let mailer = SmtpMailer::new(&SmtpConfig {
                host: host.clone(),
                port,
                secure,
                username: user,
                password: pass,
            })?;
            mailer
                .verify()
                .await
                .with_context(|| format!("smtp relay {host}:{port} is not ready"))?;
            println!("smtp relay {host}:{port} is ready to take messages");
        }
    }

    Ok(())
}
