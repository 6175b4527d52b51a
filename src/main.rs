use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use yca::analysis::OpenAiClient;
use yca::api::{self, AnalyzeOptions, AnalyzeResponse, Analyzer};
use yca::config::{self, YcaConfig, OPENAI_KEY_ENV, YOUTUBE_KEY_ENV};
use yca::output::{print_json, table};
use yca::youtube::{collect_comments, collect_with_replies, fetch_video_info, VideoId, YouTubeClient};

#[derive(Parser)]
#[command(name = "yca", version, about = "YouTube Comment Analyzer: turn viewer comments into audience insights and video ideas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to config file (default: ~/.yca/config.toml)
    #[arg(long, global = true, env = "YCA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a video's comments and generate video ideas
    Analyze {
        /// YouTube video URL (watch?v=, youtu.be/, /embed/)
        url: String,

        /// Maximum comments to collect (default: 500 or [analysis].max_comments)
        #[arg(long)]
        max_comments: Option<usize>,

        /// Include inline replies; they count toward --max-comments
        #[arg(long)]
        with_replies: bool,

        /// YouTube Data API key (overrides YOUTUBE_API_KEY and config)
        #[arg(long)]
        youtube_key: Option<String>,

        /// OpenAI API key (overrides OPENAI_API_KEY and config)
        #[arg(long)]
        openai_key: Option<String>,
    },

    /// Collect comments without analyzing them
    Comments {
        /// YouTube video URL
        url: String,

        /// Maximum comments to collect
        #[arg(long)]
        max_comments: Option<usize>,

        /// Include inline replies
        #[arg(long)]
        with_replies: bool,

        /// YouTube Data API key
        #[arg(long)]
        youtube_key: Option<String>,
    },

    /// Print the video ID embedded in a URL
    VideoId {
        /// YouTube video URL
        url: String,
    },

    /// Answer an analyze request body read from stdin with {status, body}
    Request {
        /// YouTube Data API key
        #[arg(long)]
        youtube_key: Option<String>,

        /// OpenAI API key
        #[arg(long)]
        openai_key: Option<String>,
    },

    /// Show which upstream services have credentials configured
    Health,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config template if none exists
    Init,
    /// Print the config with secrets redacted
    Show,
    /// Print the config file path
    Path,
}

fn build_youtube(cfg: &YcaConfig, flag: Option<&str>) -> Result<YouTubeClient> {
    let sc = cfg.service_config("youtube");
    let key = config::resolve_credential(flag, YOUTUBE_KEY_ENV, sc)
        .context("YouTube Data API key is required")?;
    YouTubeClient::new(key, sc.and_then(|c| c.base_url.clone()), cfg.request_timeout())
}

fn build_openai(cfg: &YcaConfig, flag: Option<&str>) -> Result<OpenAiClient> {
    let sc = cfg.service_config("openai");
    let key = config::resolve_credential(flag, OPENAI_KEY_ENV, sc)
        .context("OpenAI API key is required")?;
    OpenAiClient::new(key, sc.and_then(|c| c.base_url.clone()), cfg.request_timeout())
}

fn parse_video_id(url: &str) -> Result<VideoId> {
    VideoId::from_url(url).with_context(|| format!("Invalid YouTube URL: {url}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };
    let cfg = YcaConfig::load_from(&config_path)?;

    match cli.command {
        Commands::Analyze {
            url,
            max_comments,
            with_replies,
            youtube_key,
            openai_key,
        } => {
            let video_id = parse_video_id(&url)?;
            let youtube = build_youtube(&cfg, youtube_key.as_deref())?;
            let openai = build_openai(&cfg, openai_key.as_deref())?;

            let opts = AnalyzeOptions {
                max_comments: max_comments.unwrap_or_else(|| cfg.default_max_comments()),
                with_replies,
            };
            eprintln!("Analyzing {video_id} (up to {} comments)...", opts.max_comments);

            let analyzer = Analyzer::new(&youtube, &openai, cfg.analysis_settings());
            let report = analyzer.analyze(&video_id, opts)?;

            if json_output {
                print_json(&AnalyzeResponse {
                    report,
                    success: true,
                })?;
            } else {
                table::print_report(&report);
            }
        }

        Commands::Comments {
            url,
            max_comments,
            with_replies,
            youtube_key,
        } => {
            let video_id = parse_video_id(&url)?;
            let youtube = build_youtube(&cfg, youtube_key.as_deref())?;
            let max = max_comments.unwrap_or_else(|| cfg.default_max_comments());

            let info = fetch_video_info(&youtube, &video_id)?;
            let comments = if with_replies {
                collect_with_replies(&youtube, &video_id, max)?
            } else {
                collect_comments(&youtube, &video_id, max)?
            };

            if json_output {
                print_json(&serde_json::json!({
                    "videoId": video_id,
                    "videoInfo": info,
                    "total": comments.len(),
                    "comments": comments,
                }))?;
            } else {
                table::print_video_info(&info);
                println!();
                table::print_comments(&comments);
            }
        }

        Commands::VideoId { url } => {
            let video_id = parse_video_id(&url)?;
            if json_output {
                print_json(&serde_json::json!({ "url": url, "videoId": video_id }))?;
            } else {
                println!("{video_id}");
            }
        }

        Commands::Request {
            youtube_key,
            openai_key,
        } => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request body from stdin")?;

            let youtube = build_youtube(&cfg, youtube_key.as_deref())?;
            let openai = build_openai(&cfg, openai_key.as_deref())?;
            let analyzer = Analyzer::new(&youtube, &openai, cfg.analysis_settings());

            let reply = api::handle_analyze(&analyzer, &body, cfg.default_max_comments());
            print_json(&reply)?;
        }

        Commands::Health => {
            let report = api::health(
                config::credential_configured(YOUTUBE_KEY_ENV, cfg.service_config("youtube")),
                config::credential_configured(OPENAI_KEY_ENV, cfg.service_config("openai")),
            );
            if json_output {
                print_json(&report)?;
            } else {
                table::print_health(&report);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => {
                if config::init_config(&config_path)? {
                    println!("Created {}", config_path.display());
                } else {
                    bail!("Config already exists: {}", config_path.display());
                }
            }
            ConfigAction::Show => {
                println!("# {}", config_path.display());
                println!("{}", cfg.display_redacted());
            }
            ConfigAction::Path => println!("{}", config_path.display()),
        },
    }

    Ok(())
}
