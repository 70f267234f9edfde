use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use shortform::config::AppConfig;
use shortform::content::{sample_themes, ContentGenerator, Style, VideoScript};
use shortform::logging::init_logging;
use shortform::publish::{
    hosting, schedule, CredentialStore, InstagramAccount, InstagramUploader, PublishRequest,
    YouTubeUploader,
};
use shortform::reshape;

#[derive(Parser)]
#[command(name = "shortform")]
#[command(about = "Generate, reshape and publish short-form videos", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./shortform.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video prompt script and save it
    Script {
        /// Ad theme keyword
        #[arg(short, long)]
        keyword: String,

        #[arg(short, long, value_enum, default_value_t = Style::Cinematic)]
        style: Style,

        /// Generate one script per style instead (up to 3)
        #[arg(long)]
        variations: Option<usize>,
    },

    /// List sample themes
    Themes,

    /// Convert a video to 1080x1920 vertical format
    Reshape {
        input: PathBuf,

        /// Output path (defaults to converted_916_<name>.mp4 next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show resolution, frame rate and frame count of a video
    Info { input: PathBuf },

    /// Upload a video as a YouTube Short
    Youtube(YoutubeArgs),

    /// Publish a video as an Instagram Reel
    Reel {
        video: PathBuf,

        /// Saved script to build the caption from
        #[arg(long)]
        script: Option<PathBuf>,

        #[arg(long)]
        caption: Option<String>,

        /// Hashtag without '#' (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Check connectivity of every configured service
    Check,
}

#[derive(Args)]
struct YoutubeArgs {
    video: PathBuf,

    /// Saved script to take title and description from
    #[arg(long)]
    script: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Publish time, "YYYY-MM-DD HH:MM" in the configured zone
    #[arg(long)]
    schedule: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Script {
            keyword,
            style,
            variations,
        } => cmd_script(&config, &keyword, style, variations).await,
        Commands::Themes => {
            for theme in sample_themes() {
                println!("{theme}");
            }
            Ok(())
        }
        Commands::Reshape { input, output } => cmd_reshape(input, output).await,
        Commands::Info { input } => cmd_info(input).await,
        Commands::Youtube(args) => cmd_youtube(&config, args).await,
        Commands::Reel {
            video,
            script,
            caption,
            tags,
        } => cmd_reel(&config, video, script, caption, tags).await,
        Commands::Check => cmd_check(&config).await,
    }
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .user_agent(concat!("shortform/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn default_title(config: &AppConfig) -> String {
    format!("{} video", config.openai.brand)
}

fn load_script(path: Option<&PathBuf>) -> anyhow::Result<Option<VideoScript>> {
    path.map(|p| VideoScript::load(p).with_context(|| format!("reading {}", p.display())))
        .transpose()
}

async fn cmd_script(
    config: &AppConfig,
    keyword: &str,
    style: Style,
    variations: Option<usize>,
) -> anyhow::Result<()> {
    let generator = ContentGenerator::new(&config.openai)?;
    let scripts = match variations {
        Some(count) => generator.generate_variations(keyword, count).await,
        None => vec![generator.generate_script(keyword, style).await?],
    };
    if scripts.is_empty() {
        anyhow::bail!("no script could be generated");
    }

    for script in &scripts {
        println!("{}", script.to_pretty_json()?);
        let path = script.save(&config.paths.scripts_dir())?;
        println!("saved {}", path.display());
    }
    Ok(())
}

async fn cmd_reshape(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path =
        tokio::task::spawn_blocking(move || reshape::reshape(&input, output.as_deref())).await??;
    println!("{}", path.display());
    Ok(())
}

async fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let info = tokio::task::spawn_blocking(move || reshape::inspect(&input)).await??;
    println!("Resolution: {}x{}", info.width, info.height);
    match info.frame_rate {
        Some(rate) => println!("Frame rate: {rate}"),
        None => println!("Frame rate: unknown"),
    }
    println!("Frames: {}", info.frames);
    Ok(())
}

/// Assemble the upload request. The schedule is validated first, so a bad
/// schedule fails before any file is read or request is made.
fn youtube_request(config: &AppConfig, args: YoutubeArgs) -> anyhow::Result<PublishRequest> {
    let publish_at = args
        .schedule
        .as_deref()
        .map(|s| schedule::parse_local(s, config.schedule.utc_offset_hours))
        .transpose()?;
    let script = load_script(args.script.as_ref())?;

    let fallback_title = default_title(config);
    let title = args.title.unwrap_or_else(|| match &script {
        Some(script) => script.title_or(&fallback_title).to_owned(),
        None => fallback_title.clone(),
    });
    let description = args
        .description
        .or_else(|| script.as_ref().and_then(|s| s.summary()).map(str::to_owned))
        .unwrap_or_default();
    let tags = if args.tags.is_empty() {
        config.youtube.default_tags.clone()
    } else {
        args.tags
    };

    Ok(PublishRequest::new(args.video, title)
        .with_description(description)
        .with_tags(tags)
        .with_publish_at(publish_at))
}

async fn cmd_youtube(config: &AppConfig, args: YoutubeArgs) -> anyhow::Result<()> {
    let schedule_at = args.schedule.clone();
    let request = youtube_request(config, args)?;

    let store = CredentialStore::new(&config.paths.youtube_token);
    let uploader = YouTubeUploader::new(http_client()?, &config.youtube);
    let result = uploader.upload_video(&store, &request).await?;

    match &schedule_at {
        Some(at) => println!("Scheduled ({at}): {}", result.url),
        None => println!("Uploaded: {}", result.url),
    }
    Ok(())
}

async fn cmd_reel(
    config: &AppConfig,
    video: PathBuf,
    script: Option<PathBuf>,
    caption: Option<String>,
    tags: Vec<String>,
) -> anyhow::Result<()> {
    let script = load_script(script.as_ref())?;
    let caption = caption.unwrap_or_else(|| match &script {
        Some(script) => script.caption(&default_title(config)),
        None => default_title(config),
    });
    let tags = if tags.is_empty() {
        config.instagram.default_tags.clone()
    } else {
        tags
    };

    let http = http_client()?;
    let host = hosting::from_config(&config.instagram.hosting, http.clone());
    let uploader = InstagramUploader::new(http, &config.instagram, host);
    let account = InstagramAccount::from_config(&config.instagram);
    let result = uploader.upload_reel(&account, &video, &caption, &tags).await?;

    println!("Published: {}", result.url);
    Ok(())
}

async fn cmd_check(config: &AppConfig) -> anyhow::Result<()> {
    let http = http_client()?;

    match ContentGenerator::new(&config.openai) {
        Ok(generator) => match generator.check_connection().await {
            Ok(models) => println!("OpenAI: ok ({models} models)"),
            Err(e) => println!("OpenAI: {e}"),
        },
        Err(e) => println!("OpenAI: {e}"),
    }

    let store = CredentialStore::new(&config.paths.youtube_token);
    let youtube = YouTubeUploader::new(http.clone(), &config.youtube);
    match youtube.channel_title(&store).await {
        Ok(Some(channel)) => println!("YouTube: ok ({channel})"),
        Ok(None) => println!("YouTube: ok (no channel)"),
        Err(e) if e.is_credential_issue() => println!(
            "YouTube: {e} (authorize again to recreate {})",
            store.path().display()
        ),
        Err(e) => println!("YouTube: {e}"),
    }

    let host = hosting::from_config(&config.instagram.hosting, http.clone());
    let instagram = InstagramUploader::new(http, &config.instagram, host);
    match instagram
        .account_username(&InstagramAccount::from_config(&config.instagram))
        .await
    {
        Ok(Some(user)) => println!("Instagram: ok (@{user})"),
        Ok(None) => println!("Instagram: ok"),
        Err(e) => println!("Instagram: {e}"),
    }
    Ok(())
}
