//! plur-text - Inspect post text before publishing
//!
//! Finds facets, counts text the way each platform does, validates posts and
//! plans threads. Results go to stdout; logs go to stderr.

mod input;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use libplurtext::config::Config;
use libplurtext::logging::LoggingConfig;
use libplurtext::text::{effective_length, extract_facets, scan_candidates, MentionPolicy};
use libplurtext::types::{to_wire, FacetKind, Span, WireFacet};
use libplurtext::validation::{ValidationRequest, ValidationService};
use libplurtext::{
    split_thread, validate_attachments, CapabilityTable, MediaDescriptor, PlatformCapability,
    PlurtextError, ThreadRequest,
};

/// Exit code for content that does not fit a platform
const EXIT_INVALID: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "plur-text")]
#[command(version, about = "Inspect post text: facets, lengths, validation and threads")]
#[command(long_about = r#"Inspect post text before publishing it to decentralized social platforms.

EXAMPLES:
    # Facets in AT Protocol wire form
    plur-text facets "@alice.com check out #rust https://rust-lang.org"

    # Scan without resolving mentions
    echo "hi @bob.example" | plur-text facets --offline

    # Effective length on a platform
    plur-text count --platform twitter "日本語 https://example.com"

    # Validate for several platforms (exit code 3 when invalid)
    plur-text validate --platform bluesky,mastodon "Hello world"

    # Plan a thread from a file with posts separated by '---' lines
    plur-text thread --platform bluesky --attach 0:cat.jpg --alt 0:"A cat" thread.txt

EXIT CODES:
    0 - Success
    1 - Configuration error or unknown platform
    2 - Mention resolution failed
    3 - Content or media invalid for a platform
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print facets as AT Protocol JSON
    Facets {
        /// Text to analyze (reads from stdin if not provided)
        text: Option<String>,

        /// Only scan; do not resolve mentions
        #[arg(long)]
        offline: bool,

        /// Override the configured mention policy (fail, omit, keep)
        #[arg(long, value_name = "POLICY")]
        policy: Option<MentionPolicy>,
    },

    /// Print the effective length of a post
    Count {
        /// Text to count (reads from stdin if not provided)
        text: Option<String>,

        /// Platform to count for (default: first configured platform)
        #[arg(short, long)]
        platform: Option<String>,

        /// Count as a reply (leading mentions are free)
        #[arg(long)]
        reply: bool,

        /// Output format
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Validate a post for one or more platforms
    Validate {
        /// Text to validate (reads from stdin if not provided)
        text: Option<String>,

        /// Target platform(s), comma-separated (default: configured platforms)
        #[arg(short, long, value_delimiter = ',')]
        platform: Vec<String>,

        /// Validate as a reply (leading mentions are free)
        #[arg(long)]
        reply: bool,

        /// Attachment to validate alongside the text (repeatable)
        #[arg(long, value_name = "PATH")]
        attach: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Plan a thread from a file of posts separated by '---' lines
    Thread {
        /// Thread file ('-' for stdin)
        file: PathBuf,

        /// Platform to plan for (default: first configured platform)
        #[arg(short, long)]
        platform: Option<String>,

        /// Attach a file to post N, as N:PATH (repeatable)
        #[arg(long, value_name = "N:PATH", value_parser = input::indexed)]
        attach: Vec<(usize, String)>,

        /// Alt text for the next attachment of post N, as N:TEXT (repeatable)
        #[arg(long, value_name = "N:TEXT", value_parser = input::indexed)]
        alt: Vec<(usize, String)>,

        /// Override the configured mention policy (fail, omit, keep)
        #[arg(long, value_name = "POLICY")]
        policy: Option<MentionPolicy>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match LoggingConfig::from_env(cli.verbose) {
        Ok(logging) => {
            logging.try_init();
        }
        Err(e) => eprintln!("Warning: {}", e),
    }

    match run(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code for an error, using the library's mapping when there is one
fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PlurtextError>())
        .map_or(1, |e| e.exit_code() as u8)
}

async fn run(command: Commands) -> Result<u8> {
    let config = Config::load_or_default().context("Failed to load configuration")?;
    let capabilities = config.capabilities()?;
    debug!("Platforms available: {}", capabilities.names().join(", "));

    match command {
        Commands::Facets {
            text,
            offline,
            policy,
        } => {
            let text = input::text_or_stdin(text)?;
            let policy = policy.unwrap_or(config.mention_policy());
            facets(&config, &text, offline, policy).await
        }
        Commands::Count {
            text,
            platform,
            reply,
            format,
        } => {
            let text = input::text_or_stdin(text)?;
            let platform = select_platform(&config, &capabilities, platform.as_deref())?;
            count(&text, platform, reply, &format)
        }
        Commands::Validate {
            text,
            platform,
            reply,
            attach,
            format,
        } => {
            let text = input::text_or_stdin(text)?;
            let platforms = if platform.is_empty() {
                config.defaults.platforms.clone()
            } else {
                platform
            };
            validate(capabilities, text, platforms, reply, &attach, &format)
        }
        Commands::Thread {
            file,
            platform,
            attach,
            alt,
            policy,
        } => {
            let texts = input::read_thread(&file)?;
            let platform = select_platform(&config, &capabilities, platform.as_deref())?;
            let policy = policy.unwrap_or(config.mention_policy());
            let request = thread_request(texts, &attach, &alt)?;
            thread(&config, request, platform, policy).await
        }
    }
}

fn select_platform<'a>(
    config: &Config,
    capabilities: &'a CapabilityTable,
    requested: Option<&str>,
) -> Result<&'a PlatformCapability> {
    let name = match requested {
        Some(name) => name,
        None => config
            .defaults
            .platforms
            .first()
            .map(String::as_str)
            .ok_or_else(|| PlurtextError::InvalidInput("No platform given or configured".to_string()))?,
    };
    Ok(capabilities.require(name)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

// ============================================================================
// facets
// ============================================================================

/// Unresolved candidate, printed by `facets --offline`
#[derive(Serialize)]
struct Candidate<'t> {
    kind: FacetKind,
    index: Span,
    text: &'t str,
}

async fn facets(config: &Config, text: &str, offline: bool, policy: MentionPolicy) -> Result<u8> {
    if offline {
        let candidates: Vec<Candidate<'_>> = scan_candidates(text)
            .into_iter()
            .map(|raw| Candidate {
                kind: raw.kind.facet_kind(),
                index: raw.span,
                text: raw.text,
            })
            .collect();
        print_json(&candidates)?;
        return Ok(0);
    }

    let resolver = config.resolver();
    let facets = extract_facets(text, &resolver, policy).await?;
    let wire: Vec<WireFacet> = to_wire(&facets);
    print_json(&wire)?;
    Ok(0)
}

// ============================================================================
// count
// ============================================================================

#[derive(Serialize)]
struct CountReport<'a> {
    platform: &'a str,
    effective_length: usize,
    max_text_length: usize,
    remaining: i64,
    valid: bool,
}

fn count(text: &str, platform: &PlatformCapability, reply: bool, format: &str) -> Result<u8> {
    let length = effective_length(text, platform, reply);
    let report = CountReport {
        platform: &platform.name,
        effective_length: length,
        max_text_length: platform.max_text_length,
        remaining: platform.max_text_length as i64 - length as i64,
        valid: length <= platform.max_text_length,
    };

    if format == "json" {
        print_json(&report)?;
    } else {
        println!(
            "{}: {}/{} ({} remaining)",
            report.platform, report.effective_length, report.max_text_length, report.remaining
        );
    }
    Ok(0)
}

// ============================================================================
// validate
// ============================================================================

fn validate(
    capabilities: CapabilityTable,
    text: String,
    platforms: Vec<String>,
    reply: bool,
    attach: &[PathBuf],
    format: &str,
) -> Result<u8> {
    let media = attach
        .iter()
        .map(|path| input::media_from_path(path))
        .collect::<Result<Vec<MediaDescriptor>>>()?;

    let service = ValidationService::new(Arc::new(capabilities));
    let mut response = service.validate(ValidationRequest {
        content: text,
        platforms,
        is_reply: reply,
    });

    if !media.is_empty() {
        for result in &mut response.results {
            if let Some(platform) = service.capabilities().get(&result.platform) {
                if let Err(e) = validate_attachments(&media, platform) {
                    result.errors.push(e.to_string());
                    result.valid = false;
                }
            }
        }
        response.valid = response.results.iter().all(|r| r.valid);
    }

    if format == "json" {
        print_json(&response)?;
    } else {
        for result in &response.results {
            let status = if result.valid { "ok" } else { "invalid" };
            match (result.effective_length, result.remaining) {
                (Some(length), Some(remaining)) => println!(
                    "{}: {} ({} units, {} remaining)",
                    result.platform, status, length, remaining
                ),
                _ => println!("{}: {}", result.platform, status),
            }
            for error in &result.errors {
                println!("  error: {}", error);
            }
            for warning in &result.warnings {
                println!("  warning: {}", warning);
            }
        }
    }

    Ok(if response.valid { 0 } else { EXIT_INVALID })
}

// ============================================================================
// thread
// ============================================================================

fn thread_request(
    texts: Vec<String>,
    attach: &[(usize, String)],
    alt: &[(usize, String)],
) -> Result<ThreadRequest> {
    let posts = texts.len();
    let check_index = |index: usize, flag: &str| -> Result<()> {
        if index >= posts {
            return Err(PlurtextError::InvalidInput(format!(
                "--{} refers to post {} but the thread has {} post(s)",
                flag, index, posts
            ))
            .into());
        }
        Ok(())
    };

    let mut media_per_post: Vec<Vec<MediaDescriptor>> = vec![Vec::new(); posts];
    for (index, path) in attach {
        check_index(*index, "attach")?;
        media_per_post[*index].push(input::media_from_path(Path::new(path))?);
    }

    let mut alt_texts: Vec<Vec<Option<String>>> = vec![Vec::new(); posts];
    for (index, text) in alt {
        check_index(*index, "alt")?;
        alt_texts[*index].push(Some(text.clone()));
    }

    let mut request = ThreadRequest::new(texts).with_media(media_per_post);
    if !alt.is_empty() {
        request = request.with_alt_texts(alt_texts);
    }
    Ok(request)
}

#[derive(Serialize)]
struct PlannedPost {
    index: usize,
    text: String,
    media: Vec<MediaDescriptor>,
    facets: Vec<WireFacet>,
}

async fn thread(
    config: &Config,
    request: ThreadRequest,
    platform: &PlatformCapability,
    policy: MentionPolicy,
) -> Result<u8> {
    let resolver = config.resolver();
    let posts = split_thread(request, platform, &resolver, policy).await?;

    let planned: Vec<PlannedPost> = posts
        .into_iter()
        .map(|post| PlannedPost {
            facets: post.wire_facets(),
            index: post.index,
            text: post.text,
            media: post.media,
        })
        .collect();
    print_json(&planned)?;
    Ok(0)
}
