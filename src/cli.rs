//! Command-line interface definitions for the curation engine.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Credentials can be provided via flags or environment variables and
//! are accepted before or after the subcommand.

use crate::models::PostStatus;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the curation engine.
///
/// # Examples
///
/// ```sh
/// # Run the HTTP API
/// curation_engine serve --bind 127.0.0.1:8000
///
/// # Rank news for an intent
/// curation_engine search "brazil elections"
///
/// # Extract several pages into one document
/// curation_engine extract https://a.example/1 https://b.example/2 -o raw.txt
///
/// # Publish a draft
/// curation_engine publish --title "Eleições" --content-file post.html --status draft
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true, env = "CURATION_CONFIG")]
    pub config: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// API keys and CMS access, never echoed in `--help`.
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// OpenAI API key for the completion service
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// SerpApi key for Google News search
    #[arg(long, global = true, env = "SERPAPI_API_KEY", hide_env_values = true)]
    pub serpapi_api_key: Option<String>,

    /// Jina reader token (optional; anonymous requests are rate limited)
    #[arg(long, global = true, env = "JINA_API_KEY", hide_env_values = true)]
    pub jina_api_key: Option<String>,

    /// Full Authorization header value for the CMS (e.g. "Basic ...")
    #[arg(long, global = true, env = "WORDPRESS_AUTH", hide_env_values = true)]
    pub wordpress_auth: Option<String>,

    /// WordPress posts endpoint, e.g. https://blog.example/wp-json/wp/v2/posts
    #[arg(long, global = true, env = "WORDPRESS_POSTS_URL")]
    pub wordpress_posts_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the search, extract and publish operations over HTTP
    Serve {
        /// Address to listen on (overrides the settings file)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Turn an intent into a query and rank the best news candidates
    Search {
        /// Free-text description of what to look for
        intent: String,
    },

    /// Extract every URL in parallel and print the combined text
    Extract {
        /// Pages to extract, in output order
        #[arg(required = true)]
        urls: Vec<String>,

        /// Write the combined text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Publish a finished article to the CMS
    Publish {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post body
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,

        /// Read the post body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Post status
        #[arg(short, long, value_enum, default_value_t = PostStatus::Publish)]
        status: PostStatus,
    },
}
