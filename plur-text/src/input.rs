//! Reading post text, thread files and attachments from the command line

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use libplurtext::{MediaDescriptor, MediaType, PlurtextError};

/// Line that separates posts in a thread file
const CHUNK_SEPARATOR: &str = "---";

/// Use the argument if given, otherwise read all of stdin
///
/// One trailing newline is dropped so `echo "text" | plur-text count` counts
/// what the user typed.
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            Ok(strip_trailing_newline(buffer))
        }
    }
}

fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Read a thread file (`-` for stdin) and split it into posts
pub fn read_thread(path: &Path) -> Result<Vec<String>> {
    let content = if path == Path::new("-") {
        text_or_stdin(None)?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read thread file {}", path.display()))?
    };
    Ok(split_chunks(&content))
}

/// Split on lines containing only `---`; blank chunks are dropped
pub fn split_chunks(content: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim() == CHUNK_SEPARATOR {
            chunks.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    chunks.push(current.join("\n"));

    chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Parse an `N:VALUE` argument (zero-based post index)
pub fn indexed(arg: &str) -> Result<(usize, String), String> {
    let (index, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected N:VALUE, got '{}'", arg))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a post index", index))?;
    Ok((index, value.to_string()))
}

/// Describe a local file as an attachment, from its extension and size
pub fn media_from_path(path: &Path) -> Result<MediaDescriptor> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let (media_type, mime_type) = MediaType::from_extension(extension).ok_or_else(|| {
        PlurtextError::InvalidInput(format!(
            "Cannot tell the media type of {} from its extension",
            path.display()
        ))
    })?;

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;

    Ok(MediaDescriptor::new(media_type, mime_type, metadata.len()))
}
