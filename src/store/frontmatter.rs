use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Parse a type from markdown content with YAML frontmatter
///
/// # Example
///
/// ```text
/// let record: BatchRecord = parse_from_markdown(&content, "batch record")?;
/// ```
pub fn parse_from_markdown<T: DeserializeOwned>(
    content: &str,
    type_name: &str,
) -> Result<T, StoreError> {
    let frontmatter = extract_yaml_frontmatter(content)?;
    serde_yaml::from_value(frontmatter).map_err(|e| {
        StoreError::Serialization(format!("Failed to parse {type_name} from frontmatter: {e}"))
    })
}

/// Extract YAML frontmatter from markdown content
///
/// Expects frontmatter delimited by `---` at the start and end.
///
/// ```text
/// ---
/// batch:
///   name: Batch-A
/// ---
/// # Markdown content here
/// ```
pub fn extract_yaml_frontmatter(content: &str) -> Result<serde_yaml::Value, StoreError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() || !lines[0].trim().starts_with("---") {
        return Err(StoreError::Serialization(
            "No frontmatter delimiter found at start of content".to_string(),
        ));
    }

    // Closing delimiter must sit at the opening delimiter's indentation, so an
    // indented `---` inside a block scalar (batch notes) does not end the block.
    let opening_indent = lines[0].len() - lines[0].trim_start().len();

    let end_idx = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            trimmed.starts_with("---") && line.len() - trimmed.len() == opening_indent
        })
        .map(|(idx, _)| idx)
        .ok_or_else(|| {
            StoreError::Serialization("Frontmatter not properly closed with ---".to_string())
        })?;

    let yaml_content = lines[1..end_idx].join("\n");

    serde_yaml::from_str(&yaml_content)
        .map_err(|e| StoreError::Serialization(format!("Failed to parse YAML frontmatter: {e}")))
}
