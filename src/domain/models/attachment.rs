use std::path;

use anyhow::bail;
use anyhow::Result;

/// A local file picked in the chat loop. Only the name is ever recorded in
/// a message, the file itself is never read or uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub path: path::PathBuf,
}

impl Attachment {
    pub fn new(name: &str, path: path::PathBuf) -> Attachment {
        return Attachment {
            name: name.to_string(),
            path,
        };
    }

    pub fn from_path(path: &path::Path) -> Result<Attachment> {
        if !path.is_file() {
            bail!(format!("{} is not a file", path.display()));
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => bail!(format!("{} has no file name", path.display())),
        };

        return Ok(Attachment::new(&name, path.to_path_buf()));
    }

    /// Suffix line listing attachment names, or `None` when there is nothing
    /// attached.
    pub fn summary_line(attachments: &[Attachment]) -> Option<String> {
        if attachments.is_empty() {
            return None;
        }

        let names = attachments
            .iter()
            .map(|attachment| return attachment.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ");

        return Some(format!("Attachments: {names}"));
    }
}
