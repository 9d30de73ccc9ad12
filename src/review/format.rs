use crate::github::types::{ChangedFile, FileStatus, PullRequest};

/// Patches longer than this are cut when rendered for the log.
pub const MAX_LOGGED_PATCH_LEN: usize = 500;

/// Concatenates one block per changed file, in listing order.
///
/// Files without a patch (binaries, pure renames) still get a block with an
/// empty diff section.
pub fn build_review_input(files: &[ChangedFile]) -> String {
    let mut input = String::new();
    for file in files {
        input.push_str("file name:\n");
        input.push_str(&file.filename);
        input.push_str("\n\ndiff content:\n");
        input.push_str(file.patch.as_deref().unwrap_or(""));
        input.push_str("\n\n");
    }
    input
}

pub fn status_glyph(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Added => "🟢",
        FileStatus::Removed => "🔴",
        FileStatus::Modified => "🟠",
        FileStatus::Renamed => "🔄",
        FileStatus::Copied => "📋",
        FileStatus::Changed => "📝",
        FileStatus::Unchanged => "⚪",
    }
}

/// Human-readable rendering of one changed file, patch indented and truncated.
pub fn format_file_changes(file: &ChangedFile) -> String {
    let mut output = format!(
        "{} {} ({})\n  Changes: +{}/-{}\n",
        status_glyph(file.status),
        file.filename,
        file.status,
        file.additions,
        file.deletions
    );

    if let Some(patch) = &file.patch {
        let truncated = if patch.chars().count() > MAX_LOGGED_PATCH_LEN {
            let cut: String = patch.chars().take(MAX_LOGGED_PATCH_LEN).collect();
            format!("{}...(truncated)", cut)
        } else {
            patch.clone()
        };

        output.push_str("  Patch:\n");
        let indented: Vec<String> = truncated.lines().map(|line| format!("    {}", line)).collect();
        output.push_str(&indented.join("\n"));
        output.push('\n');
    }

    output
}

pub fn format_totals(pr: &PullRequest) -> String {
    format!(
        "+{}/-{} ({} files)",
        pr.additions, pr.deletions, pr.changed_files
    )
}

pub fn format_review_comment(review: &str) -> String {
    format!("## Automated code review\n\n{}", review.trim())
}
