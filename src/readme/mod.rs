//! README command mining
//!
//! Only lines that look like shell invocations are considered: prompt-prefixed
//! lines, lines inside fenced code blocks, `#` comment or heading lines and
//! lines carrying inline code. A fence opened and closed on one line
//! contributes its inner text as a candidate. Each
//! candidate is matched independently against the install, build and run
//! pattern families, so one line can land in several buckets.

mod commands;

pub use commands::{clean_command, clean_commands};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Install and build buckets keep at most this many lines
pub const MAX_BUCKET_COMMANDS: usize = 3;

/// Command-like lines mined from documentation, stored verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCommands {
    pub install: Vec<String>,
    pub build: Vec<String>,
    pub run: Vec<String>,
}

impl DetectedCommands {
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.build.is_empty() && self.run.is_empty()
    }

    pub fn has_run(&self) -> bool {
        !self.run.is_empty()
    }

    pub fn cleaned_install(&self) -> Vec<String> {
        clean_commands(&self.install)
    }

    pub fn cleaned_build(&self) -> Vec<String> {
        clean_commands(&self.build)
    }

    pub fn cleaned_run(&self) -> Vec<String> {
        clean_commands(&self.run)
    }
}

fn push_unique(bucket: &mut Vec<String>, line: &str, cap: Option<usize>) {
    if cap.is_some_and(|cap| bucket.len() >= cap) {
        return;
    }
    if !bucket.iter().any(|existing| existing == line) {
        bucket.push(line.to_string());
    }
}

fn looks_like_command(trimmed: &str, in_fence: bool) -> bool {
    in_fence
        || trimmed.starts_with("$ ")
        || trimmed.starts_with("> ")
        || trimmed.starts_with('#')
        || trimmed.contains('`')
}

/// Inner text of a fence opened and closed on the same line
fn single_line_fence(trimmed: &str) -> Option<&str> {
    ["```", "~~~"].into_iter().find_map(|marker| {
        let inner = trimmed.strip_prefix(marker)?.strip_suffix(marker)?;
        let inner = inner.trim();
        (!inner.is_empty() && !inner.contains(marker)).then_some(inner)
    })
}

/// Scans free text for install/build/run command lines
pub fn mine_commands(readme: &str) -> DetectedCommands {
    let patterns = commands::patterns();
    let mut detected = DetectedCommands::default();
    let mut in_fence = false;

    for line in readme.lines() {
        let mut trimmed = line.trim();
        if let Some(inner) = single_line_fence(trimmed) {
            trimmed = inner;
        } else if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        } else if trimmed.is_empty() || !looks_like_command(trimmed, in_fence) {
            continue;
        }

        let lower = trimmed.to_lowercase();
        if patterns.is_install(&lower) {
            push_unique(&mut detected.install, trimmed, Some(MAX_BUCKET_COMMANDS));
        }
        if patterns.is_build(&lower) {
            push_unique(&mut detected.build, trimmed, Some(MAX_BUCKET_COMMANDS));
        }
        if patterns.is_run(&lower) {
            push_unique(&mut detected.run, trimmed, None);
        }
    }

    debug!(
        install = detected.install.len(),
        build = detected.build.len(),
        run = detected.run.len(),
        "README commands mined"
    );
    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_commands() {
        let readme = "# Demo\n\n```bash\npip install -r requirements.txt\npython app.py\n```\n";
        let detected = mine_commands(readme);
        assert_eq!(detected.install, vec!["pip install -r requirements.txt"]);
        assert_eq!(detected.run, vec!["python app.py"]);
        assert!(detected.build.is_empty());
    }

    #[test]
    fn test_prose_is_ignored() {
        let readme = "You can pip install this package and then run python main.py yourself.";
        assert!(mine_commands(readme).is_empty());
    }

    #[test]
    fn test_single_line_fence_keeps_command_and_fence_state() {
        let readme = "```npm install```\n\nYou can pip install this package and then run python main.py yourself.\n";
        let detected = mine_commands(readme);
        assert_eq!(detected.install, vec!["npm install"]);
        assert!(detected.run.is_empty());
        assert!(detected.build.is_empty());
    }

    #[test]
    fn test_fence_closes_after_block() {
        let readme = "```sh\nnpm run build\n```\nThen pip install it and run python main.py.\n";
        let detected = mine_commands(readme);
        assert_eq!(detected.build, vec!["npm run build"]);
        assert!(detected.install.is_empty());
        assert!(detected.run.is_empty());
    }

    #[test]
    fn test_hash_lines_are_candidates() {
        let detected = mine_commands("# pip install -e .\nplain pip install text\n");
        assert_eq!(detected.install, vec!["# pip install -e ."]);
        assert!(detected.cleaned_install().is_empty());
    }

    #[test]
    fn test_prompt_and_inline_code() {
        let readme = "$ npm install\nRun `npm start` to launch.\n> go run .\n";
        let detected = mine_commands(readme);
        assert_eq!(detected.install, vec!["$ npm install"]);
        assert_eq!(detected.run, vec!["Run `npm start` to launch.", "> go run ."]);
    }

    #[test]
    fn test_build_bucket_capped_in_order() {
        let readme = "```\nnpm run build\nyarn build\nmvn package\nmake build\ngo build ./...\n```\n";
        let detected = mine_commands(readme);
        assert_eq!(
            detected.build,
            vec!["npm run build", "yarn build", "mvn package"]
        );
    }

    #[test]
    fn test_line_lands_in_multiple_buckets() {
        let detected = mine_commands("```\ncargo build --release\n```\n");
        assert_eq!(detected.install, vec!["cargo build --release"]);
        assert_eq!(detected.build, vec!["cargo build --release"]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let readme = "```\npython app.py\nnode server.js\npython app.py\n```\n";
        let detected = mine_commands(readme);
        assert_eq!(detected.run, vec!["python app.py", "node server.js"]);
    }

    #[test]
    fn test_run_bucket_unbounded() {
        let readme = "```\npython a.py\npython b.py\npython c.py\npython d.py\npython e.py\n```\n";
        assert_eq!(mine_commands(readme).run.len(), 5);
    }

    #[test]
    fn test_cleaned_views() {
        let detected = mine_commands("```\n$ python app.py\n```\n");
        assert_eq!(detected.cleaned_run(), vec!["python app.py"]);
    }
}
