//! Prompt construction for the generator

use super::context::AnalysisContext;
use crate::pipeline::ShellDialect;
use std::fmt::Write;

pub const README_EXCERPT_CHARS: usize = 2000;
pub const KEY_FILE_PROMPT_CHARS: usize = 1000;
pub const PROMPT_FILE_LIMIT: usize = 40;
pub const PROMPT_DIRECTORY_LIMIT: usize = 20;

/// Role and method instructions sent ahead of the repository description
pub const SYSTEM_PROMPT: &str = r#"You are a senior DevOps engineer who writes CI/CD pipelines for real repositories.

Work in this order:
1. Read the README first. Commands it shows are the authoritative way to install, build and run the project.
2. Use dependency manifests (package.json, requirements.txt, pom.xml, ...) only where the README is silent.
3. Fall back to the file structure and languages only when neither gives guidance.
4. Never invent commands for files that do not exist. If the README runs "python script.py" and there is no requirements.txt, do not emit "pip install -r requirements.txt".

Answer with a single JSON object and nothing else."#;

const RESPONSE_FORMAT: &str = r#"{
  "analysis": {
    "project_type": "specific project type",
    "build_system": "build tool",
    "dependencies": ["dependency names"],
    "test_framework": "test framework or unknown",
    "deployment_type": "static|server|container|script",
    "recommended_tools": ["tools"],
    "complexity": "simple|moderate|complex",
    "install_commands": ["install commands"],
    "build_commands": ["build commands"],
    "test_commands": ["test commands"],
    "run_commands": ["run commands from the README"],
    "artifacts": ["artifact globs"],
    "readme_based": true,
    "shell_environment": "SHELL"
  },
  "jenkinsfile": "complete declarative Jenkinsfile",
  "explanation": "why these commands were chosen",
  "recommendations": ["follow-up suggestions"]
}"#;

fn shell_instruction(dialect: ShellDialect) -> &'static str {
    match dialect {
        ShellDialect::Posix => "Use 'sh' steps for Linux/Unix agents",
        ShellDialect::Windows => "Use 'bat' steps for Windows agents",
        ShellDialect::AppleScript => "Use 'osascript' invoked through sh steps for macOS agents",
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Builds the user prompt describing the repository
pub fn build_prompt(ctx: &AnalysisContext<'_>) -> String {
    let structure = ctx.structure;
    let meta = &structure.metadata;
    let shell = ctx.dialect.executor();
    let languages = structure.languages.ranked();
    let primary_language = meta
        .primary_language
        .clone()
        .or_else(|| structure.languages.dominant().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut prompt = String::new();
    let _ = writeln!(prompt, "SHELL ENVIRONMENT: {}", shell.to_uppercase());
    let _ = writeln!(prompt, "{}", shell_instruction(ctx.dialect));
    let _ = writeln!(prompt, "Write every step as: {} 'command here'", shell);
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "REPOSITORY INFORMATION:");
    let _ = writeln!(prompt, "- Name: {}", meta.name);
    let _ = writeln!(prompt, "- Description: {}", meta.description);
    let _ = writeln!(prompt, "- Primary Language: {}", primary_language);
    let _ = writeln!(prompt, "- All Languages: {}", list(&languages));
    let _ = writeln!(prompt, "- Size: {} KB", meta.size);
    let _ = writeln!(prompt, "- Topics: {}", list(&meta.topics));
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "README CONTENT:");
    let _ = writeln!(prompt, "{}", truncate(&structure.readme, README_EXCERPT_CHARS));
    let _ = writeln!(prompt);

    let mined = &ctx.signals.commands;
    let profile = &ctx.signals.profile;
    let _ = writeln!(prompt, "PRE-ANALYSIS:");
    let _ = writeln!(prompt, "- Detected Install Commands: {}", list(&mined.install));
    let _ = writeln!(prompt, "- Detected Build Commands: {}", list(&mined.build));
    let _ = writeln!(prompt, "- Detected Run Commands: {}", list(&mined.run));
    let _ = writeln!(prompt, "- Manifest: {}", profile.source);
    let _ = writeln!(prompt, "- Build System: {}", profile.build_system);
    let _ = writeln!(prompt, "- Project Type: {}", ctx.signals.project_type);
    let _ = writeln!(prompt);

    let files: Vec<String> = structure
        .files
        .iter()
        .take(PROMPT_FILE_LIMIT)
        .map(|f| f.name.clone())
        .collect();
    let dirs: Vec<String> = structure
        .directories
        .iter()
        .take(PROMPT_DIRECTORY_LIMIT)
        .cloned()
        .collect();
    let _ = writeln!(prompt, "PROJECT STRUCTURE:");
    let _ = writeln!(prompt, "Files: {}", list(&files));
    let _ = writeln!(prompt, "Directories: {}", list(&dirs));
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "CONFIGURATION FILES:");
    for (name, content) in &structure.key_files {
        let _ = writeln!(
            prompt,
            "- {}:\n  {}...",
            name,
            truncate(content, KEY_FILE_PROMPT_CHARS)
        );
    }
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "RESPONSE FORMAT (JSON):");
    let _ = writeln!(prompt, "{}", RESPONSE_FORMAT.replace("SHELL", ctx.dialect.as_str()));
    prompt
}
