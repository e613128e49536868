use regex::Regex;
use std::sync::OnceLock;

pub(crate) struct PatternSet {
    install: Vec<Regex>,
    build: Vec<Regex>,
    run: Vec<Regex>,
}

const INSTALL_PATTERNS: &[&str] = &[
    r"pip\s+install",
    r"npm\s+install",
    r"yarn\s+install",
    r"bundle\s+install",
    r"composer\s+install",
    r"go\s+mod\s+download",
    r"cargo\s+build",
    r"mvn\s+install",
    r"gradle\s+build",
    r"make\s+install",
];

const BUILD_PATTERNS: &[&str] = &[
    r"npm\s+run\s+build",
    r"yarn\s+build",
    r"mvn\s+package",
    r"gradle\s+build",
    r"make\s+build",
    r"python\s+setup\.py\s+build",
    r"go\s+build",
    r"cargo\s+build",
];

const RUN_PATTERNS: &[&str] = &[
    r"python3?\s+[\w./-]+\.py",
    r"node\s+[\w./-]+\.js",
    r"npm\s+start",
    r"yarn\s+start",
    r"java\s+-jar",
    r"go\s+run",
    r"cargo\s+run",
    r"mvn\s+spring-boot:run",
    r"\./gradlew\s+bootrun",
    r"make\s+run",
    r"docker\s+run",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
}

pub(crate) fn patterns() -> &'static PatternSet {
    static SET: OnceLock<PatternSet> = OnceLock::new();
    SET.get_or_init(|| PatternSet {
        install: compile(INSTALL_PATTERNS),
        build: compile(BUILD_PATTERNS),
        run: compile(RUN_PATTERNS),
    })
}

impl PatternSet {
    pub(crate) fn is_install(&self, lower: &str) -> bool {
        self.install.iter().any(|re| re.is_match(lower))
    }

    pub(crate) fn is_build(&self, lower: &str) -> bool {
        self.build.iter().any(|re| re.is_match(lower))
    }

    pub(crate) fn is_run(&self, lower: &str) -> bool {
        self.run.iter().any(|re| re.is_match(lower))
    }
}

/// Strips markdown and prompt noise from a mined line
///
/// Removes backticks, `$`, `>` and `&`; comment lines and lines that end up
/// empty are dropped.
pub fn clean_command(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '`' | '$' | '>' | '&'))
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() || cleaned.starts_with('#') {
        None
    } else {
        Some(cleaned)
    }
}

/// Cleans a list of mined lines, dropping duplicates produced by cleaning
pub fn clean_commands<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in raw {
        if let Some(cmd) = clean_command(line.as_ref()) {
            if !out.contains(&cmd) {
                out.push(cmd);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        prompt = { "$ npm install", Some("npm install") },
        backticks = { "`pip install -r requirements.txt`", Some("pip install -r requirements.txt") },
        redirect = { "> python app.py", Some("python app.py") },
        chained = { "npm install && npm start", Some("npm install npm start") },
        comment = { "# install deps", None },
        prompt_only = { "$ ", None },
    )]
    fn test_clean_command(raw: &str, expected: Option<&str>) {
        assert_eq!(clean_command(raw).as_deref(), expected);
    }

    #[test]
    fn test_clean_commands_dedupes_after_cleaning() {
        let cleaned = clean_commands(&["$ npm start", "`npm start`", "# note"]);
        assert_eq!(cleaned, vec!["npm start"]);
    }

    #[test]
    fn test_pattern_families() {
        let set = patterns();
        assert!(set.is_install("pip install flask"));
        assert!(set.is_build("npm run build"));
        assert!(set.is_run("python main.py"));
        assert!(set.is_run("./gradlew bootrun"));
        assert!(!set.is_run("python -m venv .venv"));
        assert!(set.is_install("cargo build --release") && set.is_build("cargo build --release"));
    }
}
