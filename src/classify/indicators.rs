/// One row of the project-type indicator table
#[derive(Debug)]
pub struct IndicatorRule {
    pub label: &'static str,
    pub indicators: &'static [&'static str],
}

impl IndicatorRule {
    /// Labels checked against manifest content must name an application
    pub fn is_application(&self) -> bool {
        self.label.contains("Application")
    }

    /// Substring match against lower-cased free text
    ///
    /// Extension globs such as `*.py` only apply to file names.
    pub fn matches_text(&self, lower: &str) -> bool {
        self.indicators
            .iter()
            .filter(|ind| !ind.starts_with("*."))
            .any(|ind| lower.contains(ind))
    }

    /// Match against lower-cased file and directory names
    pub fn matches_names(&self, names: &[String]) -> bool {
        self.indicators.iter().any(|ind| match ind.strip_prefix('*') {
            Some(ext) => names.iter().any(|n| n.ends_with(ext)),
            None => names.iter().any(|n| n.contains(ind)),
        })
    }
}

pub const INDICATOR_TABLE: &[IndicatorRule] = &[
    IndicatorRule {
        label: "React Application",
        indicators: &["react", "jsx", "create-react-app"],
    },
    IndicatorRule {
        label: "Vue.js Application",
        indicators: &["vue", "nuxt"],
    },
    IndicatorRule {
        label: "Angular Application",
        indicators: &["angular", "@angular"],
    },
    IndicatorRule {
        label: "Next.js Application",
        indicators: &["next.js", "next.config"],
    },
    IndicatorRule {
        label: "Express API",
        indicators: &["express", "express.js"],
    },
    IndicatorRule {
        label: "Django Application",
        indicators: &["django", "manage.py", "wsgi"],
    },
    IndicatorRule {
        label: "Flask Application",
        indicators: &["flask", "app.py", "wsgi"],
    },
    IndicatorRule {
        label: "FastAPI Application",
        indicators: &["fastapi", "uvicorn"],
    },
    IndicatorRule {
        label: "Spring Boot Application",
        indicators: &["spring-boot", "spring"],
    },
    IndicatorRule {
        label: "Go Application",
        indicators: &["main.go", "go.mod"],
    },
    IndicatorRule {
        label: "Rust Application",
        indicators: &["cargo.toml", "src/main.rs"],
    },
    IndicatorRule {
        label: "Python Script",
        indicators: &["main.py", "app.py", "*.py"],
    },
    IndicatorRule {
        label: "Node.js Application",
        indicators: &["package.json", "node_modules"],
    },
    IndicatorRule {
        label: "Java Application",
        indicators: &["*.java", "pom.xml", "*.jar"],
    },
    IndicatorRule {
        label: "Static Website",
        indicators: &["index.html", "css", "js"],
    },
    IndicatorRule {
        label: "Docker Application",
        indicators: &["dockerfile", "docker-compose"],
    },
    IndicatorRule {
        label: "Library/Package",
        indicators: &["setup.py", "lib/", "src/"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(label: &str) -> &'static IndicatorRule {
        INDICATOR_TABLE.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn test_globs_skip_text() {
        let python = rule("Python Script");
        assert!(!python.matches_text("see *.py files"));
        assert!(python.matches_names(&["tool.py".to_string()]));
    }

    #[test]
    fn test_application_filter() {
        assert!(rule("Go Application").is_application());
        assert!(!rule("Express API").is_application());
        assert!(!rule("Static Website").is_application());
    }
}
