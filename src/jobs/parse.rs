//! Reading compiled descriptors back into a [`JobSpec`]
//!
//! Used to edit an existing job: the server hands back its descriptor and
//! the caller gets the same field mapping the compiler accepts.

use super::types::{fields, JobSpec, JobType};
use roxmltree::{Document, Node};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor is not well-formed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unrecognized descriptor root element <{0}>")]
    UnknownRoot(String),
}

fn job_type_of(root: &str) -> Option<JobType> {
    match root {
        "project" => Some(JobType::Freestyle),
        "flow-definition" => Some(JobType::Pipeline),
        "hudson.model.ExternalJob" => Some(JobType::External),
        "hudson.matrix.MatrixProject" => Some(JobType::Matrix),
        "com.cloudbees.hudson.plugins.folder.Folder" => Some(JobType::Folder),
        "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject" => {
            Some(JobType::Multibranch)
        }
        "jenkins.branch.OrganizationFolder" => Some(JobType::Organization),
        _ => None,
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| n.has_tag_name(name))
}

fn text_of(node: Option<Node<'_, '_>>) -> Option<String> {
    node.and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn put(spec: &mut JobSpec, field: &str, value: Option<String>) {
    if let Some(value) = value {
        spec.set(field, value);
    }
}

fn read_builders(root: Node<'_, '_>, spec: &mut JobSpec) {
    let Some(builders) = child(root, "builders") else {
        return;
    };
    if let Some(batch) = child(builders, "hudson.tasks.BatchFile") {
        spec.set(fields::BUILD_STEP_TYPE, "batch");
        put(spec, fields::BUILD_STEPS, text_of(child(batch, "command")));
    } else if let Some(shell) = child(builders, "hudson.tasks.Shell") {
        spec.set(fields::BUILD_STEP_TYPE, "shell");
        put(spec, fields::BUILD_STEPS, text_of(child(shell, "command")));
    }
}

/// Reads the git remote, credentials and branch of a `GitSCM` element
fn read_git_remote(scm: Node<'_, '_>, spec: &mut JobSpec) -> Option<String> {
    if let Some(remote) = descendant(scm, "hudson.plugins.git.UserRemoteConfig") {
        put(spec, fields::REPOSITORY_URL, text_of(child(remote, "url")));
        put(spec, fields::CREDENTIALS_ID, text_of(child(remote, "credentialsId")));
    }
    descendant(scm, "hudson.plugins.git.BranchSpec").and_then(|b| text_of(child(b, "name")))
}

fn read_scm(root: Node<'_, '_>, spec: &mut JobSpec) {
    let scm = child(root, "scm").filter(|s| {
        s.attribute("class")
            .is_some_and(|class| class.contains("GitSCM"))
    });
    let Some(scm) = scm else {
        spec.set(fields::SCM_TYPE, "none");
        return;
    };

    spec.set(fields::SCM_TYPE, "git");
    let branch = read_git_remote(scm, spec);
    put(spec, fields::BRANCH_SPECIFIER, branch);
    let browser = child(scm, "browser")
        .and_then(|b| b.attribute("class"))
        .and_then(|class| class.rsplit('.').next())
        .map(str::to_string);
    put(spec, fields::REPOSITORY_BROWSER, browser);
}

fn read_pipeline(root: Node<'_, '_>, spec: &mut JobSpec) {
    let Some(definition) = child(root, "definition") else {
        return;
    };
    let class = definition.attribute("class").unwrap_or_default();

    if class.contains("CpsScmFlowDefinition") {
        spec.set(fields::PIPELINE_DEFINITION_TYPE, "scm");
        if let Some(scm) = child(definition, "scm") {
            let branch = read_git_remote(scm, spec)
                .map(|b| b.strip_prefix("*/").map(str::to_string).unwrap_or(b));
            put(spec, fields::BRANCH, branch);
        }
        put(spec, fields::SCRIPT_PATH, text_of(child(definition, "scriptPath")));
    } else if class.contains("CpsFlowDefinition") {
        spec.set(fields::PIPELINE_DEFINITION_TYPE, "script");
        // Scripts keep their indentation
        let script = child(definition, "script")
            .and_then(|n| n.text())
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);
        put(spec, fields::PIPELINE_SCRIPT, script);
    }
}

fn read_axis(root: Node<'_, '_>, spec: &mut JobSpec) {
    let Some(axis) = child(root, "axes").and_then(|a| child(a, "hudson.matrix.TextAxis")) else {
        return;
    };
    put(spec, fields::AXIS_NAME, text_of(child(axis, "name")));
    if let Some(values) = child(axis, "values") {
        let values: Vec<String> = values
            .children()
            .filter(|n| n.has_tag_name("string"))
            .filter_map(|n| text_of(Some(n)))
            .collect();
        if !values.is_empty() {
            spec.set(fields::AXIS_VALUES, values.join(","));
        }
    }
}

/// Parses a descriptor produced by the compiler (or by the server itself)
pub fn parse_descriptor(xml: &str) -> Result<JobSpec, DescriptorError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let tag = root.tag_name().name();
    let job_type = job_type_of(tag).ok_or_else(|| DescriptorError::UnknownRoot(tag.to_string()))?;

    let mut spec = JobSpec::new(job_type);
    put(&mut spec, fields::DESCRIPTION, text_of(child(root, "description")));

    match job_type {
        JobType::Freestyle => {
            read_builders(root, &mut spec);
            read_scm(root, &mut spec);
        }
        JobType::Matrix => {
            read_builders(root, &mut spec);
            read_scm(root, &mut spec);
            read_axis(root, &mut spec);
        }
        JobType::Pipeline => read_pipeline(root, &mut spec),
        JobType::Multibranch => {
            if let Some(source) = descendant(root, "source") {
                put(&mut spec, fields::REPOSITORY_URL, text_of(child(source, "remote")));
                put(&mut spec, fields::CREDENTIALS_ID, text_of(child(source, "credentialsId")));
            }
            if let Some(factory) = child(root, "factory") {
                put(&mut spec, fields::SCRIPT_PATH, text_of(child(factory, "scriptPath")));
            }
        }
        JobType::Organization => {
            if let Some(navigator) = child(root, "navigators").and_then(|n| n.first_element_child()) {
                put(&mut spec, fields::ORGANIZATION_NAME, text_of(child(navigator, "repoOwner")));
                put(&mut spec, fields::CREDENTIALS_ID, text_of(child(navigator, "credentialsId")));
            }
        }
        JobType::External | JobType::Folder => {}
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::compile;

    #[test]
    fn test_freestyle_git_fields() {
        let spec = JobSpec::new(JobType::Freestyle)
            .with_field("description", "Nightly <build> & test")
            .with_field("build_steps", "make && make test")
            .with_field("scm_type", "git")
            .with_field("repository_url", "https://example.com/r.git")
            .with_field("credentials_id", "ci-bot")
            .with_field("branch_specifier", "*/release")
            .with_field("repository_browser", "GithubWeb");
        let parsed = parse_descriptor(&compile(&spec).unwrap()).unwrap();

        assert_eq!(parsed.job_type, JobType::Freestyle);
        assert_eq!(parsed.field("description"), Some("Nightly <build> & test"));
        assert_eq!(parsed.field("build_steps"), Some("make && make test"));
        assert_eq!(parsed.field("build_step_type"), Some("shell"));
        assert_eq!(parsed.field("credentials_id"), Some("ci-bot"));
        assert_eq!(parsed.field("branch_specifier"), Some("*/release"));
        assert_eq!(parsed.field("repository_browser"), Some("GithubWeb"));
    }

    #[test]
    fn test_pipeline_script_preserved() {
        let script = "pipeline {\n    agent any\n}";
        let spec = JobSpec::new(JobType::Pipeline).with_field("pipeline_script", script);
        let parsed = parse_descriptor(&compile(&spec).unwrap()).unwrap();
        assert_eq!(parsed.field("pipeline_definition_type"), Some("script"));
        assert_eq!(parsed.field("pipeline_script"), Some(script));
    }

    #[test]
    fn test_pipeline_scm_branch_unprefixed() {
        let spec = JobSpec::new(JobType::Pipeline)
            .with_field("pipeline_definition_type", "scm")
            .with_field("repository_url", "https://example.com/r.git")
            .with_field("branch", "develop");
        let parsed = parse_descriptor(&compile(&spec).unwrap()).unwrap();
        assert_eq!(parsed.field("branch"), Some("develop"));
        assert_eq!(parsed.field("script_path"), Some("Jenkinsfile"));
    }

    #[test]
    fn test_matrix_axis() {
        let spec = JobSpec::new(JobType::Matrix).with_field("axis_values", "a, b ,c");
        let parsed = parse_descriptor(&compile(&spec).unwrap()).unwrap();
        assert_eq!(parsed.field("axis_name"), Some("environment"));
        assert_eq!(parsed.field("axis_values"), Some("a,b,c"));
        assert_eq!(parsed.field("scm_type"), Some("none"));
    }

    #[test]
    fn test_unknown_root() {
        let err = parse_descriptor("<maven2-moduleset/>").unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownRoot(ref r) if r == "maven2-moduleset"));
        assert!(matches!(parse_descriptor("<project>"), Err(DescriptorError::Xml(_))));
    }
}
