//! One descriptor template per job type
//!
//! Templates never fail: required fields are checked by the compiler
//! before a template runs, and every optional field has a default.

use super::types::{fields, GitBlock, JobSpec};
use super::xml::{element, escape, XML_HEADER};
use std::fmt::Write;

pub const DEFAULT_BUILD_STEPS: &str = "echo \"Hello World\"";
pub const DEFAULT_MATRIX_STEPS: &str = "echo \"Matrix build for $environment\"";
pub const DEFAULT_AXIS_NAME: &str = "environment";
pub const DEFAULT_AXIS_VALUES: &str = "dev,test,prod";
pub const DEFAULT_BRANCH_SPEC: &str = "*/master";
pub const DEFAULT_PIPELINE_BRANCH: &str = "main";
pub const DEFAULT_SCRIPT_PATH: &str = "Jenkinsfile";
pub const DEFAULT_PIPELINE_SCRIPT: &str = "pipeline {
    agent any
    stages {
        stage('Hello') {
            steps {
                echo 'Hello World'
            }
        }
    }
}";

const GIT_BROWSER_PACKAGE: &str = "hudson.plugins.git.browser";

/// Shell step flavor for freestyle builders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    Shell,
    Batch,
}

impl StepType {
    pub fn of(spec: &JobSpec) -> Self {
        match spec.field(fields::BUILD_STEP_TYPE) {
            Some(t) if t.eq_ignore_ascii_case("batch") => StepType::Batch,
            _ => StepType::Shell,
        }
    }

    pub fn element(&self) -> &'static str {
        match self {
            StepType::Shell => "hudson.tasks.Shell",
            StepType::Batch => "hudson.tasks.BatchFile",
        }
    }
}

fn description(spec: &JobSpec) -> String {
    element("description", spec.field_or(fields::DESCRIPTION, ""))
}

fn indent(block: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<scm>` element: NullSCM without a git block
pub fn scm_block(git: Option<&GitBlock>) -> String {
    let Some(git) = git else {
        return r#"<scm class="hudson.scm.NullSCM"/>"#.to_string();
    };

    let mut remote = element("url", &git.url);
    if let Some(credentials) = &git.credentials_id {
        let _ = write!(remote, "\n{}", element("credentialsId", credentials));
    }

    let mut out = String::new();
    out.push_str("<scm class=\"hudson.plugins.git.GitSCM\" plugin=\"git@latest\">\n");
    out.push_str("  <configVersion>2</configVersion>\n");
    out.push_str("  <userRemoteConfigs>\n");
    out.push_str("    <hudson.plugins.git.UserRemoteConfig>\n");
    out.push_str(&indent(&remote, 6));
    out.push('\n');
    out.push_str("    </hudson.plugins.git.UserRemoteConfig>\n");
    out.push_str("  </userRemoteConfigs>\n");
    out.push_str("  <branches>\n");
    out.push_str("    <hudson.plugins.git.BranchSpec>\n");
    let _ = writeln!(out, "      {}", element("name", &git.branch_spec));
    out.push_str("    </hudson.plugins.git.BranchSpec>\n");
    out.push_str("  </branches>\n");
    out.push_str("  <doGenerateSubmoduleConfigurations>false</doGenerateSubmoduleConfigurations>\n");
    out.push_str("  <submoduleCfg class=\"empty-list\"/>\n");
    if let Some(browser) = &git.browser {
        let _ = writeln!(
            out,
            "  <browser class=\"{}.{}\"/>",
            GIT_BROWSER_PACKAGE,
            escape(browser)
        );
    }
    out.push_str("  <extensions/>\n");
    out.push_str("</scm>");
    out
}

fn project_body(spec: &JobSpec, step: StepType, steps: &str) -> String {
    format!(
        r#"  <actions/>
  {description}
  <keepDependencies>false</keepDependencies>
  <properties/>
{scm}
  <canRoam>true</canRoam>
  <disabled>false</disabled>
  <blockBuildWhenDownstreamBuilding>false</blockBuildWhenDownstreamBuilding>
  <blockBuildWhenUpstreamBuilding>false</blockBuildWhenUpstreamBuilding>
  <triggers/>
  <concurrentBuild>false</concurrentBuild>
  <builders>
    <{step}>
      {command}
    </{step}>
  </builders>
  <publishers/>
  <buildWrappers/>"#,
        description = description(spec),
        scm = indent(&scm_block(spec.git().as_ref()), 2),
        step = step.element(),
        command = element("command", steps),
    )
}

pub fn freestyle(spec: &JobSpec) -> String {
    let steps = spec.field_or(fields::BUILD_STEPS, DEFAULT_BUILD_STEPS);
    format!(
        "{XML_HEADER}\n<project>\n{}\n</project>",
        project_body(spec, StepType::of(spec), steps)
    )
}

pub fn matrix(spec: &JobSpec) -> String {
    let steps = spec.field_or(fields::BUILD_STEPS, DEFAULT_MATRIX_STEPS);
    let axis_name = spec.field_or(fields::AXIS_NAME, DEFAULT_AXIS_NAME);
    let values: String = spec
        .field_or(fields::AXIS_VALUES, DEFAULT_AXIS_VALUES)
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| element("string", v))
        .collect();

    format!(
        r#"{XML_HEADER}
<hudson.matrix.MatrixProject>
{body}
  <axes>
    <hudson.matrix.TextAxis>
      {name}
      <values>
        {values}
      </values>
    </hudson.matrix.TextAxis>
  </axes>
  <runSequentially>false</runSequentially>
</hudson.matrix.MatrixProject>"#,
        body = project_body(spec, StepType::Shell, steps),
        name = element("name", axis_name),
    )
}

/// Pipeline definition read from a repository
pub struct ScmDefinition<'a> {
    pub repository_url: &'a str,
    pub credentials_id: Option<&'a str>,
    pub branch: &'a str,
    pub script_path: &'a str,
}

fn scm_definition(def: &ScmDefinition<'_>) -> String {
    let git = GitBlock {
        url: def.repository_url.to_string(),
        credentials_id: def.credentials_id.map(str::to_string),
        branch_spec: format!("*/{}", def.branch),
        browser: None,
    };
    format!(
        r#"<definition class="org.jenkinsci.plugins.workflow.cps.CpsScmFlowDefinition" plugin="workflow-cps@latest">
{scm}
  {path}
  <lightweight>true</lightweight>
</definition>"#,
        scm = indent(&scm_block(Some(&git)), 2),
        path = element("scriptPath", def.script_path),
    )
}

/// Already indented for the job body; the script text must stay verbatim
fn script_definition(script: &str) -> String {
    format!(
        r#"  <definition class="org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition" plugin="workflow-cps@latest">
    {script}
    <sandbox>true</sandbox>
  </definition>"#,
        script = element("script", script),
    )
}

/// Pipeline job; `scm` selects the repository-backed definition
pub fn pipeline(spec: &JobSpec, scm: Option<ScmDefinition<'_>>) -> String {
    let definition = match scm {
        Some(def) => indent(&scm_definition(&def), 2),
        None => script_definition(spec.field_or(fields::PIPELINE_SCRIPT, DEFAULT_PIPELINE_SCRIPT)),
    };
    format!(
        r#"{XML_HEADER}
<flow-definition plugin="workflow-job@latest">
  <actions/>
  {description}
  <keepDependencies>false</keepDependencies>
  <properties/>
{definition}
  <triggers/>
  <disabled>false</disabled>
</flow-definition>"#,
        description = description(spec),
    )
}

pub fn external(spec: &JobSpec) -> String {
    format!(
        r#"{XML_HEADER}
<hudson.model.ExternalJob>
  <actions/>
  {description}
  <keepDependencies>false</keepDependencies>
  <properties/>
  <disabled>false</disabled>
</hudson.model.ExternalJob>"#,
        description = description(spec),
    )
}

pub fn folder(spec: &JobSpec) -> String {
    format!(
        r#"{XML_HEADER}
<com.cloudbees.hudson.plugins.folder.Folder plugin="cloudbees-folder@latest">
  <actions/>
  {description}
  <properties/>
  <folderViews class="com.cloudbees.hudson.plugins.folder.views.DefaultFolderViewHolder">
    <views>
      <hudson.model.AllView>
        <owner class="com.cloudbees.hudson.plugins.folder.Folder" reference="../../../.."/>
        <name>all</name>
        <filterExecutors>false</filterExecutors>
        <filterQueue>false</filterQueue>
        <properties class="hudson.model.View$PropertyList"/>
      </hudson.model.AllView>
    </views>
    <tabBar class="hudson.views.DefaultViewsTabBar"/>
  </folderViews>
  <healthMetrics/>
</com.cloudbees.hudson.plugins.folder.Folder>"#,
        description = description(spec),
    )
}

/// Shared head of multibranch projects and organization folders
fn computed_folder_head(spec: &JobSpec, owner_class: &str) -> String {
    format!(
        r#"  <actions/>
  {description}
  <properties/>
  <folderViews class="jenkins.branch.MultiBranchProjectViewHolder" plugin="branch-api@latest">
    <owner class="{owner_class}" reference="../.."/>
  </folderViews>
  <healthMetrics/>
  <icon class="jenkins.branch.MetadataActionFolderIcon" plugin="branch-api@latest">
    <owner class="{owner_class}" reference="../.."/>
  </icon>
  <orphanedItemStrategy class="com.cloudbees.hudson.plugins.folder.computed.DefaultOrphanedItemStrategy" plugin="cloudbees-folder@latest">
    <pruneDeadBranches>true</pruneDeadBranches>
    <daysToKeep>-1</daysToKeep>
    <numToKeep>-1</numToKeep>
  </orphanedItemStrategy>
  <triggers/>
  <disabled>false</disabled>"#,
        description = description(spec),
    )
}

const MULTIBRANCH_CLASS: &str = "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject";
const ORGANIZATION_CLASS: &str = "jenkins.branch.OrganizationFolder";

pub fn multibranch(spec: &JobSpec, repository_url: &str) -> String {
    format!(
        r#"{XML_HEADER}
<{MULTIBRANCH_CLASS} plugin="workflow-multibranch@latest">
{head}
  <sources class="jenkins.branch.BranchSource" plugin="branch-api@latest">
    <source class="jenkins.plugins.git.GitSCMSource" plugin="git@latest">
      <id>git-repo</id>
      {remote}
      {credentials}
      <traits/>
    </source>
    <strategy class="jenkins.branch.DefaultBranchPropertyStrategy" plugin="branch-api@latest">
      <properties class="empty-list"/>
    </strategy>
  </sources>
  <factory class="org.jenkinsci.plugins.workflow.multibranch.WorkflowBranchProjectFactory" plugin="workflow-multibranch@latest">
    <owner class="{MULTIBRANCH_CLASS}" reference="../.."/>
    {script_path}
  </factory>
</{MULTIBRANCH_CLASS}>"#,
        head = computed_folder_head(spec, MULTIBRANCH_CLASS),
        remote = element("remote", repository_url),
        credentials = element("credentialsId", spec.field_or(fields::CREDENTIALS_ID, "")),
        script_path = element(
            "scriptPath",
            spec.field_or(fields::SCRIPT_PATH, DEFAULT_SCRIPT_PATH)
        ),
    )
}

pub fn organization(spec: &JobSpec, organization_name: &str) -> String {
    format!(
        r#"{XML_HEADER}
<{ORGANIZATION_CLASS} plugin="branch-api@latest">
{head}
  <navigators>
    <org.jenkinsci.plugins.github_branch_source.GitHubSCMNavigator plugin="github-branch-source@latest">
      {owner}
      {credentials}
      <traits/>
    </org.jenkinsci.plugins.github_branch_source.GitHubSCMNavigator>
  </navigators>
  <projectFactories>
    <org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProjectFactory plugin="workflow-multibranch@latest">
      {script_path}
    </org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProjectFactory>
  </projectFactories>
</{ORGANIZATION_CLASS}>"#,
        head = computed_folder_head(spec, ORGANIZATION_CLASS),
        owner = element("repoOwner", organization_name),
        credentials = element("credentialsId", spec.field_or(fields::CREDENTIALS_ID, "")),
        script_path = element(
            "scriptPath",
            spec.field_or(fields::SCRIPT_PATH, DEFAULT_SCRIPT_PATH)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::JobType;

    #[test]
    fn test_null_scm_without_git() {
        assert_eq!(scm_block(None), r#"<scm class="hudson.scm.NullSCM"/>"#);
    }

    #[test]
    fn test_git_scm_credentials_only_when_set() {
        let mut git = GitBlock {
            url: "https://example.com/r.git".into(),
            credentials_id: None,
            branch_spec: "*/main".into(),
            browser: None,
        };
        let block = scm_block(Some(&git));
        assert!(block.contains("<url>https://example.com/r.git</url>"));
        assert!(!block.contains("credentialsId"));
        assert!(block.contains("<name>*/main</name>"));

        git.credentials_id = Some("gh-token".into());
        git.browser = Some("GithubWeb".into());
        let block = scm_block(Some(&git));
        assert!(block.contains("<credentialsId>gh-token</credentialsId>"));
        assert!(block.contains(r#"<browser class="hudson.plugins.git.browser.GithubWeb"/>"#));
    }

    #[test]
    fn test_freestyle_batch_step() {
        let spec = JobSpec::new(JobType::Freestyle)
            .with_field("build_step_type", "batch")
            .with_field("build_steps", "dir & echo done");
        let xml = freestyle(&spec);
        assert!(xml.starts_with(XML_HEADER));
        assert!(xml.contains("<hudson.tasks.BatchFile>"));
        assert!(xml.contains("<command>dir &amp; echo done</command>"));
    }

    #[test]
    fn test_matrix_defaults() {
        let xml = matrix(&JobSpec::new(JobType::Matrix));
        assert!(xml.contains("<name>environment</name>"));
        assert!(xml.contains("<string>dev</string><string>test</string><string>prod</string>"));
        assert!(xml.contains("echo &quot;Matrix build for $environment&quot;"));
    }

    #[test]
    fn test_pipeline_scm_branch() {
        let spec = JobSpec::new(JobType::Pipeline);
        let xml = pipeline(
            &spec,
            Some(ScmDefinition {
                repository_url: "https://example.com/r.git",
                credentials_id: None,
                branch: "develop",
                script_path: "ci/Jenkinsfile",
            }),
        );
        assert!(xml.contains("CpsScmFlowDefinition"));
        assert!(xml.contains("<name>*/develop</name>"));
        assert!(xml.contains("<scriptPath>ci/Jenkinsfile</scriptPath>"));
    }
}
