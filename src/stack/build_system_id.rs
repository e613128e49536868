crate::define_tag_enum! {
    /// Build system tag carried by a `BuildProfile`.
    ///
    /// When no manifest is found the profile falls back to the dominant
    /// language name, which lands in `Custom` (e.g. `Custom("python")`).
    BuildSystemId {
        Npm => "npm" : "npm",
        Yarn => "yarn" : "Yarn",
        Pip => "pip" : "pip",
        Poetry => "poetry" : "Poetry",
        Setuptools => "setuptools" : "Setuptools",
        Maven => "maven" : "Maven" | "mvn",
        Gradle => "gradle" : "Gradle",
        Go => "go" : "Go" | "go-mod" | "go mod",
        Cargo => "cargo" : "Cargo",
        Composer => "composer" : "Composer",
        DotNet => "dotnet" : ".NET" | ".net",
    }
}

impl BuildSystemId {
    /// The catch-all tag used when nothing better is known
    pub fn custom() -> Self {
        BuildSystemId::Custom("custom".to_string())
    }

    /// Node package managers share install/build conventions
    pub fn is_node(&self) -> bool {
        matches!(self, BuildSystemId::Npm | BuildSystemId::Yarn)
    }

    pub fn is_python(&self) -> bool {
        matches!(
            self,
            BuildSystemId::Pip | BuildSystemId::Poetry | BuildSystemId::Setuptools
        )
    }
}
