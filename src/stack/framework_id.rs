crate::define_tag_enum! {
    /// Application framework inferred from manifest dependencies.
    ///
    /// The label doubles as the project-type name the classifier reports.
    FrameworkId {
        React => "react" : "React Application",
        Vue => "vue" : "Vue.js Application",
        Angular => "angular" : "Angular Application",
        NextJs => "nextjs" : "Next.js Application" | "next",
        Express => "express" : "Express API",
        Django => "django" : "Django Application",
        Flask => "flask" : "Flask Application",
        FastApi => "fastapi" : "FastAPI Application",
        SpringBoot => "spring-boot" : "Spring Boot Application" | "spring",
    }
}

impl FrameworkId {
    /// Frameworks that ship as a static bundle rather than a running server
    pub fn is_static_frontend(&self) -> bool {
        matches!(self, FrameworkId::React | FrameworkId::Vue)
    }

    /// Short tool name, e.g. "React" for the recommended-tools list
    pub fn tool_name(&self) -> String {
        match self {
            FrameworkId::React => "React".to_string(),
            FrameworkId::Vue => "Vue".to_string(),
            FrameworkId::Angular => "Angular".to_string(),
            FrameworkId::NextJs => "Next.js".to_string(),
            FrameworkId::Express => "Express".to_string(),
            FrameworkId::Django => "Django".to_string(),
            FrameworkId::Flask => "Flask".to_string(),
            FrameworkId::FastApi => "FastAPI".to_string(),
            FrameworkId::SpringBoot => "Spring Boot".to_string(),
            FrameworkId::Custom(name) => name.clone(),
        }
    }
}
