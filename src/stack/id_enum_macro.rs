/// Defines a string-tagged identifier enum with an open `Custom(String)` variant.
///
/// Each known variant maps to a lower-case wire tag (used for serde and for
/// parsing, aliases allowed) and a display label. Unknown tags round-trip
/// through `Custom` so values reported by a generator are never lost.
#[macro_export]
macro_rules! define_tag_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $tag:literal : $label:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Custom(String),
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from_tag(&s))
            }
        }

        impl $enum_name {
            /// Wire tag for this identifier
            pub fn as_str(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $tag,
                    )*
                    Self::Custom(name) => name.as_str(),
                }
            }

            /// Human-facing label
            pub fn label(&self) -> String {
                match self {
                    $(
                        Self::$variant => $label.to_string(),
                    )*
                    Self::Custom(name) => name.clone(),
                }
            }

            /// Parses a tag case-insensitively; unknown tags become `Custom`
            pub fn from_tag(tag: &str) -> Self {
                let normalized = tag.trim().to_lowercase();
                match normalized.as_str() {
                    $(
                        $tag $(| $alias)* => Self::$variant,
                    )*
                    _ => Self::Custom(normalized),
                }
            }

            pub fn is_custom(&self) -> bool {
                matches!(self, Self::Custom(_))
            }

            pub fn known_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
