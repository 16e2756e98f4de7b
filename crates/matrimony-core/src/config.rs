/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `foo_bar` is read from `FOO_BAR`.
/// Missing optional fields fall back to their `#[serde(default)]`.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit list of key/value pairs instead of the process environment.
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
