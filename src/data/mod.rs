//! Move and species lookup.
//!
//! Battles never talk to a data source directly. They go through a
//! [`MoveResolver`], which memoizes whatever [`DataProvider`] it wraps.

mod pokeapi;
mod provider;
mod resolver;

pub use pokeapi::PokeApiProvider;
pub use provider::{DataProvider, LocalDataFile, LocalDataProvider};
pub use resolver::MoveResolver;

/// Canonical lookup key: trimmed, lowercase, spaces replaced with `-`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn display_names_normalize_to_api_names() {
        assert_eq!(normalize_name("Thunder Shock"), "thunder-shock");
        assert_eq!(normalize_name(" tackle "), "tackle");
        assert_eq!(normalize_name("U-turn"), "u-turn");
    }
}
