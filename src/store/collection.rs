use std::fmt;

/// The two independent document namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Raw benchmark output, served under `/raw_input`
    Raw,
    /// Standardized benchmark output, served under `/standardized_output`
    Standardized,
}

impl Collection {
    pub const ALL: [Self; 2] = [Self::Raw, Self::Standardized];

    /// URL path segment the collection is mounted on
    pub const fn route(self) -> &'static str {
        match self {
            Self::Raw => "raw_input",
            Self::Standardized => "standardized_output",
        }
    }

    pub fn from_route(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.route() == segment)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Standardized => write!(f, "standardized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_lookup() {
        assert_eq!(Collection::from_route("raw_input"), Some(Collection::Raw));
        assert_eq!(
            Collection::from_route("standardized_output"),
            Some(Collection::Standardized)
        );
        assert_eq!(Collection::from_route("parsed"), None);
    }
}
