//! Shared User-Agent string for the listing and transfer HTTP clients.
//!
//! Single source for the UA format so listing and transfer traffic stay
//! consistent and easy to update (good citizenship; RFC 9308).

/// Default User-Agent identifying the tool.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("treemirror/{version} (public-dataset-mirror)")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("treemirror/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has a version"),
            "UA must carry the crate version: {ua}"
        );
    }
}
