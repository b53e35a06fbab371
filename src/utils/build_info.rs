/// Build facts embedded by `build.rs`, shown by `onboard_cli version`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

impl BuildMetadata {
    pub fn summary(&self) -> String {
        format!(
            "onboard_cli {} ({} {}, {} build, {})",
            self.version, self.git_hash, self.target, self.profile, self.timestamp
        )
    }
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("ONBOARD_CORE_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("ONBOARD_CORE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("ONBOARD_CORE_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("ONBOARD_CORE_BUILD_PROFILE").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_starts_with_package_version() {
        let summary = current().summary();
        assert!(summary.starts_with(&format!("onboard_cli {}", env!("CARGO_PKG_VERSION"))));
    }
}
