use env_logger::{Builder, Env};

/// `RUST_LOG` wins when set. Otherwise the forge crates log at info (debug
/// with `--debug`) and everything else at warn.
pub fn init_logging(debug: bool) {
    Builder::from_env(Env::default().default_filter_or(default_filter(debug)))
        .format_timestamp_millis()
        .init();
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "warn,forge_core=debug,forge_llm=debug,workflow_system=debug,forge=debug"
    } else {
        "warn,forge_core=info,forge_llm=info,workflow_system=info,forge=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_crates_log_info_by_default() {
        let filter = default_filter(false);
        assert!(filter.starts_with("warn,"));
        for target in ["forge_core", "forge_llm", "workflow_system", "forge"] {
            assert!(filter.contains(&format!("{target}=info")), "{target}");
        }
        assert!(default_filter(true).contains("forge_llm=debug"));
    }
}
