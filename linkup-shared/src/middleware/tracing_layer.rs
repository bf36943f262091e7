use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a service: its own crate at debug, everything else at info.
pub fn default_filter(service_name: &str) -> String {
    let target = service_name.replace('-', "_");
    format!("info,{target}=debug,linkup_shared=debug,tower_http=debug")
}

pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

    let is_production = std::env::var("LINKUP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    tracing::info!(service = service_name, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_crate_target_names() {
        let filter = default_filter("linkup-matching");
        assert!(filter.contains("linkup_matching=debug"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
