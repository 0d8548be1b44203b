use errgate_config::TelemetryConfig;
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;

/// Build the OpenTelemetry resource describing this service
pub fn build_resource(config: &TelemetryConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new(semconv::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(semconv::SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ];

    // Sorted so the resource is stable across runs
    let mut extra: Vec<_> = config.resource_attributes.iter().collect();
    extra.sort();
    attrs.extend(extra.into_iter().map(|(key, value)| KeyValue::new(key.clone(), value.clone())));

    Resource::builder_empty().with_attributes(attrs).build()
}

#[cfg(test)]
mod tests {
    use opentelemetry::{Key, Value};

    use super::*;

    #[test]
    fn resource_carries_service_name_and_extra_attributes() {
        let mut config = TelemetryConfig {
            service_name: "records-api".to_string(),
            ..TelemetryConfig::default()
        };
        config
            .resource_attributes
            .insert("deployment.environment".to_string(), "staging".to_string());

        let resource = build_resource(&config);

        assert_eq!(resource.get(&Key::new(semconv::SERVICE_NAME)), Some(Value::from("records-api")));
        assert_eq!(resource.get(&Key::new("deployment.environment")), Some(Value::from("staging")));
    }
}
