use crate::config::model::*;
use crate::registry::types::{Node, Service};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.discovery.services = vec![Service::new(
        "greeter",
        "1.0.0",
        vec![
            Node::new("greeter-1", "10.0.0.1:8080"),
            Node::new("greeter-2", "10.0.0.2:8080"),
        ],
    )];
    config.wrappers.order = vec![WrapperKind::Shard, WrapperKind::RateLimit];
    config.wrappers.shard_keys = vec!["X-Tenant".to_string()];
    config.wrappers.rate_limit = Some(RateLimit {
        requests_per_second: 100.0,
        burst: 10,
    });
    config
}

#[test]
fn test_config_validation_success() {
    let config = create_test_config();
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.discovery.kind, DiscoveryKind::Memory);
    assert_eq!(config.selector.strategy, StrategyKind::RoundRobin);
    assert_eq!(config.discovery.dns_domain, "local");
}

#[test]
fn test_invalid_node_address() {
    let mut config = create_test_config();
    config.discovery.services[0].nodes[0].address = "10.0.0.1".to_string();
    assert!(config.validate().is_err());

    config.discovery.services[0].nodes[0].address = ":8080".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_duplicate_node_id() {
    let mut config = create_test_config();
    config.discovery.services[0].nodes[1].id = "greeter-1".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate node id"));
}

#[test]
fn test_shard_wrapper_requires_keys() {
    let mut config = create_test_config();
    config.wrappers.shard_keys.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_rate_limit_wrapper_requires_section() {
    let mut config = create_test_config();
    config.wrappers.rate_limit = None;
    assert!(config.validate().is_err());
}

#[test]
fn test_rate_limit_zero_burst() {
    let mut config = create_test_config();
    config.wrappers.rate_limit = Some(RateLimit {
        requests_per_second: 10.0,
        burst: 0,
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_endpoints_without_rate_limit_wrapper() {
    let mut config = create_test_config();
    config.wrappers.order = vec![WrapperKind::Shard];
    config.wrappers.rate_limit_endpoints = vec!["Greeter.Hello".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_duplicate_wrapper() {
    let mut config = create_test_config();
    config.wrappers.order.push(WrapperKind::Shard);
    assert!(config.validate().is_err());
}

#[test]
fn test_client_limits() {
    let mut config = create_test_config();
    config.client.request_timeout_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = create_test_config();
    config.client.retries = 11;
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_endpoint_filter() {
    let mut config = create_test_config();
    config.selector.filters = vec![FilterSpec::Endpoint {
        endpoint: String::new(),
    }];
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Endpoint filter"));
}

#[test]
fn test_parse_toml() {
    let raw = r#"
[discovery]
kind = "memory"
cache_ttl_seconds = 30

[[discovery.services]]
name = "greeter"
version = "1.1.0"
endpoints = ["Greeter.Hello", "Greeter.Goodbye"]

[[discovery.services.nodes]]
id = "greeter-1"
address = "10.0.0.1:8080"
metadata = { datacenter = "eu-1" }

[selector]
strategy = "random"
filters = [
    { kind = "latest_version" },
    { kind = "metadata", key = "datacenter", value = "eu-1" },
    { kind = "endpoint", endpoint = "Greeter.Hello" },
]

[client]
retries = 2

[wrappers]
order = ["rate_limit", "latest_version"]
rate_limit = { requests_per_second = 50.0, burst = 5 }
rate_limit_endpoints = ["Greeter.Hello"]
"#;

    let config: Config = toml::from_str(raw).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.discovery.cache_ttl_seconds, 30);
    assert_eq!(config.discovery.services[0].nodes[0].metadata["datacenter"], "eu-1");
    assert_eq!(config.selector.strategy, StrategyKind::Random);
    assert_eq!(config.selector.filters.len(), 3);
    assert_eq!(config.discovery.services[0].endpoints.len(), 2);
    assert_eq!(
        config.selector.filters[2],
        FilterSpec::Endpoint {
            endpoint: "Greeter.Hello".to_string()
        }
    );
    assert_eq!(
        config.selector.filters[1],
        FilterSpec::Metadata {
            key: "datacenter".to_string(),
            value: "eu-1".to_string()
        }
    );
    assert_eq!(config.client.retries, 2);
    assert_eq!(config.client.request_timeout_seconds, 5);
    assert_eq!(
        config.wrappers.order,
        vec![WrapperKind::RateLimit, WrapperKind::LatestVersion]
    );
}
