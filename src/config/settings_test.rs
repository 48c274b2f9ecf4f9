use super::*;

#[test]
fn test_defaults_deserialize() {
    let settings = Settings::from_builder(Settings::defaults().unwrap()).unwrap();

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.scan.backend, ScanBackendKind::Simulated);
    assert_eq!(settings.scan.poll_interval(), None);
    assert!(!settings.scan.allow_private_hosts);
    assert_eq!(settings.pricing, PricingTable::default());
    assert_eq!(settings.sharing.estimate_ttl_hours, 72);
    assert!(settings.audit_api.api_key.is_none());
    assert!(settings.llm.api_key.is_none());
}

#[test]
fn test_overrides_take_precedence() {
    let builder = Settings::defaults()
        .unwrap()
        .set_override("scan.backend", "http")
        .unwrap()
        .set_override("scan.poll_interval_ms", 250)
        .unwrap()
        .set_override("pricing.currency", "USD")
        .unwrap()
        .set_override("llm.api_key", "sk-test")
        .unwrap();
    let settings = Settings::from_builder(builder).unwrap();

    assert_eq!(settings.scan.backend, ScanBackendKind::Http);
    assert_eq!(
        settings.scan.poll_interval(),
        Some(Duration::from_millis(250))
    );
    assert_eq!(settings.pricing.currency, "USD");
    assert_eq!(settings.pricing.critical_cents, 5000);
    assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_unknown_backend_is_rejected() {
    let builder = Settings::defaults()
        .unwrap()
        .set_override("scan.backend", "firecrawl")
        .unwrap();
    assert!(Settings::from_builder(builder).is_err());
}
